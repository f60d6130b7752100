//! Cycle-based simulation of a [`Circuit`](crate::Circuit).
//!
//! The simulator interprets the signal graph directly. Combinational logic is evaluated on demand, and registers only change on [`Simulator::posedge_clk`] (or, for [`ResetPolicy::Asynchronous`](crate::ResetPolicy::Asynchronous) registers, as soon as reset is asserted).

pub mod trace;

use trace::Trace;

use crate::error::*;
use crate::graph::{self, SignalData};

use std::collections::{HashMap, HashSet};

/// Simulates a single [`Circuit`](crate::Circuit).
///
/// All inputs start at `0`, every register starts at its reset value, and reset starts deasserted.
///
/// # Examples
///
/// ```
/// use hdlgraph::*;
///
/// # fn main() -> Result<()> {
/// let c = Context::new();
///
/// let en = c.input("en", 1)?;
/// let q = c.reg(ResetPolicy::Synchronous, 0u32, 1, |q| q.xor(en))?;
/// let toggle = c.circuit("toggle", vec![("q", q)])?;
///
/// let mut sim = sim::Simulator::new(&toggle);
/// sim.set_input("en", true)?;
/// sim.posedge_clk()?;
/// assert_eq!(sim.output("q")?, 1);
/// sim.posedge_clk()?;
/// assert_eq!(sim.output("q")?, 0);
/// # Ok(())
/// # }
/// ```
pub struct Simulator<'a, 'c> {
    circuit: &'c graph::Circuit<'a>,

    inputs: HashMap<&'a graph::Signal<'a>, u128>,
    registers: HashMap<&'a graph::Signal<'a>, u128>,
    reset: bool,
}

impl<'a, 'c> Simulator<'a, 'c> {
    pub fn new(circuit: &'c graph::Circuit<'a>) -> Simulator<'a, 'c> {
        let inputs = circuit.inputs.iter().map(|&input| (input, 0)).collect();
        let registers = circuit
            .registers
            .iter()
            .map(|&reg| (reg, graph::register_data(reg).reset_value))
            .collect();

        Simulator {
            circuit,

            inputs,
            registers,
            reset: false,
        }
    }

    pub fn circuit(&self) -> &'c graph::Circuit<'a> {
        self.circuit
    }

    /// Sets the input named `name` to `value`. The new value is visible to combinational logic immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPort`] if the circuit has no such input, or [`Error::ValueOutOfRange`] if `value` doesn't fit in the input's bit width.
    pub fn set_input(&mut self, name: &str, value: impl Into<graph::Value>) -> Result<()> {
        let input = self.find_input(name)?;
        let value = value.into().check_fits(input.bit_width())?;
        self.inputs.insert(input, value);
        Ok(())
    }

    /// Returns the current value of the input named `name`.
    pub fn input(&self, name: &str) -> Result<u128> {
        let input = self.find_input(name)?;
        Ok(self.inputs[&input])
    }

    /// Asserts (`true`) or deasserts (`false`) the implicit reset.
    ///
    /// Asserting reset immediately forces every [`ResetPolicy::Asynchronous`](crate::ResetPolicy::Asynchronous) register to its reset value. Synchronous registers only see reset on the next rising edge.
    pub fn set_reset(&mut self, asserted: bool) {
        self.reset = asserted;

        if asserted {
            for (&reg, value) in self.registers.iter_mut() {
                let data = graph::register_data(reg);
                if data.reset_policy == graph::ResetPolicy::Asynchronous {
                    *value = data.reset_value;
                }
            }
        }
    }

    /// Evaluates the output named `name` from the current inputs and register values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPort`] if the circuit has no such output, or [`Error::CyclicCombinationalLogic`] if the output depends on a combinational loop.
    pub fn output(&self, name: &str) -> Result<u128> {
        let output = self
            .circuit
            .outputs
            .iter()
            .find(|output| output.name == name)
            .ok_or_else(|| self.unknown_port(name))?;
        self.eval(output.source, &mut HashMap::new())
    }

    /// Returns the current value of every register, in the same order as the `__reg_N` names used by code generation.
    pub fn registers(&self) -> impl Iterator<Item = u128> + '_ + use<'_, 'a, 'c> {
        self.circuit
            .registers
            .iter()
            .map(move |reg| self.registers[reg])
    }

    /// Simulates a rising edge of `clk`.
    ///
    /// Every register's next value is computed from the state before the edge, then all registers are updated at once. While reset is asserted, registers with a reset policy other than [`ResetPolicy::None`](crate::ResetPolicy::None) take their reset value instead.
    pub fn posedge_clk(&mut self) -> Result<()> {
        let mut values = HashMap::new();
        let mut next_values = Vec::with_capacity(self.circuit.registers.len());

        for &reg in self.circuit.registers.iter() {
            let data = graph::register_data(reg);
            let value = if self.reset && data.reset_policy.uses_reset() {
                data.reset_value
            } else {
                let next = (*data.next.borrow()).ok_or(Error::UndrivenRegister { id: data.id })?;
                self.eval(next, &mut values)?
            };
            next_values.push((reg, value));
        }

        for (reg, value) in next_values {
            self.registers.insert(reg, value);
        }

        Ok(())
    }

    fn find_input(&self, name: &str) -> Result<&'a graph::Signal<'a>> {
        self.circuit
            .inputs
            .iter()
            .copied()
            .find(|input| matches!(input.data, SignalData::Input { name: ref input_name, .. } if input_name == name))
            .ok_or_else(|| self.unknown_port(name))
    }

    fn unknown_port(&self, name: &str) -> Error {
        Error::UnknownPort {
            circuit: self.circuit.name.clone(),
            name: name.to_owned(),
        }
    }

    fn eval(
        &self,
        signal: &'a graph::Signal<'a>,
        values: &mut HashMap<&'a graph::Signal<'a>, u128>,
    ) -> Result<u128> {
        enum Frame<'a> {
            Enter(&'a graph::Signal<'a>),
            Leave(&'a graph::Signal<'a>),
        }

        let mut frames = vec![Frame::Enter(signal)];
        let mut active = HashSet::new();

        let mut results = Vec::new();

        while let Some(frame) = frames.pop() {
            let (signal, value) = match frame {
                Frame::Enter(signal) => {
                    if let Some(&value) = values.get(&signal) {
                        results.push(value);
                        continue;
                    }
                    if !active.insert(signal) {
                        return Err(Error::CyclicCombinationalLogic {
                            circuit: self.circuit.name.clone(),
                            node: signal.describe(),
                        });
                    }

                    match signal.data {
                        SignalData::Lit { value, .. } => (signal, value),
                        SignalData::Input { .. } => (signal, self.inputs[&signal]),
                        SignalData::Reg { .. } => (signal, self.registers[&signal]),

                        SignalData::Wire { data } => {
                            let source = (*data.source.borrow()).ok_or_else(|| {
                                Error::UndrivenWire {
                                    name: data.name.clone(),
                                }
                            })?;
                            frames.push(Frame::Leave(signal));
                            frames.push(Frame::Enter(source));
                            continue;
                        }

                        SignalData::UnOp { source, .. } => {
                            frames.push(Frame::Leave(signal));
                            frames.push(Frame::Enter(source));
                            continue;
                        }
                        SignalData::BinOp { lhs, rhs, .. } => {
                            frames.push(Frame::Leave(signal));
                            frames.push(Frame::Enter(rhs));
                            frames.push(Frame::Enter(lhs));
                            continue;
                        }
                    }
                }
                Frame::Leave(signal) => {
                    let value = match signal.data {
                        SignalData::Wire { .. } => pop_result(&mut results),

                        SignalData::UnOp { op, bit_width, .. } => {
                            let source = pop_result(&mut results);
                            match op {
                                graph::UnOp::Not => !source & graph::mask(bit_width),
                            }
                        }
                        SignalData::BinOp { op, .. } => {
                            let rhs = pop_result(&mut results);
                            let lhs = pop_result(&mut results);
                            match op {
                                graph::BinOp::BitAnd => lhs & rhs,
                                graph::BinOp::BitOr => lhs | rhs,
                                graph::BinOp::BitXor => lhs ^ rhs,
                            }
                        }

                        SignalData::Lit { .. } | SignalData::Input { .. } | SignalData::Reg { .. } => {
                            unreachable!()
                        }
                    };
                    (signal, value)
                }
            };

            active.remove(&signal);
            values.insert(signal, value);
            results.push(value);
        }

        Ok(pop_result(&mut results))
    }
}

fn pop_result(results: &mut Vec<u128>) -> u128 {
    results
        .pop()
        .unwrap_or_else(|| unreachable!("operand was not evaluated"))
}

enum Probe {
    Input(String),
    Output(String),
    Register(usize),
}

/// Records a [`Simulator`]'s inputs, outputs and registers into a [`Trace`] at caller-chosen time stamps.
///
/// Registers are recorded under the same `__reg_N` names code generation uses.
pub struct Tracer<T: Trace> {
    trace: T,
    probes: Vec<(Probe, T::SignalId)>,
}

impl<T: Trace> Tracer<T> {
    /// Declares every signal of `sim`'s circuit in `trace`, inside a module scope named after the circuit.
    pub fn new(sim: &Simulator, mut trace: T) -> Result<Tracer<T>> {
        let circuit = sim.circuit();
        let mut probes = Vec::new();

        trace.push_module(circuit.name())?;
        for (name, bit_width) in circuit.inputs() {
            let id = trace.add_signal(name, bit_width)?;
            probes.push((Probe::Input(name.to_owned()), id));
        }
        for output in circuit.outputs() {
            let id = trace.add_signal(output.name(), output.bit_width())?;
            probes.push((Probe::Output(output.name().to_owned()), id));
        }
        for (index, reg) in circuit.registers.iter().enumerate() {
            let id = trace.add_signal(&format!("__reg_{}", index), reg.bit_width())?;
            probes.push((Probe::Register(index), id));
        }
        trace.pop_module()?;

        Ok(Tracer { trace, probes })
    }

    /// Records the current value of every signal at `time_stamp`.
    pub fn sample(&mut self, sim: &Simulator, time_stamp: u64) -> Result<()> {
        let registers: Vec<u128> = sim.registers().collect();

        self.trace.update_time_stamp(time_stamp)?;
        for (probe, id) in self.probes.iter() {
            let value = match probe {
                Probe::Input(name) => sim.input(name)?,
                Probe::Output(name) => sim.output(name)?,
                Probe::Register(index) => registers[*index],
            };
            self.trace.update_signal(id, value)?;
        }

        Ok(())
    }

    pub fn into_inner(self) -> T {
        self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::*;

    use rstest::rstest;

    use std::io;

    #[rstest]
    #[case(0, 0, 0, 0, 0)]
    #[case(0, 1, 0, 1, 1)]
    #[case(1, 0, 0, 1, 1)]
    #[case(1, 1, 1, 1, 0)]
    fn bitwise_truth_table(
        #[case] a: u32,
        #[case] b: u32,
        #[case] and: u128,
        #[case] or: u128,
        #[case] xor: u128,
    ) {
        let c = Context::new();

        let i1 = c.input("i1", 1).unwrap();
        let i2 = c.input("i2", 1).unwrap();
        let circuit = c
            .circuit(
                "ops",
                vec![
                    ("and_o", i1.and(i2).unwrap()),
                    ("or_o", i1.or(i2).unwrap()),
                    ("xor_o", i1.xor(i2).unwrap()),
                    ("not_o", !i1),
                ],
            )
            .unwrap();

        let mut sim = Simulator::new(&circuit);
        sim.set_input("i1", a).unwrap();
        sim.set_input("i2", b).unwrap();

        assert_eq!(sim.output("and_o").unwrap(), and);
        assert_eq!(sim.output("or_o").unwrap(), or);
        assert_eq!(sim.output("xor_o").unwrap(), xor);
        assert_eq!(sim.output("not_o").unwrap(), (a ^ 1) as u128);
    }

    #[rstest]
    #[case(1, 0b0, 0b1)]
    #[case(4, 0b0101, 0b1010)]
    #[case(128, 0, u128::MAX)]
    fn not_stays_within_bit_width(#[case] bit_width: u32, #[case] value: u128, #[case] expected: u128) {
        let c = Context::new();

        let i = c.input("i", bit_width).unwrap();
        let circuit = c.circuit("inv", vec![("o", !i)]).unwrap();

        let mut sim = Simulator::new(&circuit);
        sim.set_input("i", value).unwrap();

        assert_eq!(sim.output("o").unwrap(), expected);
    }

    #[test]
    fn port_errors() {
        let c = Context::new();

        let i = c.input("i", 2).unwrap();
        let circuit = c.circuit("c", vec![("o", !i)]).unwrap();

        let mut sim = Simulator::new(&circuit);

        assert!(matches!(
            sim.set_input("nope", 0u32),
            Err(Error::UnknownPort { ref name, .. }) if name == "nope"
        ));
        assert!(matches!(
            sim.set_input("i", 4u32),
            Err(Error::ValueOutOfRange { value: 4, bit_width: 2, .. })
        ));
        assert!(matches!(
            sim.output("i"),
            Err(Error::UnknownPort { ref circuit, .. }) if circuit == "c"
        ));
        assert_eq!(sim.input("i").unwrap(), 0);
    }

    #[test]
    fn leds() {
        let c = Context::new();

        let in0 = !c.input("key0", 1).unwrap();
        let in1 = !c.input("key1", 1).unwrap();
        let q = c
            .reg(ResetPolicy::None, 0u32, 1, |d| d.and(!in1)?.or((!d).and(in0)?))
            .unwrap();
        let circuit = c.circuit("leds", vec![("q", q)]).unwrap();

        let mut sim = Simulator::new(&circuit);
        // Keys are active low
        sim.set_input("key0", true).unwrap();
        sim.set_input("key1", true).unwrap();
        sim.posedge_clk().unwrap();
        assert_eq!(sim.output("q").unwrap(), 0);

        sim.set_input("key0", false).unwrap();
        sim.posedge_clk().unwrap();
        assert_eq!(sim.output("q").unwrap(), 1);

        sim.set_input("key0", true).unwrap();
        sim.posedge_clk().unwrap();
        sim.posedge_clk().unwrap();
        assert_eq!(sim.output("q").unwrap(), 1);

        sim.set_input("key1", false).unwrap();
        sim.posedge_clk().unwrap();
        assert_eq!(sim.output("q").unwrap(), 0);
    }

    #[test]
    fn registers_sample_the_same_edge() {
        let c = Context::new();

        let b_val = c.wire("b_val", 1).unwrap();
        let a = c
            .reg(ResetPolicy::None, 1u32, 1, |_| Ok(b_val.value()))
            .unwrap();
        let b = c.reg(ResetPolicy::None, 0u32, 1, |_| Ok(a)).unwrap();
        b_val.drive(b).unwrap();
        let circuit = c.circuit("swap", vec![("a", a), ("b", b)]).unwrap();

        let mut sim = Simulator::new(&circuit);
        assert_eq!(sim.registers().collect::<Vec<_>>(), vec![1, 0]);

        sim.posedge_clk().unwrap();
        assert_eq!(sim.output("a").unwrap(), 0);
        assert_eq!(sim.output("b").unwrap(), 1);

        sim.posedge_clk().unwrap();
        assert_eq!(sim.output("a").unwrap(), 1);
        assert_eq!(sim.output("b").unwrap(), 0);
    }

    #[rstest]
    #[case(ResetPolicy::None, 9)]
    #[case(ResetPolicy::Synchronous, 3)]
    #[case(ResetPolicy::Asynchronous, 3)]
    fn reset_on_clock_edge(#[case] reset_policy: ResetPolicy, #[case] expected: u128) {
        let c = Context::new();

        let d = c.input("d", 4).unwrap();
        let q = c.reg(reset_policy, 3u32, 4, |_| Ok(d)).unwrap();
        let circuit = c.circuit("latch", vec![("q", q)]).unwrap();

        let mut sim = Simulator::new(&circuit);
        assert_eq!(sim.output("q").unwrap(), 3);

        sim.set_input("d", 9u32).unwrap();
        sim.posedge_clk().unwrap();
        assert_eq!(sim.output("q").unwrap(), 9);

        sim.set_reset(true);
        sim.posedge_clk().unwrap();
        assert_eq!(sim.output("q").unwrap(), expected);

        sim.set_reset(false);
        sim.posedge_clk().unwrap();
        assert_eq!(sim.output("q").unwrap(), 9);
    }

    #[test]
    fn asynchronous_reset_needs_no_clock() {
        let c = Context::new();

        let d = c.input("d", 4).unwrap();
        let sync_q = c.reg(ResetPolicy::Synchronous, 1u32, 4, |_| Ok(d)).unwrap();
        let async_q = c.reg(ResetPolicy::Asynchronous, 2u32, 4, |_| Ok(d)).unwrap();
        let circuit = c
            .circuit("resets", vec![("sync_q", sync_q), ("async_q", async_q)])
            .unwrap();

        let mut sim = Simulator::new(&circuit);
        sim.set_input("d", 0xfu32).unwrap();
        sim.posedge_clk().unwrap();

        sim.set_reset(true);

        assert_eq!(sim.output("sync_q").unwrap(), 0xf);
        assert_eq!(sim.output("async_q").unwrap(), 2);
    }

    #[test]
    fn identity_register_keeps_its_reset_value() {
        let c = Context::new();

        let q = c.reg(ResetPolicy::Synchronous, 5u32, 4, Ok).unwrap();
        let circuit = c.circuit("hold", vec![("q", q)]).unwrap();

        let mut sim = Simulator::new(&circuit);
        for _ in 0..4 {
            sim.posedge_clk().unwrap();
            assert_eq!(sim.output("q").unwrap(), 5);
        }
    }

    #[test]
    fn combinational_loop_error() {
        let c = Context::new();

        let i = c.input("i", 1).unwrap();
        let w = c.wire("w", 1).unwrap();
        w.drive(w.value().and(i).unwrap()).unwrap();
        let circuit = c.circuit("looped", vec![("o", w.value())]).unwrap();

        let sim = Simulator::new(&circuit);

        assert!(matches!(
            sim.output("o"),
            Err(Error::CyclicCombinationalLogic { ref node, .. }) if node == "wire \"w\""
        ));
    }

    #[derive(Default)]
    struct RecordingTrace {
        events: Vec<String>,
        names: Vec<String>,
    }

    impl Trace for RecordingTrace {
        type SignalId = usize;

        fn push_module(&mut self, name: &str) -> io::Result<()> {
            self.events.push(format!("module {}", name));
            Ok(())
        }

        fn pop_module(&mut self) -> io::Result<()> {
            self.events.push("end".to_owned());
            Ok(())
        }

        fn add_signal(&mut self, name: &str, bit_width: u32) -> io::Result<usize> {
            self.events.push(format!("signal {} {}", name, bit_width));
            self.names.push(name.to_owned());
            Ok(self.names.len() - 1)
        }

        fn update_time_stamp(&mut self, time_stamp: u64) -> io::Result<()> {
            self.events.push(format!("#{}", time_stamp));
            Ok(())
        }

        fn update_signal(&mut self, signal_id: &usize, value: u128) -> io::Result<()> {
            self.events
                .push(format!("{}={}", self.names[*signal_id], value));
            Ok(())
        }
    }

    #[test]
    fn tracer_records_every_signal() {
        let c = Context::new();

        let en = c.input("en", 1).unwrap();
        let count = c
            .reg(ResetPolicy::None, 0u32, 2, |count| {
                count.xor(c.lit(1u32, 2)?)?.and(c.lit(3u32, 2)?)
            })
            .unwrap();
        let circuit = c
            .circuit("counter", vec![("count", count), ("idle", !en)])
            .unwrap();

        let mut sim = Simulator::new(&circuit);
        let mut tracer = Tracer::new(&sim, RecordingTrace::default()).unwrap();
        tracer.sample(&sim, 0).unwrap();
        sim.set_input("en", true).unwrap();
        sim.posedge_clk().unwrap();
        tracer.sample(&sim, 10).unwrap();

        assert_eq!(
            tracer.into_inner().events,
            vec![
                "module counter",
                "signal en 1",
                "signal count 2",
                "signal idle 1",
                "signal __reg_0 2",
                "end",
                "#0",
                "en=0",
                "count=0",
                "idle=1",
                "__reg_0=0",
                "#10",
                "en=1",
                "count=1",
                "idle=0",
                "__reg_0=1",
            ]
        );
    }
}
