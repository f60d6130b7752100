use super::context::*;
use super::register::*;
use super::signal::*;

use crate::error::*;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ptr;

/// A named output binding of a [`Circuit`].
pub struct Output<'a> {
    pub(crate) name: String,
    pub(crate) source: &'a Signal<'a>,
}

impl<'a> Output<'a> {
    /// Returns the port name this output is bound to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the bit width of the signal driving this output.
    pub fn bit_width(&self) -> u32 {
        self.source.bit_width()
    }
}

/// A non-fatal finding about a [`Circuit`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Diagnostic {
    /// An input declared in the circuit's [`Context`] that none of the circuit's outputs depend on.
    UnusedInput { name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnusedInput { name } => {
                write!(f, "input \"{}\" is not used by any output", name)
            }
        }
    }
}

/// The unit of code generation: a named set of outputs, plus everything they depend on.
///
/// A `Circuit` is created by [`Context::circuit`] and is immutable afterwards. Its inputs are the [`Context`] inputs reachable from its outputs, through combinational logic, register next-state expressions and wire drivers.
#[must_use]
pub struct Circuit<'a> {
    pub(crate) name: String,

    pub(crate) inputs: Vec<&'a Signal<'a>>,
    pub(crate) outputs: Vec<Output<'a>>,
    pub(crate) registers: Vec<&'a Signal<'a>>,

    diagnostics: Vec<Diagnostic>,
}

impl<'a> Circuit<'a> {
    /// Returns the circuit's name, which is also the name of the generated module.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the names and bit widths of this circuit's inputs, sorted by name.
    pub fn inputs(&self) -> impl Iterator<Item = (&str, u32)> + '_ + use<'_, 'a> {
        self.inputs.iter().map(|input| match input.data {
            SignalData::Input { ref name, bit_width } => (name.as_str(), bit_width),
            _ => unreachable!(),
        })
    }

    /// Returns this circuit's outputs, in the order they were bound.
    pub fn outputs(&self) -> &[Output<'a>] {
        &self.outputs
    }

    /// Returns the number of registers reachable from this circuit's outputs.
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Returns the non-fatal [`Diagnostic`]s found while building this circuit.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl<'a> Context<'a> {
    /// Creates a [`Circuit`] called `name`, whose outputs are bound to the given signals in the given order.
    ///
    /// Inputs of this `Context` which none of the outputs depend on are reported as [`Diagnostic::UnusedInput`]s; this is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateOutputName`] if two outputs share a name, [`Error::DuplicateName`] if an output shares its name with an input or wire the circuit uses, [`Error::InvalidName`] for unusable names, [`Error::ContextMismatch`] for signals from another `Context`, and [`Error::UndrivenRegister`]/[`Error::UndrivenWire`] if an output depends on a register or wire without a driver.
    ///
    /// # Examples
    ///
    /// ```
    /// use hdlgraph::*;
    ///
    /// # fn main() -> Result<()> {
    /// let c = Context::new();
    ///
    /// let a = c.input("a", 1)?;
    /// let b = c.input("b", 1)?;
    /// let half_adder = c.circuit("half_adder", vec![("sum", a.xor(b)?), ("carry", a.and(b)?)])?;
    ///
    /// assert!(matches!(
    ///     c.circuit("c", vec![("q", a), ("q", b)]),
    ///     Err(Error::DuplicateOutputName { .. })
    /// ));
    /// # Ok(())
    /// # }
    /// ```
    pub fn circuit<N, I>(&'a self, name: impl Into<String>, outputs: I) -> Result<Circuit<'a>>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, &'a Signal<'a>)>,
    {
        let name = name.into();
        validate_name(&name)?;

        let mut bound = Vec::new();
        for (output_name, source) in outputs {
            let output_name = output_name.into();
            validate_name(&output_name)?;
            if !ptr::eq(self, source.context) {
                return Err(Error::ContextMismatch);
            }
            if bound.iter().any(|output: &Output| output.name == output_name) {
                return Err(Error::DuplicateOutputName { name: output_name });
            }
            bound.push(Output {
                name: output_name,
                source,
            });
        }

        let reachable = trace_reachable(&bound)?;

        for output in bound.iter() {
            if reachable.inputs.contains_key(&output.name)
                || reachable.wire_names.contains(&output.name)
            {
                return Err(Error::DuplicateName {
                    name: output.name.clone(),
                });
            }
        }

        let diagnostics: Vec<Diagnostic> = self
            .inputs
            .borrow()
            .keys()
            .filter(|input_name| !reachable.inputs.contains_key(*input_name))
            .map(|input_name| Diagnostic::UnusedInput {
                name: input_name.clone(),
            })
            .collect();
        for diagnostic in diagnostics.iter() {
            tracing::warn!(circuit = %name, "{}", diagnostic);
        }

        let circuit = Circuit {
            name,

            inputs: reachable.inputs.into_values().collect(),
            outputs: bound,
            registers: reachable.registers,

            diagnostics,
        };
        tracing::debug!(
            circuit = %circuit.name,
            inputs = circuit.inputs.len(),
            outputs = circuit.outputs.len(),
            registers = circuit.registers.len(),
            "built circuit"
        );
        Ok(circuit)
    }
}

struct Reachable<'a> {
    inputs: BTreeMap<String, &'a Signal<'a>>,
    registers: Vec<&'a Signal<'a>>,
    wire_names: HashSet<String>,
}

/// Walks everything the outputs depend on, in a fixed order: outputs as bound, left operands before right ones.
fn trace_reachable<'a>(outputs: &[Output<'a>]) -> Result<Reachable<'a>> {
    let mut reachable = Reachable {
        inputs: BTreeMap::new(),
        registers: Vec::new(),
        wire_names: HashSet::new(),
    };
    let mut visited = HashSet::new();

    let mut frames: Vec<&'a Signal<'a>> = outputs.iter().rev().map(|output| output.source).collect();

    while let Some(signal) = frames.pop() {
        if !visited.insert(signal) {
            continue;
        }

        match signal.data {
            SignalData::Lit { .. } => (),

            SignalData::Input { ref name, .. } => {
                reachable.inputs.insert(name.clone(), signal);
            }

            SignalData::Reg { data } => {
                reachable.registers.push(signal);
                let next = (*data.next.borrow()).ok_or(Error::UndrivenRegister { id: data.id })?;
                frames.push(next);
            }
            SignalData::Wire { data } => {
                reachable.wire_names.insert(data.name.clone());
                let source = (*data.source.borrow()).ok_or_else(|| Error::UndrivenWire {
                    name: data.name.clone(),
                })?;
                frames.push(source);
            }

            SignalData::UnOp { source, .. } => {
                frames.push(source);
            }
            SignalData::BinOp { lhs, rhs, .. } => {
                frames.push(rhs);
                frames.push(lhs);
            }
        }
    }

    Ok(reachable)
}

pub(crate) fn register_data<'a>(signal: &'a Signal<'a>) -> &'a RegisterData<'a> {
    match signal.data {
        SignalData::Reg { data } => data,
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_output_name_error() {
        let c = Context::new();

        let x = c.input("x", 1).unwrap();
        let y = c.input("y", 1).unwrap();

        assert!(matches!(
            c.circuit("c", vec![("q", x), ("q", y)]),
            Err(Error::DuplicateOutputName { ref name }) if name == "q"
        ));
    }

    #[test]
    fn output_named_like_input_error() {
        let c = Context::new();

        let x = c.input("x", 1).unwrap();

        assert!(matches!(
            c.circuit("c", vec![("x", !x)]),
            Err(Error::DuplicateName { .. })
        ));
    }

    #[test]
    fn reachable_inputs_are_sorted_and_unused_inputs_reported() {
        let c = Context::new();

        let b = c.input("b", 2).unwrap();
        let a = c.input("a", 2).unwrap();
        let _unused = c.input("unused", 1).unwrap();

        let circuit = c.circuit("c", vec![("o", b.or(a).unwrap())]).unwrap();

        assert_eq!(circuit.inputs().collect::<Vec<_>>(), vec![("a", 2), ("b", 2)]);
        assert_eq!(
            circuit.diagnostics(),
            &[Diagnostic::UnusedInput {
                name: "unused".into()
            }]
        );
    }

    #[test]
    fn inputs_behind_registers_are_reachable() {
        let c = Context::new();

        let d = c.input("d", 8).unwrap();
        let r1 = c.reg(ResetPolicy::None, 0u32, 8, |_| Ok(d)).unwrap();
        let r2 = c.reg(ResetPolicy::None, 0u32, 8, |_| Ok(r1)).unwrap();

        let circuit = c.circuit("delay", vec![("q", r2)]).unwrap();

        assert_eq!(circuit.inputs().collect::<Vec<_>>(), vec![("d", 8)]);
        assert_eq!(circuit.register_count(), 2);
        assert!(circuit.registers[0] == r2);
        assert!(circuit.registers[1] == r1);
        assert!(circuit.diagnostics().is_empty());
    }

    #[test]
    fn undriven_wire_error() {
        let c = Context::new();

        let w = c.wire("w", 1).unwrap();

        assert!(matches!(
            c.circuit("c", vec![("o", !w.value())]),
            Err(Error::UndrivenWire { ref name }) if name == "w"
        ));
    }

    #[test]
    fn undriven_register_error() {
        let c = Context::new();

        let i = c.input("i", 1).unwrap();
        let mut leaked = None;
        let _ = c.reg(ResetPolicy::None, 0u32, 4, |q| {
            leaked = Some(q);
            Ok(i)
        });
        let leaked = leaked.unwrap();

        assert!(matches!(
            c.circuit("c", vec![("o", leaked)]),
            Err(Error::UndrivenRegister { id: 0 })
        ));
    }

    #[test]
    fn foreign_output_error() {
        let c1 = Context::new();
        let c2 = Context::new();

        assert!(matches!(
            c1.circuit("c", vec![("o", c2.high())]),
            Err(Error::ContextMismatch)
        ));
    }

    #[test]
    fn output_metadata() {
        let c = Context::new();

        let i = c.input("i", 5).unwrap();
        let circuit = c.circuit("passthrough", vec![("o", i)]).unwrap();

        assert_eq!(circuit.name(), "passthrough");
        assert_eq!(circuit.outputs().len(), 1);
        assert_eq!(circuit.outputs()[0].name(), "o");
        assert_eq!(circuit.outputs()[0].bit_width(), 5);
    }
}
