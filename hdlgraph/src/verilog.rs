//! SystemVerilog code generation.
//!
//! A [`Circuit`](crate::Circuit) becomes one module with the circuit's name. The module has an implicit `clk` port when the circuit contains registers, and an implicit active-low `reset_n` port when any of those registers uses a [`ResetPolicy`](crate::ResetPolicy) other than `None`.
//!
//! Generated identifiers (`__reg_N`, `__temp_N`) are assigned in a fixed traversal order, so the same graph always produces byte-identical output.

mod compiler;
mod ir;
mod state_elements;

use compiler::*;
use ir::*;
use state_elements::*;

use crate::code_writer::CodeWriter;
use crate::error::*;
use crate::graph;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Generates a SystemVerilog module for `circuit` and writes it to `w`.
///
/// The whole module is built in memory before anything is written, so if generation fails, nothing is written to `w`. `w` is flushed before returning.
///
/// # Errors
///
/// Returns [`Error::CyclicCombinationalLogic`] if the circuit contains a combinational loop (only possible through a [`Wire`](crate::Wire)), or [`Error::SinkWriteFailure`] if writing to `w` fails.
///
/// # Examples
///
/// ```
/// use hdlgraph::*;
///
/// # fn main() -> Result<()> {
/// let c = Context::new();
///
/// let i = c.input("i", 1)?;
/// let inverter = c.circuit("inverter", vec![("o", !i)])?;
///
/// let mut out = Vec::new();
/// verilog::generate(&inverter, &mut out)?;
/// assert!(String::from_utf8(out).unwrap().starts_with("module inverter("));
/// # Ok(())
/// # }
/// ```
pub fn generate<'a, W: Write>(circuit: &graph::Circuit<'a>, w: W) -> Result<()> {
    let module = compile(circuit)?;

    let mut w = CodeWriter::new(w);
    module.write(&mut w)?;
    w.flush()?;

    Ok(())
}

/// Generates a SystemVerilog module for `circuit` and writes it to a file at `path`, creating or truncating it.
///
/// The file is only created once generation has succeeded.
///
/// # Errors
///
/// Same as [`generate`].
pub fn generate_to_file<'a>(circuit: &graph::Circuit<'a>, path: impl AsRef<Path>) -> Result<()> {
    let module = compile(circuit)?;

    let file = File::create(path.as_ref())?;
    let mut w = CodeWriter::new(BufWriter::new(file));
    module.write(&mut w)?;
    w.flush()?;

    tracing::debug!(path = %path.as_ref().display(), "wrote module");

    Ok(())
}

struct Module<'a, 'c> {
    circuit: &'c graph::Circuit<'a>,
    state_elements: StateElements<'a>,
    assignments: AssignmentContext,
}

fn compile<'a, 'c>(circuit: &'c graph::Circuit<'a>) -> Result<Module<'a, 'c>> {
    let state_elements = StateElements::new(circuit);
    let mut assignments = AssignmentContext::new();

    let mut c = Compiler::new(&circuit.name, &state_elements);

    for output in circuit.outputs.iter() {
        let expr = c.compile_signal(output.source, &mut assignments)?;
        assignments.push(Assignment {
            target_name: output.name.clone(),
            expr,
        });
    }

    for reg in state_elements.iter() {
        // Circuit construction rejects undriven registers
        let next = (*reg.data.next.borrow()).ok_or(Error::UndrivenRegister { id: reg.data.id })?;
        let expr = c.compile_signal(next, &mut assignments)?;
        assignments.push(Assignment {
            target_name: reg.next_name.clone(),
            expr,
        });
    }

    tracing::debug!(
        circuit = %circuit.name,
        registers = circuit.registers.len(),
        temps = assignments.temp_count(),
        "compiled module"
    );

    drop(c);
    Ok(Module {
        circuit,
        state_elements,
        assignments,
    })
}

impl<'a, 'c> Module<'a, 'c> {
    fn write<W: Write>(&self, w: &mut CodeWriter<W>) -> std::io::Result<()> {
        let mut ports = Vec::new();
        if !self.state_elements.is_empty() {
            ports.push("input wire logic clk".to_owned());
        }
        if self.state_elements.uses_reset() {
            ports.push("input wire logic reset_n".to_owned());
        }
        for (name, bit_width) in self.circuit.inputs() {
            ports.push(format!("input wire logic {}{}", bit_range(bit_width), name));
        }
        for output in self.circuit.outputs.iter() {
            ports.push(format!(
                "output wire logic {}{}",
                bit_range(output.bit_width()),
                output.name
            ));
        }

        w.append_line(&format!("module {}(", self.circuit.name))?;
        w.indent();
        let num_ports = ports.len();
        for (i, port) in ports.iter().enumerate() {
            if i < num_ports - 1 {
                w.append_line(&format!("{},", port))?;
            } else {
                w.append_line(port)?;
            }
        }
        w.unindent();
        w.append_line(");")?;
        w.append_newline()?;

        w.indent();

        if !self.state_elements.is_empty() {
            for reg in self.state_elements.iter() {
                NodeDecl {
                    name: reg.value_name.clone(),
                    bit_width: reg.data.bit_width,
                    initial_value: Some(reset_value_expr(reg)),
                }
                .write(w)?;
                NodeDecl {
                    name: reg.next_name.clone(),
                    bit_width: reg.data.bit_width,
                    initial_value: None,
                }
                .write(w)?;
            }
            w.append_newline()?;

            for reg in self.state_elements.iter() {
                write_register_update(reg, w)?;
                w.append_newline()?;
            }
        }

        self.assignments.write_decls(w)?;
        self.assignments.write_assignments(w)?;

        w.unindent();
        w.append_line("endmodule")?;

        Ok(())
    }
}

fn reset_value_expr(reg: &Register) -> Expr {
    Expr::Constant {
        bit_width: reg.data.bit_width,
        value: reg.data.reset_value,
    }
}

fn write_register_update<W: Write>(reg: &Register, w: &mut CodeWriter<W>) -> std::io::Result<()> {
    let sensitivity = match reg.data.reset_policy {
        graph::ResetPolicy::None | graph::ResetPolicy::Synchronous => "posedge clk",
        graph::ResetPolicy::Asynchronous => "posedge clk, negedge reset_n",
    };
    w.append_line(&format!("always_ff @({}) begin", sensitivity))?;
    w.indent();

    if reg.data.reset_policy.uses_reset() {
        w.append_line("if (~reset_n) begin")?;
        w.indent();
        w.append_indent()?;
        w.append(&format!("{} <= ", reg.value_name))?;
        reset_value_expr(reg).write(w)?;
        w.append(";")?;
        w.append_newline()?;
        w.unindent();
        w.append_line("end")?;
        w.append_line("else begin")?;
        w.indent();
        w.append_line(&format!("{} <= {};", reg.value_name, reg.next_name))?;
        w.unindent();
        w.append_line("end")?;
    } else {
        w.append_line(&format!("{} <= {};", reg.value_name, reg.next_name))?;
    }

    w.unindent();
    w.append_line("end")?;

    Ok(())
}
