use super::ir::*;
use super::state_elements::*;

use crate::error::*;
use crate::graph::{self, SignalData};

use std::collections::{HashMap, HashSet};

pub(super) struct Compiler<'graph, 'state> {
    circuit_name: &'state str,
    state_elements: &'state StateElements<'graph>,
    signal_exprs: HashMap<&'graph graph::Signal<'graph>, Expr>,
}

impl<'graph, 'state> Compiler<'graph, 'state> {
    pub fn new(
        circuit_name: &'state str,
        state_elements: &'state StateElements<'graph>,
    ) -> Compiler<'graph, 'state> {
        Compiler {
            circuit_name,
            state_elements,
            signal_exprs: HashMap::new(),
        }
    }

    /// Compiles `signal` depth-first, left operands before right ones, giving each node at most one name.
    ///
    /// Registers are referenced by name and never traversed, since their next-state expressions are compiled separately. Any other node reached again while it's still being compiled is part of a combinational loop.
    pub fn compile_signal(
        &mut self,
        signal: &'graph graph::Signal<'graph>,
        a: &mut AssignmentContext,
    ) -> Result<Expr> {
        enum Frame<'graph> {
            Enter(&'graph graph::Signal<'graph>),
            Leave(&'graph graph::Signal<'graph>),
        }

        let mut frames = vec![Frame::Enter(signal)];
        let mut active = HashSet::new();

        let mut results = Vec::new();

        while let Some(frame) = frames.pop() {
            let (signal, expr) = match frame {
                Frame::Enter(signal) => {
                    if let Some(expr) = self.signal_exprs.get(&signal) {
                        results.push(expr.clone());
                        continue;
                    }
                    if !active.insert(signal) {
                        return Err(Error::CyclicCombinationalLogic {
                            circuit: self.circuit_name.to_owned(),
                            node: signal.describe(),
                        });
                    }

                    match signal.data {
                        SignalData::Lit { value, bit_width } => {
                            (signal, Expr::Constant { bit_width, value })
                        }

                        SignalData::Input { ref name, .. } => (
                            signal,
                            Expr::Ref {
                                name: name.clone(),
                            },
                        ),

                        SignalData::Reg { .. } => (
                            signal,
                            Expr::Ref {
                                name: self.state_elements.regs[&signal].value_name.clone(),
                            },
                        ),

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
                    let expr = match signal.data {
                        SignalData::Wire { data } => {
                            let source = pop_result(&mut results);
                            a.gen_net(data.name.clone(), source, data.bit_width)
                        }

                        SignalData::UnOp { op, bit_width, .. } => {
                            let source = pop_result(&mut results);
                            a.gen_temp(
                                Expr::UnOp {
                                    source: Box::new(source),
                                    op,
                                },
                                bit_width,
                            )
                        }
                        SignalData::BinOp { op, bit_width, .. } => {
                            let rhs = pop_result(&mut results);
                            let lhs = pop_result(&mut results);
                            a.gen_temp(
                                Expr::BinOp {
                                    lhs: Box::new(lhs),
                                    rhs: Box::new(rhs),
                                    op,
                                },
                                bit_width,
                            )
                        }

                        SignalData::Lit { .. } | SignalData::Input { .. } | SignalData::Reg { .. } => {
                            unreachable!()
                        }
                    };
                    (signal, expr)
                }
            };

            active.remove(&signal);
            self.signal_exprs.insert(signal, expr.clone());
            results.push(expr);
        }

        Ok(pop_result(&mut results))
    }
}

fn pop_result(results: &mut Vec<Expr>) -> Expr {
    results
        .pop()
        .unwrap_or_else(|| unreachable!("operand was not compiled"))
}
