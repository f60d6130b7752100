use crate::code_writer::CodeWriter;
use crate::graph;

use std::io::{Result, Write};

pub(super) fn bit_range(bit_width: u32) -> String {
    if bit_width > 1 {
        format!("[{}:{}] ", bit_width - 1, 0)
    } else {
        String::new()
    }
}

pub(super) struct NodeDecl {
    pub name: String,
    pub bit_width: u32,
    pub initial_value: Option<Expr>,
}

impl NodeDecl {
    pub fn write<W: Write>(&self, w: &mut CodeWriter<W>) -> Result<()> {
        w.append_indent()?;
        w.append(&format!("logic {}{}", bit_range(self.bit_width), self.name))?;
        if let Some(ref initial_value) = self.initial_value {
            w.append(" = ")?;
            initial_value.write(w)?;
        }
        w.append(";")?;
        w.append_newline()?;

        Ok(())
    }
}

/// Collects the declarations and continuous assignments for the combinational part of a module.
pub(super) struct AssignmentContext {
    assignments: Vec<Assignment>,
    local_decls: Vec<NodeDecl>,
    temp_count: u32,
}

impl AssignmentContext {
    pub fn new() -> AssignmentContext {
        AssignmentContext {
            assignments: Vec::new(),
            local_decls: Vec::new(),
            temp_count: 0,
        }
    }

    pub fn gen_temp(&mut self, expr: Expr, bit_width: u32) -> Expr {
        match expr {
            // We don't need to generate a temp for Constants or Refs
            Expr::Constant { .. } | Expr::Ref { .. } => expr,
            _ => {
                let name = format!("__temp_{}", self.temp_count);
                self.temp_count += 1;
                self.gen_net(name, expr, bit_width)
            }
        }
    }

    /// Declares a named net driven by `expr` and returns a reference to it.
    pub fn gen_net(&mut self, name: String, expr: Expr, bit_width: u32) -> Expr {
        self.local_decls.push(NodeDecl {
            name: name.clone(),
            bit_width,
            initial_value: None,
        });
        self.assignments.push(Assignment {
            target_name: name.clone(),
            expr,
        });

        Expr::Ref { name }
    }

    pub fn push(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    pub fn temp_count(&self) -> u32 {
        self.temp_count
    }

    pub fn write_decls<W: Write>(&self, w: &mut CodeWriter<W>) -> Result<()> {
        if self.local_decls.is_empty() {
            return Ok(());
        }
        for node_decl in self.local_decls.iter() {
            node_decl.write(w)?;
        }
        w.append_newline()?;

        Ok(())
    }

    pub fn write_assignments<W: Write>(&self, w: &mut CodeWriter<W>) -> Result<()> {
        if self.assignments.is_empty() {
            return Ok(());
        }
        for assignment in self.assignments.iter() {
            assignment.write(w)?;
        }
        w.append_newline()?;

        Ok(())
    }
}

pub(super) struct Assignment {
    pub target_name: String,
    pub expr: Expr,
}

impl Assignment {
    fn write<W: Write>(&self, w: &mut CodeWriter<W>) -> Result<()> {
        w.append_indent()?;
        w.append(&format!("assign {} = ", self.target_name))?;
        self.expr.write(w)?;
        w.append(";")?;
        w.append_newline()?;

        Ok(())
    }
}

#[derive(Clone)]
pub(super) enum Expr {
    BinOp {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        op: graph::BinOp,
    },
    Constant {
        bit_width: u32,
        value: u128,
    },
    Ref {
        name: String,
    },
    UnOp {
        source: Box<Expr>,
        op: graph::UnOp,
    },
}

impl Expr {
    pub fn write<W: Write>(&self, w: &mut CodeWriter<W>) -> Result<()> {
        match self {
            Expr::BinOp { lhs, rhs, op } => {
                lhs.write(w)?;
                w.append(match op {
                    graph::BinOp::BitAnd => " & ",
                    graph::BinOp::BitOr => " | ",
                    graph::BinOp::BitXor => " ^ ",
                })?;
                rhs.write(w)?;
            }
            Expr::Constant { bit_width, value } => {
                w.append(&format!("{}'h{:x}", bit_width, value))?;
            }
            Expr::Ref { name } => {
                w.append(name)?;
            }
            Expr::UnOp { source, op } => {
                w.append(match op {
                    graph::UnOp::Not => "~",
                })?;
                source.write(w)?;
            }
        }

        Ok(())
    }
}
