use crate::graph;

use std::collections::HashMap;

pub(super) struct Register<'a> {
    pub data: &'a graph::RegisterData<'a>,
    pub value_name: String,
    pub next_name: String,
}

/// Generated names for every register in a circuit, numbered in the circuit's discovery order.
pub(super) struct StateElements<'a> {
    pub regs: HashMap<&'a graph::Signal<'a>, Register<'a>>,
    pub order: Vec<&'a graph::Signal<'a>>,
}

impl<'a> StateElements<'a> {
    pub fn new(circuit: &graph::Circuit<'a>) -> StateElements<'a> {
        let mut regs = HashMap::new();

        for (index, &signal) in circuit.registers.iter().enumerate() {
            let value_name = format!("__reg_{}", index);
            let next_name = format!("{}_next", value_name);
            regs.insert(
                signal,
                Register {
                    data: graph::register_data(signal),
                    value_name,
                    next_name,
                },
            );
        }

        StateElements {
            regs,
            order: circuit.registers.clone(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Register<'a>> + '_ {
        self.order.iter().map(move |signal| &self.regs[signal])
    }

    pub fn uses_reset(&self) -> bool {
        self.iter().any(|reg| reg.data.reset_policy.uses_reset())
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
