use super::context::*;
use super::signal::*;
use super::value::*;

use crate::error::*;

use std::cell::RefCell;
use std::ptr;

/// How a register responds to the implicit, active-low `reset_n` port.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ResetPolicy {
    /// The register ignores reset. Its reset value is only used as its power-on value.
    None,
    /// Reset is sampled on the rising clock edge.
    Synchronous,
    /// Reset takes effect as soon as it's asserted, independent of the clock.
    Asynchronous,
}

impl ResetPolicy {
    pub(crate) fn uses_reset(self) -> bool {
        self != ResetPolicy::None
    }
}

pub(crate) struct RegisterData<'a> {
    pub id: u32,
    pub bit_width: u32,
    pub reset_policy: ResetPolicy,
    pub reset_value: u128,
    pub next: RefCell<Option<&'a Signal<'a>>>,
}

impl<'a> Context<'a> {
    /// Creates a register with `bit_width` bits and returns the [`Signal`] that represents its current value.
    ///
    /// The register is built in two phases: first a placeholder signal representing the register's current value is allocated, then `next` is called exactly once with that placeholder and must return the expression to latch on the next rising clock edge. This is the only way to form a cycle through combinational logic, and the cycle always passes through exactly this register.
    ///
    /// On each rising edge, if reset is asserted and `reset_policy` isn't [`ResetPolicy::None`], the register takes `reset_value`; otherwise it takes the value of the next-state expression, evaluated with the register's previous value. `reset_value` is also the register's power-on value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBitWidth`] or [`Error::ValueOutOfRange`] for a bad `bit_width`/`reset_value`, [`Error::WidthMismatch`] if the returned next-state expression isn't `bit_width` bits wide, [`Error::ContextMismatch`] if it belongs to another `Context`, and any error returned by `next` itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use hdlgraph::*;
    ///
    /// # fn main() -> Result<()> {
    /// let c = Context::new();
    ///
    /// let enable = c.input("enable", 1)?;
    /// let toggle = c.reg(ResetPolicy::Synchronous, false, 1, |q| q.xor(enable))?;
    /// let blinker = c.circuit("blinker", vec![("led", toggle)])?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn reg<F>(
        &'a self,
        reset_policy: ResetPolicy,
        reset_value: impl Into<Value>,
        bit_width: u32,
        next: F,
    ) -> Result<&'a Signal<'a>>
    where
        F: FnOnce(&'a Signal<'a>) -> Result<&'a Signal<'a>>,
    {
        check_bit_width(bit_width)?;
        let reset_value = reset_value.into().check_fits(bit_width)?;

        let data = self.register_data_arena.alloc(RegisterData {
            id: self.next_register_id(),
            bit_width,
            reset_policy,
            reset_value,
            next: RefCell::new(None),
        });
        let value: &'a Signal<'a> = self.signal_arena.alloc(Signal {
            context: self,

            data: SignalData::Reg { data },
        });

        let next = next(value)?;
        if !ptr::eq(self, next.context) {
            return Err(Error::ContextMismatch);
        }
        if next.bit_width() != bit_width {
            return Err(Error::WidthMismatch {
                expected: bit_width,
                actual: next.bit_width(),
            });
        }
        *data.next.borrow_mut() = Some(next);

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_fn_is_called_with_placeholder() {
        let c = Context::new();

        let mut placeholder = None;
        let r = c
            .reg(ResetPolicy::None, 0u32, 4, |q| {
                placeholder = Some(q);
                Ok(q)
            })
            .unwrap();

        assert!(placeholder == Some(r));
        assert_eq!(r.bit_width(), 4);
        match r.data {
            SignalData::Reg { data } => {
                assert_eq!(data.reset_policy, ResetPolicy::None);
                assert!(*data.next.borrow() == Some(r));
            }
            _ => panic!("expected a register"),
        }
    }

    #[test]
    fn next_width_mismatch_error() {
        let c = Context::new();

        let i = c.input("i", 3).unwrap();

        assert!(matches!(
            c.reg(ResetPolicy::Synchronous, 0u32, 4, |_| Ok(i)),
            Err(Error::WidthMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn next_fn_error_is_propagated() {
        let c = Context::new();

        let i = c.input("i", 3).unwrap();

        assert!(matches!(
            c.reg(ResetPolicy::None, 0u32, 1, |q| q.and(i)),
            Err(Error::WidthMismatch {
                expected: 1,
                actual: 3
            })
        ));
    }

    #[test]
    fn reset_value_out_of_range_error() {
        let c = Context::new();

        assert!(matches!(
            c.reg(ResetPolicy::Asynchronous, 16u32, 4, Ok),
            Err(Error::ValueOutOfRange {
                required_bits: 5,
                ..
            })
        ));
    }

    #[test]
    fn foreign_next_error() {
        let c1 = Context::new();
        let c2 = Context::new();

        let other = c2.high();

        assert!(matches!(
            c1.reg(ResetPolicy::None, 0u32, 1, |_| Ok(other)),
            Err(Error::ContextMismatch)
        ));
    }

    #[test]
    fn register_ids_are_sequential() {
        let c = Context::new();

        let ids: Vec<u32> = (0..3)
            .map(|_| match c.reg(ResetPolicy::None, 0u32, 1, Ok).unwrap().data {
                SignalData::Reg { data } => data.id,
                _ => unreachable!(),
            })
            .collect();

        assert_eq!(ids, vec![0, 1, 2]);
    }
}
