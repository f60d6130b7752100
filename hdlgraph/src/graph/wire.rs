use super::context::*;
use super::signal::*;

use crate::error::*;

use std::cell::RefCell;
use std::ptr;

pub(crate) struct WireData<'a> {
    pub name: String,
    pub bit_width: u32,
    pub source: RefCell<Option<&'a Signal<'a>>>,
}

/// A named net that can be used before the signal driving it exists, created by [`Context::wire`].
///
/// A `Wire` must be driven exactly once. Unlike a register, a wire adds no delay, so driving a wire with an expression that depends on the wire itself describes a combinational loop, which code generation rejects.
#[must_use]
pub struct Wire<'a> {
    data: &'a WireData<'a>,
    value: &'a Signal<'a>,
}

impl<'a> Wire<'a> {
    /// Returns the [`Signal`] carrying this wire's value.
    pub fn value(&self) -> &'a Signal<'a> {
        self.value
    }

    /// Drives this wire with `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyDriven`] if this wire already has a driver, [`Error::WidthMismatch`] if `source` isn't as wide as this wire, or [`Error::ContextMismatch`] if `source` belongs to another [`Context`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hdlgraph::*;
    ///
    /// # fn main() -> Result<()> {
    /// let c = Context::new();
    ///
    /// let ready = c.wire("ready", 1)?;
    /// let busy = !ready.value();
    /// ready.drive(c.input("done", 1)?)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn drive(&self, source: &'a Signal<'a>) -> Result<()> {
        if !ptr::eq(self.value.context, source.context) {
            return Err(Error::ContextMismatch);
        }
        if self.data.source.borrow().is_some() {
            return Err(Error::AlreadyDriven {
                name: self.data.name.clone(),
            });
        }
        if source.bit_width() != self.data.bit_width {
            return Err(Error::WidthMismatch {
                expected: self.data.bit_width,
                actual: source.bit_width(),
            });
        }
        *self.data.source.borrow_mut() = Some(source);
        Ok(())
    }
}

impl<'a> Context<'a> {
    /// Creates a [`Wire`] called `name` with `bit_width` bits. Wires share their namespace with inputs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateName`], [`Error::InvalidName`] or [`Error::InvalidBitWidth`] under the same conditions as [`Context::input`].
    pub fn wire(&'a self, name: impl Into<String>, bit_width: u32) -> Result<&'a Wire<'a>> {
        let name = name.into();
        self.claim_name(&name)?;
        check_bit_width(bit_width)?;
        let data = self.wire_data_arena.alloc(WireData {
            name: name.clone(),
            bit_width,
            source: RefCell::new(None),
        });
        let value = self.signal_arena.alloc(Signal {
            context: self,

            data: SignalData::Wire { data },
        });
        self.wires.borrow_mut().insert(name, value);
        Ok(self.wire_arena.alloc(Wire { data, value }))
    }
}
