use super::context::*;
use super::register::*;
use super::wire::*;

use crate::error::*;

use std::hash::{Hash, Hasher};
use std::ops::Not;
use std::ptr;

/// The minimum allowed bit width for any given [`Signal`].
pub const MIN_SIGNAL_BIT_WIDTH: u32 = 1;
/// The maximum allowed bit width for any given [`Signal`].
///
/// This is currently set to `128` so that every value fits in a native `u128`, both in the simulator and when formatting literals.
pub const MAX_SIGNAL_BIT_WIDTH: u32 = 128;

/// Represents a collection of 1 or more bits driven by some source.
///
/// A `Signal` is created by [`Context`] methods (eg. [`lit`](Context::lit), [`input`](Context::input), [`reg`](Context::reg)) or by combining existing `Signal`s (eg. [`and`](Signal::and)). Signals are immutable once created and are referenced through shared `&'a Signal<'a>` handles, so one signal can feed any number of others.
///
/// Two signals are the same node only if they are the same allocation; building an equivalent expression twice produces two distinct nodes.
///
/// # Examples
///
/// ```
/// use hdlgraph::*;
///
/// # fn main() -> Result<()> {
/// let c = Context::new();
///
/// let a = c.input("a", 8)?;
/// let b = c.lit(0x0fu8, 8)?;
/// let masked = a.and(b)?; // 8-bit signal
/// let inverted = !masked; // 8-bit signal
/// assert_eq!(inverted.bit_width(), 8);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct Signal<'a> {
    pub(crate) context: &'a Context<'a>,

    pub(crate) data: SignalData<'a>,
}

pub(crate) enum SignalData<'a> {
    Lit {
        value: u128,
        bit_width: u32,
    },

    Input {
        name: String,
        bit_width: u32,
    },

    Reg {
        data: &'a RegisterData<'a>,
    },
    Wire {
        data: &'a WireData<'a>,
    },

    UnOp {
        source: &'a Signal<'a>,
        op: UnOp,
        bit_width: u32,
    },
    BinOp {
        lhs: &'a Signal<'a>,
        rhs: &'a Signal<'a>,
        op: BinOp,
        bit_width: u32,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum UnOp {
    Not,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BinOp {
    BitAnd,
    BitOr,
    BitXor,
}

impl<'a> Signal<'a> {
    /// Returns the bit width of the given `Signal`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hdlgraph::*;
    ///
    /// # fn main() -> Result<()> {
    /// let c = Context::new();
    ///
    /// assert_eq!(c.lit(42u32, 7)?.bit_width(), 7);
    /// assert_eq!(c.input("i", 27)?.bit_width(), 27);
    /// assert_eq!((!c.low()).bit_width(), 1);
    /// assert_eq!(c.high().and(c.low())?.bit_width(), 1);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn bit_width(&self) -> u32 {
        match self.data {
            SignalData::Lit { bit_width, .. } => bit_width,
            SignalData::Input { bit_width, .. } => bit_width,
            SignalData::Reg { data } => data.bit_width,
            SignalData::Wire { data } => data.bit_width,
            SignalData::UnOp { bit_width, .. } => bit_width,
            SignalData::BinOp { bit_width, .. } => bit_width,
        }
    }

    /// Creates a `Signal` that represents the bitwise AND of `self` and `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if the bit widths of `self` and `rhs` differ, or [`Error::ContextMismatch`] if they belong to different [`Context`]s. No signal is created in either case.
    ///
    /// # Examples
    ///
    /// ```
    /// use hdlgraph::*;
    ///
    /// # fn main() -> Result<()> {
    /// let c = Context::new();
    ///
    /// let a = c.input("a", 4)?;
    /// let b = c.input("b", 4)?;
    /// let both = a.and(b)?;
    ///
    /// assert!(matches!(a.and(c.low()), Err(Error::WidthMismatch { expected: 4, actual: 1 })));
    /// # Ok(())
    /// # }
    /// ```
    pub fn and(&'a self, rhs: &'a Signal<'a>) -> Result<&'a Signal<'a>> {
        self.bin_op(rhs, BinOp::BitAnd)
    }

    /// Creates a `Signal` that represents the bitwise OR of `self` and `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if the bit widths of `self` and `rhs` differ, or [`Error::ContextMismatch`] if they belong to different [`Context`]s.
    pub fn or(&'a self, rhs: &'a Signal<'a>) -> Result<&'a Signal<'a>> {
        self.bin_op(rhs, BinOp::BitOr)
    }

    /// Creates a `Signal` that represents the bitwise XOR of `self` and `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if the bit widths of `self` and `rhs` differ, or [`Error::ContextMismatch`] if they belong to different [`Context`]s.
    pub fn xor(&'a self, rhs: &'a Signal<'a>) -> Result<&'a Signal<'a>> {
        self.bin_op(rhs, BinOp::BitXor)
    }

    fn bin_op(&'a self, rhs: &'a Signal<'a>, op: BinOp) -> Result<&'a Signal<'a>> {
        if !ptr::eq(self.context, rhs.context) {
            return Err(Error::ContextMismatch);
        }
        let bit_width = self.bit_width();
        if bit_width != rhs.bit_width() {
            return Err(Error::WidthMismatch {
                expected: bit_width,
                actual: rhs.bit_width(),
            });
        }
        Ok(self.context.signal_arena.alloc(Signal {
            context: self.context,

            data: SignalData::BinOp {
                lhs: self,
                rhs,
                op,
                bit_width,
            },
        }))
    }

    /// A short human-readable description, used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self.data {
            SignalData::Lit { value, bit_width } => {
                format!("literal {}'h{:x}", bit_width, value)
            }
            SignalData::Input { ref name, .. } => format!("input \"{}\"", name),
            SignalData::Reg { data } => format!("register {}", data.id),
            SignalData::Wire { data } => format!("wire \"{}\"", data.name),
            SignalData::UnOp { op, bit_width, .. } => {
                format!("{:?} ({} bit(s))", op, bit_width)
            }
            SignalData::BinOp { op, bit_width, .. } => {
                format!("{:?} ({} bit(s))", op, bit_width)
            }
        }
    }
}

impl<'a> Not for &'a Signal<'a> {
    type Output = &'a Signal<'a>;

    /// Creates a `Signal` that represents the bitwise NOT of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hdlgraph::*;
    ///
    /// # fn main() -> Result<()> {
    /// let c = Context::new();
    ///
    /// let key = c.input("key", 1)?;
    /// let pressed = !key; // Active-low key
    /// # Ok(())
    /// # }
    /// ```
    fn not(self) -> Self::Output {
        self.context.signal_arena.alloc(Signal {
            context: self.context,

            data: SignalData::UnOp {
                source: self,
                op: UnOp::Not,
                bit_width: self.bit_width(),
            },
        })
    }
}

impl<'a> Eq for &'a Signal<'a> {}

impl<'a> Hash for &'a Signal<'a> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(*self as *const _ as usize)
    }
}

impl<'a> PartialEq for &'a Signal<'a> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(*self, *other)
    }
}
