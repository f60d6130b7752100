/// An unsigned integer value, used for literals, reset values and simulator inputs.
///
/// This type isn't typically used explicitly, as the graph API always takes `Value` parameters as `Into<Value>`, and `Value` implements `From` for `bool` and Rust's unsigned integer types.
///
/// # Examples
///
/// ```
/// use hdlgraph::*;
///
/// # fn main() -> Result<()> {
/// let c = Context::new();
///
/// let a = c.lit(true, 16)?;
/// let b = c.lit(0xdeadbeefu32, 47)?;
/// let d = c.lit(42u8, 8)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Value(u128);

impl Value {
    pub(crate) fn required_bits(self) -> u32 {
        128 - self.0.leading_zeros()
    }

    pub(crate) fn check_fits(self, bit_width: u32) -> crate::Result<u128> {
        let required_bits = self.required_bits();
        if required_bits > bit_width {
            return Err(crate::Error::ValueOutOfRange {
                value: self.0,
                bit_width,
                required_bits,
            });
        }
        Ok(self.0)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value(value.into())
    }
}

macro_rules! value_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value(value.into())
                }
            }
        )*
    };
}

value_from_unsigned!(u8, u16, u32, u64, u128);

/// Returns a mask covering the low `bit_width` bits.
pub(crate) fn mask(bit_width: u32) -> u128 {
    if bit_width >= 128 {
        u128::MAX
    } else {
        (1u128 << bit_width) - 1
    }
}
