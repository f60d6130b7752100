mod circuit;
mod context;
mod register;
mod signal;
mod value;
mod wire;

pub(crate) use circuit::register_data;
pub(crate) use register::RegisterData;
pub(crate) use signal::{BinOp, SignalData, UnOp};
pub(crate) use value::mask;

pub use circuit::{Circuit, Diagnostic, Output};
pub use context::*;
pub use register::ResetPolicy;
pub use signal::{Signal, MAX_SIGNAL_BIT_WIDTH, MIN_SIGNAL_BIT_WIDTH};
pub use value::*;
pub use wire::Wire;
