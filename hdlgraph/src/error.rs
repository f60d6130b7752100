//! Error types for graph construction, emission and simulation.

use thiserror::Error;

use std::io;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Every way an `hdlgraph` operation can fail.
///
/// Construction errors (widths, names, values) are returned by the call that introduces the offending node or binding. [`CyclicCombinationalLogic`](Error::CyclicCombinationalLogic) can only be detected by traversal, so it's returned by the emitter and the simulator.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Signals have different bit widths ({expected} and {actual}, respectively).")]
    WidthMismatch { expected: u32, actual: u32 },

    #[error("Cannot create a signal with {bit_width} bit(s). Signals must be between {min} and {max} bit(s) wide.")]
    InvalidBitWidth { bit_width: u32, min: u32, max: u32 },

    #[error("The name \"{name}\" is already used by another input or wire.")]
    DuplicateName { name: String },

    #[error("The output name \"{name}\" is used more than once.")]
    DuplicateOutputName { name: String },

    #[error("\"{name}\" is not a usable name: {reason}.")]
    InvalidName { name: String, reason: &'static str },

    #[error("Cannot fit the specified value '{value}' into the specified bit width '{bit_width}'. The value '{value}' requires a bit width of at least {required_bits} bit(s).")]
    ValueOutOfRange {
        value: u128,
        bit_width: u32,
        required_bits: u32,
    },

    #[error("Attempted to combine signals from different contexts.")]
    ContextMismatch,

    #[error("Register {id} was never given a next-state expression.")]
    UndrivenRegister { id: u32 },

    #[error("Wire \"{name}\" is not driven.")]
    UndrivenWire { name: String },

    #[error("Wire \"{name}\" is already driven.")]
    AlreadyDriven { name: String },

    #[error("Circuit \"{circuit}\" has no port called \"{name}\".")]
    UnknownPort { circuit: String, name: String },

    #[error("Cannot generate code for circuit \"{circuit}\" because {node} is part of a combinational loop.")]
    CyclicCombinationalLogic { circuit: String, node: String },

    #[error("Failed to write to the output sink: {0}")]
    SinkWriteFailure(#[from] io::Error),
}
