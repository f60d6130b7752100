//! Waveform tracing for the simulator.

pub mod vcd;

use std::io;

/// A sink for simulation waveforms, driven by [`Tracer`](super::Tracer).
///
/// All signals are declared first, inside one or more module scopes. Once the outermost scope is popped, values are reported as a sequence of time stamps, each followed by the value of every signal at that time.
pub trait Trace {
    type SignalId;

    fn push_module(&mut self, name: &str) -> io::Result<()>;
    fn pop_module(&mut self) -> io::Result<()>;
    fn add_signal(&mut self, name: &str, bit_width: u32) -> io::Result<Self::SignalId>;

    fn update_time_stamp(&mut self, time_stamp: u64) -> io::Result<()>;
    /// Reports `value` for a signal. Only the low `bit_width` bits of `value` are meaningful.
    fn update_signal(&mut self, signal_id: &Self::SignalId, value: u128) -> io::Result<()>;
}
