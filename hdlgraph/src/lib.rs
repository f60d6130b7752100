//! Signal graphs for digital logic, emitted as [SystemVerilog](https://en.wikipedia.org/wiki/SystemVerilog) netlists.
//!
//! hdlgraph provides an API to describe [`Circuit`]s built from [`Signal`]s: inputs, literals, bitwise operators and clocked [registers](Context::reg). A circuit can then be turned into a synthesizable [verilog module](verilog::generate), or run directly in the [cycle-based simulator](sim::Simulator).
//!
//! Every operation checks its operands as the graph is built. Mismatched bit widths, duplicate or malformed names and out-of-range literals are reported as an [`Error`] by the call that introduces them, so a [`Circuit`] that was built successfully can always be emitted, unless it contains a combinational loop through a [`Wire`].
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! hdlgraph = { version = "0.1", default-features = false }
//! ```
//!
//! # Examples
//!
//! ```rust
//! # fn main() -> hdlgraph::Result<()> {
//! use hdlgraph::*;
//!
//! // Create a context, which will own every signal
//! let c = Context::new();
//!
//! // Two active-low keys turn an LED on and off
//! let on = !c.input("key0", 1)?;
//! let off = !c.input("key1", 1)?;
//! let led = c.reg(ResetPolicy::None, false, 1, |led| {
//!     led.and(!off)?.or((!led).and(on)?)
//! })?;
//!
//! let leds = c.circuit("leds", vec![("led", led)])?;
//!
//! // Generate verilog code
//! verilog::generate(&leds, std::io::stdout())?;
//! # Ok(())
//! # }
//! ```

mod code_writer;
mod error;
mod graph;
pub mod sim;
pub mod verilog;

pub use error::*;
pub use graph::*;
