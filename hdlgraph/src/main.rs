use anyhow::Context as _;
use clap::Parser;
use hdlgraph::sim::trace::vcd::{TimeScaleUnit, VcdTrace};
use hdlgraph::*;
use tracing_subscriber::EnvFilter;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Builds a two-key LED switch and writes it out as a SystemVerilog module
#[derive(Parser, Debug)]
#[command(name = "hdlgraph")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Where to write the module (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Name of the generated module
    #[arg(short = 'm', long, default_value = "leds")]
    module_name: String,

    /// How the LED register responds to reset_n
    #[arg(long, value_enum, default_value = "none")]
    reset_policy: ResetPolicyArg,

    /// Simulate a scripted key sequence and dump it as a VCD trace
    #[arg(long)]
    vcd: Option<PathBuf>,

    /// Number of clock cycles to simulate
    #[arg(long, default_value_t = 32)]
    cycles: u64,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum ResetPolicyArg {
    #[value(name = "none")]
    None,
    #[value(name = "sync")]
    Sync,
    #[value(name = "async")]
    Async,
}

impl From<ResetPolicyArg> for ResetPolicy {
    fn from(arg: ResetPolicyArg) -> Self {
        match arg {
            ResetPolicyArg::None => ResetPolicy::None,
            ResetPolicyArg::Sync => ResetPolicy::Synchronous,
            ResetPolicyArg::Async => ResetPolicy::Asynchronous,
        }
    }
}

// Keys are active low, so `true` means released
const KEY0_PRESSED: std::ops::Range<u64> = 2..4;
const KEY1_PRESSED: std::ops::Range<u64> = 10..12;
const KEY_SCRIPT_PERIOD: u64 = 16;

fn leds<'a>(c: &'a hdlgraph::Context<'a>, args: &Args) -> Result<Circuit<'a>> {
    let on = !c.input("key0", 1)?;
    let off = !c.input("key1", 1)?;
    let led = c.reg(args.reset_policy.clone().into(), false, 1, |led| {
        led.and(!off)?.or((!led).and(on)?)
    })?;

    c.circuit(args.module_name.clone(), vec![("led", led)])
}

fn simulate(circuit: &Circuit, cycles: u64, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_trace(circuit, cycles, BufWriter::new(file))
        .with_context(|| format!("writing {}", path.display()))?;

    tracing::info!(path = %path.display(), cycles, "wrote trace");

    Ok(())
}

fn write_trace(circuit: &Circuit, cycles: u64, mut w: impl Write) -> anyhow::Result<()> {
    {
        let trace = VcdTrace::new(&mut w, 1, TimeScaleUnit::Ns)?;

        let mut sim = sim::Simulator::new(circuit);
        let mut tracer = sim::Tracer::new(&sim, trace)?;

        sim.set_reset(true);
        sim.posedge_clk()?;
        sim.set_reset(false);

        for cycle in 0..cycles {
            let step = cycle % KEY_SCRIPT_PERIOD;
            sim.set_input("key0", !KEY0_PRESSED.contains(&step))?;
            sim.set_input("key1", !KEY1_PRESSED.contains(&step))?;
            tracer.sample(&sim, cycle * 10)?;
            sim.posedge_clk()?;
        }
        tracer.sample(&sim, cycles * 10)?;
    }

    // Dropping a BufWriter swallows flush errors
    w.flush()?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let c = hdlgraph::Context::new();
    let circuit = leds(&c, &args).context("building circuit")?;

    match args.output {
        Some(ref path) => {
            verilog::generate_to_file(&circuit, path)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote module");
        }
        None => verilog::generate(&circuit, std::io::stdout().lock())?,
    }

    if let Some(ref path) = args.vcd {
        simulate(&circuit, args.cycles, path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    struct FailingFlush(Vec<u8>);

    impl Write for FailingFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    fn args(reset_policy: ResetPolicyArg) -> Args {
        Args {
            output: None,
            module_name: "leds".into(),
            reset_policy,
            vcd: None,
            cycles: 32,
            verbose: false,
        }
    }

    #[test]
    fn write_trace_dumps_key_script() {
        let c = hdlgraph::Context::new();
        let circuit = leds(&c, &args(ResetPolicyArg::Sync)).unwrap();

        let mut buf = Vec::new();
        write_trace(&circuit, 16, &mut buf).unwrap();
        let vcd = String::from_utf8(buf).unwrap();

        assert!(vcd.contains("$enddefinitions"));
        assert!(vcd.contains(" led $end"));
        assert!(vcd.contains("#160\n"));
    }

    #[test]
    fn write_trace_flush_error() {
        let c = hdlgraph::Context::new();
        let circuit = leds(&c, &args(ResetPolicyArg::None)).unwrap();

        let err = write_trace(&circuit, 4, FailingFlush(Vec::new())).unwrap_err();

        assert!(err.to_string().contains("disk full"));
    }
}
