#[path = "src/designs.rs"]
mod designs;

use hdlgraph::*;

use std::env;
use std::path::Path;

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=src/designs.rs");

    let out_dir = env::var("OUT_DIR").unwrap();

    for (name, design) in designs::DESIGNS {
        let c = Context::new();
        let circuit = design(&c)?;
        verilog::generate_to_file(&circuit, Path::new(&out_dir).join(format!("{}.v", name)))?;
    }

    Ok(())
}
