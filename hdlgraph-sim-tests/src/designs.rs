//! Circuits shared by the build script, which emits them into `OUT_DIR`, and the tests.

use hdlgraph::*;

pub type Design = for<'a> fn(&'a Context<'a>) -> Result<Circuit<'a>>;

pub const DESIGNS: &[(&str, Design)] = &[
    ("leds", leds),
    ("toggle_sync", toggle_sync),
    ("toggle_async", toggle_async),
    ("shared_diamond", shared_diamond),
    ("constants", constants),
];

pub fn leds<'a>(c: &'a Context<'a>) -> Result<Circuit<'a>> {
    let in0 = !c.input("key0", 1)?;
    let in1 = !c.input("key1", 1)?;
    let q = c.reg(ResetPolicy::None, false, 1, |d| {
        d.and(!in1)?.or((!d).and(in0)?)
    })?;

    c.circuit("leds", vec![("q", q)])
}

pub fn toggle_sync<'a>(c: &'a Context<'a>) -> Result<Circuit<'a>> {
    let en = c.input("en", 1)?;
    let q = c.reg(ResetPolicy::Synchronous, false, 1, |q| q.xor(en))?;

    c.circuit("toggle_sync", vec![("q", q)])
}

pub fn toggle_async<'a>(c: &'a Context<'a>) -> Result<Circuit<'a>> {
    let en = c.input("en", 1)?;
    let q = c.reg(ResetPolicy::Asynchronous, true, 1, |q| q.xor(en))?;

    c.circuit("toggle_async", vec![("q", q)])
}

pub fn shared_diamond<'a>(c: &'a Context<'a>) -> Result<Circuit<'a>> {
    let a = c.input("a", 8)?;
    let b = c.input("b", 8)?;
    let shared = a.and(b)?;

    c.circuit(
        "shared_diamond",
        vec![("o1", (!shared).or(shared)?), ("o2", shared.xor(b)?)],
    )
}

pub fn constants<'a>(c: &'a Context<'a>) -> Result<Circuit<'a>> {
    let i = c.input("i", 8)?;

    c.circuit(
        "constants",
        vec![
            ("zero", c.low()),
            ("one", c.high()),
            ("wide", c.lit(u128::MAX, 128)?),
            ("masked", i.and(c.lit(0xf0u8, 8)?)?),
        ],
    )
}
