use super::register::*;
use super::signal::*;
use super::value::*;
use super::wire::*;

use crate::error::*;

use typed_arena::Arena;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// The implicit clock/reset ports, which user names would collide with.
const IMPLICIT_PORT_NAMES: &[&str] = &["clk", "reset_n"];

/// IEEE 1800-2017 SystemVerilog keywords, sorted.
const SYSTEM_VERILOG_KEYWORDS: &[&str] = &[
    "accept_on", "alias", "always", "always_comb", "always_ff", "always_latch", "and", "assert",
    "assign", "assume", "automatic", "before", "begin", "bind", "bins", "binsof", "bit", "break",
    "buf", "bufif0", "bufif1", "byte", "case", "casex", "casez", "cell", "chandle", "checker",
    "class", "clocking", "cmos", "config", "const", "constraint", "context", "continue", "cover",
    "covergroup", "coverpoint", "cross", "deassign", "default", "defparam", "design", "disable",
    "dist", "do", "edge", "else", "end", "endcase", "endchecker", "endclass", "endclocking",
    "endconfig", "endfunction", "endgenerate", "endgroup", "endinterface", "endmodule",
    "endpackage", "endprimitive", "endprogram", "endproperty", "endsequence", "endspecify",
    "endtable", "endtask", "enum", "event", "eventually", "expect", "export", "extends", "extern",
    "final", "first_match", "for", "force", "foreach", "forever", "fork", "forkjoin", "function",
    "generate", "genvar", "global", "highz0", "highz1", "if", "iff", "ifnone", "ignore_bins",
    "illegal_bins", "implements", "implies", "import", "incdir", "include", "initial", "inout",
    "input", "inside", "instance", "int", "integer", "interconnect", "interface", "intersect",
    "join", "join_any", "join_none", "large", "let", "liblist", "library", "local", "localparam",
    "logic", "longint", "macromodule", "matches", "medium", "modport", "module", "nand", "negedge",
    "nettype", "new", "nexttime", "nmos", "nor", "noshowcancelled", "not", "notif0", "notif1",
    "null", "or", "output", "package", "packed", "parameter", "pmos", "posedge", "primitive",
    "priority", "program", "property", "protected", "pull0", "pull1", "pulldown", "pullup",
    "pulsestyle_ondetect", "pulsestyle_onevent", "pure", "rand", "randc", "randcase",
    "randsequence", "rcmos", "real", "realtime", "ref", "reg", "reject_on", "release", "repeat",
    "restrict", "return", "rnmos", "rpmos", "rtran", "rtranif0", "rtranif1", "s_always",
    "s_eventually", "s_nexttime", "s_until", "s_until_with", "scalared", "sequence", "shortint",
    "shortreal", "showcancelled", "signed", "small", "soft", "solve", "specify", "specparam",
    "static", "string", "strong", "strong0", "strong1", "struct", "super", "supply0", "supply1",
    "sync_accept_on", "sync_reject_on", "table", "tagged", "task", "this", "throughout", "time",
    "timeprecision", "timeunit", "tran", "tranif0", "tranif1", "tri", "tri0", "tri1", "triand",
    "trior", "trireg", "type", "typedef", "union", "unique", "unique0", "unsigned", "until",
    "until_with", "untyped", "use", "uwire", "var", "vectored", "virtual", "void", "wait",
    "wait_order", "wand", "weak", "weak0", "weak1", "while", "wildcard", "wire", "with", "within",
    "wor", "xnor", "xor",
];

/// A top-level container/owner object for a signal graph.
///
/// A `Context` owns every [`Signal`] created through it, and is the construction session for one or more [`Circuit`](crate::Circuit)s: input and wire names must be unique within a `Context`.
///
/// # Examples
///
/// ```
/// use hdlgraph::*;
///
/// # fn main() -> Result<()> {
/// let c = Context::new();
///
/// let i = c.input("i", 1)?;
/// let inverter = c.circuit("inverter", vec![("o", !i)])?;
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct Context<'a> {
    pub(crate) signal_arena: Arena<Signal<'a>>,
    pub(super) register_data_arena: Arena<RegisterData<'a>>,
    pub(super) wire_data_arena: Arena<WireData<'a>>,
    pub(super) wire_arena: Arena<Wire<'a>>,

    pub(crate) inputs: RefCell<BTreeMap<String, &'a Signal<'a>>>,
    pub(crate) wires: RefCell<BTreeMap<String, &'a Signal<'a>>>,
    pub(super) register_count: Cell<u32>,
}

impl<'a> Context<'a> {
    /// Creates a new, empty `Context`.
    pub fn new() -> Context<'a> {
        Context {
            signal_arena: Arena::new(),
            register_data_arena: Arena::new(),
            wire_data_arena: Arena::new(),
            wire_arena: Arena::new(),

            inputs: RefCell::new(BTreeMap::new()),
            wires: RefCell::new(BTreeMap::new()),
            register_count: Cell::new(0),
        }
    }

    /// Creates an input called `name` with `bit_width` bits, and returns a [`Signal`] that represents the value of this input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateName`] if an input or wire called `name` already exists in this `Context`, [`Error::InvalidName`] if `name` isn't a plain identifier or is reserved, and [`Error::InvalidBitWidth`] if `bit_width` is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use hdlgraph::*;
    ///
    /// # fn main() -> Result<()> {
    /// let c = Context::new();
    ///
    /// let my_input = c.input("my_input", 80)?;
    /// assert!(matches!(c.input("my_input", 1), Err(Error::DuplicateName { .. })));
    /// # Ok(())
    /// # }
    /// ```
    pub fn input(&'a self, name: impl Into<String>, bit_width: u32) -> Result<&'a Signal<'a>> {
        let name = name.into();
        self.claim_name(&name)?;
        check_bit_width(bit_width)?;
        let input = self.signal_arena.alloc(Signal {
            context: self,

            data: SignalData::Input {
                name: name.clone(),
                bit_width,
            },
        });
        self.inputs.borrow_mut().insert(name, input);
        Ok(input)
    }

    /// Creates a [`Signal`] that represents the constant literal specified by `value` with `bit_width` bits.
    ///
    /// The bit width of the type provided by `value` doesn't need to match `bit_width`, but the value represented by `value` must fit into `bit_width` bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBitWidth`] if `bit_width` is out of range, or [`Error::ValueOutOfRange`] if `value` needs more than `bit_width` bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use hdlgraph::*;
    ///
    /// # fn main() -> Result<()> {
    /// let c = Context::new();
    ///
    /// let eight_bit_const = c.lit(0xffu32, 8)?;
    /// let one_bit_const = c.lit(0u32, 1)?;
    /// let twenty_seven_bit_const = c.lit(true, 27)?;
    ///
    /// assert!(matches!(c.lit(128u32, 7), Err(Error::ValueOutOfRange { required_bits: 8, .. })));
    /// # Ok(())
    /// # }
    /// ```
    pub fn lit(&'a self, value: impl Into<Value>, bit_width: u32) -> Result<&'a Signal<'a>> {
        check_bit_width(bit_width)?;
        let value = value.into().check_fits(bit_width)?;
        Ok(self.alloc_lit(value, bit_width))
    }

    /// Convenience method to create a [`Signal`] that represents a single `0` bit.
    pub fn low(&'a self) -> &'a Signal<'a> {
        self.alloc_lit(0, 1)
    }

    /// Convenience method to create a [`Signal`] that represents a single `1` bit.
    pub fn high(&'a self) -> &'a Signal<'a> {
        self.alloc_lit(1, 1)
    }

    fn alloc_lit(&'a self, value: u128, bit_width: u32) -> &'a Signal<'a> {
        self.signal_arena.alloc(Signal {
            context: self,

            data: SignalData::Lit { value, bit_width },
        })
    }

    /// Reserves `name` in the input/wire namespace of this `Context`.
    pub(super) fn claim_name(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        if self.inputs.borrow().contains_key(name) || self.wires.borrow().contains_key(name) {
            return Err(Error::DuplicateName {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    pub(super) fn next_register_id(&self) -> u32 {
        let id = self.register_count.get();
        self.register_count.set(id + 1);
        id
    }

    #[cfg(test)]
    pub(crate) fn signal_count(&self) -> usize {
        self.signal_arena.len()
    }
}

impl<'a> Default for Context<'a> {
    fn default() -> Self {
        Context::new()
    }
}

pub(crate) fn check_bit_width(bit_width: u32) -> Result<()> {
    if !(MIN_SIGNAL_BIT_WIDTH..=MAX_SIGNAL_BIT_WIDTH).contains(&bit_width) {
        return Err(Error::InvalidBitWidth {
            bit_width,
            min: MIN_SIGNAL_BIT_WIDTH,
            max: MAX_SIGNAL_BIT_WIDTH,
        });
    }
    Ok(())
}

/// Port, wire and module names end up verbatim in the generated module.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason| {
        Err(Error::InvalidName {
            name: name.to_owned(),
            reason,
        })
    };

    let mut chars = name.chars();
    match chars.next() {
        None => return invalid("names must not be empty"),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return invalid("names must start with a letter or an underscore")
        }
        _ => (),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return invalid("names may only contain letters, digits and underscores");
    }
    if name.starts_with("__") {
        return invalid("names starting with \"__\" are reserved for generated identifiers");
    }
    if IMPLICIT_PORT_NAMES.contains(&name) {
        return invalid("this name is reserved for an implicit port");
    }
    if SYSTEM_VERILOG_KEYWORDS.binary_search(&name).is_ok() {
        return invalid("this name is a SystemVerilog keyword");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_has_no_inputs() {
        let c = Context::new();

        assert!(c.inputs.borrow().is_empty());
        assert_eq!(c.signal_count(), 0);
    }

    #[test]
    fn input_duplicate_name_error() {
        let c = Context::new();

        let _ = c.input("a", 1).unwrap();
        let _ = c.input("b", 1).unwrap();

        assert!(matches!(
            c.input("a", 4),
            Err(Error::DuplicateName { ref name }) if name == "a"
        ));
    }

    #[test]
    fn input_bit_width_out_of_range_error() {
        let c = Context::new();

        assert!(matches!(
            c.input("i", 0),
            Err(Error::InvalidBitWidth { bit_width: 0, .. })
        ));
        assert!(matches!(
            c.input("i", 129),
            Err(Error::InvalidBitWidth { bit_width: 129, .. })
        ));
        assert!(c.input("i", 128).is_ok());
    }

    #[test]
    fn input_invalid_names() {
        let c = Context::new();

        for name in &["", "1abc", "a-b", "__temp_0", "clk", "reset_n", "module"] {
            assert!(
                matches!(c.input(*name, 1), Err(Error::InvalidName { .. })),
                "{:?} should be rejected",
                name
            );
        }
        assert!(c.input("_key0", 1).is_ok());
    }

    #[test]
    fn keywords_are_rejected_everywhere() {
        let c = Context::new();

        let i = c.input("i", 1).unwrap();

        for &keyword in SYSTEM_VERILOG_KEYWORDS {
            assert!(
                matches!(c.input(keyword, 1), Err(Error::InvalidName { .. })),
                "input {:?} should be rejected",
                keyword
            );
            assert!(
                matches!(c.wire(keyword, 1), Err(Error::InvalidName { .. })),
                "wire {:?} should be rejected",
                keyword
            );
            assert!(
                matches!(c.circuit("c", vec![(keyword, !i)]), Err(Error::InvalidName { .. })),
                "output {:?} should be rejected",
                keyword
            );
            assert!(
                matches!(c.circuit(keyword, vec![("o", !i)]), Err(Error::InvalidName { .. })),
                "circuit {:?} should be rejected",
                keyword
            );
        }
    }

    #[test]
    fn keyword_list_is_sorted() {
        assert!(SYSTEM_VERILOG_KEYWORDS.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn lit_bit_width_out_of_range_error() {
        let c = Context::new();

        assert!(matches!(c.lit(false, 0), Err(Error::InvalidBitWidth { .. })));
        assert!(matches!(c.lit(false, 129), Err(Error::InvalidBitWidth { .. })));
    }

    #[test]
    fn lit_value_out_of_range_error() {
        let c = Context::new();

        assert!(matches!(
            c.lit(128u32, 7),
            Err(Error::ValueOutOfRange {
                value: 128,
                bit_width: 7,
                required_bits: 8
            })
        ));
        assert!(matches!(
            c.lit(1023u128, 4),
            Err(Error::ValueOutOfRange {
                required_bits: 10,
                ..
            })
        ));
        assert!(matches!(
            c.lit(65536u32, 1),
            Err(Error::ValueOutOfRange {
                required_bits: 17,
                ..
            })
        ));
        assert!(c.lit(u128::MAX, 128).is_ok());
    }

    #[test]
    fn value_out_of_range_message() {
        let c = Context::new();

        let error = c.lit(128u32, 7).err().unwrap();
        assert_eq!(
            error.to_string(),
            "Cannot fit the specified value '128' into the specified bit width '7'. The value '128' requires a bit width of at least 8 bit(s)."
        );
    }
}
