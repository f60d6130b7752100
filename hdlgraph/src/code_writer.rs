use std::io::{Result, Write};

pub struct CodeWriter<W: Write> {
    w: W,
    indent_level: u32,
}

impl<W: Write> CodeWriter<W> {
    pub fn new(w: W) -> CodeWriter<W> {
        CodeWriter { w, indent_level: 0 }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn unindent(&mut self) {
        debug_assert!(self.indent_level > 0, "indent level underflow");
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    pub fn append_indent(&mut self) -> Result<()> {
        for _ in 0..self.indent_level {
            write!(self.w, "    ")?;
        }
        Ok(())
    }

    pub fn append_newline(&mut self) -> Result<()> {
        writeln!(self.w)?;
        Ok(())
    }

    pub fn append(&mut self, s: &str) -> Result<()> {
        write!(self.w, "{}", s)?;
        Ok(())
    }

    pub fn append_line(&mut self, s: &str) -> Result<()> {
        self.append_indent()?;
        self.append(s)?;
        self.append_newline()?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.w.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_lines() {
        let mut buf = Vec::new();
        {
            let mut w = CodeWriter::new(&mut buf);
            w.append_line("a").unwrap();
            w.indent();
            w.append_line("b").unwrap();
            w.indent();
            w.append_indent().unwrap();
            w.append("c").unwrap();
            w.append_newline().unwrap();
            w.unindent();
            w.unindent();
            w.append_line("d").unwrap();
        }

        assert_eq!(String::from_utf8(buf).unwrap(), "a\n    b\n        c\nd\n");
    }
}
