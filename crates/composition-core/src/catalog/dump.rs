//! Indented text output for diagnostic dumps.

use std::fmt::{self, Write};

/// Writes lines prefixed with the current indentation.
pub struct IndentWriter<'a, W: Write> {
    out: &'a mut W,
    depth: usize,
    width: usize,
}

impl<'a, W: Write> IndentWriter<'a, W> {
    /// Wrap `out`, indenting `width` spaces per level.
    pub fn new(out: &'a mut W, width: usize) -> Self {
        Self {
            out,
            depth: 0,
            width,
        }
    }

    /// Write one line at the current depth.
    pub fn line(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        write!(self.out, "{:1$}", "", self.depth * self.width)?;
        self.out.write_fmt(args)?;
        self.out.write_char('\n')
    }

    /// Run `body` one level deeper.
    pub fn indented<F>(&mut self, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }
}
