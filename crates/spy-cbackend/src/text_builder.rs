//! Indentation-aware text output.
//!
//! A [`TextBuilder`] accumulates lines at a current indentation level.
//! [`detached`](TextBuilder::detached) builders collect a block out of line
//! so it can be [`attach`](TextBuilder::attach)ed in one piece once it is
//! complete, even if other output was written to the parent meanwhile.

const INDENT: &str = "    ";

/// Line-oriented text buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuilder {
    buf: String,
    level: usize,
}

/// Saved buffer length for [`TextBuilder::rollback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

impl TextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current indentation; empty lines stay empty.
    pub fn wl(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.level {
                self.buf.push_str(INDENT);
            }
            self.buf.push_str(line);
        }
        self.buf.push('\n');
    }

    /// Write a block of lines, each at the current indentation.
    pub fn wb(&mut self, block: &str) {
        for line in block.lines() {
            self.wl(line);
        }
    }

    /// Run `f` with the indentation one level deeper.
    pub fn indent<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.level += 1;
        let result = f(self);
        self.level -= 1;
        result
    }

    /// An empty builder at the same indentation, to be attached later.
    pub fn detached(&self) -> Self {
        Self {
            buf: String::new(),
            level: self.level,
        }
    }

    /// Append everything written to a detached builder.
    pub fn attach(&mut self, nested: TextBuilder) {
        self.buf.push_str(&nested.buf);
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.buf.len())
    }

    /// Discard everything written since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.buf.truncate(checkpoint.0);
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn build(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_follow_indentation() {
        let mut out = TextBuilder::new();
        out.wl("struct S {");
        out.indent(|out| {
            out.wl("int32_t x;");
            out.wl("");
        });
        out.wl("};");
        assert_eq!(out.as_str(), "struct S {\n    int32_t x;\n\n};\n");
    }

    #[test]
    fn detached_block_is_spliced_whole() {
        let mut out = TextBuilder::new();
        let mut body = out.detached();
        body.wl("struct Outer {");
        out.wl("struct Inner {};");
        body.wl("};");
        out.attach(body);
        assert_eq!(out.as_str(), "struct Inner {};\nstruct Outer {\n};\n");
    }

    #[test]
    fn rollback_discards_tail() {
        let mut out = TextBuilder::new();
        out.wl("keep");
        let checkpoint = out.checkpoint();
        out.wb("drop\nthis too");
        out.rollback(checkpoint);
        assert_eq!(out.build(), "keep\n");
    }

    #[test]
    fn detached_keeps_level() {
        let mut out = TextBuilder::new();
        out.indent(|out| {
            let mut nested = out.detached();
            nested.wl("x");
            out.attach(nested);
        });
        assert_eq!(out.as_str(), "    x\n");
    }
}
