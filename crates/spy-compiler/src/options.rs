//! Compiler configuration.

/// Settings for lowering function bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompilerOptions {
    /// Emit `mark_if_then`, `mark_if_then_else` and `mark_while` before each
    /// construct, carrying its labels. Off by default.
    pub emit_markers: bool,
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markers(mut self, enabled: bool) -> Self {
        self.emit_markers = enabled;
        self
    }
}
