//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where statements, expressions and errors occur
//! in the source of the function being compiled.

use std::fmt;

/// A region of source code.
///
/// Lines are 1-indexed, columns are 0-indexed byte offsets into the line,
/// matching the locations produced by the upstream parser.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// First line of the region.
    pub line_start: u32,
    /// Last line of the region.
    pub line_end: u32,
    /// Starting column on `line_start`.
    pub col_start: u32,
    /// Ending column on `line_end` (exclusive).
    pub col_end: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub fn new(line_start: u32, col_start: u32, line_end: u32, col_end: u32) -> Self {
        Self {
            line_start,
            line_end,
            col_start,
            col_end,
        }
    }

    /// Create a zero-width span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// Create a span covering `len` columns on a single line.
    #[inline]
    pub fn on_line(line: u32, col: u32, len: u32) -> Self {
        Self::new(line, col, line, col + len)
    }

    /// Whether this span covers no source text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.line_start == self.line_end && self.col_start == self.col_end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        let (line_start, col_start) =
            (self.line_start, self.col_start).min((other.line_start, other.col_start));
        let (line_end, col_end) =
            (self.line_end, self.col_end).max((other.line_end, other.col_end));
        Span {
            line_start,
            line_end,
            col_start,
            col_end,
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.line_start, self.col_start, self.line_end, self.col_end
        )
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_start, self.col_start)
    }
}
