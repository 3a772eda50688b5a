//! Binary and comparison operators.

use std::fmt;

/// Binary operators, comparisons included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtE,
    /// `>`
    Gt,
    /// `>=`
    GtE,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 10] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Eq,
        BinaryOp::NotEq,
        BinaryOp::Lt,
        BinaryOp::LtE,
        BinaryOp::Gt,
        BinaryOp::GtE,
    ];

    /// Source-level spelling.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtE => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtE => ">=",
        }
    }

    /// Parse a source-level spelling.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Check if this operator is a comparison.
    pub fn is_comparison(&self) -> bool {
        use BinaryOp::*;
        matches!(self, Eq | NotEq | Lt | LtE | Gt | GtE)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip() {
        for op in BinaryOp::ALL {
            assert_eq!(BinaryOp::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(BinaryOp::from_symbol("%"), None);
    }

    #[test]
    fn comparisons() {
        assert!(BinaryOp::LtE.is_comparison());
        assert!(!BinaryOp::Mul.is_comparison());
        assert_eq!(BinaryOp::NotEq.to_string(), "!=");
    }
}
