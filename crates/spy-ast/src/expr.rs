//! Expression AST nodes.

use spy_core::{Span, Value};

use crate::ops::BinaryOp;

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal constant
    Constant(ConstantExpr<'ast>),
    /// Variable reference
    Name(NameExpr<'ast>),
    /// Binary operation or comparison
    BinOp(&'ast BinOpExpr<'ast>),
    /// Function call
    Call(&'ast CallExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Constant(e) => e.span,
            Self::Name(e) => e.span,
            Self::BinOp(e) => e.span,
            Self::Call(e) => e.span,
        }
    }

    /// The variable name, if this is a plain name.
    pub fn as_name(&self) -> Option<&'ast str> {
        match self {
            Self::Name(n) => Some(n.id),
            _ => None,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'ast> {
    None,
    I32(i32),
    F64(f64),
    Bool(bool),
    Str(&'ast str),
}

impl Literal<'_> {
    /// Owned constant for this literal.
    pub fn to_value(&self) -> Value {
        match *self {
            Literal::None => Value::None,
            Literal::I32(v) => Value::I32(v),
            Literal::F64(v) => Value::f64(v),
            Literal::Bool(v) => Value::Bool(v),
            Literal::Str(s) => Value::str(s),
        }
    }
}

/// A literal constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantExpr<'ast> {
    pub value: Literal<'ast>,
    pub span: Span,
}

/// A reference to a variable by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameExpr<'ast> {
    pub id: &'ast str,
    pub span: Span,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinOpExpr<'ast> {
    pub op: BinaryOp,
    pub left: &'ast Expr<'ast>,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

/// A function call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    /// The callee
    pub func: &'ast Expr<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}
