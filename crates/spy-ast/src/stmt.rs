//! Statement AST nodes.
//!
//! Covers:
//! - Expression statements
//! - Variable definitions and assignments
//! - Control flow (if/else, while)
//! - `return` and `pass`

use spy_core::Span;

use crate::expr::Expr;
use crate::Ident;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// Return statement
    Return(ReturnStmt<'ast>),
    /// Variable definition `x: T = value`
    VarDef(VarDefStmt<'ast>),
    /// Assignment `x = value`
    Assign(AssignStmt<'ast>),
    /// If statement
    If(&'ast IfStmt<'ast>),
    /// While loop
    While(&'ast WhileStmt<'ast>),
    /// No-op
    Pass(PassStmt),
    /// Expression evaluated for its side effects
    Expr(ExprStmt<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Return(s) => s.span,
            Self::VarDef(s) => s.span,
            Self::Assign(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::Pass(s) => s.span,
            Self::Expr(s) => s.span,
        }
    }
}

/// A return statement.
///
/// Examples:
/// - `return`
/// - `return expr`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    /// Optional return value
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// A typed variable definition.
///
/// Examples:
/// - `x: i32`
/// - `x: i32 = 5`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDefStmt<'ast> {
    pub name: Ident<'ast>,
    /// Declared type
    pub ty: &'ast Expr<'ast>,
    /// Optional initializer
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// An assignment to an existing variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignStmt<'ast> {
    pub target: Ident<'ast>,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

/// An if statement, with optional else body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub test: &'ast Expr<'ast>,
    pub then_body: &'ast [Stmt<'ast>],
    /// Empty when there is no `else`
    pub else_body: &'ast [Stmt<'ast>],
    pub span: Span,
}

impl IfStmt<'_> {
    pub fn has_else(&self) -> bool {
        !self.else_body.is_empty()
    }
}

/// A while loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub test: &'ast Expr<'ast>,
    pub body: &'ast [Stmt<'ast>],
    pub span: Span,
}

/// `pass`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassStmt {
    pub span: Span,
}

/// An expression statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}
