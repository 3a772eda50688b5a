//! Function definitions.

use spy_core::Span;

use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::Ident;

/// A function definition as produced by the parser.
///
/// The argument list keeps every form the surface syntax allows, including
/// the ones the compiler rejects, so that errors can point at them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuncDef<'ast> {
    pub name: Ident<'ast>,
    pub args: FuncArgs<'ast>,
    /// Return annotation; `None` when missing
    pub return_type: Option<&'ast Expr<'ast>>,
    pub body: &'ast [Stmt<'ast>],
    pub span: Span,
}

impl FuncDef<'_> {
    /// Span covering `def <name>`, used when the return type is missing.
    pub fn header_span(&self) -> Span {
        let col_end = "def ".len() as u32 + self.name.name.len() as u32;
        Span::new(self.span.line_start, self.span.col_start, self.span.line_start, col_end)
    }
}

/// The full argument list of a function definition.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FuncArgs<'ast> {
    /// Regular positional-or-keyword arguments
    pub args: &'ast [FuncArg<'ast>],
    /// `*args`
    pub vararg: Option<FuncArg<'ast>>,
    /// `**kwargs`
    pub kwarg: Option<FuncArg<'ast>>,
    /// Default values, aligned to the end of `args`
    pub defaults: &'ast [Expr<'ast>],
    /// Arguments before `/`
    pub posonly: &'ast [FuncArg<'ast>],
    /// Arguments after `*`
    pub kwonly: &'ast [FuncArg<'ast>],
}

impl<'ast> FuncArgs<'ast> {
    /// Only regular arguments.
    pub fn simple(args: &'ast [FuncArg<'ast>]) -> Self {
        Self {
            args,
            ..Self::default()
        }
    }
}

/// A single argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuncArg<'ast> {
    pub name: &'ast str,
    /// Type annotation; `None` when missing
    pub ty: Option<&'ast Expr<'ast>>,
    pub span: Span,
}
