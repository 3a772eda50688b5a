//! Convenience constructors for arena-allocated trees.
//!
//! The front-end parser is not part of this workspace; `AstBuilder` is how
//! tests, benches and embedders produce the trees the compiler consumes.
//!
//! ```
//! use bumpalo::Bump;
//! use spy_ast::{AstBuilder, BinaryOp};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let body = [b.ret(b.binop(BinaryOp::Add, b.name("x"), b.int(1)))];
//! let func = b.func("inc", &[b.arg("x", "i32")], Some("i32"), body);
//! assert_eq!(func.name.name, "inc");
//! ```

use std::cell::Cell;

use bumpalo::Bump;
use spy_core::Span;

use crate::decl::{FuncArg, FuncArgs, FuncDef};
use crate::expr::{BinOpExpr, CallExpr, ConstantExpr, Expr, Literal, NameExpr};
use crate::ops::BinaryOp;
use crate::stmt::{AssignStmt, ExprStmt, IfStmt, PassStmt, ReturnStmt, Stmt, VarDefStmt, WhileStmt};
use crate::Ident;

/// Builds AST nodes in an arena.
///
/// Every node gets the current span, set with [`at`](Self::at) or
/// [`set_span`](Self::set_span).
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    span: Cell<Span>,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            span: Cell::new(Span::point(1, 0)),
        }
    }

    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// Set the span given to subsequently built nodes.
    pub fn set_span(&self, span: Span) -> &Self {
        self.span.set(span);
        self
    }

    /// Move to the start of `line`.
    pub fn at(&self, line: u32) -> &Self {
        self.set_span(Span::point(line, 0))
    }

    fn span(&self) -> Span {
        self.span.get()
    }

    fn slice<T: Copy>(&self, items: impl IntoIterator<Item = T>) -> &'ast [T] {
        let items: Vec<T> = items.into_iter().collect();
        self.arena.alloc_slice_copy(&items)
    }

    pub fn ident(&self, name: &str) -> Ident<'ast> {
        Ident {
            name: self.arena.alloc_str(name),
            span: self.span(),
        }
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    pub fn literal(&self, value: Literal<'ast>) -> Expr<'ast> {
        Expr::Constant(ConstantExpr {
            value,
            span: self.span(),
        })
    }

    pub fn int(&self, value: i32) -> Expr<'ast> {
        self.literal(Literal::I32(value))
    }

    pub fn float(&self, value: f64) -> Expr<'ast> {
        self.literal(Literal::F64(value))
    }

    pub fn bool(&self, value: bool) -> Expr<'ast> {
        self.literal(Literal::Bool(value))
    }

    pub fn str(&self, value: &str) -> Expr<'ast> {
        self.literal(Literal::Str(self.arena.alloc_str(value)))
    }

    pub fn none(&self) -> Expr<'ast> {
        self.literal(Literal::None)
    }

    pub fn name(&self, id: &str) -> Expr<'ast> {
        Expr::Name(NameExpr {
            id: self.arena.alloc_str(id),
            span: self.span(),
        })
    }

    pub fn binop(&self, op: BinaryOp, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        Expr::BinOp(self.arena.alloc(BinOpExpr {
            op,
            left: self.arena.alloc(left),
            right: self.arena.alloc(right),
            span: left.span().merge(right.span()),
        }))
    }

    /// Call a function by name.
    pub fn call(&self, func: &str, args: impl IntoIterator<Item = Expr<'ast>>) -> Expr<'ast> {
        let callee = self.name(func);
        self.call_expr(callee, args)
    }

    /// Call an arbitrary callee expression.
    pub fn call_expr(
        &self,
        func: Expr<'ast>,
        args: impl IntoIterator<Item = Expr<'ast>>,
    ) -> Expr<'ast> {
        Expr::Call(self.arena.alloc(CallExpr {
            func: self.arena.alloc(func),
            args: self.slice(args),
            span: self.span(),
        }))
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    pub fn ret(&self, value: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Return(ReturnStmt {
            value: Some(self.arena.alloc(value)),
            span: self.span(),
        })
    }

    pub fn ret_void(&self) -> Stmt<'ast> {
        Stmt::Return(ReturnStmt {
            value: None,
            span: self.span(),
        })
    }

    pub fn vardef(&self, name: &str, ty: &str, value: Expr<'ast>) -> Stmt<'ast> {
        Stmt::VarDef(VarDefStmt {
            name: self.ident(name),
            ty: self.arena.alloc(self.name(ty)),
            value: Some(self.arena.alloc(value)),
            span: self.span(),
        })
    }

    /// A definition without initializer.
    pub fn declare(&self, name: &str, ty: &str) -> Stmt<'ast> {
        Stmt::VarDef(VarDefStmt {
            name: self.ident(name),
            ty: self.arena.alloc(self.name(ty)),
            value: None,
            span: self.span(),
        })
    }

    pub fn assign(&self, target: &str, value: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Assign(AssignStmt {
            target: self.ident(target),
            value: self.arena.alloc(value),
            span: self.span(),
        })
    }

    pub fn if_(
        &self,
        test: Expr<'ast>,
        then_body: impl IntoIterator<Item = Stmt<'ast>>,
        else_body: impl IntoIterator<Item = Stmt<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::If(self.arena.alloc(IfStmt {
            test: self.arena.alloc(test),
            then_body: self.slice(then_body),
            else_body: self.slice(else_body),
            span: self.span(),
        }))
    }

    pub fn while_(
        &self,
        test: Expr<'ast>,
        body: impl IntoIterator<Item = Stmt<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::While(self.arena.alloc(WhileStmt {
            test: self.arena.alloc(test),
            body: self.slice(body),
            span: self.span(),
        }))
    }

    pub fn pass(&self) -> Stmt<'ast> {
        Stmt::Pass(PassStmt { span: self.span() })
    }

    pub fn expr_stmt(&self, value: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Expr(ExprStmt {
            value: self.arena.alloc(value),
            span: self.span(),
        })
    }

    // ==========================================================================
    // Definitions
    // ==========================================================================

    pub fn arg(&self, name: &str, ty: &str) -> FuncArg<'ast> {
        FuncArg {
            name: self.arena.alloc_str(name),
            ty: Some(self.arena.alloc(self.name(ty))),
            span: self.span(),
        }
    }

    /// An argument without annotation.
    pub fn untyped_arg(&self, name: &str) -> FuncArg<'ast> {
        FuncArg {
            name: self.arena.alloc_str(name),
            ty: None,
            span: self.span(),
        }
    }

    pub fn args(&self, args: &[FuncArg<'ast>]) -> &'ast [FuncArg<'ast>] {
        self.arena.alloc_slice_copy(args)
    }

    pub fn exprs(&self, exprs: &[Expr<'ast>]) -> &'ast [Expr<'ast>] {
        self.arena.alloc_slice_copy(exprs)
    }

    /// A function with regular arguments only.
    pub fn func(
        &self,
        name: &str,
        args: &[FuncArg<'ast>],
        return_type: Option<&str>,
        body: impl IntoIterator<Item = Stmt<'ast>>,
    ) -> &'ast FuncDef<'ast> {
        let args = FuncArgs::simple(self.args(args));
        self.func_with(name, args, return_type, body)
    }

    /// A function with an arbitrary argument list.
    pub fn func_with(
        &self,
        name: &str,
        args: FuncArgs<'ast>,
        return_type: Option<&str>,
        body: impl IntoIterator<Item = Stmt<'ast>>,
    ) -> &'ast FuncDef<'ast> {
        let return_type = return_type.map(|ty| &*self.arena.alloc(self.name(ty)));
        self.arena.alloc(FuncDef {
            name: self.ident(name),
            args,
            return_type,
            body: self.slice(body),
            span: self.span(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_take_current_span() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let first = b.at(3).pass();
        let second = b.set_span(Span::on_line(7, 4, 2)).int(1);
        assert_eq!(first.span(), Span::point(3, 0));
        assert_eq!(second.span(), Span::on_line(7, 4, 2));
    }

    #[test]
    fn binop_spans_operands() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let left = b.set_span(Span::on_line(1, 0, 1)).name("a");
        let right = b.set_span(Span::on_line(1, 4, 1)).name("b");
        let expr = b.binop(BinaryOp::Lt, left, right);
        assert_eq!(expr.span(), Span::new(1, 0, 1, 5));
    }

    #[test]
    fn if_without_else() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let stmt = b.if_(b.bool(true), [b.pass()], []);
        let Stmt::If(node) = stmt else {
            panic!("expected if");
        };
        assert!(!node.has_else());
        assert_eq!(node.then_body.len(), 1);
    }

    #[test]
    fn func_header_span() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let func = b.set_span(Span::new(2, 0, 4, 10)).func("foo", &[], None, [b.pass()]);
        assert!(func.return_type.is_none());
        assert_eq!(func.header_span(), Span::new(2, 0, 2, 7));
    }

    #[test]
    fn call_by_name() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let call = b.call("print", [b.int(1), b.int(2)]);
        let Expr::Call(node) = call else {
            panic!("expected call");
        };
        assert_eq!(node.func.as_name(), Some("print"));
        assert_eq!(node.args.len(), 2);
    }
}
