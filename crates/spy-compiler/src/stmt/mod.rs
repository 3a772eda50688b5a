//! Statement compiler.
//!
//! The [`StmtCompiler`] lowers statements so that the operand stack depth is
//! the same before and after each one. Control flow turns into a flat
//! sequence of `br` / `br_if_not` instructions whose targets are
//! back-patched once the destination label is known.
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = StmtCompiler::new(ctx, symbols, oracle, &mut emitter);
//! compiler.compile_block(func.body)?;
//! ```

mod if_stmt;
mod return_stmt;
mod var_def;
mod while_stmt;

use spy_ast::{ExprStmt, Stmt};
use spy_core::CompilationError;

use crate::context::CompilationContext;
use crate::emit::BytecodeEmitter;
use crate::expr::ExprCompiler;
use crate::scope::{SymbolTable, TypeOracle};

type Result<T> = std::result::Result<T, CompilationError>;

/// Compiles statements to instructions.
pub struct StmtCompiler<'a> {
    ctx: &'a CompilationContext,
    symbols: &'a dyn SymbolTable,
    oracle: &'a dyn TypeOracle,
    emitter: &'a mut BytecodeEmitter,
}

impl<'a> StmtCompiler<'a> {
    pub fn new(
        ctx: &'a CompilationContext,
        symbols: &'a dyn SymbolTable,
        oracle: &'a dyn TypeOracle,
        emitter: &'a mut BytecodeEmitter,
    ) -> Self {
        Self {
            ctx,
            symbols,
            oracle,
            emitter,
        }
    }

    /// Compile a statement.
    pub fn compile(&mut self, stmt: &Stmt<'_>) -> Result<()> {
        self.emitter.set_span(stmt.span());
        match stmt {
            Stmt::Return(ret) => self.compile_return(ret),
            Stmt::VarDef(def) => self.compile_var_def(def),
            Stmt::Assign(assign) => self.compile_assign(assign),
            Stmt::If(if_stmt) => self.compile_if(if_stmt),
            Stmt::While(while_stmt) => self.compile_while(while_stmt),
            Stmt::Pass(_) => Ok(()),
            Stmt::Expr(expr_stmt) => self.compile_expr_stmt(expr_stmt),
        }
    }

    /// Compile statements in order.
    pub fn compile_block(&mut self, body: &[Stmt<'_>]) -> Result<()> {
        for stmt in body {
            self.compile(stmt)?;
        }
        Ok(())
    }

    /// Evaluate for side effects and drop the result.
    fn compile_expr_stmt(&mut self, expr_stmt: &ExprStmt<'_>) -> Result<()> {
        self.expr_compiler().compile(expr_stmt.value)?;
        self.emitter.set_span(expr_stmt.span);
        self.emitter.emit_pop()?;
        Ok(())
    }

    /// Create an expression compiler writing to the same emitter.
    fn expr_compiler(&mut self) -> ExprCompiler<'_> {
        ExprCompiler::new(self.ctx, self.symbols, self.oracle, self.emitter)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::bytecode::CodeObject;
    use crate::options::CompilerOptions;
    use crate::test_support::{Env, Oracle};
    use bumpalo::Bump;
    use spy_ast::{AstBuilder, BinaryOp};
    use spy_core::{Color, FuncParam};

    /// Compile a statement list into a bare code object, without epilogue.
    pub(crate) fn compile_body(
        ctx: &CompilationContext,
        env: &Env,
        body: &[Stmt<'_>],
    ) -> Result<CodeObject> {
        let oracle = Oracle {
            env,
            registry: ctx.registry(),
        };
        let mut emitter = BytecodeEmitter::new(ctx.options().emit_markers);
        StmtCompiler::new(ctx, env, &oracle, &mut emitter).compile_block(body)?;
        let void = ctx.registry().builtins().void;
        let mut code = CodeObject::new("test::body".parse().unwrap(), void);
        code.body = emitter.finish()?;
        code.validate()?;
        Ok(code)
    }

    pub(crate) fn marker_context() -> CompilationContext {
        CompilationContext::with_options(CompilerOptions::new().with_markers(true)).unwrap()
    }

    #[test]
    fn pass_emits_nothing() {
        let ctx = CompilationContext::new().unwrap();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let code = compile_body(&ctx, &Env::new(), &[b.pass(), b.pass()]).unwrap();
        assert!(code.is_empty());
    }

    #[test]
    fn expression_statement_discards_result() {
        let mut ctx = CompilationContext::new().unwrap();
        let b_ = *ctx.registry().builtins();
        let fn_type = ctx
            .registry_mut()
            .function_type(vec![FuncParam::new("x", b_.i32)], b_.void, Color::Red)
            .unwrap();
        let env = Env::new().function("log", fn_type, "builtins::log");
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let body = [
            b.expr_stmt(b.call("log", [b.int(1)])),
            b.expr_stmt(b.binop(BinaryOp::Add, b.int(1), b.int(2))),
        ];
        let code = compile_body(&ctx, &env, &body).unwrap();
        assert!(code.equals(
            "
            load_const 1
            call_global builtins::log, 1
            pop_and_discard
            load_const 1
            load_const 2
            i32_add
            pop_and_discard
            "
        ));
    }

    #[test]
    fn instruction_spans_follow_statements() {
        let ctx = CompilationContext::new().unwrap();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let first = b.at(3).expr_stmt(b.int(1));
        let second = b.at(4).expr_stmt(b.int(2));
        let code = compile_body(&ctx, &Env::new(), &[first, second]).unwrap();
        let lines: Vec<u32> = code.body.iter().map(|i| i.span.line_start).collect();
        assert_eq!(lines, vec![3, 3, 4, 4]);
    }

    #[test]
    fn error_stops_compilation() {
        let ctx = CompilationContext::new().unwrap();
        let i32 = ctx.registry().builtins().i32;
        let env = Env::new().non_local("outer", i32);
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let body = [b.pass(), b.at(2).expr_stmt(b.name("outer")), b.pass()];
        let err = compile_body(&ctx, &env, &body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "at 2:0: non-local variable 'outer' is not supported"
        );
    }
}
