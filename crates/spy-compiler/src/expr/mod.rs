//! Expression compiler.
//!
//! The [`ExprCompiler`] lowers one expression so that, at runtime, it pushes
//! exactly one value. Static types and constant values come from the
//! [`TypeOracle`]; storage classes come from the [`SymbolTable`].
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = ExprCompiler::new(ctx, symbols, oracle, &mut emitter);
//! compiler.compile(&expr)?;
//! ```

mod binary;
mod calls;
mod identifiers;

use spy_ast::Expr;
use spy_core::{CompilationError, InternalError, TypeId};

use crate::context::CompilationContext;
use crate::emit::BytecodeEmitter;
use crate::scope::{SymbolTable, TypeOracle};

pub(crate) use identifiers::compile_store;

type Result<T> = std::result::Result<T, CompilationError>;

/// Compiles expressions to instructions.
pub struct ExprCompiler<'a> {
    ctx: &'a CompilationContext,
    symbols: &'a dyn SymbolTable,
    oracle: &'a dyn TypeOracle,
    emitter: &'a mut BytecodeEmitter,
}

impl<'a> ExprCompiler<'a> {
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

    /// Compile an expression, pushing its value.
    pub fn compile(&mut self, expr: &Expr<'_>) -> Result<()> {
        match expr {
            Expr::Constant(constant) => {
                self.emitter.set_span(constant.span);
                self.emitter.emit_load_const(constant.value.to_value())?;
                Ok(())
            }
            Expr::Name(name) => identifiers::compile_load(self, name.id, name.span),
            Expr::BinOp(binop) => binary::compile_binop(self, binop),
            Expr::Call(call) => calls::compile_call(self, call),
        }
    }

    /// Static type of an expression.
    fn type_of(&self, expr: &Expr<'_>) -> Result<TypeId> {
        self.oracle.type_of(expr).ok_or_else(|| {
            InternalError::PreconditionViolated(format!(
                "no static type for expression at {}",
                expr.span()
            ))
            .into()
        })
    }
}
