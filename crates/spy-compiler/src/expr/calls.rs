//! Direct call compilation.
//!
//! A call lowers to `call_global` only when the callee is a name bound to a
//! compile-time constant function. Any other callee would need an indirect
//! call, which the instruction set does not have.

use spy_ast::{CallExpr, Expr};
use spy_core::{CompilationError, Value};

use super::{ExprCompiler, Result};

/// Compile a call expression.
pub fn compile_call(compiler: &mut ExprCompiler<'_>, call: &CallExpr<'_>) -> Result<()> {
    let indirect = CompilationError::IndirectCall { span: call.span };
    let Expr::Name(callee) = call.func else {
        return Err(indirect);
    };
    let is_const = compiler
        .symbols
        .resolve(callee.id)
        .is_some_and(|sym| sym.is_const);
    if !is_const {
        return Err(indirect);
    }
    let Some(Value::Func(qn)) = compiler.oracle.const_value_of(call.func) else {
        return Err(indirect);
    };

    for arg in call.args {
        compiler.compile(arg)?;
    }
    compiler.emitter.set_span(call.span);
    compiler.emitter.emit_call_global(qn, call.args.len())?;
    Ok(())
}
