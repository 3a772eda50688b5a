//! Variable loads and stores.
//!
//! Locals use `load_local` / `store_local`, module globals use
//! `load_global` / `store_global`. Names captured from an enclosing function
//! are not supported yet.

use spy_core::{CompilationError, InternalError, Span};

use super::{ExprCompiler, Result};
use crate::emit::BytecodeEmitter;
use crate::scope::{ScopeKind, SymbolTable};

/// Compile a variable reference.
pub fn compile_load(compiler: &mut ExprCompiler<'_>, name: &str, span: Span) -> Result<()> {
    let symbol = compiler
        .symbols
        .resolve(name)
        .ok_or_else(|| InternalError::UnknownSymbol(name.to_string()))?;
    compiler.emitter.set_span(span);
    match symbol.scope {
        ScopeKind::Local => compiler.emitter.emit_load_local(name)?,
        ScopeKind::Global => compiler.emitter.emit_load_global(name)?,
        ScopeKind::NonLocal => {
            return Err(CompilationError::NonLocalVariable {
                name: name.to_string(),
                span,
            });
        }
    };
    Ok(())
}

/// Store the top of stack into a variable.
pub(crate) fn compile_store(
    symbols: &dyn SymbolTable,
    emitter: &mut BytecodeEmitter,
    name: &str,
    span: Span,
) -> Result<()> {
    let symbol = symbols
        .resolve(name)
        .ok_or_else(|| InternalError::UnknownSymbol(name.to_string()))?;
    emitter.set_span(span);
    match symbol.scope {
        ScopeKind::Local => emitter.emit_store_local(name)?,
        ScopeKind::Global => emitter.emit_store_global(name)?,
        ScopeKind::NonLocal => {
            return Err(CompilationError::NonLocalVariable {
                name: name.to_string(),
                span,
            });
        }
    };
    Ok(())
}
