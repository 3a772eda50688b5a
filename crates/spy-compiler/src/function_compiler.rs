//! Function compiler for generating code objects from function definitions.
//!
//! This module provides [`FunctionCompiler`] which compiles a single
//! function to a [`CodeObject`]. It handles:
//!
//! - Rejecting signatures the backend cannot express yet
//! - Declaring local storage from the symbol table
//! - Compiling body statements
//! - Appending the epilogue: an implicit `return None` for `void` functions,
//!   a runtime `abort` otherwise
//!
//! # Example
//!
//! ```ignore
//! let compiler = FunctionCompiler::new(&ctx, &scope, &oracle);
//! let code = compiler.compile(qn, func_type, &func_def)?;
//! println!("{}", code.disassemble());
//! ```

use spy_ast::FuncDef;
use spy_core::{ArgumentForm, CompilationError, QualifiedName, TypeId, Value};
use tracing::debug;

use crate::bytecode::CodeObject;
use crate::context::CompilationContext;
use crate::emit::BytecodeEmitter;
use crate::scope::{SymbolTable, TypeOracle};
use crate::stmt::StmtCompiler;

type Result<T> = std::result::Result<T, CompilationError>;

/// Runtime message for a non-`void` function whose body ends without
/// returning.
pub const MISSING_RETURN_MESSAGE: &str = "reached the end of the function without a `return`";

/// Compiles one function definition at a time.
pub struct FunctionCompiler<'a> {
    ctx: &'a CompilationContext,
    symbols: &'a dyn SymbolTable,
    oracle: &'a dyn TypeOracle,
}

impl<'a> FunctionCompiler<'a> {
    /// Create a function compiler.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Registry, dispatch tables and options
    /// * `symbols` - Storage class of every name in the function's scope
    /// * `oracle` - Static types and constant values of expressions
    pub fn new(
        ctx: &'a CompilationContext,
        symbols: &'a dyn SymbolTable,
        oracle: &'a dyn TypeOracle,
    ) -> Self {
        Self {
            ctx,
            symbols,
            oracle,
        }
    }

    /// Compile `def` into a code object named `qn`.
    ///
    /// `func_type` must be a function type; its return type selects the
    /// epilogue.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(
        &self,
        qn: QualifiedName,
        func_type: TypeId,
        def: &FuncDef<'_>,
    ) -> Result<CodeObject> {
        debug!(qn = %qn, "compiling function");
        check_signature(def)?;

        let mut code = CodeObject::new(qn, func_type);
        for (name, ty) in self.symbols.locals() {
            code.declare_local(name, ty)?;
        }

        let mut emitter = BytecodeEmitter::new(self.ctx.options().emit_markers);
        StmtCompiler::new(self.ctx, self.symbols, self.oracle, &mut emitter)
            .compile_block(def.body)?;
        self.emit_epilogue(&mut emitter, func_type, def)?;

        code.body = emitter.finish()?;
        code.validate()?;
        Ok(code)
    }

    fn emit_epilogue(
        &self,
        emitter: &mut BytecodeEmitter,
        func_type: TypeId,
        def: &FuncDef<'_>,
    ) -> Result<()> {
        let registry = self.ctx.registry();
        let ret = registry.function_shape(func_type)?.ret;
        emitter.set_span(def.span);
        if ret == registry.builtins().void {
            emitter.emit_load_const(Value::None)?;
            emitter.emit_return()?;
        } else {
            emitter.emit_abort(MISSING_RETURN_MESSAGE)?;
        }
        Ok(())
    }
}

/// Reject argument forms and missing annotations, at the offending location.
fn check_signature(def: &FuncDef<'_>) -> Result<()> {
    let args = &def.args;
    let unsupported =
        |form, span| -> Result<()> { Err(CompilationError::UnsupportedArgument { form, span }) };

    if let Some(vararg) = args.vararg {
        return unsupported(ArgumentForm::Variadic, vararg.span);
    }
    if let Some(kwarg) = args.kwarg {
        return unsupported(ArgumentForm::KeywordVariadic, kwarg.span);
    }
    if let Some(default) = args.defaults.first() {
        return unsupported(ArgumentForm::Default, default.span());
    }
    if let Some(arg) = args.posonly.first() {
        return unsupported(ArgumentForm::PositionalOnly, arg.span);
    }
    if let Some(arg) = args.kwonly.first() {
        return unsupported(ArgumentForm::KeywordOnly, arg.span);
    }

    for arg in args.args {
        if arg.ty.is_none() {
            return Err(CompilationError::MissingArgumentType {
                name: arg.name.to_string(),
                span: arg.span,
            });
        }
    }

    if def.return_type.is_none() {
        return Err(CompilationError::MissingReturnType {
            span: def.header_span(),
        });
    }
    Ok(())
}
