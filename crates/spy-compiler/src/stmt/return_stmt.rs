//! Return statement compilation.

use spy_ast::ReturnStmt;
use spy_core::Value;

use super::{Result, StmtCompiler};

impl StmtCompiler<'_> {
    /// Compile a return statement.
    ///
    /// A bare `return` returns `None`.
    pub fn compile_return(&mut self, ret: &ReturnStmt<'_>) -> Result<()> {
        match ret.value {
            Some(value) => self.expr_compiler().compile(value)?,
            None => {
                self.emitter.set_span(ret.span);
                self.emitter.emit_load_const(Value::None)?;
            }
        }
        self.emitter.set_span(ret.span);
        self.emitter.emit_return()?;
        Ok(())
    }
}
