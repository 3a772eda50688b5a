//! Variable definitions and assignments.
//!
//! Storage for locals is declared up front from the symbol table, so a
//! definition only emits code for its initializer.

use spy_ast::{AssignStmt, VarDefStmt};

use super::{Result, StmtCompiler};
use crate::expr::compile_store;

impl StmtCompiler<'_> {
    /// Compile `x: T` or `x: T = value`.
    pub fn compile_var_def(&mut self, def: &VarDefStmt<'_>) -> Result<()> {
        let Some(value) = def.value else {
            return Ok(());
        };
        self.expr_compiler().compile(value)?;
        compile_store(self.symbols, self.emitter, def.name.name, def.span)
    }

    /// Compile `x = value`.
    pub fn compile_assign(&mut self, assign: &AssignStmt<'_>) -> Result<()> {
        self.expr_compiler().compile(assign.value)?;
        compile_store(self.symbols, self.emitter, assign.target.name, assign.span)
    }
}
