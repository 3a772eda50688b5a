//! While loop compilation.

use spy_ast::WhileStmt;

use crate::bytecode::OpCode;

use super::{Result, StmtCompiler};

impl StmtCompiler<'_> {
    /// Compile a while loop.
    ///
    /// Bytecode layout:
    /// ```text
    /// [mark_while BODY, END]
    /// START:
    /// [condition]
    /// br_if_not END
    /// BODY:
    /// [body]
    /// br START
    /// END:
    /// ```
    pub fn compile_while(&mut self, while_stmt: &WhileStmt<'_>) -> Result<()> {
        let marker = self.emitter.emit_marker(OpCode::MarkWhile)?;
        let start_label = self.emitter.current_label();
        self.expr_compiler().compile(while_stmt.test)?;
        self.emitter.set_span(while_stmt.span);
        let to_end = self.emitter.emit_jump(OpCode::BrIfNot)?;

        let body_label = self.emitter.current_label();
        self.compile_block(while_stmt.body)?;
        self.emitter.set_span(while_stmt.span);
        self.emitter.emit_branch_to(OpCode::Br, start_label)?;

        let end_label = self.emitter.current_label();
        self.emitter.patch_jump(to_end, end_label)?;
        self.emitter.patch_marker(marker, &[body_label, end_label])?;
        Ok(())
    }
}
