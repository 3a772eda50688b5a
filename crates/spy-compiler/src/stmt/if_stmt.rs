//! If/else statement compilation.

use spy_ast::IfStmt;

use crate::bytecode::OpCode;

use super::{Result, StmtCompiler};

impl StmtCompiler<'_> {
    /// Compile an if statement, with or without else body.
    pub fn compile_if(&mut self, if_stmt: &IfStmt<'_>) -> Result<()> {
        if if_stmt.has_else() {
            self.compile_if_else(if_stmt)
        } else {
            self.compile_if_only(if_stmt)
        }
    }

    /// Bytecode layout:
    /// ```text
    /// [mark_if_then THEN, END]
    /// [condition]
    /// br_if_not END
    /// THEN:
    /// [then body]
    /// END:
    /// ```
    fn compile_if_only(&mut self, if_stmt: &IfStmt<'_>) -> Result<()> {
        let marker = self.emitter.emit_marker(OpCode::MarkIfThen)?;
        self.expr_compiler().compile(if_stmt.test)?;
        self.emitter.set_span(if_stmt.span);
        let to_end = self.emitter.emit_jump(OpCode::BrIfNot)?;

        let then_label = self.emitter.current_label();
        self.compile_block(if_stmt.then_body)?;

        let end_label = self.emitter.current_label();
        self.emitter.patch_jump(to_end, end_label)?;
        self.emitter.patch_marker(marker, &[then_label, end_label])?;
        Ok(())
    }

    /// Bytecode layout:
    /// ```text
    /// [mark_if_then_else THEN, ELSE, END]
    /// [condition]
    /// br_if_not ELSE
    /// THEN:
    /// [then body]
    /// br END
    /// ELSE:
    /// [else body]
    /// END:
    /// ```
    fn compile_if_else(&mut self, if_stmt: &IfStmt<'_>) -> Result<()> {
        let marker = self.emitter.emit_marker(OpCode::MarkIfThenElse)?;
        self.expr_compiler().compile(if_stmt.test)?;
        self.emitter.set_span(if_stmt.span);
        let to_else = self.emitter.emit_jump(OpCode::BrIfNot)?;

        let then_label = self.emitter.current_label();
        self.compile_block(if_stmt.then_body)?;
        self.emitter.set_span(if_stmt.span);
        let to_end = self.emitter.emit_jump(OpCode::Br)?;

        let else_label = self.emitter.current_label();
        self.compile_block(if_stmt.else_body)?;

        let end_label = self.emitter.current_label();
        self.emitter.patch_jump(to_else, else_label)?;
        self.emitter.patch_jump(to_end, end_label)?;
        self.emitter
            .patch_marker(marker, &[then_label, else_label, end_label])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{compile_body, marker_context};
    use crate::context::CompilationContext;
    use crate::test_support::Env;
    use bumpalo::Bump;
    use spy_ast::{AstBuilder, BinaryOp};

    #[test]
    fn if_without_else() {
        let ctx = CompilationContext::new().unwrap();
        let i32 = ctx.registry().builtins().i32;
        let env = Env::new().local("x", i32);
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let cond = b.binop(BinaryOp::Lt, b.name("x"), b.int(0));
        let body = [b.if_(cond, [b.assign("x", b.int(0))], [])];
        let code = compile_body(&ctx, &env, &body).unwrap();
        assert!(code.equals(
            "
            load_local x
            load_const 0
            i32_lt
            br_if_not @6
            load_const 0
            store_local x
            "
        ));
    }

    #[test]
    fn if_with_else() {
        let ctx = CompilationContext::new().unwrap();
        let i32 = ctx.registry().builtins().i32;
        let env = Env::new().local("x", i32);
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let cond = b.binop(BinaryOp::Lt, b.name("x"), b.int(0));
        let body = [
            b.if_(cond, [b.assign("x", b.int(1))], [b.assign("x", b.int(2))]),
            b.ret(b.name("x")),
        ];
        let code = compile_body(&ctx, &env, &body).unwrap();
        assert!(code.equals(
            "
            load_local x
            load_const 0
            i32_lt
            br_if_not @7
            load_const 1
            store_local x
            br @9
            load_const 2
            store_local x
            load_local x
            return
            "
        ));
    }

    #[test]
    fn empty_then_body_targets_join() {
        let ctx = CompilationContext::new().unwrap();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let body = [b.if_(b.bool(true), [b.pass()], [])];
        let code = compile_body(&ctx, &Env::new(), &body).unwrap();
        assert!(code.equals(
            "
            load_const True
            br_if_not @2
            "
        ));
    }

    #[test]
    fn markers_carry_labels() {
        let ctx = marker_context();
        let i32 = ctx.registry().builtins().i32;
        let env = Env::new().local("x", i32);
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let cond = b.binop(BinaryOp::Eq, b.name("x"), b.int(0));
        let body = [b.if_(cond, [b.assign("x", b.int(1))], [b.assign("x", b.int(2))])];
        let code = compile_body(&ctx, &env, &body).unwrap();
        assert!(code.equals(
            "
            mark_if_then_else @5, @8, @10
            load_local x
            load_const 0
            i32_eq
            br_if_not @8
            load_const 1
            store_local x
            br @10
            load_const 2
            store_local x
            "
        ));

        let code = compile_body(&ctx, &env, &[b.if_(b.bool(false), [b.pass()], [])]).unwrap();
        assert!(code.equals(
            "
            mark_if_then @3, @3
            load_const False
            br_if_not @3
            "
        ));
    }

    #[test]
    fn nested_ifs_patch_independently() {
        let ctx = CompilationContext::new().unwrap();
        let i32 = ctx.registry().builtins().i32;
        let env = Env::new().local("x", i32);
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let inner = b.if_(b.bool(false), [b.assign("x", b.int(1))], []);
        let body = [b.if_(b.bool(true), [inner], [b.assign("x", b.int(2))])];
        let code = compile_body(&ctx, &env, &body).unwrap();
        assert!(code.equals(
            "
            load_const True
            br_if_not @7
            load_const False
            br_if_not @6
            load_const 1
            store_local x
            br @9
            load_const 2
            store_local x
            "
        ));
    }
}
