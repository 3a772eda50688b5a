//! Binary operator compilation.
//!
//! Only a closed set of operand types lowers directly:
//!
//! ```text
//! i32 + - * == != < <= > >= i32   -> i32_<op> instruction
//! str + str                       -> call_global operator::str_add, 2
//! ```
//!
//! Anything else must have been rewritten to a call by operator dispatch
//! before lowering, and is reported as an unsupported operator.

use spy_ast::{BinOpExpr, BinaryOp};
use spy_core::CompilationError;

use super::{ExprCompiler, Result};
use crate::bytecode::OpCode;
use crate::operators::operator_qn;

/// Compile a binary operation.
pub fn compile_binop(compiler: &mut ExprCompiler<'_>, binop: &BinOpExpr<'_>) -> Result<()> {
    let left = compiler.type_of(binop.left)?;
    let right = compiler.type_of(binop.right)?;
    let b = *compiler.ctx.registry().builtins();

    if left == b.i32 && right == b.i32 {
        if let Some(opcode) = i32_opcode(binop.op) {
            compiler.compile(binop.left)?;
            compiler.compile(binop.right)?;
            compiler.emitter.set_span(binop.span);
            compiler.emitter.emit(opcode, vec![])?;
            return Ok(());
        }
    }

    if left == b.str && right == b.str && binop.op == BinaryOp::Add {
        compiler.compile(binop.left)?;
        compiler.compile(binop.right)?;
        compiler.emitter.set_span(binop.span);
        compiler.emitter.emit_call_global(operator_qn("str_add"), 2)?;
        return Ok(());
    }

    let registry = compiler.ctx.registry();
    Err(CompilationError::UnsupportedOperator {
        op: binop.op.symbol().to_string(),
        left: registry.human_name(left)?,
        right: registry.human_name(right)?,
        span: binop.span,
    })
}

fn i32_opcode(op: BinaryOp) -> Option<OpCode> {
    match op {
        BinaryOp::Add => Some(OpCode::I32Add),
        BinaryOp::Sub => Some(OpCode::I32Sub),
        BinaryOp::Mul => Some(OpCode::I32Mul),
        BinaryOp::Eq => Some(OpCode::I32Eq),
        BinaryOp::NotEq => Some(OpCode::I32Neq),
        BinaryOp::Lt => Some(OpCode::I32Lt),
        BinaryOp::LtE => Some(OpCode::I32Lte),
        BinaryOp::Gt => Some(OpCode::I32Gt),
        BinaryOp::GtE => Some(OpCode::I32Gte),
        BinaryOp::Div => None,
    }
}
