//! Bytecode operation codes.
//!
//! The instruction set is a closed vocabulary. Each opcode has a fixed list
//! of operand kinds; instructions are checked against it when built.

use std::fmt;

/// Kind of an instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Compile-time constant value
    Const,
    /// Variable name
    Name,
    /// Qualified name of a function
    Func,
    /// Argument count
    Count,
    /// Instruction index, set once
    Target,
    /// Free-form text
    Message,
}

/// Bytecode operation codes.
///
/// The interpreter is a stack machine. Most operations pop their operands
/// and push one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    // =========================================================================
    // Control
    // =========================================================================
    /// Return the top of stack.
    Return,
    /// Trap with a message.
    /// Operand: message
    Abort,

    // =========================================================================
    // Structure markers
    // =========================================================================
    /// Precedes an `if` without `else`.
    /// Operands: then-start, end
    MarkIfThen,
    /// Precedes an `if` with `else`.
    /// Operands: then-start, else-start, end
    MarkIfThenElse,
    /// Precedes a `while`.
    /// Operands: body-start, end
    MarkWhile,

    // =========================================================================
    // Loads and stores
    // =========================================================================
    /// Push a constant.
    /// Operand: value
    LoadConst,
    /// Operand: local name
    LoadLocal,
    /// Operand: global name
    LoadGlobal,
    /// Operand: local name
    StoreLocal,
    /// Operand: global name
    StoreGlobal,

    // =========================================================================
    // Calls
    // =========================================================================
    /// Call a function directly.
    /// Operands: function QN, argument count
    CallGlobal,

    // =========================================================================
    // i32 arithmetic and comparison
    // =========================================================================
    I32Add,
    I32Sub,
    I32Mul,
    I32Eq,
    I32Neq,
    I32Lt,
    I32Lte,
    I32Gt,
    I32Gte,

    // =========================================================================
    // Stack and branches
    // =========================================================================
    /// Pop top of stack.
    PopAndDiscard,
    /// Unconditional branch.
    /// Operand: target
    Br,
    /// Pop a bool and branch if false.
    /// Operand: target
    BrIfNot,
}

impl OpCode {
    pub const ALL: [OpCode; 23] = [
        OpCode::Return,
        OpCode::Abort,
        OpCode::MarkIfThen,
        OpCode::MarkIfThenElse,
        OpCode::MarkWhile,
        OpCode::LoadConst,
        OpCode::LoadLocal,
        OpCode::LoadGlobal,
        OpCode::StoreLocal,
        OpCode::StoreGlobal,
        OpCode::CallGlobal,
        OpCode::I32Add,
        OpCode::I32Sub,
        OpCode::I32Mul,
        OpCode::I32Eq,
        OpCode::I32Neq,
        OpCode::I32Lt,
        OpCode::I32Lte,
        OpCode::I32Gt,
        OpCode::I32Gte,
        OpCode::PopAndDiscard,
        OpCode::Br,
        OpCode::BrIfNot,
    ];

    /// Operand kinds, in order.
    pub fn operands(&self) -> &'static [ArgKind] {
        use ArgKind::*;
        match self {
            OpCode::Abort => &[Message],
            OpCode::MarkIfThen | OpCode::MarkWhile => &[Target, Target],
            OpCode::MarkIfThenElse => &[Target, Target, Target],
            OpCode::LoadConst => &[Const],
            OpCode::LoadLocal | OpCode::LoadGlobal | OpCode::StoreLocal | OpCode::StoreGlobal => {
                &[Name]
            }
            OpCode::CallGlobal => &[Func, Count],
            OpCode::Br | OpCode::BrIfNot => &[Target],
            OpCode::Return
            | OpCode::I32Add
            | OpCode::I32Sub
            | OpCode::I32Mul
            | OpCode::I32Eq
            | OpCode::I32Neq
            | OpCode::I32Lt
            | OpCode::I32Lte
            | OpCode::I32Gt
            | OpCode::I32Gte
            | OpCode::PopAndDiscard => &[],
        }
    }

    /// Number of operands.
    pub fn arity(&self) -> usize {
        self.operands().len()
    }

    /// Check if this opcode transfers control.
    pub fn is_branch(&self) -> bool {
        matches!(self, OpCode::Br | OpCode::BrIfNot)
    }

    /// Check if this opcode only annotates structure.
    pub fn is_marker(&self) -> bool {
        matches!(
            self,
            OpCode::MarkIfThen | OpCode::MarkIfThenElse | OpCode::MarkWhile
        )
    }

    /// Get the opcode name as it appears in disassembly.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Return => "return",
            OpCode::Abort => "abort",
            OpCode::MarkIfThen => "mark_if_then",
            OpCode::MarkIfThenElse => "mark_if_then_else",
            OpCode::MarkWhile => "mark_while",
            OpCode::LoadConst => "load_const",
            OpCode::LoadLocal => "load_local",
            OpCode::LoadGlobal => "load_global",
            OpCode::StoreLocal => "store_local",
            OpCode::StoreGlobal => "store_global",
            OpCode::CallGlobal => "call_global",
            OpCode::I32Add => "i32_add",
            OpCode::I32Sub => "i32_sub",
            OpCode::I32Mul => "i32_mul",
            OpCode::I32Eq => "i32_eq",
            OpCode::I32Neq => "i32_neq",
            OpCode::I32Lt => "i32_lt",
            OpCode::I32Lte => "i32_lte",
            OpCode::I32Gt => "i32_gt",
            OpCode::I32Gte => "i32_gte",
            OpCode::PopAndDiscard => "pop_and_discard",
            OpCode::Br => "br",
            OpCode::BrIfNot => "br_if_not",
        }
    }

    /// Look up an opcode by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
