//! Bytecode representation.
//!
//! - [`OpCode`]: the closed instruction vocabulary
//! - [`Instruction`] / [`Arg`]: one step with checked operands
//! - [`CodeObject`]: a lowered function body with its locals

mod code_object;
mod instruction;
mod opcode;

pub use code_object::CodeObject;
pub use instruction::{Arg, Instruction};
pub use opcode::{ArgKind, OpCode};
