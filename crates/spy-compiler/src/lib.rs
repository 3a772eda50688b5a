//! SPy middle-end compiler.
//!
//! Lowers one name-resolved, type-checked function at a time into a flat
//! [`CodeObject`], and resolves operators and implicit conversions to
//! concrete functions ahead of lowering.
//!
//! ## Modules
//!
//! - [`bytecode`]: Opcodes, instructions and code objects
//! - [`context`]: Registry, dispatch tables and options shared by one compilation
//! - [`conversion`]: Implicit conversions and generated `from_dynamic` wrappers
//! - [`emit`]: Instruction emitter with branch back-patching
//! - [`expr`]: Expression compiler
//! - [`operators`]: Multimethod operator dispatch
//! - [`scope`]: Symbol table and type oracle interfaces
//! - [`stmt`]: Statement compiler for control flow and assignments

pub mod bytecode;
pub mod context;
pub mod conversion;
pub mod emit;
pub mod expr;
mod function_compiler;
pub mod operators;
mod options;
pub mod scope;
pub mod stmt;

#[cfg(test)]
mod test_support;

pub use bytecode::{Arg, CodeObject, Instruction, OpCode};
pub use context::CompilationContext;
pub use conversion::{convert, convert_maybe, from_dynamic};
pub use emit::{BytecodeEmitter, JumpLabel, MarkerLabel};
pub use expr::ExprCompiler;
pub use function_compiler::{FunctionCompiler, MISSING_RETURN_MESSAGE};
pub use operators::{
    MultiMethodTable, OpArg, OpImpl, Operand, Operator, OperatorResolver, TypeHooks,
};
pub use options::CompilerOptions;
pub use scope::{ScopeKind, Symbol, SymbolTable, TypeOracle};
pub use stmt::StmtCompiler;
