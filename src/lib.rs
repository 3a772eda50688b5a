//! SPy middle-end.
//!
//! One-stop facade over the workspace crates:
//!
//! - [`core`]: qualified names, type descriptors, values and errors
//! - [`ast`]: the arena-allocated tree the compiler consumes
//! - [`registry`]: type and function interning
//! - [`compiler`]: bytecode compiler, operator and conversion dispatch
//! - [`cbackend`]: C type lowering and header writing
//!
//! ```
//! use spy::prelude::*;
//!
//! let qn: QualifiedName = "mod::dict[i32, f64]::foo#0".parse().unwrap();
//! assert_eq!(qn.mangled(), "spy_mod$dict__i32_f64$foo$0");
//! ```

pub use bumpalo;
pub use spy_ast as ast;
pub use spy_cbackend as cbackend;
pub use spy_compiler as compiler;
pub use spy_core as core;
pub use spy_registry as registry;

/// The types most embedders need.
pub mod prelude {
    pub use spy_ast::{AstBuilder, BinaryOp, Expr, FuncDef, Stmt};
    pub use spy_cbackend::{CModuleWriter, LoweringOptions, TypeLowering};
    pub use spy_compiler::{
        CodeObject, CompilationContext, CompilerOptions, FunctionCompiler, Operand, Operator,
        ScopeKind, Symbol, SymbolTable, TypeOracle,
    };
    pub use spy_core::{
        CompilationError, InternalError, QualifiedName, Span, SpyError, TypeError, TypeId, Value,
    };
    pub use spy_registry::SymbolRegistry;
}
