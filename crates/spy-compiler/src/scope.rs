//! Queries answered by the type-checking pass.
//!
//! The compiler does not resolve names or infer types itself. It asks a
//! [`SymbolTable`] where a name lives and a [`TypeOracle`] for the static
//! type and constant value of expressions.

use spy_ast::Expr;
use spy_core::{TypeId, Value};

/// Where a name is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// A local of the function being compiled.
    Local,
    /// A module-level global.
    Global,
    /// Captured from an enclosing function.
    NonLocal,
}

/// Resolution of a name in the current scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub scope: ScopeKind,
    pub ty: TypeId,
    /// Bound to a compile-time constant.
    pub is_const: bool,
}

impl Symbol {
    pub fn local(ty: TypeId) -> Self {
        Self {
            scope: ScopeKind::Local,
            ty,
            is_const: false,
        }
    }

    pub fn global(ty: TypeId) -> Self {
        Self {
            scope: ScopeKind::Global,
            ty,
            is_const: false,
        }
    }

    /// A global bound to a compile-time constant, such as a function.
    pub fn constant(ty: TypeId) -> Self {
        Self {
            scope: ScopeKind::Global,
            ty,
            is_const: true,
        }
    }

    pub fn non_local(ty: TypeId) -> Self {
        Self {
            scope: ScopeKind::NonLocal,
            ty,
            is_const: false,
        }
    }
}

/// Per-function symbol table.
pub trait SymbolTable {
    /// Resolve a name visible in the function body.
    fn resolve(&self, name: &str) -> Option<Symbol>;

    /// Locals of the function, parameters first.
    fn locals(&self) -> Vec<(String, TypeId)>;
}

/// Static facts about expressions.
pub trait TypeOracle {
    /// Static type of an expression.
    fn type_of(&self, expr: &Expr<'_>) -> Option<TypeId>;

    /// Value of a compile-time constant expression.
    fn const_value_of(&self, expr: &Expr<'_>) -> Option<Value>;
}
