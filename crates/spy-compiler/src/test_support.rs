//! Symbol tables and type oracles for unit tests.

use rustc_hash::FxHashMap;

use spy_ast::{Expr, Literal};
use spy_core::{TypeId, Value};
use spy_registry::SymbolRegistry;

use crate::scope::{ScopeKind, Symbol, SymbolTable, TypeOracle};

/// Map-backed scope.
#[derive(Debug, Default)]
pub(crate) struct Env {
    symbols: FxHashMap<String, Symbol>,
    order: Vec<String>,
    consts: FxHashMap<String, Value>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local(mut self, name: &str, ty: TypeId) -> Self {
        self.insert(name, Symbol::local(ty));
        self
    }

    pub fn global(mut self, name: &str, ty: TypeId) -> Self {
        self.insert(name, Symbol::global(ty));
        self
    }

    pub fn non_local(mut self, name: &str, ty: TypeId) -> Self {
        self.insert(name, Symbol::non_local(ty));
        self
    }

    /// A constant global bound to a function.
    pub fn function(mut self, name: &str, ty: TypeId, qn: &str) -> Self {
        self.insert(name, Symbol::constant(ty));
        self.consts
            .insert(name.to_string(), Value::Func(qn.parse().unwrap()));
        self
    }

    fn insert(&mut self, name: &str, symbol: Symbol) {
        if self.symbols.insert(name.to_string(), symbol).is_none() {
            self.order.push(name.to_string());
        }
    }
}

impl SymbolTable for Env {
    fn resolve(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name).copied()
    }

    fn locals(&self) -> Vec<(String, TypeId)> {
        self.order
            .iter()
            .filter_map(|name| {
                let sym = self.symbols.get(name)?;
                (sym.scope == ScopeKind::Local).then(|| (name.clone(), sym.ty))
            })
            .collect()
    }
}

/// Types from literals, symbols and function signatures.
pub(crate) struct Oracle<'e> {
    pub env: &'e Env,
    pub registry: &'e SymbolRegistry,
}

impl TypeOracle for Oracle<'_> {
    fn type_of(&self, expr: &Expr<'_>) -> Option<TypeId> {
        let b = self.registry.builtins();
        match expr {
            Expr::Constant(c) => Some(match c.value {
                Literal::None => b.void,
                Literal::I32(_) => b.i32,
                Literal::F64(_) => b.f64,
                Literal::Bool(_) => b.bool,
                Literal::Str(_) => b.str,
            }),
            Expr::Name(n) => self.env.resolve(n.id).map(|s| s.ty),
            Expr::BinOp(binop) => {
                if binop.op.is_comparison() {
                    return Some(b.bool);
                }
                let left = self.type_of(binop.left)?;
                let right = self.type_of(binop.right)?;
                Some(if left == right { left } else { b.f64 })
            }
            Expr::Call(call) => {
                let callee = self.env.resolve(call.func.as_name()?)?;
                Some(self.registry.function_shape(callee.ty).ok()?.ret)
            }
        }
    }

    fn const_value_of(&self, expr: &Expr<'_>) -> Option<Value> {
        match expr {
            Expr::Constant(c) => Some(c.value.to_value()),
            Expr::Name(n) => self.env.consts.get(n.id).cloned(),
            _ => None,
        }
    }
}
