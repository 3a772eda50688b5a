//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use spy::ast::{Expr, Literal};
use spy::compiler::{ScopeKind, Symbol, SymbolTable, TypeOracle};
use spy::core::{QualifiedName, TypeId, Value};
use spy::registry::SymbolRegistry;

/// Map-backed function scope.
#[derive(Debug, Default)]
pub struct Scope {
    symbols: HashMap<String, Symbol>,
    order: Vec<String>,
    consts: HashMap<String, Value>,
}

impl Scope {
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

    /// A module-level constant bound to the function `qn`.
    pub fn function(mut self, name: &str, func_type: TypeId, qn: &str) -> Self {
        self.insert(name, Symbol::constant(func_type));
        self.consts
            .insert(name.to_string(), Value::Func(parse_qn(qn)));
        self
    }

    fn insert(&mut self, name: &str, symbol: Symbol) {
        if self.symbols.insert(name.to_string(), symbol).is_none() {
            self.order.push(name.to_string());
        }
    }
}

impl SymbolTable for Scope {
    fn resolve(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name).copied()
    }

    fn locals(&self) -> Vec<(String, TypeId)> {
        self.order
            .iter()
            .filter_map(|name| {
                let symbol = self.symbols.get(name)?;
                (symbol.scope == ScopeKind::Local).then(|| (name.clone(), symbol.ty))
            })
            .collect()
    }
}

/// Computes static types from the shape of expressions.
pub struct StructuralOracle<'a> {
    pub scope: &'a Scope,
    pub registry: &'a SymbolRegistry,
}

impl<'a> StructuralOracle<'a> {
    pub fn new(scope: &'a Scope, registry: &'a SymbolRegistry) -> Self {
        Self { scope, registry }
    }
}

impl TypeOracle for StructuralOracle<'_> {
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
            Expr::Name(name) => self.scope.resolve(name.id).map(|s| s.ty),
            Expr::BinOp(binop) if binop.op.is_comparison() => Some(b.bool),
            Expr::BinOp(binop) => {
                let left = self.type_of(binop.left)?;
                let right = self.type_of(binop.right)?;
                Some(if left == right { left } else { b.f64 })
            }
            Expr::Call(call) => {
                let callee = self.scope.resolve(call.func.as_name()?)?;
                Some(self.registry.function_shape(callee.ty).ok()?.ret)
            }
        }
    }

    fn const_value_of(&self, expr: &Expr<'_>) -> Option<Value> {
        match expr {
            Expr::Constant(c) => Some(c.value.to_value()),
            Expr::Name(name) => self.scope.consts.get(name.id).cloned(),
            _ => None,
        }
    }
}

pub fn parse_qn(text: &str) -> QualifiedName {
    text.parse()
        .unwrap_or_else(|e| panic!("invalid qualified name {text:?}: {e}"))
}
