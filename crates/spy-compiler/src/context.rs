//! CompilationContext - state shared by every unit of one compilation run.
//!
//! The context owns the [`SymbolRegistry`], the operator dispatch table, the
//! per-type [`TypeHooks`] and the memoized conversion wrappers. It is created
//! once per run and passed by reference; nothing here is global, so separate
//! compilations (and tests) never share state.

use rustc_hash::FxHashMap;

use spy_core::{CompilationError, FuncId, RegistrationError, TypeId};
use spy_registry::SymbolRegistry;

use crate::conversion;
use crate::operators::{
    self, MultiMethodTable, OpImpl, Operand, Operator, OperatorResolver, TypeHooks,
};
use crate::options::CompilerOptions;

/// Unified compilation context.
pub struct CompilationContext {
    pub(crate) registry: SymbolRegistry,
    pub(crate) operators: MultiMethodTable,
    pub(crate) hooks: FxHashMap<TypeId, Box<dyn TypeHooks>>,
    /// `operator::from_dynamic[T]` per destination type.
    pub(crate) from_dynamic: FxHashMap<TypeId, FuncId>,
    options: CompilerOptions,
}

impl CompilationContext {
    /// Create a context with the builtin types and operators registered.
    pub fn new() -> Result<Self, RegistrationError> {
        Self::with_options(CompilerOptions::default())
    }

    pub fn with_options(options: CompilerOptions) -> Result<Self, RegistrationError> {
        let mut registry = SymbolRegistry::new();
        let mut table = MultiMethodTable::new();
        operators::register_builtins(&mut registry, &mut table)?;
        Ok(Self {
            registry,
            operators: table,
            hooks: FxHashMap::default(),
            from_dynamic: FxHashMap::default(),
            options,
        })
    }

    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SymbolRegistry {
        &mut self.registry
    }

    pub fn operators(&self) -> &MultiMethodTable {
        &self.operators
    }

    /// Dispatch table, for registering additional implementations.
    pub fn operators_mut(&mut self) -> &mut MultiMethodTable {
        &mut self.operators
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Attach overrides and conversions to a type, replacing earlier hooks.
    pub fn register_hooks(&mut self, ty: TypeId, hooks: impl TypeHooks + 'static) {
        self.hooks.insert(ty, Box::new(hooks));
    }

    pub fn resolver(&mut self) -> OperatorResolver<'_> {
        OperatorResolver::new(self)
    }

    /// Resolve `left op right`; fails with a type error when nothing matches.
    pub fn resolve_operator(
        &mut self,
        op: Operator,
        left: Operand,
        right: Operand,
    ) -> Result<OpImpl, CompilationError> {
        self.resolver().resolve(op, left, right)
    }

    /// Conversion of `operand` to `expected`; see [`conversion::convert`].
    pub fn convert(
        &mut self,
        expected: TypeId,
        operand: Operand,
    ) -> Result<FuncId, CompilationError> {
        conversion::convert(self, expected, operand)
    }

    /// Like [`convert`](Self::convert), but `None` when no conversion is needed.
    pub fn convert_maybe(
        &mut self,
        expected: TypeId,
        operand: Operand,
    ) -> Result<Option<FuncId>, CompilationError> {
        conversion::convert_maybe(self, expected, operand)
    }
}
