//! Multimethod dispatch table.

use rustc_hash::FxHashMap;

use spy_core::{FuncId, RegistrationError, TypeId};

use super::Operator;

/// Implementations keyed by operator and operand types.
///
/// Exact entries match one `(left, right)` pair. Partial entries match when
/// either operand has the registered type; they back the `dynamic` fallback.
#[derive(Debug, Default)]
pub struct MultiMethodTable {
    exact: FxHashMap<(Operator, TypeId, TypeId), FuncId>,
    partial: FxHashMap<(Operator, TypeId), FuncId>,
}

impl MultiMethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an implementation for an exact type pair.
    pub fn register(
        &mut self,
        op: Operator,
        left: TypeId,
        right: TypeId,
        func: FuncId,
    ) -> Result<(), RegistrationError> {
        if self.exact.contains_key(&(op, left, right)) {
            return Err(RegistrationError::DuplicateOperator(format!(
                "`{op}` ({left:?}, {right:?})"
            )));
        }
        self.exact.insert((op, left, right), func);
        Ok(())
    }

    /// Register an implementation for any pair where one side is `ty`.
    pub fn register_partial(
        &mut self,
        op: Operator,
        ty: TypeId,
        func: FuncId,
    ) -> Result<(), RegistrationError> {
        if self.partial.contains_key(&(op, ty)) {
            return Err(RegistrationError::DuplicateOperator(format!(
                "`{op}` ({ty:?}, *)"
            )));
        }
        self.partial.insert((op, ty), func);
        Ok(())
    }

    pub fn lookup_exact(&self, op: Operator, left: TypeId, right: TypeId) -> Option<FuncId> {
        self.exact.get(&(op, left, right)).copied()
    }

    /// Partial match on the left operand, then the right.
    pub fn lookup_partial(&self, op: Operator, left: TypeId, right: TypeId) -> Option<FuncId> {
        self.partial
            .get(&(op, left))
            .or_else(|| self.partial.get(&(op, right)))
            .copied()
    }

    /// Number of entries, exact and partial.
    pub fn len(&self) -> usize {
        self.exact.len() + self.partial.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
