//! Per-type extension points for dispatch.

use spy_core::{FuncId, TypeId};
use spy_registry::SymbolRegistry;

use super::{OpImpl, Operand, Operator};

/// Operator overrides and conversions provided by a type.
///
/// Hooks are registered per type on the
/// [`CompilationContext`](crate::CompilationContext). Every method defaults
/// to "not provided". Overrides may register generated functions in the
/// registry; the resolver typechecks whatever they return.
pub trait TypeHooks {
    /// Override `op` for operands where this type is the left or right side.
    fn binary_op(
        &self,
        _registry: &mut SymbolRegistry,
        _op: Operator,
        _left: &Operand,
        _right: &Operand,
    ) -> Option<OpImpl> {
        None
    }

    /// Convert an operand of this type to `expected`.
    fn convert_to(
        &self,
        _registry: &mut SymbolRegistry,
        _expected: TypeId,
        _operand: &Operand,
    ) -> Option<FuncId> {
        None
    }

    /// Convert an operand of type `got` to this type.
    fn convert_from(
        &self,
        _registry: &mut SymbolRegistry,
        _got: TypeId,
        _operand: &Operand,
    ) -> Option<FuncId> {
        None
    }
}
