//! Operator resolution.
//!
//! ## Lookup order
//!
//! ```text
//! 1. exact (op, left, right) entry
//! 2. override hook of the left type, then of the right type
//! 3. == / != only: identity comparison when the nearest common ancestor
//!    is a reference type other than `object`
//! 4. partial entry matching either side (the `dynamic` fallback)
//! 5. nothing: OpImpl::Null
//! ```
//!
//! Every match is typechecked against the operands. Arguments that are not
//! assignable to the parameter type get a converter; when no conversion
//! exists the match fails with the operator's type error.

use tracing::trace;

use spy_core::{CompilationError, InternalError, Level, TypeError, TypeId};

use crate::context::CompilationContext;
use crate::conversion;

use super::{OpImpl, Operand, Operator, operator_qn};

/// Resolves operators against a compilation context.
pub struct OperatorResolver<'a> {
    ctx: &'a mut CompilationContext,
}

impl<'a> OperatorResolver<'a> {
    pub fn new(ctx: &'a mut CompilationContext) -> Self {
        Self { ctx }
    }

    /// Resolve `left op right`, failing with a type error on no match.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve(
        &mut self,
        op: Operator,
        left: Operand,
        right: Operand,
    ) -> Result<OpImpl, CompilationError> {
        let opimpl = self.lookup(op, left, right)?;
        if opimpl.is_null() {
            return Err(self.no_operator(op, &[left, right])?.into());
        }
        Ok(opimpl)
    }

    /// Find an implementation; `OpImpl::Null` when nothing matches.
    pub fn lookup(
        &mut self,
        op: Operator,
        left: Operand,
        right: Operand,
    ) -> Result<OpImpl, CompilationError> {
        let operands = [left, right];

        if let Some(func) = self.ctx.operators.lookup_exact(op, left.ty, right.ty) {
            trace!(%op, ?func, "exact match");
            return self.typecheck_opimpl(op, OpImpl::simple(func, &operands), &operands);
        }

        if let Some(opimpl) = self.find_override(op, &left, &right) {
            trace!(%op, func = ?opimpl.func(), "type override");
            return self.typecheck_opimpl(op, opimpl, &operands);
        }

        if op.is_equality() && self.can_use_identity(left.ty, right.ty) {
            let name = if op == Operator::Eq {
                "object_is"
            } else {
                "object_isnot"
            };
            let qn = operator_qn(name);
            let func = self
                .ctx
                .registry
                .lookup_function(&qn)
                .ok_or_else(|| InternalError::UnknownSymbol(qn.to_string()))?;
            trace!(%op, "identity comparison");
            return self.typecheck_opimpl(op, OpImpl::simple(func, &operands), &operands);
        }

        if let Some(func) = self.ctx.operators.lookup_partial(op, left.ty, right.ty) {
            trace!(%op, ?func, "partial match");
            return self.typecheck_opimpl(op, OpImpl::simple(func, &operands), &operands);
        }

        trace!(%op, ?left, ?right, "no match");
        Ok(OpImpl::Null)
    }

    fn find_override(&mut self, op: Operator, left: &Operand, right: &Operand) -> Option<OpImpl> {
        let mut sides = vec![left.ty];
        if right.ty != left.ty {
            sides.push(right.ty);
        }
        for ty in sides {
            if let Some(hooks) = self.ctx.hooks.get(&ty) {
                if let Some(opimpl) = hooks.binary_op(&mut self.ctx.registry, op, left, right) {
                    return Some(opimpl);
                }
            }
        }
        None
    }

    /// Identity comparison applies below the root, for reference types.
    fn can_use_identity(&self, left: TypeId, right: TypeId) -> bool {
        let registry = &self.ctx.registry;
        match registry.common_ancestor(left, right) {
            Some(common) => common != registry.builtins().object && registry.is_reference(common),
            None => false,
        }
    }

    /// Check arity and argument types, adding converters where needed.
    pub fn typecheck_opimpl(
        &mut self,
        op: Operator,
        opimpl: OpImpl,
        operands: &[Operand],
    ) -> Result<OpImpl, CompilationError> {
        let OpImpl::Resolved { func, mut args } = opimpl else {
            return Ok(OpImpl::Null);
        };
        let params: Vec<TypeId> = self
            .ctx
            .registry
            .signature(func)?
            .params
            .iter()
            .map(|p| p.ty)
            .collect();

        if params.len() != args.len() {
            let name = self.ctx.registry.function_entry(func)?.qn.human_name();
            let span = operands.first().map(|o| o.span).unwrap_or_default();
            let err = self.no_operator(op, operands)?.with(
                Level::Note,
                format!(
                    "`{name}` takes {} argument(s) but {} were supplied",
                    params.len(),
                    args.len()
                ),
                span,
            );
            return Err(err.into());
        }

        for (arg, &param) in args.iter_mut().zip(&params) {
            if arg.converter.is_some() {
                continue;
            }
            match conversion::convert_maybe(self.ctx, param, arg.operand) {
                Ok(converter) => arg.converter = converter,
                Err(CompilationError::Type(_)) => {
                    return Err(self.no_operator(op, operands)?.into());
                }
                Err(err) => return Err(err),
            }
        }
        Ok(OpImpl::Resolved { func, args })
    }

    fn no_operator(&self, op: Operator, operands: &[Operand]) -> Result<TypeError, InternalError> {
        let registry = &self.ctx.registry;
        let [left, right] = operands else {
            return Err(InternalError::PreconditionViolated(format!(
                "`{op}` takes two operands, got {}",
                operands.len()
            )));
        };
        let left_name = registry.human_name(left.ty)?;
        let right_name = registry.human_name(right.ty)?;
        Ok(TypeError::no_operator(
            op.symbol(),
            (&left_name, left.span),
            (&right_name, right.span),
        ))
    }
}
