//! Conversion resolution.
//!
//! Finds the function that turns a value of one static type into another.
//! Conversions are checked in this order:
//!
//! 1. Downcast (the expected type derives from the operand type, which
//!    covers `dynamic`): a generated `operator::from_dynamic[T]` wrapper that
//!    typechecks the value at runtime, created once per destination type
//! 2. A `convert` entry in the dispatch table
//! 3. The operand type's `convert_to` hook
//! 4. The expected type's `convert_from` hook
//!
//! Anything else is a "mismatched types" error at the operand.

use tracing::{debug, trace};

use spy_core::{
    Color, CompilationError, FuncId, FuncParam, FunctionKind, InternalError, QualifiedName,
    Segment, TypeError, TypeId,
};

use crate::context::CompilationContext;
use crate::operators::{Operand, Operator};

/// Conversion of `operand` to `expected`.
///
/// The operand must not already be a subtype of `expected`; use
/// [`convert_maybe`] when that is not known.
pub fn convert(
    ctx: &mut CompilationContext,
    expected: TypeId,
    operand: Operand,
) -> Result<FuncId, CompilationError> {
    let got = operand.ty;
    if ctx.registry.is_subtype(got, expected) {
        return Err(InternalError::PreconditionViolated(format!(
            "`{}` needs no conversion to `{}`",
            ctx.registry.human_name(got)?,
            ctx.registry.human_name(expected)?
        ))
        .into());
    }
    if let Some(func) = find_converter(ctx, expected, operand)? {
        return Ok(func);
    }
    Err(TypeError::mismatched_types(
        &ctx.registry.human_name(expected)?,
        &ctx.registry.human_name(got)?,
        operand.span,
    )
    .into())
}

/// Like [`convert`], but `None` when the operand is already assignable.
pub fn convert_maybe(
    ctx: &mut CompilationContext,
    expected: TypeId,
    operand: Operand,
) -> Result<Option<FuncId>, CompilationError> {
    if ctx.registry.is_subtype(operand.ty, expected) {
        return Ok(None);
    }
    convert(ctx, expected, operand).map(Some)
}

fn find_converter(
    ctx: &mut CompilationContext,
    expected: TypeId,
    operand: Operand,
) -> Result<Option<FuncId>, CompilationError> {
    let got = operand.ty;
    if ctx.registry.is_subtype(expected, got) {
        return from_dynamic(ctx, expected).map(Some);
    }

    if let Some(func) = ctx.operators.lookup_exact(Operator::Convert, got, expected) {
        trace!(?got, ?expected, ?func, "conversion from table");
        return Ok(Some(func));
    }

    if let Some(hooks) = ctx.hooks.get(&got) {
        if let Some(func) = hooks.convert_to(&mut ctx.registry, expected, &operand) {
            trace!(?got, ?expected, ?func, "conversion from source type");
            return Ok(Some(func));
        }
    }
    if let Some(hooks) = ctx.hooks.get(&expected) {
        if let Some(func) = hooks.convert_from(&mut ctx.registry, got, &operand) {
            trace!(?got, ?expected, ?func, "conversion from destination type");
            return Ok(Some(func));
        }
    }
    Ok(None)
}

/// `operator::from_dynamic[T]`, registered on first use.
///
/// The wrapper has type `def(obj: dynamic) -> T`. It checks the runtime type
/// and returns the value unchanged.
pub fn from_dynamic(ctx: &mut CompilationContext, ty: TypeId) -> Result<FuncId, CompilationError> {
    if let Some(&func) = ctx.from_dynamic.get(&ty) {
        return Ok(func);
    }
    let dynamic = ctx.registry.builtins().dynamic;
    let qn = QualifiedName::new([
        Segment::new("operator"),
        Segment::with_qualifiers("from_dynamic", vec![ctx.registry.qn_of(ty)?.clone()]),
    ]);
    let func_type = ctx
        .registry
        .function_type(vec![FuncParam::new("obj", dynamic)], ty, Color::Red)
        .map_err(InternalError::from)?;
    let func = match ctx.registry.lookup_function(&qn) {
        Some(func) => func,
        None => {
            debug!(qn = %qn, "generated conversion wrapper");
            ctx.registry
                .add_function(qn, func_type, FunctionKind::Generated)
                .map_err(InternalError::from)?
        }
    };
    ctx.from_dynamic.insert(ty, func);
    Ok(func)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::TypeHooks;
    use spy_core::{Level, Span};
    use spy_registry::SymbolRegistry;

    fn operand(ty: TypeId) -> Operand {
        Operand::new(ty, Span::on_line(3, 8, 1))
    }

    fn qn_of(ctx: &CompilationContext, func: FuncId) -> String {
        ctx.registry().function_entry(func).unwrap().qn.to_string()
    }

    #[test]
    fn table_conversion() {
        let mut ctx = CompilationContext::new().unwrap();
        let b = *ctx.registry().builtins();
        let func = ctx.convert(b.f64, operand(b.i32)).unwrap();
        assert_eq!(qn_of(&ctx, func), "operator::i32_to_f64");
        let func = ctx.convert(b.bool, operand(b.i32)).unwrap();
        assert_eq!(qn_of(&ctx, func), "operator::i32_to_bool");
    }

    #[test]
    fn downcast_uses_from_dynamic() {
        let mut ctx = CompilationContext::new().unwrap();
        let b = *ctx.registry().builtins();
        let func = ctx.convert(b.i32, operand(b.object)).unwrap();
        assert_eq!(qn_of(&ctx, func), "operator::from_dynamic[builtins::i32]");
        let entry = ctx.registry().function_entry(func).unwrap();
        assert_eq!(entry.kind, FunctionKind::Generated);
        assert_eq!(
            ctx.registry().human_name(entry.func_type).unwrap(),
            "def(dynamic) -> i32"
        );
    }

    #[test]
    fn from_dynamic_is_memoized() {
        let mut ctx = CompilationContext::new().unwrap();
        let b = *ctx.registry().builtins();
        let first = ctx.convert(b.str, operand(b.dynamic)).unwrap();
        let count = ctx.registry().function_count();
        let second = ctx.convert(b.str, operand(b.object)).unwrap();
        assert_eq!(first, second);
        assert_eq!(ctx.registry().function_count(), count);
    }

    #[test]
    fn mismatched_types() {
        let mut ctx = CompilationContext::new().unwrap();
        let b = *ctx.registry().builtins();
        let err = ctx.convert(b.i32, operand(b.str)).unwrap_err();
        let CompilationError::Type(err) = err else {
            panic!("expected a type error, got {err:?}");
        };
        assert_eq!(err.message, "mismatched types");
        assert_eq!(err.annotations[0].level, Level::Error);
        assert_eq!(err.annotations[0].message, "expected `i32`, got `str`");
        assert_eq!(err.span(), Some(Span::on_line(3, 8, 1)));
    }

    #[test]
    fn no_conversion_needed() {
        let mut ctx = CompilationContext::new().unwrap();
        let b = *ctx.registry().builtins();
        assert_eq!(ctx.convert_maybe(b.object, operand(b.i32)), Ok(None));
        assert_eq!(ctx.convert_maybe(b.dynamic, operand(b.str)), Ok(None));
        let err = ctx.convert(b.object, operand(b.i32)).unwrap_err();
        assert!(err.is_internal());
    }

    struct Celsius {
        to_f64: FuncId,
        from_i32: FuncId,
    }

    impl TypeHooks for Celsius {
        fn convert_to(
            &self,
            _registry: &mut SymbolRegistry,
            _expected: TypeId,
            _operand: &Operand,
        ) -> Option<FuncId> {
            Some(self.to_f64)
        }

        fn convert_from(
            &self,
            _registry: &mut SymbolRegistry,
            _got: TypeId,
            _operand: &Operand,
        ) -> Option<FuncId> {
            Some(self.from_i32)
        }
    }

    #[test]
    fn hooks_prefer_source_type() {
        let mut ctx = CompilationContext::new().unwrap();
        let b = *ctx.registry().builtins();
        let celsius = ctx
            .registry_mut()
            .lifted_type("temp::Celsius".parse().unwrap(), b.f64)
            .unwrap();
        let kelvin = ctx
            .registry_mut()
            .lifted_type("temp::Kelvin".parse().unwrap(), b.f64)
            .unwrap();
        let to_f64 = ctx.registry().lookup_function(&"operator::i32_to_f64".parse().unwrap()).unwrap();
        let from_i32 = ctx.registry().lookup_function(&"operator::i32_to_bool".parse().unwrap()).unwrap();
        ctx.register_hooks(celsius, Celsius { to_f64, from_i32 });

        // celsius -> kelvin: the source hook wins
        assert_eq!(ctx.convert(kelvin, operand(celsius)), Ok(to_f64));
        // i32 -> celsius: only the destination hook applies
        assert_eq!(ctx.convert(celsius, operand(b.i32)), Ok(from_i32));
    }
}
