//! Builtin operator and conversion implementations.
//!
//! Every implementation is registered as a function `operator::<name>` and
//! entered into the dispatch table:
//!
//! ```text
//! i32 x i32        + - * / == != < <= > >=   operator::i32_<op>
//! f64 x f64        + - * / == != < <= > >=   operator::f64_<op>
//! i32 x f64        (both orders)             operator::f64_<op>
//! str x str        + == !=                   operator::str_<op>
//! str x i32        *                         operator::str_mul
//! dynamic x *      + * == != < <= > >=       operator::dynamic_<op>
//! convert          i32 -> f64, i32 -> bool
//! ```
//!
//! `operator::object_is` and `operator::object_isnot` are registered as
//! functions only; the resolver picks them for identity comparison.

use spy_core::{
    Color, FuncId, FuncParam, FunctionKind, QualifiedName, RegistrationError, TypeId,
};
use spy_registry::SymbolRegistry;

use super::{MultiMethodTable, Operator};

const ARITHMETIC: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

const COMPARISON: [Operator; 6] = [
    Operator::Eq,
    Operator::Ne,
    Operator::Lt,
    Operator::Le,
    Operator::Gt,
    Operator::Ge,
];

const DYNAMIC: [Operator; 8] = [
    Operator::Add,
    Operator::Mul,
    Operator::Eq,
    Operator::Ne,
    Operator::Lt,
    Operator::Le,
    Operator::Gt,
    Operator::Ge,
];

/// Qualified name of a builtin implementation.
pub(crate) fn operator_qn(name: &str) -> QualifiedName {
    QualifiedName::new(["operator", name])
}

fn add_impl(
    registry: &mut SymbolRegistry,
    name: &str,
    params: &[(&str, TypeId)],
    ret: TypeId,
) -> Result<FuncId, RegistrationError> {
    let params = params
        .iter()
        .map(|&(pname, ty)| FuncParam::new(pname, ty))
        .collect();
    let func_type = registry.function_type(params, ret, Color::Red)?;
    registry.add_function(operator_qn(name), func_type, FunctionKind::Builtin)
}

fn add_binary(
    registry: &mut SymbolRegistry,
    name: &str,
    left: TypeId,
    right: TypeId,
    ret: TypeId,
) -> Result<FuncId, RegistrationError> {
    add_impl(registry, name, &[("l", left), ("r", right)], ret)
}

/// Register the builtin implementations and their table entries.
pub(crate) fn register_builtins(
    registry: &mut SymbolRegistry,
    table: &mut MultiMethodTable,
) -> Result<(), RegistrationError> {
    let b = *registry.builtins();

    // numeric families, with mixed i32/f64 promoted to f64
    for (prefix, ty) in [("i32", b.i32), ("f64", b.f64)] {
        for op in ARITHMETIC.into_iter().chain(COMPARISON) {
            let ret = if COMPARISON.contains(&op) { b.bool } else { ty };
            let name = format!("{prefix}_{}", op.name());
            let func = add_binary(registry, &name, ty, ty, ret)?;
            table.register(op, ty, ty, func)?;
            if ty == b.f64 {
                table.register(op, b.f64, b.i32, func)?;
                table.register(op, b.i32, b.f64, func)?;
            }
        }
    }

    let str_add = add_binary(registry, "str_add", b.str, b.str, b.str)?;
    table.register(Operator::Add, b.str, b.str, str_add)?;
    let str_mul = add_binary(registry, "str_mul", b.str, b.i32, b.str)?;
    table.register(Operator::Mul, b.str, b.i32, str_mul)?;
    let str_eq = add_binary(registry, "str_eq", b.str, b.str, b.bool)?;
    table.register(Operator::Eq, b.str, b.str, str_eq)?;
    let str_ne = add_binary(registry, "str_ne", b.str, b.str, b.bool)?;
    table.register(Operator::Ne, b.str, b.str, str_ne)?;

    for op in DYNAMIC {
        let name = format!("dynamic_{}", op.name());
        let func = add_binary(registry, &name, b.dynamic, b.dynamic, b.dynamic)?;
        table.register_partial(op, b.dynamic, func)?;
    }

    add_binary(registry, "object_is", b.object, b.object, b.bool)?;
    add_binary(registry, "object_isnot", b.object, b.object, b.bool)?;

    let to_f64 = add_impl(registry, "i32_to_f64", &[("x", b.i32)], b.f64)?;
    table.register(Operator::Convert, b.i32, b.f64, to_f64)?;
    let to_bool = add_impl(registry, "i32_to_bool", &[("x", b.i32)], b.bool)?;
    table.register(Operator::Convert, b.i32, b.bool, to_bool)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (SymbolRegistry, MultiMethodTable) {
        let mut registry = SymbolRegistry::new();
        let mut table = MultiMethodTable::new();
        register_builtins(&mut registry, &mut table).unwrap();
        (registry, table)
    }

    fn qn_of(registry: &SymbolRegistry, func: Option<FuncId>) -> String {
        let func = func.expect("no implementation");
        registry.function_entry(func).unwrap().qn.to_string()
    }

    #[test]
    fn i32_family() {
        let (registry, table) = setup();
        let b = *registry.builtins();
        let add = table.lookup_exact(Operator::Add, b.i32, b.i32);
        assert_eq!(qn_of(&registry, add), "operator::i32_add");
        let lt = table.lookup_exact(Operator::Lt, b.i32, b.i32);
        assert_eq!(qn_of(&registry, lt), "operator::i32_lt");
        let sig = registry.signature(lt.unwrap()).unwrap();
        assert_eq!(sig.ret, b.bool);
        assert_eq!(sig.params[0].name, "l");
    }

    #[test]
    fn mixed_numeric_uses_f64() {
        let (registry, table) = setup();
        let b = *registry.builtins();
        for op in ARITHMETIC.into_iter().chain(COMPARISON) {
            let expected = format!("operator::f64_{}", op.name());
            assert_eq!(qn_of(&registry, table.lookup_exact(op, b.i32, b.f64)), expected);
            assert_eq!(qn_of(&registry, table.lookup_exact(op, b.f64, b.i32)), expected);
        }
    }

    #[test]
    fn str_entries() {
        let (registry, table) = setup();
        let b = *registry.builtins();
        assert_eq!(
            qn_of(&registry, table.lookup_exact(Operator::Mul, b.str, b.i32)),
            "operator::str_mul"
        );
        assert_eq!(table.lookup_exact(Operator::Sub, b.str, b.str), None);
    }

    #[test]
    fn dynamic_partials() {
        let (registry, table) = setup();
        let b = *registry.builtins();
        assert_eq!(
            qn_of(&registry, table.lookup_partial(Operator::Add, b.i32, b.dynamic)),
            "operator::dynamic_add"
        );
        assert_eq!(table.lookup_partial(Operator::Sub, b.dynamic, b.i32), None);
    }

    #[test]
    fn conversions() {
        let (registry, table) = setup();
        let b = *registry.builtins();
        assert_eq!(
            qn_of(&registry, table.lookup_exact(Operator::Convert, b.i32, b.f64)),
            "operator::i32_to_f64"
        );
        assert_eq!(table.lookup_exact(Operator::Convert, b.f64, b.i32), None);
        assert!(registry.lookup_function(&operator_qn("object_is")).is_some());
    }
}
