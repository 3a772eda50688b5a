//! Operator and conversion dispatch.
//!
//! This module decides which concrete function implements an operator for a
//! pair of static operand types:
//! - [`MultiMethodTable`] holds exact `(op, left, right)` registrations and
//!   partial registrations keyed by one `dynamic` side
//! - [`TypeHooks`] lets a type override an operator or provide conversions
//! - [`OperatorResolver`] runs the lookup and typechecks the result, adding
//!   argument conversions where needed
//!
//! Resolution happens at compile time, once per use site.

mod builtin;
mod hooks;
mod resolver;
mod table;

pub(crate) use builtin::{operator_qn, register_builtins};
pub use hooks::TypeHooks;
pub use resolver::OperatorResolver;
pub use table::MultiMethodTable;

use std::fmt;

use spy_ast::BinaryOp;
use spy_core::{FuncId, Span, TypeId};

/// Operators that can be dispatched on operand types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Conversion from the left type to the right type.
    Convert,
}

impl Operator {
    /// Source symbol, as used in diagnostics.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Convert => "convert",
        }
    }

    /// Name used for implementation functions, e.g. `i32_add`.
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Add => "add",
            Operator::Sub => "sub",
            Operator::Mul => "mul",
            Operator::Div => "div",
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Convert => "convert",
        }
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, Operator::Eq | Operator::Ne)
    }
}

impl From<BinaryOp> for Operator {
    fn from(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Add => Operator::Add,
            BinaryOp::Sub => Operator::Sub,
            BinaryOp::Mul => Operator::Mul,
            BinaryOp::Div => Operator::Div,
            BinaryOp::Eq => Operator::Eq,
            BinaryOp::NotEq => Operator::Ne,
            BinaryOp::Lt => Operator::Lt,
            BinaryOp::LtE => Operator::Le,
            BinaryOp::Gt => Operator::Gt,
            BinaryOp::GtE => Operator::Ge,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An operand at a use site: its static type and where it appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub ty: TypeId,
    pub span: Span,
}

impl Operand {
    pub fn new(ty: TypeId, span: Span) -> Self {
        Self { ty, span }
    }
}

/// An argument of a resolved implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpArg {
    pub operand: Operand,
    /// Applied to the operand before the call.
    pub converter: Option<FuncId>,
}

/// Result of operator resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpImpl {
    /// No implementation matched.
    Null,
    /// Call `func` with `args`.
    Resolved { func: FuncId, args: Vec<OpArg> },
}

impl OpImpl {
    /// Call `func` with the operands passed through unchanged.
    pub fn simple(func: FuncId, operands: &[Operand]) -> Self {
        OpImpl::Resolved {
            func,
            args: operands
                .iter()
                .map(|&operand| OpArg {
                    operand,
                    converter: None,
                })
                .collect(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, OpImpl::Null)
    }

    pub fn func(&self) -> Option<FuncId> {
        match self {
            OpImpl::Null => None,
            OpImpl::Resolved { func, .. } => Some(*func),
        }
    }

    pub fn args(&self) -> &[OpArg] {
        match self {
            OpImpl::Null => &[],
            OpImpl::Resolved { args, .. } => args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_from_binary_op() {
        for op in BinaryOp::ALL {
            assert_eq!(Operator::from(op).symbol(), op.symbol());
        }
    }

    #[test]
    fn simple_opimpl() {
        let operand = Operand::new(TypeId::new(3), Span::default());
        let opimpl = OpImpl::simple(FuncId::new(0), &[operand, operand]);
        assert_eq!(opimpl.func(), Some(FuncId::new(0)));
        assert_eq!(opimpl.args().len(), 2);
        assert!(opimpl.args().iter().all(|a| a.converter.is_none()));
        assert!(OpImpl::Null.is_null());
        assert!(OpImpl::Null.args().is_empty());
    }
}
