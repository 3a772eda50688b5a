//! Instructions and their operands.

use std::fmt;

use spy_core::{InternalError, QualifiedName, Span, Value};

use super::opcode::{ArgKind, OpCode};

/// An instruction operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arg {
    Const(Value),
    Name(String),
    Func(QualifiedName),
    Count(usize),
    /// Instruction index; `None` until patched.
    Target(Option<usize>),
    Message(String),
}

impl Arg {
    pub fn kind(&self) -> ArgKind {
        match self {
            Arg::Const(_) => ArgKind::Const,
            Arg::Name(_) => ArgKind::Name,
            Arg::Func(_) => ArgKind::Func,
            Arg::Count(_) => ArgKind::Count,
            Arg::Target(_) => ArgKind::Target,
            Arg::Message(_) => ArgKind::Message,
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Arg::Name(name.into())
    }

    pub fn message(text: impl Into<String>) -> Self {
        Arg::Message(text.into())
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Const(v) => write!(f, "{v}"),
            Arg::Name(n) => f.write_str(n),
            Arg::Func(qn) => write!(f, "{qn}"),
            Arg::Count(n) => write!(f, "{n}"),
            Arg::Target(Some(t)) => write!(f, "@{t}"),
            Arg::Target(None) => f.write_str("@?"),
            Arg::Message(m) => write!(f, "{m:?}"),
        }
    }
}

/// One step of a lowered function body.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub op: OpCode,
    pub args: Vec<Arg>,
    /// Source location of the statement or expression that produced it.
    pub span: Span,
}

impl Instruction {
    /// Build an instruction, checking operands against the opcode.
    pub fn new(op: OpCode, args: Vec<Arg>, span: Span) -> Result<Self, InternalError> {
        check_operands(op, &args)?;
        Ok(Self { op, args, span })
    }

    /// Targets carried by this instruction, in operand order.
    pub fn targets(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.args.iter().filter_map(|arg| match arg {
            Arg::Target(t) => Some(*t),
            _ => None,
        })
    }

    /// Branch target, for `br` and `br_if_not`.
    pub fn branch_target(&self) -> Option<usize> {
        if !self.op.is_branch() {
            return None;
        }
        self.targets().next().flatten()
    }

    /// `name arg0, arg1`: the opcode and its comma-joined operands.
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            return self.op.name().to_string();
        }
        let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
        format!("{} {}", self.op.name(), args.join(", "))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

pub(crate) fn check_operands(op: OpCode, args: &[Arg]) -> Result<(), InternalError> {
    let expected = op.operands();
    if expected.len() != args.len() {
        return Err(InternalError::InvalidArity {
            op: op.name(),
            expected: expected.len(),
            got: args.len(),
        });
    }
    for (position, (kind, arg)) in expected.iter().zip(args).enumerate() {
        if arg.kind() != *kind {
            return Err(InternalError::InvalidOperand {
                op: op.name(),
                position,
                operand: format!("{:?}", arg.kind()),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_without_args() {
        let instr = Instruction::new(OpCode::Return, vec![], Span::default()).unwrap();
        assert_eq!(instr.render(), "return");
    }

    #[test]
    fn render_joins_args() {
        let call = Instruction::new(
            OpCode::CallGlobal,
            vec![Arg::Func("test::foo".parse().unwrap()), Arg::Count(2)],
            Span::default(),
        )
        .unwrap();
        assert_eq!(call.render(), "call_global test::foo, 2");

        let abort = Instruction::new(
            OpCode::Abort,
            vec![Arg::message("boom")],
            Span::default(),
        )
        .unwrap();
        assert_eq!(abort.render(), "abort \"boom\"");
    }

    #[test]
    fn targets_are_distinguishable() {
        let br = Instruction::new(OpCode::Br, vec![Arg::Target(Some(3))], Span::default()).unwrap();
        assert_eq!(br.render(), "br @3");
        assert_eq!(br.branch_target(), Some(3));
        let pending =
            Instruction::new(OpCode::BrIfNot, vec![Arg::Target(None)], Span::default()).unwrap();
        assert_eq!(pending.render(), "br_if_not @?");
        assert_eq!(pending.branch_target(), None);
    }

    #[test]
    fn wrong_arity() {
        let err = Instruction::new(OpCode::I32Add, vec![Arg::Count(1)], Span::default())
            .unwrap_err();
        assert_eq!(
            err,
            InternalError::InvalidArity {
                op: "i32_add",
                expected: 0,
                got: 1
            }
        );
    }

    #[test]
    fn wrong_operand_kind() {
        let err = Instruction::new(OpCode::LoadLocal, vec![Arg::Count(1)], Span::default())
            .unwrap_err();
        assert!(matches!(err, InternalError::InvalidOperand { position: 0, .. }));
    }
}
