//! Lowered function bodies.

use std::fmt::Write;

use spy_core::{InternalError, QualifiedName, TypeId};
use spy_registry::SymbolRegistry;

use super::instruction::Instruction;

/// A function body lowered to a flat instruction sequence.
///
/// Built once by the compiler and never mutated after compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeObject {
    pub qn: QualifiedName,
    /// Function type of the compiled function.
    pub func_type: TypeId,
    /// Local variables in declaration order; parameters come first.
    pub locals: Vec<(String, TypeId)>,
    pub body: Vec<Instruction>,
}

impl CodeObject {
    pub fn new(qn: QualifiedName, func_type: TypeId) -> Self {
        Self {
            qn,
            func_type,
            locals: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Declare a local variable. Each name may be declared once.
    pub fn declare_local(&mut self, name: impl Into<String>, ty: TypeId) -> Result<(), InternalError> {
        let name = name.into();
        if self.local_type(&name).is_some() {
            return Err(InternalError::DuplicateLocal(name));
        }
        self.locals.push((name, ty));
        Ok(())
    }

    pub fn local_type(&self, name: &str) -> Option<TypeId> {
        self.locals
            .iter()
            .find(|(local, _)| local == name)
            .map(|(_, ty)| *ty)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// One line per instruction: index, opcode name, comma-joined operands.
    ///
    /// ```text
    /// 00000 load_local      a
    /// 00001 br_if_not       @4
    /// ```
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        for (i, instr) in self.body.iter().enumerate() {
            let args: Vec<String> = instr.args.iter().map(ToString::to_string).collect();
            let line = format!("{i:05} {:<15} {}", instr.op.name(), args.join(", "));
            let _ = writeln!(out, "{}", line.trim_end());
        }
        out
    }

    /// Header, locals and disassembly.
    pub fn dump(&self, registry: &SymbolRegistry) -> Result<String, InternalError> {
        let mut out = format!("{}: {}\n", self.qn, registry.human_name(self.func_type)?);
        for (name, ty) in &self.locals {
            let _ = writeln!(out, "    var {name}: {}", registry.human_name(*ty)?);
        }
        out.push_str(&self.disassemble());
        Ok(out)
    }

    /// Compare the body against `name args` lines.
    ///
    /// Indentation, blank lines and runs of spaces are ignored.
    pub fn equals(&self, expected: &str) -> bool {
        let expected: Vec<String> = expected
            .lines()
            .map(normalize)
            .filter(|line| !line.is_empty())
            .collect();
        let actual: Vec<String> = self.body.iter().map(|i| normalize(&i.render())).collect();
        expected == actual
    }

    /// Every target is set and lies within `0..=len`.
    pub fn validate(&self) -> Result<(), InternalError> {
        let len = self.body.len();
        for (index, instr) in self.body.iter().enumerate() {
            for target in instr.targets() {
                match target {
                    None => return Err(InternalError::BranchNotPatched { index }),
                    Some(target) if target > len => {
                        return Err(InternalError::BranchOutOfRange { index, target, len });
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}

fn normalize(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}
