//! Instruction emitter with backpatched branches.
//!
//! The [`BytecodeEmitter`] appends checked instructions to a function body.
//! Forward branches are emitted with an unresolved target and patched exactly
//! once when the target label is known.
//!
//! # Example
//!
//! ```ignore
//! let mut emitter = BytecodeEmitter::new(false);
//!
//! emitter.emit_load_local("cond")?;
//! let skip = emitter.emit_jump(OpCode::BrIfNot)?;
//! emitter.emit_load_const(Value::I32(1))?;
//! emitter.emit_return()?;
//! emitter.patch_jump_here(skip)?;
//!
//! let body = emitter.finish()?;
//! ```

use spy_core::{InternalError, QualifiedName, Span, Value};

use crate::bytecode::{Arg, Instruction, OpCode};

/// Emits instructions for one function body.
#[derive(Debug)]
pub struct BytecodeEmitter {
    body: Vec<Instruction>,

    /// Span attached to subsequently emitted instructions
    span: Span,

    /// Whether structure markers are emitted
    markers: bool,
}

impl BytecodeEmitter {
    pub fn new(markers: bool) -> Self {
        Self {
            body: Vec::new(),
            span: Span::default(),
            markers,
        }
    }

    /// Set the source location for subsequent instructions.
    pub fn set_span(&mut self, span: Span) {
        self.span = span;
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Index the next instruction will have.
    pub fn current_label(&self) -> usize {
        self.body.len()
    }

    pub fn body(&self) -> &[Instruction] {
        &self.body
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Emit an instruction, returning its index.
    pub fn emit(&mut self, op: OpCode, args: Vec<Arg>) -> Result<usize, InternalError> {
        let index = self.body.len();
        self.body.push(Instruction::new(op, args, self.span)?);
        Ok(index)
    }

    pub fn emit_load_const(&mut self, value: Value) -> Result<usize, InternalError> {
        self.emit(OpCode::LoadConst, vec![Arg::Const(value)])
    }

    pub fn emit_load_local(&mut self, name: &str) -> Result<usize, InternalError> {
        self.emit(OpCode::LoadLocal, vec![Arg::name(name)])
    }

    pub fn emit_load_global(&mut self, name: &str) -> Result<usize, InternalError> {
        self.emit(OpCode::LoadGlobal, vec![Arg::name(name)])
    }

    pub fn emit_store_local(&mut self, name: &str) -> Result<usize, InternalError> {
        self.emit(OpCode::StoreLocal, vec![Arg::name(name)])
    }

    pub fn emit_store_global(&mut self, name: &str) -> Result<usize, InternalError> {
        self.emit(OpCode::StoreGlobal, vec![Arg::name(name)])
    }

    pub fn emit_call_global(
        &mut self,
        func: QualifiedName,
        argc: usize,
    ) -> Result<usize, InternalError> {
        self.emit(OpCode::CallGlobal, vec![Arg::Func(func), Arg::Count(argc)])
    }

    pub fn emit_pop(&mut self) -> Result<usize, InternalError> {
        self.emit(OpCode::PopAndDiscard, vec![])
    }

    pub fn emit_return(&mut self) -> Result<usize, InternalError> {
        self.emit(OpCode::Return, vec![])
    }

    pub fn emit_abort(&mut self, message: &str) -> Result<usize, InternalError> {
        self.emit(OpCode::Abort, vec![Arg::message(message)])
    }

    // ==========================================================================
    // Branches
    // ==========================================================================

    /// Emit a branch with an unresolved target.
    pub fn emit_jump(&mut self, op: OpCode) -> Result<JumpLabel, InternalError> {
        let index = self.emit(op, vec![Arg::Target(None)])?;
        if !op.is_branch() {
            return Err(InternalError::NotABranch { index });
        }
        Ok(JumpLabel(index))
    }

    /// Emit a branch to a known label, typically a loop start.
    pub fn emit_branch_to(&mut self, op: OpCode, target: usize) -> Result<usize, InternalError> {
        let index = self.emit(op, vec![Arg::Target(Some(target))])?;
        if !op.is_branch() {
            return Err(InternalError::NotABranch { index });
        }
        Ok(index)
    }

    /// Resolve a pending branch.
    pub fn patch_jump(&mut self, label: JumpLabel, target: usize) -> Result<(), InternalError> {
        self.set_target(label.0, 0, target)
    }

    /// Resolve a pending branch to the current label.
    pub fn patch_jump_here(&mut self, label: JumpLabel) -> Result<(), InternalError> {
        let here = self.current_label();
        self.patch_jump(label, here)
    }

    // ==========================================================================
    // Structure Markers
    // ==========================================================================

    /// Emit a marker with unresolved labels, if markers are enabled.
    pub fn emit_marker(&mut self, op: OpCode) -> Result<Option<MarkerLabel>, InternalError> {
        if !self.markers {
            return Ok(None);
        }
        if !op.is_marker() {
            return Err(InternalError::PreconditionViolated(format!(
                "'{}' is not a structure marker",
                op.name()
            )));
        }
        let args = vec![Arg::Target(None); op.arity()];
        let index = self.emit(op, args)?;
        Ok(Some(MarkerLabel(index)))
    }

    /// Back-fill every label of a marker, in operand order.
    pub fn patch_marker(
        &mut self,
        marker: Option<MarkerLabel>,
        labels: &[usize],
    ) -> Result<(), InternalError> {
        let Some(MarkerLabel(index)) = marker else {
            return Ok(());
        };
        let arity = self.body.get(index).map_or(0, |i| i.op.arity());
        if arity != labels.len() {
            return Err(InternalError::InvalidArity {
                op: self.body.get(index).map_or("?", |i| i.op.name()),
                expected: arity,
                got: labels.len(),
            });
        }
        for (slot, &target) in labels.iter().enumerate() {
            self.set_target(index, slot, target)?;
        }
        Ok(())
    }

    fn set_target(&mut self, index: usize, slot: usize, target: usize) -> Result<(), InternalError> {
        let instr = self
            .body
            .get_mut(index)
            .ok_or(InternalError::NotABranch { index })?;
        let arg = instr
            .args
            .iter_mut()
            .filter(|arg| matches!(arg, Arg::Target(_)))
            .nth(slot)
            .ok_or(InternalError::NotABranch { index })?;
        match arg {
            Arg::Target(Some(existing)) => Err(InternalError::BranchAlreadyPatched {
                index,
                target: *existing,
            }),
            Arg::Target(pending) => {
                *pending = Some(target);
                Ok(())
            }
            _ => Err(InternalError::NotABranch { index }),
        }
    }

    // ==========================================================================
    // Finalization
    // ==========================================================================

    /// Finish emission; every target must be resolved and in `0..=len`.
    pub fn finish(self) -> Result<Vec<Instruction>, InternalError> {
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
        Ok(self.body)
    }
}

/// A branch awaiting its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpLabel(usize);

impl JumpLabel {
    /// Index of the branch instruction.
    pub fn offset(&self) -> usize {
        self.0
    }
}

/// A structure marker awaiting its labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerLabel(usize);

impl MarkerLabel {
    pub fn offset(&self) -> usize {
        self.0
    }
}
