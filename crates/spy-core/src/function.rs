//! Registered functions.

use std::fmt;

use crate::{QualifiedName, TypeId};

/// Handle to a registered function.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(u32);

impl FuncId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FuncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FuncId({})", self.0)
    }
}

/// Where a function's implementation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// Provided by the runtime.
    Builtin,
    /// Compiled from user source.
    User,
    /// Synthesized by the compiler, e.g. `operator::from_dynamic[T]`.
    Generated,
}

/// A function known to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEntry {
    pub qn: QualifiedName,
    /// Always a function-kind type.
    pub func_type: TypeId,
    pub kind: FunctionKind,
}

impl FunctionEntry {
    pub fn new(qn: QualifiedName, func_type: TypeId, kind: FunctionKind) -> Self {
        Self {
            qn,
            func_type,
            kind,
        }
    }
}
