//! Unified error types for the SPy middle-end.
//!
//! ## Error Hierarchy
//!
//! ```text
//! SpyError (top-level wrapper)
//! ├── QnParseError      - malformed qualified-name text
//! ├── RegistrationError - duplicate or malformed registry entries
//! ├── CompilationError  - user-triggerable failures while lowering a function
//! │   ├── TypeError     - no operator / conversion matches
//! │   └── InternalError - upstream defects, never user-facing
//! └── TypeError / InternalError may also surface on their own
//! ```
//!
//! Every phase-specific error converts into [`SpyError`] with `?`.

use std::fmt;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Qualified-name parse errors
// ============================================================================

/// Categories of QN parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QnParseErrorKind {
    /// A token that cannot appear here.
    UnexpectedToken,
    /// Input ended where a name or suffix was required.
    UnexpectedEnd,
    /// Input ended inside a qualifier list.
    UnclosedBracket,
    /// A complete name was followed by more input.
    TrailingInput,
    /// A character that is not allowed in names.
    InvalidName,
}

impl QnParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QnParseErrorKind::UnexpectedToken => "unexpected token",
            QnParseErrorKind::UnexpectedEnd => "unexpected end of input",
            QnParseErrorKind::UnclosedBracket => "unclosed bracket",
            QnParseErrorKind::TrailingInput => "trailing input",
            QnParseErrorKind::InvalidName => "invalid name",
        }
    }
}

impl fmt::Display for QnParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A QN parse error with the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {position}: {message}")]
pub struct QnParseError {
    pub kind: QnParseErrorKind,
    pub position: usize,
    pub message: String,
}

impl QnParseError {
    pub fn new(kind: QnParseErrorKind, position: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            message: message.into(),
        }
    }
}

// ============================================================================
// Registration errors
// ============================================================================

/// Errors raised while populating the symbol registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A function with this name already exists.
    #[error("duplicate function: {0}")]
    DuplicateFunction(String),

    /// A type with this name already exists with a different shape.
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    /// A type handle that does not belong to the registry.
    #[error("unknown type id {0}")]
    UnknownType(u32),

    /// A function registered with a type that is not a function type.
    #[error("'{0}' is not a function type")]
    NotAFunctionType(String),

    /// An operator entry registered twice for the same key.
    #[error("duplicate operator: {0}")]
    DuplicateOperator(String),

    /// A struct whose fields cannot be laid out.
    #[error("invalid layout for '{type_name}': field '{field}' {reason}")]
    InvalidLayout {
        type_name: String,
        field: String,
        reason: String,
    },
}

// ============================================================================
// Type errors
// ============================================================================

/// Severity of an annotation attached to a [`TypeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => f.write_str("error"),
            Level::Note => f.write_str("note"),
        }
    }
}

/// A message pointing at a source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub level: Level,
    pub message: String,
    pub span: Span,
}

/// No operator or conversion matched the operand types.
///
/// Carries a headline message plus located annotations naming the
/// human-readable type names involved.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", self.render())]
pub struct TypeError {
    pub message: String,
    pub annotations: Vec<Annotation>,
}

impl TypeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            annotations: Vec::new(),
        }
    }

    /// Attach a located annotation.
    pub fn with(mut self, level: Level, message: impl Into<String>, span: Span) -> Self {
        self.annotations.push(Annotation {
            level,
            message: message.into(),
            span,
        });
        self
    }

    /// `mismatched types` / ``expected `exp`, got `got` ``.
    pub fn mismatched_types(expected: &str, got: &str, span: Span) -> Self {
        Self::new("mismatched types").with(
            Level::Error,
            format!("expected `{expected}`, got `{got}`"),
            span,
        )
    }

    /// ``cannot do `l` op `r` ``, with one note per operand.
    pub fn no_operator(
        op: &str,
        left: (&str, Span),
        right: (&str, Span),
    ) -> Self {
        Self::new(format!("cannot do `{}` {op} `{}`", left.0, right.0))
            .with(Level::Note, format!("this is `{}`", left.0), left.1)
            .with(Level::Note, format!("this is `{}`", right.0), right.1)
    }

    /// Location of the first annotation, if any.
    pub fn span(&self) -> Option<Span> {
        self.annotations.first().map(|a| a.span)
    }

    fn render(&self) -> String {
        let mut out = self.message.clone();
        for ann in &self.annotations {
            out.push_str(&format!("\n  {} at {}: {}", ann.level, ann.span, ann.message));
        }
        out
    }
}

// ============================================================================
// Internal errors
// ============================================================================

/// Assertion failures that signal a defect upstream of the failing component.
///
/// These are never reported to users as diagnostics: they abort the current
/// unit and propagate to the top-level caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("symbol '{0}' not found in scope")]
    UnknownSymbol(String),

    #[error("unknown type id {0}")]
    UnknownType(u32),

    #[error("unknown function id {0}")]
    UnknownFunction(u32),

    #[error("cannot translate type '{type_name}': {reason}")]
    UnsupportedTypeKind { type_name: String, reason: String },

    #[error("branch at {index} already points to {target}")]
    BranchAlreadyPatched { index: usize, target: usize },

    #[error("branch at {index} has no target")]
    BranchNotPatched { index: usize },

    #[error("branch at {index} targets {target}, outside 0..={len}")]
    BranchOutOfRange {
        index: usize,
        target: usize,
        len: usize,
    },

    #[error("opcode '{op}' expects {expected} argument(s), got {got}")]
    InvalidArity {
        op: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("instruction at {index} is not a branch")]
    NotABranch { index: usize },

    #[error("opcode '{op}' cannot take {operand} as argument {position}")]
    InvalidOperand {
        op: &'static str,
        position: usize,
        operand: String,
    },

    #[error("local variable '{0}' declared twice")]
    DuplicateLocal(String),

    #[error("precondition violated: {0}")]
    PreconditionViolated(String),

    /// A registration made by the compiler itself was rejected.
    #[error("registration failed: {0}")]
    Registration(#[from] RegistrationError),
}

// ============================================================================
// Compilation errors
// ============================================================================

/// Argument forms rejected by function definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentForm {
    Variadic,
    KeywordVariadic,
    Default,
    PositionalOnly,
    KeywordOnly,
}

impl fmt::Display for ArgumentForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgumentForm::Variadic => "*args",
            ArgumentForm::KeywordVariadic => "**kwargs",
            ArgumentForm::Default => "default arguments",
            ArgumentForm::PositionalOnly => "positional-only arguments",
            ArgumentForm::KeywordOnly => "keyword-only arguments",
        })
    }
}

/// Errors that occur while lowering a function body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// Function definition without a return annotation.
    #[error("at {span}: missing return type")]
    MissingReturnType { span: Span },

    /// Parameter without a type annotation.
    #[error("at {span}: missing type for argument '{name}'")]
    MissingArgumentType { name: String, span: Span },

    /// An argument form that is not supported yet.
    #[error("at {span}: {form} is not supported yet")]
    UnsupportedArgument { form: ArgumentForm, span: Span },

    /// Reference to a variable captured from an enclosing function.
    #[error("at {span}: non-local variable '{name}' is not supported")]
    NonLocalVariable { name: String, span: Span },

    /// The callee is not a compile-time constant function name.
    #[error("at {span}: indirect calls not supported")]
    IndirectCall { span: Span },

    /// No direct lowering exists for this operator and operand types.
    #[error("at {span}: {op} op between {left} and {right}")]
    UnsupportedOperator {
        op: String,
        left: String,
        right: String,
        span: Span,
    },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

impl CompilationError {
    /// Location of the error, when it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompilationError::MissingReturnType { span }
            | CompilationError::MissingArgumentType { span, .. }
            | CompilationError::UnsupportedArgument { span, .. }
            | CompilationError::NonLocalVariable { span, .. }
            | CompilationError::IndirectCall { span }
            | CompilationError::UnsupportedOperator { span, .. } => Some(*span),
            CompilationError::Type(err) => err.span(),
            CompilationError::Internal(_) => None,
        }
    }

    /// True for upstream defects rather than user errors.
    pub fn is_internal(&self) -> bool {
        matches!(self, CompilationError::Internal(_))
    }
}

// ============================================================================
// Top-level wrapper
// ============================================================================

/// Any error produced by the middle-end.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpyError {
    #[error(transparent)]
    QnParse(#[from] QnParseError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Compilation(#[from] CompilationError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}
