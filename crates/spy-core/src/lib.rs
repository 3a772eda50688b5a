//! Core types shared by every stage of the SPy middle-end.
//!
//! This crate provides:
//! - [`QualifiedName`]: structured identifiers with canonical, human and
//!   mangled renderings
//! - [`Span`]: source locations
//! - [`Value`]: compile-time constants
//! - [`TypeDescriptor`] / [`TypeId`] and [`FunctionEntry`] / [`FuncId`]: the
//!   data stored in the registry
//! - the error taxonomy in [`error`]

pub mod error;
pub mod function;
mod qn_parser;
pub mod qualified_name;
pub mod span;
pub mod types;
pub mod value;

pub use error::{
    Annotation, ArgumentForm, CompilationError, InternalError, Level, QnParseError,
    QnParseErrorKind, RegistrationError, SpyError, TypeError,
};
pub use function::{FuncId, FunctionEntry, FunctionKind};
pub use qualified_name::{MANGLE_PREFIX, QualifiedName, ROOT_MODULE, Segment, is_valid_name};
pub use span::Span;
pub use types::{
    Color, Field, FuncParam, FunctionType, Primitive, StructLayout, StructType, TypeDescriptor,
    TypeId, TypeKind, WORD_SIZE, calc_layout,
};
pub use value::Value;
