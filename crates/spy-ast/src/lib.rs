//! Abstract syntax tree for SPy function bodies.
//!
//! All nodes borrow from a `bumpalo` arena and are `Copy`; the tree is valid
//! for the lifetime of the arena. The tree is produced by the front-end
//! (outside this workspace) after name resolution, and consumed by
//! `spy-compiler`.

pub mod builder;
pub mod decl;
pub mod expr;
pub mod ops;
pub mod stmt;

use spy_core::Span;

pub use builder::AstBuilder;
pub use decl::*;
pub use expr::*;
pub use ops::*;
pub use stmt::*;

/// An identifier with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}
