//! Type and function registry for the SPy middle-end.
//!
//! [`SymbolRegistry`] interns every type descriptor and function for one
//! compilation run and starts out holding the [`Builtins`].

mod builtins;
mod registry;

pub use builtins::Builtins;
pub use registry::SymbolRegistry;
