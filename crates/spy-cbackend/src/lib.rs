//! C backend for the SPy middle-end.
//!
//! Turns registered types into C declarations and compiled functions into
//! prototypes:
//!
//! - [`TypeLowering`]: memoized, transactional type-graph lowering into
//!   three ordered text streams
//! - [`CFunction`]: prototype rendering
//! - [`CModuleWriter`]: header assembly from code objects

mod c_types;
mod lowering;
mod text_builder;
mod writer;

pub use c_types::{CFuncParam, CFunction, CType};
pub use lowering::{LoweringOptions, TypeLowering};
pub use text_builder::{Checkpoint, TextBuilder};
pub use writer::CModuleWriter;
