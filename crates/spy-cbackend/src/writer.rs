//! C header assembly.
//!
//! The writer lowers every prototype first, since parameter and return
//! types may add declarations, and only then emits the streams:
//!
//! ```text
//! #include "spy.h"
//!
//! // forward declarations
//! // helper macros
//! // type definitions
//! // function prototypes
//! ```

use tracing::debug;

use spy_compiler::CodeObject;
use spy_core::InternalError;
use spy_registry::SymbolRegistry;

use crate::lowering::{LoweringOptions, TypeLowering};
use crate::text_builder::TextBuilder;

/// Writes one C header for a set of compiled functions.
pub struct CModuleWriter<'r> {
    lowering: TypeLowering<'r>,
}

impl<'r> CModuleWriter<'r> {
    pub fn new(registry: &'r SymbolRegistry) -> Self {
        Self::with_options(registry, LoweringOptions::default())
    }

    pub fn with_options(registry: &'r SymbolRegistry, options: LoweringOptions) -> Self {
        Self {
            lowering: TypeLowering::with_options(registry, options),
        }
    }

    /// Lowering state, e.g. to lower extra types before writing.
    pub fn lowering_mut(&mut self) -> &mut TypeLowering<'r> {
        &mut self.lowering
    }

    /// Render the header for `code_objects`, in order.
    pub fn write(mut self, code_objects: &[CodeObject]) -> Result<String, InternalError> {
        let mut prototypes = Vec::with_capacity(code_objects.len());
        for code in code_objects {
            let func = self.lowering.c_function(&code.qn.mangled(), code.func_type)?;
            prototypes.push(func.decl());
        }
        debug!(functions = prototypes.len(), "writing C module");

        let mut out = TextBuilder::new();
        out.wl("#include \"spy.h\"");
        out.wl("");
        section(&mut out, "forward declarations", self.lowering.types_decl());
        section(&mut out, "helper macros", self.lowering.ptrs_def());
        section(&mut out, "type definitions", self.lowering.types_def());
        out.wl("// function prototypes");
        for decl in &prototypes {
            out.wl(&format!("{decl};"));
        }
        Ok(out.build())
    }
}

fn section(out: &mut TextBuilder, title: &str, body: &str) {
    out.wl(&format!("// {title}"));
    out.wb(body);
    out.wl("");
}
