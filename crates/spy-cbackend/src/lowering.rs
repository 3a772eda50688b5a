//! Type-graph lowering.
//!
//! [`TypeLowering`] maps registered types to C types, memoized per type, and
//! writes the declarations those types need into three ordered streams:
//!
//! ```text
//! types_decl   forward declarations and wrapper structs
//! ptrs_def     helper macros (SPY_PTR_FUNCTIONS, SPY_TYPELIFT_FUNCTIONS)
//! types_def    full struct definitions
//! ```
//!
//! A struct is registered as soon as its forward declaration is written, so
//! fields that lead back to it resolve to the forward name. Its body is
//! built in a detached buffer and spliced into `types_def` only once every
//! field type has been lowered.
//!
//! Pointers and lifted types are registered after their item, so a cycle
//! through a struct can lower the same wrapper on the way in. The cache is
//! checked again once the item is done and the inner result is reused.
//!
//! Each call to [`lower`](TypeLowering::lower) or
//! [`c_function`](TypeLowering::c_function) is one unit: if it fails,
//! the streams and the cache are restored to what they were before it.

use rustc_hash::FxHashMap;
use tracing::debug;

use spy_core::{Field, InternalError, Primitive, QualifiedName, TypeId, TypeKind};
use spy_registry::SymbolRegistry;

use crate::c_types::{CFuncParam, CFunction, CType};
use crate::text_builder::{Checkpoint, TextBuilder};

type Result<T> = std::result::Result<T, InternalError>;

/// Options for the generated declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoweringOptions {
    /// Give pointer wrappers a `length` field under `SPY_DEBUG`.
    pub debug_length: bool,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self { debug_length: true }
    }
}

impl LoweringOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug_length(mut self, enabled: bool) -> Self {
        self.debug_length = enabled;
        self
    }
}

/// Undo information for one lowering unit.
struct UnitCheckpoint {
    types_decl: Checkpoint,
    ptrs_def: Checkpoint,
    types_def: Checkpoint,
    cached: usize,
}

/// Lowers registered types to C, memoized per type.
pub struct TypeLowering<'r> {
    registry: &'r SymbolRegistry,
    options: LoweringOptions,
    cache: FxHashMap<TypeId, CType>,
    /// Cache insertions in order, for rollback.
    cached: Vec<TypeId>,
    types_decl: TextBuilder,
    ptrs_def: TextBuilder,
    types_def: TextBuilder,
}

impl<'r> TypeLowering<'r> {
    pub fn new(registry: &'r SymbolRegistry) -> Self {
        Self::with_options(registry, LoweringOptions::default())
    }

    pub fn with_options(registry: &'r SymbolRegistry, options: LoweringOptions) -> Self {
        Self {
            registry,
            options,
            cache: FxHashMap::default(),
            cached: Vec::new(),
            types_decl: TextBuilder::new(),
            ptrs_def: TextBuilder::new(),
            types_def: TextBuilder::new(),
        }
    }

    pub fn registry(&self) -> &'r SymbolRegistry {
        self.registry
    }

    /// Forward declarations and wrapper structs.
    pub fn types_decl(&self) -> &str {
        self.types_decl.as_str()
    }

    /// Helper macro invocations.
    pub fn ptrs_def(&self) -> &str {
        self.ptrs_def.as_str()
    }

    /// Full struct definitions.
    pub fn types_def(&self) -> &str {
        self.types_def.as_str()
    }

    /// The C type of `ty`, emitting its declarations on first use.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn lower(&mut self, ty: TypeId) -> Result<CType> {
        let checkpoint = self.checkpoint();
        let result = self.lower_type(ty);
        if result.is_err() {
            self.rollback(checkpoint);
        }
        result
    }

    /// Prototype of a function called `name` with type `func_type`.
    ///
    /// The return and parameter types are lowered as a single unit.
    pub fn c_function(&mut self, name: &str, func_type: TypeId) -> Result<CFunction> {
        let checkpoint = self.checkpoint();
        let result = self.lower_function(name, func_type);
        if result.is_err() {
            self.rollback(checkpoint);
        }
        result
    }

    /// Return type of the registered function `qn`.
    pub fn c_restype_by_qn(&mut self, qn: &QualifiedName) -> Result<CType> {
        let func = self
            .registry
            .lookup_function(qn)
            .ok_or_else(|| InternalError::UnknownSymbol(qn.to_string()))?;
        let ret = self.registry.signature(func)?.ret;
        self.lower(ret)
    }

    // ==========================================================================
    // Per-kind lowering
    // ==========================================================================

    fn lower_function(&mut self, name: &str, func_type: TypeId) -> Result<CFunction> {
        let registry = self.registry;
        let shape = registry.function_shape(func_type)?;
        let restype = self.lower_type(shape.ret)?;
        let mut params = Vec::with_capacity(shape.params.len());
        for param in &shape.params {
            params.push(CFuncParam {
                name: param.name.clone(),
                c_type: self.lower_type(param.ty)?,
            });
        }
        Ok(CFunction {
            name: name.to_string(),
            params,
            restype,
        })
    }

    fn lower_type(&mut self, ty: TypeId) -> Result<CType> {
        if let Some(c_type) = self.cache.get(&ty) {
            return Ok(c_type.clone());
        }
        let registry = self.registry;
        let desc = registry.descriptor(ty)?;
        let c_type = match &desc.kind {
            TypeKind::Primitive(p) => {
                let c_type = primitive_ctype(*p);
                self.register(ty, c_type.clone());
                c_type
            }
            TypeKind::Pointer { item } => self.lower_pointer(ty, &desc.qn, *item)?,
            TypeKind::Struct(_) if !registry.is_complete(ty) => {
                return Err(InternalError::UnsupportedTypeKind {
                    type_name: desc.qn.to_string(),
                    reason: "struct is declared but never defined".to_string(),
                });
            }
            TypeKind::Struct(st) => self.lower_struct(ty, &desc.qn, &st.fields)?,
            TypeKind::Lifted { underlying } => self.lower_lifted(ty, &desc.qn, *underlying)?,
            TypeKind::Object | TypeKind::Dynamic | TypeKind::Function(_) => {
                return Err(InternalError::UnsupportedTypeKind {
                    type_name: desc.qn.to_string(),
                    reason: format!("no C representation for {} types", desc.kind.name()),
                });
            }
        };
        debug!(qn = %desc.qn, c_type = %c_type, "lowered type");
        Ok(c_type)
    }

    fn lower_pointer(&mut self, ty: TypeId, qn: &QualifiedName, item: TypeId) -> Result<CType> {
        let item = self.lower_type(item)?;
        if let Some(done) = self.cache.get(&ty) {
            return Ok(done.clone());
        }
        let ptr = CType::new(qn.mangled());

        self.types_decl.wl(&format!("typedef struct {ptr} {{"));
        self.types_decl.indent(|out| out.wl(&format!("{item} *p;")));
        if self.options.debug_length {
            self.types_decl.wb("#ifdef SPY_DEBUG\n    size_t length;\n#endif");
        }
        self.types_decl.wl(&format!("}} {ptr};"));

        self.ptrs_def.wl(&format!("SPY_PTR_FUNCTIONS({ptr}, {item});"));
        self.ptrs_def
            .wl(&format!("#define {ptr}$NULL (({ptr}){{0}})"));

        self.register(ty, ptr.clone());
        Ok(ptr)
    }

    fn lower_struct(
        &mut self,
        ty: TypeId,
        qn: &QualifiedName,
        fields: &[Field],
    ) -> Result<CType> {
        let st = CType::new(qn.mangled());
        self.types_decl.wl(&format!("typedef struct {st} {st};"));
        self.register(ty, st.clone());

        let mut body = self.types_def.detached();
        body.wl(&format!("struct {st} {{"));
        for field in fields {
            let c_field = self.lower_type(field.ty)?;
            body.indent(|out| out.wl(&format!("{c_field} {};", field.name)));
        }
        body.wl("};");
        body.wl("");
        self.types_def.attach(body);
        Ok(st)
    }

    fn lower_lifted(
        &mut self,
        ty: TypeId,
        qn: &QualifiedName,
        underlying: TypeId,
    ) -> Result<CType> {
        let ll = self.lower_type(underlying)?;
        if let Some(done) = self.cache.get(&ty) {
            return Ok(done.clone());
        }
        let hl = CType::new(qn.mangled());

        self.types_decl.wl(&format!("typedef struct {hl} {{"));
        self.types_decl.indent(|out| out.wl(&format!("{ll} ll;")));
        self.types_decl.wl(&format!("}} {hl};"));
        self.ptrs_def
            .wl(&format!("SPY_TYPELIFT_FUNCTIONS({hl}, {ll});"));

        self.register(ty, hl.clone());
        Ok(hl)
    }

    // ==========================================================================
    // Cache and rollback
    // ==========================================================================

    fn register(&mut self, ty: TypeId, c_type: CType) {
        if self.cache.insert(ty, c_type).is_none() {
            self.cached.push(ty);
        }
    }

    fn checkpoint(&self) -> UnitCheckpoint {
        UnitCheckpoint {
            types_decl: self.types_decl.checkpoint(),
            ptrs_def: self.ptrs_def.checkpoint(),
            types_def: self.types_def.checkpoint(),
            cached: self.cached.len(),
        }
    }

    fn rollback(&mut self, checkpoint: UnitCheckpoint) {
        self.types_decl.rollback(checkpoint.types_decl);
        self.ptrs_def.rollback(checkpoint.ptrs_def);
        self.types_def.rollback(checkpoint.types_def);
        for ty in self.cached.drain(checkpoint.cached..) {
            self.cache.remove(&ty);
        }
    }
}

fn primitive_ctype(p: Primitive) -> CType {
    CType::new(match p {
        Primitive::Void => "void",
        Primitive::I32 => "int32_t",
        Primitive::F64 => "double",
        Primitive::Bool => "bool",
        Primitive::Str => "spy_Str *",
        Primitive::RawBuffer => "spy_RawBuffer *",
        Primitive::JsRef => "JsRef",
        // TODO: needs a runtime type object instead of an opaque pointer
        Primitive::Type => "void *",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use spy_core::{Color, FuncParam, FunctionKind};

    fn qn(text: &str) -> QualifiedName {
        text.parse().unwrap()
    }

    #[test]
    fn primitives() {
        let registry = SymbolRegistry::new();
        let b = *registry.builtins();
        let mut lowering = TypeLowering::new(&registry);
        let cases = [
            (b.void, "void"),
            (b.i32, "int32_t"),
            (b.f64, "double"),
            (b.bool, "bool"),
            (b.str, "spy_Str *"),
            (b.raw_buffer, "spy_RawBuffer *"),
            (b.js_ref, "JsRef"),
            (b.type_, "void *"),
        ];
        for (ty, expected) in cases {
            assert_eq!(lowering.lower(ty).unwrap().name(), expected);
        }
        assert!(lowering.types_decl().is_empty());
        assert!(lowering.ptrs_def().is_empty());
        assert!(lowering.types_def().is_empty());
    }

    #[test]
    fn pointer_wrapper() {
        let mut registry = SymbolRegistry::new();
        let i32 = registry.builtins().i32;
        let ptr = registry.pointer_type(i32).unwrap();
        let mut lowering = TypeLowering::new(&registry);

        let c_type = lowering.lower(ptr).unwrap();
        assert_eq!(c_type.name(), "spy_unsafe$ptr__builtins$i32");
        assert_eq!(
            lowering.types_decl(),
            "typedef struct spy_unsafe$ptr__builtins$i32 {\n\
             \x20   int32_t *p;\n\
             #ifdef SPY_DEBUG\n\
             \x20   size_t length;\n\
             #endif\n\
             } spy_unsafe$ptr__builtins$i32;\n"
        );
        assert_eq!(
            lowering.ptrs_def(),
            "SPY_PTR_FUNCTIONS(spy_unsafe$ptr__builtins$i32, int32_t);\n\
             #define spy_unsafe$ptr__builtins$i32$NULL ((spy_unsafe$ptr__builtins$i32){0})\n"
        );
    }

    #[test]
    fn pointer_without_debug_length() {
        let mut registry = SymbolRegistry::new();
        let f64 = registry.builtins().f64;
        let ptr = registry.pointer_type(f64).unwrap();
        let options = LoweringOptions::new().with_debug_length(false);
        let mut lowering = TypeLowering::with_options(&registry, options);
        lowering.lower(ptr).unwrap();
        assert!(!lowering.types_decl().contains("SPY_DEBUG"));
        assert!(lowering.types_decl().contains("    double *p;\n"));
    }

    #[test]
    fn nested_struct_bodies_do_not_interleave() {
        let mut registry = SymbolRegistry::new();
        let b = *registry.builtins();
        let inner = registry
            .struct_type(qn("test::Inner"), vec![Field::new("v", b.i32)])
            .unwrap();
        let outer = registry
            .struct_type(
                qn("test::Outer"),
                vec![Field::new("inner", inner), Field::new("w", b.f64)],
            )
            .unwrap();
        let mut lowering = TypeLowering::new(&registry);

        assert_eq!(lowering.lower(outer).unwrap().name(), "spy_test$Outer");
        assert_eq!(
            lowering.types_decl(),
            "typedef struct spy_test$Outer spy_test$Outer;\n\
             typedef struct spy_test$Inner spy_test$Inner;\n"
        );
        assert_eq!(
            lowering.types_def(),
            "struct spy_test$Inner {\n    int32_t v;\n};\n\n\
             struct spy_test$Outer {\n    spy_test$Inner inner;\n    double w;\n};\n\n"
        );
    }

    #[test]
    fn struct_with_pointer_field() {
        let mut registry = SymbolRegistry::new();
        let b = *registry.builtins();
        let ptr = registry.pointer_type(b.i32).unwrap();
        let node = registry
            .struct_type(
                qn("test::Buf"),
                vec![Field::new("data", ptr), Field::new("len", b.i32)],
            )
            .unwrap();
        let mut lowering = TypeLowering::new(&registry);
        lowering.lower(node).unwrap();
        assert!(lowering.types_def().contains("    spy_unsafe$ptr__builtins$i32 data;\n"));
        assert!(
            lowering
                .ptrs_def()
                .starts_with("SPY_PTR_FUNCTIONS(spy_unsafe$ptr__builtins$i32, int32_t);")
        );
    }

    /// `struct Node { val: i32, next: ptr[Node] }`
    fn linked_node(registry: &mut SymbolRegistry) -> (TypeId, TypeId) {
        let i32 = registry.builtins().i32;
        let node = registry.declare_struct(qn("test::Node")).unwrap();
        let next = registry.pointer_type(node).unwrap();
        registry
            .define_struct(node, vec![Field::new("val", i32), Field::new("next", next)])
            .unwrap();
        (node, next)
    }

    #[test]
    fn self_referential_struct() {
        let mut registry = SymbolRegistry::new();
        let (node, next) = linked_node(&mut registry);

        let mut from_struct = TypeLowering::new(&registry);
        assert_eq!(from_struct.lower(node).unwrap().name(), "spy_test$Node");
        let mut from_pointer = TypeLowering::new(&registry);
        assert_eq!(
            from_pointer.lower(next).unwrap().name(),
            "spy_unsafe$ptr__test$Node"
        );

        for lowering in [&from_struct, &from_pointer] {
            let decl = lowering.types_decl();
            assert_eq!(decl.matches("typedef struct spy_test$Node spy_test$Node;").count(), 1);
            assert_eq!(decl.matches("typedef struct spy_unsafe$ptr__test$Node {").count(), 1);
            assert_eq!(lowering.ptrs_def().matches("SPY_PTR_FUNCTIONS").count(), 1);
            assert_eq!(lowering.ptrs_def().matches("$NULL").count(), 1);
            assert_eq!(
                lowering.types_def(),
                "struct spy_test$Node {\n\
                 \x20   int32_t val;\n\
                 \x20   spy_unsafe$ptr__test$Node next;\n\
                 };\n\n"
            );
        }
        assert_eq!(from_struct.types_decl(), from_pointer.types_decl());
        assert_eq!(from_struct.ptrs_def(), from_pointer.ptrs_def());
    }

    #[test]
    fn cycle_through_lifted_type() {
        let mut registry = SymbolRegistry::new();
        let node = registry.declare_struct(qn("test::Node")).unwrap();
        let next = registry.pointer_type(node).unwrap();
        let link = registry.lifted_type(qn("test::Link"), next).unwrap();
        registry
            .define_struct(node, vec![Field::new("link", link)])
            .unwrap();

        let mut lowering = TypeLowering::new(&registry);
        assert_eq!(lowering.lower(link).unwrap().name(), "spy_test$Link");
        assert_eq!(lowering.types_decl().matches("} spy_test$Link;").count(), 1);
        assert_eq!(
            lowering.types_decl().matches("} spy_unsafe$ptr__test$Node;").count(),
            1
        );
        assert_eq!(lowering.ptrs_def().matches("SPY_TYPELIFT_FUNCTIONS").count(), 1);
        assert!(lowering.types_def().contains("    spy_test$Link link;\n"));
    }

    #[test]
    fn undefined_struct() {
        let mut registry = SymbolRegistry::new();
        let node = registry.declare_struct(qn("test::Opaque")).unwrap();
        let ptr = registry.pointer_type(node).unwrap();
        let mut lowering = TypeLowering::new(&registry);
        let err = lowering.lower(ptr).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot translate type 'test::Opaque': struct is declared but never defined"
        );
        assert!(lowering.types_decl().is_empty());
    }

    #[test]
    fn lifted_type() {
        let mut registry = SymbolRegistry::new();
        let i32 = registry.builtins().i32;
        let lifted = registry.lifted_type(qn("test::Handle"), i32).unwrap();
        let mut lowering = TypeLowering::new(&registry);
        assert_eq!(lowering.lower(lifted).unwrap().name(), "spy_test$Handle");
        assert_eq!(
            lowering.types_decl(),
            "typedef struct spy_test$Handle {\n    int32_t ll;\n} spy_test$Handle;\n"
        );
        assert_eq!(
            lowering.ptrs_def(),
            "SPY_TYPELIFT_FUNCTIONS(spy_test$Handle, int32_t);\n"
        );
    }

    #[test]
    fn lowering_is_memoized() {
        let mut registry = SymbolRegistry::new();
        let b = *registry.builtins();
        let ptr = registry.pointer_type(b.i32).unwrap();
        let st = registry
            .struct_type(qn("test::P"), vec![Field::new("p", ptr)])
            .unwrap();
        let mut lowering = TypeLowering::new(&registry);

        let first = lowering.lower(st).unwrap();
        let streams = (
            lowering.types_decl().to_string(),
            lowering.ptrs_def().to_string(),
            lowering.types_def().to_string(),
        );
        let second = lowering.lower(st).unwrap();
        lowering.lower(ptr).unwrap();
        assert_eq!(first, second);
        assert_eq!(lowering.types_decl(), streams.0);
        assert_eq!(lowering.ptrs_def(), streams.1);
        assert_eq!(lowering.types_def(), streams.2);
    }

    #[test]
    fn unsupported_kinds() {
        let registry = SymbolRegistry::new();
        let b = *registry.builtins();
        let mut lowering = TypeLowering::new(&registry);
        for ty in [b.object, b.dynamic] {
            let err = lowering.lower(ty).unwrap_err();
            assert!(matches!(err, InternalError::UnsupportedTypeKind { .. }));
        }
    }

    #[test]
    fn failed_unit_is_rolled_back() {
        let mut registry = SymbolRegistry::new();
        let b = *registry.builtins();
        let ptr = registry.pointer_type(b.i32).unwrap();
        let bad = registry
            .struct_type(
                qn("test::Bad"),
                vec![Field::new("p", ptr), Field::new("o", b.object)],
            )
            .unwrap();
        let mut lowering = TypeLowering::new(&registry);

        let err = lowering.lower(bad).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot translate type 'builtins::object': no C representation for object types"
        );
        assert!(lowering.types_decl().is_empty());
        assert!(lowering.ptrs_def().is_empty());
        assert!(lowering.types_def().is_empty());

        // the pointer emitted inside the failed unit is lowered again
        lowering.lower(ptr).unwrap();
        assert!(lowering.ptrs_def().contains("SPY_PTR_FUNCTIONS"));
    }

    #[test]
    fn failure_keeps_earlier_units() {
        let registry = SymbolRegistry::new();
        let b = *registry.builtins();
        let mut lowering = TypeLowering::new(&registry);
        lowering.lower(b.i32).unwrap();
        assert!(lowering.lower(b.dynamic).is_err());
        assert_eq!(lowering.cached, vec![b.i32]);
    }

    #[test]
    fn function_signatures() {
        let mut registry = SymbolRegistry::new();
        let b = *registry.builtins();
        let add_type = registry
            .function_type(
                vec![FuncParam::new("a", b.i32), FuncParam::new("b", b.i32)],
                b.f64,
                Color::Red,
            )
            .unwrap();
        registry
            .add_function(qn("test::add"), add_type, FunctionKind::User)
            .unwrap();
        let main_type = registry.function_type(vec![], b.void, Color::Red).unwrap();
        let mut lowering = TypeLowering::new(&registry);

        let add = lowering.c_function("spy_test$add", add_type).unwrap();
        assert_eq!(add.decl(), "double spy_test$add(int32_t a, int32_t b)");
        let main = lowering.c_function("spy_test$main", main_type).unwrap();
        assert_eq!(main.decl(), "void spy_test$main(void)");

        assert_eq!(lowering.c_restype_by_qn(&qn("test::add")).unwrap().name(), "double");
        assert_eq!(lowering.types_decl(), "");
        let err = lowering.c_restype_by_qn(&qn("test::missing")).unwrap_err();
        assert_eq!(err, InternalError::UnknownSymbol("test::missing".into()));
    }

    #[test]
    fn failed_prototype_is_rolled_back() {
        let mut registry = SymbolRegistry::new();
        let b = *registry.builtins();
        let ptr = registry.pointer_type(b.f64).unwrap();
        let func_type = registry
            .function_type(
                vec![FuncParam::new("p", ptr), FuncParam::new("d", b.dynamic)],
                ptr,
                Color::Red,
            )
            .unwrap();
        let mut lowering = TypeLowering::new(&registry);

        let err = lowering.c_function("spy_test$f", func_type).unwrap_err();
        assert!(matches!(err, InternalError::UnsupportedTypeKind { .. }));
        assert!(lowering.types_decl().is_empty());
        assert!(lowering.ptrs_def().is_empty());
        assert!(lowering.cached.is_empty());
    }
}
