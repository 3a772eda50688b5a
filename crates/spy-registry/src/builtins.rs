//! The builtin type set every registry starts with.

use spy_core::{Primitive, QualifiedName, Segment, TypeId, TypeKind};

/// Handles to the builtin types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtins {
    /// `builtins::void`, the unit type.
    pub void: TypeId,
    pub i32: TypeId,
    pub f64: TypeId,
    pub bool: TypeId,
    pub str: TypeId,
    /// `builtins::object`, the universal root.
    pub object: TypeId,
    pub dynamic: TypeId,
    /// `builtins::type`
    pub type_: TypeId,
    /// `rawbuffer::RawBuffer`
    pub raw_buffer: TypeId,
    /// `jsffi::JsRef`
    pub js_ref: TypeId,
}

/// What the registry needs to create one builtin.
pub(crate) struct BuiltinDef {
    pub module: &'static str,
    pub name: &'static str,
    pub kind: TypeKind,
    /// The root and `dynamic` have no supertype.
    pub rooted: bool,
}

impl BuiltinDef {
    pub fn qn(&self) -> QualifiedName {
        QualifiedName::new([Segment::new(self.module), Segment::new(self.name)])
    }
}

fn def(module: &'static str, name: &'static str, kind: TypeKind, rooted: bool) -> BuiltinDef {
    BuiltinDef {
        module,
        name,
        kind,
        rooted,
    }
}

/// Builtins in registration order; `object` comes first so it can be
/// everybody else's base.
pub(crate) fn definitions() -> [BuiltinDef; 10] {
    [
        def("builtins", "object", TypeKind::Object, false),
        def("builtins", "dynamic", TypeKind::Dynamic, false),
        def("builtins", "void", TypeKind::Primitive(Primitive::Void), true),
        def("builtins", "i32", TypeKind::Primitive(Primitive::I32), true),
        def("builtins", "f64", TypeKind::Primitive(Primitive::F64), true),
        def("builtins", "bool", TypeKind::Primitive(Primitive::Bool), true),
        def("builtins", "str", TypeKind::Primitive(Primitive::Str), true),
        def("builtins", "type", TypeKind::Primitive(Primitive::Type), true),
        def("rawbuffer", "RawBuffer", TypeKind::Primitive(Primitive::RawBuffer), true),
        def("jsffi", "JsRef", TypeKind::Primitive(Primitive::JsRef), true),
    ]
}

/// Builtins in the order of [`definitions`].
pub(crate) fn from_ids(ids: &[TypeId; 10]) -> Builtins {
    let [object, dynamic, void, i32, f64, bool, str, type_, raw_buffer, js_ref] = *ids;
    Builtins {
        void,
        i32,
        f64,
        bool,
        str,
        object,
        dynamic,
        type_,
        raw_buffer,
        js_ref,
    }
}
