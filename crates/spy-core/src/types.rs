//! Type descriptors.
//!
//! Every type the compiler knows about is described by a [`TypeDescriptor`]
//! stored in the registry and referred to through a copyable [`TypeId`].
//! Descriptors are immutable once registered; the only derived data, the
//! struct layout, is computed when the struct type is created.

use std::fmt;

use crate::QualifiedName;
use crate::error::RegistrationError;

/// Handle to a registered type descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
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

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Size of a machine word: pointers and reference handles.
pub const WORD_SIZE: u32 = 8;

/// Compile-time-only ("blue") or runtime-visible ("red") function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    Blue,
    #[default]
    Red,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Blue => f.write_str("blue"),
            Color::Red => f.write_str("red"),
        }
    }
}

/// Value types with a fixed native representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Void,
    I32,
    F64,
    Bool,
    Str,
    RawBuffer,
    JsRef,
    /// Types as first-class values.
    Type,
}

impl Primitive {
    /// Storage size in bytes; `None` for `void`.
    pub fn size(self) -> Option<u32> {
        match self {
            Primitive::Void => None,
            Primitive::I32 => Some(4),
            Primitive::F64 => Some(8),
            Primitive::Bool => Some(1),
            Primitive::Str | Primitive::RawBuffer | Primitive::JsRef | Primitive::Type => {
                Some(WORD_SIZE)
            }
        }
    }
}

/// A named, typed function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncParam {
    pub name: String,
    pub ty: TypeId,
}

impl FuncParam {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Shape of a function type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    pub params: Vec<FuncParam>,
    pub ret: TypeId,
    pub color: Color,
}

impl FunctionType {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A named struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeId,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Field offsets and total size of a struct.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructLayout {
    /// Offset of each field, parallel to the field list.
    pub offsets: Vec<u32>,
    pub size: u32,
}

/// Shape of a struct type: its fields in declaration order and their layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType {
    pub fields: Vec<Field>,
    pub layout: StructLayout,
}

impl StructType {
    /// Offset of the named field.
    pub fn offset_of(&self, name: &str) -> Option<u32> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .map(|i| self.layout.offsets[i])
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Compute struct layout from field sizes.
///
/// Each field is aligned to its own size:
/// `offset = (offset + (size - 1)) & !(size - 1)`. This is only a correct
/// native layout while every size is a power of two no larger than a word;
/// other sizes still get a deterministic, if approximate, placement.
/// Zero-sized fields cannot be placed and are rejected.
pub fn calc_layout<'a, I>(type_name: &str, fields: I) -> Result<StructLayout, RegistrationError>
where
    I: IntoIterator<Item = (&'a str, u32)>,
{
    let mut offset = 0u32;
    let mut offsets = Vec::new();
    for (name, size) in fields {
        if size == 0 {
            return Err(RegistrationError::InvalidLayout {
                type_name: type_name.to_string(),
                field: name.to_string(),
                reason: "has no size".to_string(),
            });
        }
        offset = (offset + (size - 1)) & !(size - 1);
        offsets.push(offset);
        offset += size;
    }
    Ok(StructLayout {
        offsets,
        size: offset,
    })
}

/// Representation kind of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(Primitive),
    /// Reference type compared by identity; includes the universal root.
    Object,
    /// Accepts values of any type, checked at runtime.
    Dynamic,
    Function(FunctionType),
    Struct(StructType),
    /// `unsafe::ptr[item]`.
    Pointer { item: TypeId },
    /// A distinct type sharing the representation of `underlying`.
    Lifted { underlying: TypeId },
}

impl TypeKind {
    /// Short name of the kind, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Primitive(_) => "primitive",
            TypeKind::Object => "object",
            TypeKind::Dynamic => "dynamic",
            TypeKind::Function(_) => "function",
            TypeKind::Struct(_) => "struct",
            TypeKind::Pointer { .. } => "pointer",
            TypeKind::Lifted { .. } => "lifted",
        }
    }
}

/// A registered type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub qn: QualifiedName,
    pub kind: TypeKind,
    /// Direct supertype; `None` only for the universal root.
    pub base: Option<TypeId>,
}

impl TypeDescriptor {
    pub fn new(qn: QualifiedName, kind: TypeKind, base: Option<TypeId>) -> Self {
        Self { qn, kind, base }
    }

    /// Identity-comparable type.
    pub fn is_reference(&self) -> bool {
        matches!(self.kind, TypeKind::Object)
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match &self.kind {
            TypeKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match &self.kind {
            TypeKind::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self.kind {
            TypeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Name used in diagnostics.
    pub fn human_name(&self) -> String {
        self.qn.human_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_aligns_to_field_size() {
        let layout = calc_layout("S", [("a", 4), ("b", 1), ("c", 8)]).unwrap();
        assert_eq!(layout.offsets, vec![0, 4, 8]);
        assert_eq!(layout.size, 16);
    }

    #[test]
    fn layout_packs_small_fields() {
        let layout = calc_layout("S", [("a", 1), ("b", 1), ("c", 4), ("d", 1)]).unwrap();
        assert_eq!(layout.offsets, vec![0, 1, 4, 8]);
        // no trailing padding
        assert_eq!(layout.size, 9);
    }

    #[test]
    fn empty_struct_has_no_size() {
        let layout = calc_layout("S", Vec::<(&str, u32)>::new()).unwrap();
        assert!(layout.offsets.is_empty());
        assert_eq!(layout.size, 0);
    }

    #[test]
    fn zero_sized_field_is_rejected() {
        let err = calc_layout("S", [("a", 4), ("v", 0)]).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::InvalidLayout { ref field, .. } if field == "v"
        ));
    }

    #[test]
    fn primitive_sizes() {
        assert_eq!(Primitive::I32.size(), Some(4));
        assert_eq!(Primitive::F64.size(), Some(8));
        assert_eq!(Primitive::Bool.size(), Some(1));
        assert_eq!(Primitive::Str.size(), Some(WORD_SIZE));
        assert_eq!(Primitive::Void.size(), None);
    }

    #[test]
    fn struct_offset_lookup() {
        let st = StructType {
            fields: vec![Field::new("x", TypeId::new(1)), Field::new("y", TypeId::new(2))],
            layout: StructLayout {
                offsets: vec![0, 8],
                size: 16,
            },
        };
        assert_eq!(st.offset_of("y"), Some(8));
        assert_eq!(st.offset_of("z"), None);
        assert_eq!(st.field("x").map(|f| f.ty), Some(TypeId::new(1)));
    }
}
