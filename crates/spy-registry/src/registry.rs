//! SymbolRegistry - interning storage for types and functions.
//!
//! This module provides [`SymbolRegistry`], the per-compilation store of
//! every [`TypeDescriptor`] and [`FunctionEntry`]. Entries are addressed by
//! copyable handles ([`TypeId`], [`FuncId`]) and looked up by
//! [`QualifiedName`].
//!
//! # Interning
//!
//! A QN names at most one type and at most one function. Registering a type
//! whose QN is already taken returns the existing handle when the shape is
//! identical and fails with [`RegistrationError::DuplicateType`] otherwise.
//! Structs may be declared before they are defined, so that a field can
//! point back at its own struct:
//!
//! ```text
//! let node = registry.declare_struct(qn)?;          // incomplete
//! let next = registry.pointer_type(node)?;
//! registry.define_struct(node, vec![.., Field::new("next", next)])?;
//! ```
//!
//! Functions are never interned: a second function with the same QN is an
//! error. Fresh names come from [`unique_qn`](SymbolRegistry::unique_qn),
//! whose suffixes are monotonic and never reused.
//!
//! # Thread Safety
//!
//! `SymbolRegistry` is not thread-safe. It is owned by one compilation
//! context and passed by reference; parallel compilation would have to
//! partition work so that no two units register names under the same base.

use std::iter;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use spy_core::{
    Color, Field, FuncId, FuncParam, FunctionEntry, FunctionKind, FunctionType, InternalError,
    QualifiedName, RegistrationError, Segment, StructLayout, StructType, TypeDescriptor, TypeId,
    TypeKind, WORD_SIZE, calc_layout,
};

use crate::builtins::{self, Builtins};

/// Interning registry for type descriptors and functions.
#[derive(Debug)]
pub struct SymbolRegistry {
    /// Descriptors indexed by `TypeId`.
    types: Vec<TypeDescriptor>,
    types_by_name: FxHashMap<QualifiedName, TypeId>,
    /// Structs declared but not yet defined.
    incomplete: FxHashSet<TypeId>,

    /// Entries indexed by `FuncId`.
    functions: Vec<FunctionEntry>,
    functions_by_name: FxHashMap<QualifiedName, FuncId>,

    /// Next suffix to try, per base name.
    next_suffix: FxHashMap<QualifiedName, u32>,

    builtins: Builtins,
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolRegistry {
    /// Create a registry holding the builtin types.
    pub fn new() -> Self {
        let defs = builtins::definitions();
        let object = TypeId::new(0);
        let mut types = Vec::with_capacity(defs.len());
        let mut types_by_name = FxHashMap::default();
        let mut ids = [object; 10];
        for (i, def) in defs.into_iter().enumerate() {
            let id = TypeId::new(i as u32);
            let qn = def.qn();
            types_by_name.insert(qn.clone(), id);
            types.push(TypeDescriptor::new(qn, def.kind, def.rooted.then_some(object)));
            ids[i] = id;
        }
        Self {
            types,
            types_by_name,
            incomplete: FxHashSet::default(),
            functions: Vec::new(),
            functions_by_name: FxHashMap::default(),
            next_suffix: FxHashMap::default(),
            builtins: builtins::from_ids(&ids),
        }
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    // ==========================================================================
    // Type Lookup
    // ==========================================================================

    /// Get a descriptor by handle.
    pub fn get(&self, id: TypeId) -> Option<&TypeDescriptor> {
        self.types.get(id.index())
    }

    /// Get a descriptor, treating an unknown handle as an upstream defect.
    pub fn descriptor(&self, id: TypeId) -> Result<&TypeDescriptor, InternalError> {
        self.get(id).ok_or(InternalError::UnknownType(id.raw()))
    }

    /// Get a type by qualified name.
    pub fn lookup_type(&self, qn: &QualifiedName) -> Option<TypeId> {
        self.types_by_name.get(qn).copied()
    }

    /// Get a type by the text of its qualified name.
    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        let qn = QualifiedName::parse(name).ok()?;
        self.lookup_type(&qn)
    }

    pub fn qn_of(&self, id: TypeId) -> Result<&QualifiedName, InternalError> {
        Ok(&self.descriptor(id)?.qn)
    }

    /// Name of a type as shown in diagnostics.
    pub fn human_name(&self, id: TypeId) -> Result<String, InternalError> {
        Ok(self.descriptor(id)?.human_name())
    }

    /// The function shape of a function type.
    pub fn function_shape(&self, id: TypeId) -> Result<&FunctionType, InternalError> {
        let desc = self.descriptor(id)?;
        desc.as_function()
            .ok_or_else(|| InternalError::UnsupportedTypeKind {
                type_name: desc.qn.to_string(),
                reason: format!("expected a function type, found {}", desc.kind.name()),
            })
    }

    /// Number of registered types, builtins included.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// All registered types in registration order.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &TypeDescriptor)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, desc)| (TypeId::new(i as u32), desc))
    }

    // ==========================================================================
    // Type Registration
    // ==========================================================================

    fn check(&self, id: TypeId) -> Result<(), RegistrationError> {
        match self.get(id) {
            Some(_) => Ok(()),
            None => Err(RegistrationError::UnknownType(id.raw())),
        }
    }

    /// Register a type, or return the existing one with the same name and shape.
    ///
    /// `base` defaults to the universal root.
    pub fn register_type(
        &mut self,
        qn: QualifiedName,
        kind: TypeKind,
        base: Option<TypeId>,
    ) -> Result<TypeId, RegistrationError> {
        let base = base.unwrap_or(self.builtins.object);
        self.check(base)?;
        if let Some(existing) = self.lookup_type(&qn) {
            let desc = &self.types[existing.index()];
            if desc.kind == kind && desc.base == Some(base) {
                return Ok(existing);
            }
            return Err(RegistrationError::DuplicateType(qn.to_string()));
        }
        let id = TypeId::new(self.types.len() as u32);
        debug!(qn = %qn, kind = kind.name(), "registered type");
        self.types_by_name.insert(qn.clone(), id);
        self.types.push(TypeDescriptor::new(qn, kind, Some(base)));
        Ok(id)
    }

    /// Function type `builtins::def[p0, ..., r]`, or `builtins::blue_def[...]`
    /// for blue functions.
    ///
    /// Function types are interned by color, parameter and return types;
    /// parameter names come from the first registration.
    pub fn function_type(
        &mut self,
        params: Vec<FuncParam>,
        ret: TypeId,
        color: Color,
    ) -> Result<TypeId, RegistrationError> {
        let mut qualifiers = Vec::with_capacity(params.len() + 1);
        for param in &params {
            self.check(param.ty)?;
            qualifiers.push(self.types[param.ty.index()].qn.clone());
        }
        self.check(ret)?;
        qualifiers.push(self.types[ret.index()].qn.clone());
        let qn = QualifiedName::new([
            Segment::new(spy_core::ROOT_MODULE),
            Segment::with_qualifiers(def_name(color), qualifiers),
        ]);

        if let Some(existing) = self.lookup_type(&qn) {
            return match self.types[existing.index()].as_function() {
                Some(_) => Ok(existing),
                None => Err(RegistrationError::DuplicateType(qn.to_string())),
            };
        }
        self.register_type(qn, TypeKind::Function(FunctionType { params, ret, color }), None)
    }

    /// Pointer type `unsafe::ptr[item]`.
    pub fn pointer_type(&mut self, item: TypeId) -> Result<TypeId, RegistrationError> {
        self.check(item)?;
        let qn = QualifiedName::new([
            Segment::new("unsafe"),
            Segment::with_qualifiers("ptr", vec![self.types[item.index()].qn.clone()]),
        ]);
        self.register_type(qn, TypeKind::Pointer { item }, None)
    }

    /// Struct type with fields in declaration order; the layout is computed here.
    ///
    /// Defines the struct if `qn` was only declared.
    pub fn struct_type(
        &mut self,
        qn: QualifiedName,
        fields: Vec<Field>,
    ) -> Result<TypeId, RegistrationError> {
        if let Some(id) = self.lookup_type(&qn).filter(|id| self.incomplete.contains(id)) {
            self.define_struct(id, fields)?;
            return Ok(id);
        }
        let st = self.layout_struct(&qn, fields)?;
        self.register_type(qn, TypeKind::Struct(st), None)
    }

    /// Declare a struct without fields yet.
    ///
    /// The struct can be pointed to right away but has no size, so it
    /// cannot be a by-value field until [`define_struct`](Self::define_struct)
    /// is called. Declaring an existing struct returns it.
    pub fn declare_struct(&mut self, qn: QualifiedName) -> Result<TypeId, RegistrationError> {
        if let Some(existing) = self.lookup_type(&qn) {
            return match self.types[existing.index()].kind {
                TypeKind::Struct(_) => Ok(existing),
                _ => Err(RegistrationError::DuplicateType(qn.to_string())),
            };
        }
        let empty = StructType {
            fields: Vec::new(),
            layout: StructLayout::default(),
        };
        let id = self.register_type(qn, TypeKind::Struct(empty), None)?;
        self.incomplete.insert(id);
        Ok(id)
    }

    /// Give a declared struct its fields. Each struct is defined once.
    pub fn define_struct(&mut self, id: TypeId, fields: Vec<Field>) -> Result<(), RegistrationError> {
        self.check(id)?;
        let qn = self.types[id.index()].qn.clone();
        if !self.incomplete.contains(&id) {
            return Err(RegistrationError::DuplicateType(qn.to_string()));
        }
        let st = self.layout_struct(&qn, fields)?;
        debug!(qn = %qn, fields = st.fields.len(), "defined struct");
        self.types[id.index()].kind = TypeKind::Struct(st);
        self.incomplete.remove(&id);
        Ok(())
    }

    /// False for a struct that was declared but not defined.
    pub fn is_complete(&self, id: TypeId) -> bool {
        !self.incomplete.contains(&id)
    }

    fn layout_struct(
        &self,
        qn: &QualifiedName,
        fields: Vec<Field>,
    ) -> Result<StructType, RegistrationError> {
        let type_name = qn.to_string();
        let mut sizes = Vec::with_capacity(fields.len());
        for field in &fields {
            self.check(field.ty)?;
            let size = self.sizeof(field.ty).ok_or_else(|| RegistrationError::InvalidLayout {
                type_name: type_name.clone(),
                field: field.name.clone(),
                reason: "has no fixed size".to_string(),
            })?;
            sizes.push((field.name.as_str(), size));
        }
        let layout = calc_layout(&type_name, sizes)?;
        Ok(StructType { fields, layout })
    }

    /// A distinct type represented as `underlying`.
    pub fn lifted_type(
        &mut self,
        qn: QualifiedName,
        underlying: TypeId,
    ) -> Result<TypeId, RegistrationError> {
        self.check(underlying)?;
        self.register_type(qn, TypeKind::Lifted { underlying }, None)
    }

    /// An identity-comparable class deriving from `base` (the root when `None`).
    pub fn reference_type(
        &mut self,
        qn: QualifiedName,
        base: Option<TypeId>,
    ) -> Result<TypeId, RegistrationError> {
        self.register_type(qn, TypeKind::Object, base)
    }

    // ==========================================================================
    // Type Relations
    // ==========================================================================

    /// `id` followed by its chain of supertypes.
    pub fn ancestors(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        iter::successors(Some(id), |t| self.get(*t).and_then(|d| d.base))
    }

    /// Whether a value of type `sub` can be used where `sup` is expected.
    ///
    /// Every type is a subtype of `dynamic`.
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        sup == self.builtins.dynamic || self.ancestors(sub).any(|t| t == sup)
    }

    /// Nearest type both `a` and `b` are subtypes of.
    pub fn common_ancestor(&self, a: TypeId, b: TypeId) -> Option<TypeId> {
        let dynamic = self.builtins.dynamic;
        if a == dynamic || b == dynamic {
            return Some(dynamic);
        }
        self.ancestors(a).find(|&anc| self.is_subtype(b, anc))
    }

    /// Identity-comparable type.
    pub fn is_reference(&self, id: TypeId) -> bool {
        self.get(id).is_some_and(TypeDescriptor::is_reference)
    }

    /// Storage size in bytes; `None` for types without a fixed size.
    pub fn sizeof(&self, id: TypeId) -> Option<u32> {
        match &self.get(id)?.kind {
            TypeKind::Primitive(p) => p.size(),
            TypeKind::Object | TypeKind::Pointer { .. } => Some(WORD_SIZE),
            TypeKind::Lifted { underlying } => self.sizeof(*underlying),
            TypeKind::Struct(_) if self.incomplete.contains(&id) => None,
            TypeKind::Struct(st) => Some(st.layout.size),
            TypeKind::Dynamic | TypeKind::Function(_) => None,
        }
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    /// Register a function; each QN can be registered once.
    pub fn add_function(
        &mut self,
        qn: QualifiedName,
        func_type: TypeId,
        kind: FunctionKind,
    ) -> Result<FuncId, RegistrationError> {
        let desc = self
            .get(func_type)
            .ok_or(RegistrationError::UnknownType(func_type.raw()))?;
        if desc.as_function().is_none() {
            return Err(RegistrationError::NotAFunctionType(desc.qn.to_string()));
        }
        if self.functions_by_name.contains_key(&qn) {
            return Err(RegistrationError::DuplicateFunction(qn.to_string()));
        }
        let id = FuncId::new(self.functions.len() as u32);
        debug!(qn = %qn, ?kind, "registered function");
        self.functions_by_name.insert(qn.clone(), id);
        self.functions.push(FunctionEntry::new(qn, func_type, kind));
        Ok(id)
    }

    pub fn lookup_function(&self, qn: &QualifiedName) -> Option<FuncId> {
        self.functions_by_name.get(qn).copied()
    }

    pub fn function(&self, id: FuncId) -> Option<&FunctionEntry> {
        self.functions.get(id.index())
    }

    /// Get a function, treating an unknown handle as an upstream defect.
    pub fn function_entry(&self, id: FuncId) -> Result<&FunctionEntry, InternalError> {
        self.function(id).ok_or(InternalError::UnknownFunction(id.raw()))
    }

    /// Parameter and return types of a registered function.
    pub fn signature(&self, id: FuncId) -> Result<&FunctionType, InternalError> {
        let entry = self.function_entry(id)?;
        self.function_shape(entry.func_type)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    // ==========================================================================
    // Names
    // ==========================================================================

    /// `base` with a fresh suffix: `base#0`, `base#1`, ...
    ///
    /// Suffixes for a given base only ever increase, and names already taken
    /// by a type or function are skipped.
    pub fn unique_qn(&mut self, base: &QualifiedName) -> QualifiedName {
        let counter = self.next_suffix.entry(base.clone()).or_insert(0);
        loop {
            let candidate = base.with_suffix(counter.to_string());
            *counter += 1;
            if !self.functions_by_name.contains_key(&candidate)
                && !self.types_by_name.contains_key(&candidate)
            {
                return candidate;
            }
        }
    }
}

fn def_name(color: Color) -> &'static str {
    match color {
        Color::Red => "def",
        Color::Blue => "blue_def",
    }
}
