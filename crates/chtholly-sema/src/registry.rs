//! Type registry: the arena that owns every type descriptor.
//!
//! All types live in one `Vec<TypeDesc>`; everything else refers to them by
//! [`TypeId`]. Primitives are interned at construction, references, arrays
//! and function types by structural key on demand, and nominal types
//! (structs, classes, enums) by name at their declaration site. Because
//! construction always goes through the interner, two types are equal
//! exactly when their ids are equal.

use std::collections::HashMap;

/// Index of a type descriptor in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

/// A resolved field of a struct or class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeId,
    pub mutable: bool,
}

/// A resolved enum variant with its payload types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDef {
    pub name: String,
    pub payload: Vec<TypeId>,
}

/// A function or method signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionSig {
    pub params: Vec<TypeId>,
    pub ret: TypeId,
}

/// A type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDesc {
    Int { bits: u8, signed: bool },
    Float { bits: u8 },
    Bool,
    Char,
    Str,
    Void,
    /// Poison type: the result of a failed check. Compatible with
    /// everything so one error does not cascade.
    Unknown,
    /// `&T` / `&mut T`. The lifetime of a reference is tracked per borrow
    /// site and per binding, not in the descriptor, so that references to
    /// the same type from different scopes stay assignment-compatible.
    Reference { inner: TypeId, mutable: bool },
    Array { element: TypeId, len: u64 },
    DynArray { element: TypeId },
    Struct { name: String, fields: Vec<FieldDef> },
    Class {
        name: String,
        fields: Vec<FieldDef>,
        methods: Vec<(String, FunctionSig)>,
    },
    Enum { name: String, variants: Vec<VariantDef> },
    Function(FunctionSig),
    /// A method value produced by member access: the signature bound to
    /// its defining class.
    Method { class: TypeId, sig: FunctionSig },
}

/// Owns and interns all type descriptors.
pub struct TypeRegistry {
    types: Vec<TypeDesc>,

    // Cached ids of the pre-populated primitives
    unknown: TypeId,
    void: TypeId,
    bool_: TypeId,
    char_: TypeId,
    string: TypeId,
    i32_: TypeId,
    f64_: TypeId,

    primitives: HashMap<&'static str, TypeId>,
    ref_cache: HashMap<(TypeId, bool), TypeId>,
    array_cache: HashMap<(TypeId, u64), TypeId>,
    dyn_array_cache: HashMap<TypeId, TypeId>,
    fn_cache: HashMap<FunctionSig, TypeId>,
    nominals: HashMap<String, TypeId>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            types: Vec::new(),
            unknown: TypeId(0),
            void: TypeId(0),
            bool_: TypeId(0),
            char_: TypeId(0),
            string: TypeId(0),
            i32_: TypeId(0),
            f64_: TypeId(0),
            primitives: HashMap::new(),
            ref_cache: HashMap::new(),
            array_cache: HashMap::new(),
            dyn_array_cache: HashMap::new(),
            fn_cache: HashMap::new(),
            nominals: HashMap::new(),
        };
        registry.populate_primitives();
        registry
    }

    fn populate_primitives(&mut self) {
        self.unknown = self.push(TypeDesc::Unknown);
        self.void = self.push(TypeDesc::Void);
        self.bool_ = self.push(TypeDesc::Bool);
        self.char_ = self.push(TypeDesc::Char);
        self.string = self.push(TypeDesc::Str);

        let ints: [(&'static str, u8, bool); 8] = [
            ("i8", 8, true),
            ("i16", 16, true),
            ("i32", 32, true),
            ("i64", 64, true),
            ("u8", 8, false),
            ("u16", 16, false),
            ("u32", 32, false),
            ("u64", 64, false),
        ];
        for (name, bits, signed) in ints {
            let id = self.push(TypeDesc::Int { bits, signed });
            self.primitives.insert(name, id);
        }
        self.i32_ = self.primitives["i32"];

        let f32_ = self.push(TypeDesc::Float { bits: 32 });
        let f64_ = self.push(TypeDesc::Float { bits: 64 });
        self.f64_ = f64_;
        self.primitives.insert("f32", f32_);
        self.primitives.insert("f64", f64_);

        self.primitives.insert("bool", self.bool_);
        self.primitives.insert("char", self.char_);
        self.primitives.insert("string", self.string);
        self.primitives.insert("void", self.void);
    }

    fn push(&mut self, desc: TypeDesc) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(desc);
        id
    }

    pub fn get(&self, id: TypeId) -> &TypeDesc {
        &self.types[id.0 as usize]
    }

    // === Pre-populated primitives ===

    pub fn unknown(&self) -> TypeId {
        self.unknown
    }

    pub fn void(&self) -> TypeId {
        self.void
    }

    pub fn bool_(&self) -> TypeId {
        self.bool_
    }

    pub fn char_(&self) -> TypeId {
        self.char_
    }

    pub fn string(&self) -> TypeId {
        self.string
    }

    pub fn i32_(&self) -> TypeId {
        self.i32_
    }

    pub fn f64_(&self) -> TypeId {
        self.f64_
    }

    /// Resolve a built-in primitive name (`i8`..`u64`, `f32`, `f64`,
    /// `bool`, `char`, `string`, `void`).
    pub fn primitive(&self, name: &str) -> Option<TypeId> {
        self.primitives.get(name).copied()
    }

    // === Interning ===

    pub fn intern_reference(&mut self, inner: TypeId, mutable: bool) -> TypeId {
        if let Some(&id) = self.ref_cache.get(&(inner, mutable)) {
            return id;
        }
        let id = self.push(TypeDesc::Reference { inner, mutable });
        self.ref_cache.insert((inner, mutable), id);
        id
    }

    pub fn intern_array(&mut self, element: TypeId, len: u64) -> TypeId {
        if let Some(&id) = self.array_cache.get(&(element, len)) {
            return id;
        }
        let id = self.push(TypeDesc::Array { element, len });
        self.array_cache.insert((element, len), id);
        id
    }

    pub fn intern_dyn_array(&mut self, element: TypeId) -> TypeId {
        if let Some(&id) = self.dyn_array_cache.get(&element) {
            return id;
        }
        let id = self.push(TypeDesc::DynArray { element });
        self.dyn_array_cache.insert(element, id);
        id
    }

    pub fn intern_function(&mut self, sig: FunctionSig) -> TypeId {
        if let Some(&id) = self.fn_cache.get(&sig) {
            return id;
        }
        let id = self.push(TypeDesc::Function(sig.clone()));
        self.fn_cache.insert(sig, id);
        id
    }

    /// Methods are not deduplicated; each member-access site gets a fresh
    /// descriptor binding the signature to its class.
    pub fn intern_method(&mut self, class: TypeId, sig: FunctionSig) -> TypeId {
        self.push(TypeDesc::Method { class, sig })
    }

    /// Register a nominal type. Returns `None` when the name is taken.
    pub fn declare_nominal(&mut self, name: &str, desc: TypeDesc) -> Option<TypeId> {
        if self.nominals.contains_key(name) {
            return None;
        }
        let id = self.push(desc);
        self.nominals.insert(name.to_string(), id);
        Some(id)
    }

    pub fn lookup_nominal(&self, name: &str) -> Option<TypeId> {
        self.nominals.get(name).copied()
    }

    /// Attach method signatures to an already-registered class. Signatures
    /// may mention the class's own name, so they are resolved after the
    /// nominal exists and patched in here.
    pub fn set_class_methods(&mut self, id: TypeId, methods: Vec<(String, FunctionSig)>) {
        if let TypeDesc::Class {
            methods: slot, ..
        } = &mut self.types[id.0 as usize]
        {
            *slot = methods;
        }
    }

    // === Predicates ===

    /// Copy semantics: strings, dynamic arrays and all nominal types move;
    /// everything else (primitives, references, fixed arrays, functions)
    /// copies.
    pub fn is_copy(&self, id: TypeId) -> bool {
        !matches!(
            self.get(id),
            TypeDesc::Str
                | TypeDesc::DynArray { .. }
                | TypeDesc::Struct { .. }
                | TypeDesc::Class { .. }
                | TypeDesc::Enum { .. }
        )
    }

    pub fn is_integer(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeDesc::Int { .. })
    }

    pub fn is_float(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeDesc::Float { .. })
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        self.is_integer(id) || self.is_float(id)
    }

    pub fn is_unknown(&self, id: TypeId) -> bool {
        id == self.unknown
    }

    pub fn is_aggregate(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeDesc::Struct { .. } | TypeDesc::Class { .. })
    }

    /// Whether a value of type `found` can be stored where `expected` is
    /// required. Interning makes this id equality; the unknown type is
    /// compatible in both directions to stop error cascades.
    pub fn assignable(&self, expected: TypeId, found: TypeId) -> bool {
        expected == found || self.is_unknown(expected) || self.is_unknown(found)
    }

    /// Result type of an arithmetic operation, or `None` when the operand
    /// types do not combine. Equal numeric types keep their type; mixing an
    /// integer with a float coerces to the float.
    pub fn arith_result(&self, left: TypeId, right: TypeId) -> Option<TypeId> {
        if self.is_unknown(left) {
            return Some(right);
        }
        if self.is_unknown(right) {
            return Some(left);
        }
        if !self.is_numeric(left) || !self.is_numeric(right) {
            return None;
        }
        if left == right {
            return Some(left);
        }
        if self.is_integer(left) && self.is_float(right) {
            return Some(right);
        }
        if self.is_float(left) && self.is_integer(right) {
            return Some(left);
        }
        None
    }

    /// Render a type for messages.
    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeDesc::Int { bits, signed } => {
                format!("{}{}", if *signed { "i" } else { "u" }, bits)
            }
            TypeDesc::Float { bits } => format!("f{}", bits),
            TypeDesc::Bool => "bool".to_string(),
            TypeDesc::Char => "char".to_string(),
            TypeDesc::Str => "string".to_string(),
            TypeDesc::Void => "void".to_string(),
            TypeDesc::Unknown => "<unknown>".to_string(),
            TypeDesc::Reference { inner, mutable } => {
                if *mutable {
                    format!("&mut {}", self.display(*inner))
                } else {
                    format!("&{}", self.display(*inner))
                }
            }
            TypeDesc::Array { element, len } => format!("{}[{}]", self.display(*element), len),
            TypeDesc::DynArray { element } => format!("{}[]", self.display(*element)),
            TypeDesc::Struct { name, .. }
            | TypeDesc::Class { name, .. }
            | TypeDesc::Enum { name, .. } => name.clone(),
            TypeDesc::Function(sig) | TypeDesc::Method { sig, .. } => {
                let params: Vec<String> = sig.params.iter().map(|p| self.display(*p)).collect();
                format!("fn({}): {}", params.join(", "), self.display(sig.ret))
            }
        }
    }
}
