//! # Type Descriptor Model
//!
//! Immutable recursive descriptors for every type a Thrift schema can
//! express: primitive scalars, enumerations, lists/sets, maps, and named
//! structs (declared exception types are plain structs here).
//!
//! Struct references use name-indirection: [`TypeDescriptor::Struct`] carries
//! only the struct's name, and definitions live in a [`StructTable`] owned by
//! the enclosing [`SchemaDescriptor`]. Self-referential struct definitions
//! (a tree node holding a list of its own type) are therefore representable
//! with finite descriptor trees; a single *value* tree is always finite, so
//! recursion over values terminates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The eight Thrift base types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// `bool`
    Bool,
    /// `byte` / `i8`
    Byte,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `double`
    Double,
    /// `string`
    String,
    /// `binary`
    Binary,
}

impl PrimitiveKind {
    /// Human-readable name used in validation messages, e.g.
    /// `"32 bit integer"`.
    pub fn display_name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::I16 => "16 bit integer",
            PrimitiveKind::I32 => "32 bit integer",
            PrimitiveKind::I64 => "64 bit integer",
            PrimitiveKind::Double => "float",
            PrimitiveKind::String => "string",
            PrimitiveKind::Binary => "binary",
        }
    }

    /// Inclusive bounds for the signed integer widths, `None` for the
    /// non-integer kinds.
    pub fn integer_bounds(self) -> Option<(i128, i128)> {
        match self {
            PrimitiveKind::Byte => Some((i8::MIN as i128, i8::MAX as i128)),
            PrimitiveKind::I16 => Some((i16::MIN as i128, i16::MAX as i128)),
            PrimitiveKind::I32 => Some((i32::MIN as i128, i32::MAX as i128)),
            PrimitiveKind::I64 => Some((i64::MIN as i128, i64::MAX as i128)),
            _ => None,
        }
    }
}

/// A Thrift enum: two total, mutually-inverse mappings between symbolic
/// names and their integer codes.
///
/// The extractor verifies the inverse-mapping invariant at construction;
/// downstream code may rely on `names_to_values.len() ==
/// values_to_names.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    /// The enum's declared name.
    pub name: String,
    /// Symbolic name → integer code.
    pub names_to_values: BTreeMap<String, i32>,
    /// Integer code → symbolic name.
    pub values_to_names: BTreeMap<i32, String>,
}

/// A recursive descriptor for one schema type.
///
/// This is a closed union: the validation engine and the value translator
/// match on it exhaustively, so adding a variant forces every consumer to
/// handle it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// One of the eight base types.
    Primitive(PrimitiveKind),
    /// A named enumeration with its symbol table.
    Enum(EnumDescriptor),
    /// `list<T>` — ordered homogeneous collection.
    List(Box<TypeDescriptor>),
    /// `set<T>` — unordered homogeneous collection, deduplicated by equality.
    Set(Box<TypeDescriptor>),
    /// `map<K, V>` — key and value independently typed.
    Map(Box<TypeDescriptor>, Box<TypeDescriptor>),
    /// A named struct or exception, by indirection into the schema's
    /// [`StructTable`].
    Struct(String),
}

/// One named, positionally-identified, typed slot within a struct or an
/// operation's argument/result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// On-wire positional identity, unique within the owning field sequence.
    pub field_id: i16,
    /// The only externally meaningful identity for input/output value trees.
    pub name: String,
    /// The field's type.
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// Whether the field must be present in a request.
    pub required: bool,
}

/// A named, fixed-shape record type. Declared exception types use the same
/// representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDescriptor {
    /// The struct's declared name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

/// Struct definitions for one schema file, keyed by struct name.
///
/// [`TypeDescriptor::Struct`] resolves against this table lazily during
/// validation and translation.
pub type StructTable = BTreeMap<String, StructDescriptor>;

/// One callable operation of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// The operation's name.
    pub name: String,
    /// Argument fields in declaration order.
    pub args: Vec<FieldDescriptor>,
    /// Result variants: empty for void, the `success` entry (field id 0)
    /// first when present, then one entry per declared error variant. At
    /// most one variant is populated in any real response.
    pub results: Vec<FieldDescriptor>,
}

impl OperationDescriptor {
    /// The success result variant, if the operation returns a value.
    pub fn success(&self) -> Option<&FieldDescriptor> {
        self.results.iter().find(|r| r.field_id == 0)
    }

    /// The declared error variants (every result entry except `success`).
    pub fn declared_errors(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.results.iter().filter(|r| r.field_id != 0)
    }
}

/// One service of a schema file: its operations, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Name of the schema file this service came from.
    pub schema_file: String,
    /// The service's declared name.
    pub name: String,
    /// Operations keyed by name.
    pub operations: BTreeMap<String, OperationDescriptor>,
}

impl ServiceDescriptor {
    /// Operation names in sorted order, for listings.
    pub fn operation_names(&self) -> Vec<String> {
        self.operations.keys().cloned().collect()
    }
}

/// Everything extracted from one schema file: its struct definitions and
/// its services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Name of the schema file.
    pub schema_file: String,
    /// Struct and exception definitions, keyed by name.
    pub structs: StructTable,
    /// Services keyed by name.
    pub services: BTreeMap<String, ServiceDescriptor>,
}
