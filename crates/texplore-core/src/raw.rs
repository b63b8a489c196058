//! # Raw Schema Metadata
//!
//! The contract between the schema-source collaborator (the IDL loader) and
//! the [extractor](crate::extract). The core never parses schema source text
//! itself; it consumes this already-tokenized form.
//!
//! Named type references stay unresolved here — [`RawType::Named`] is looked
//! up against the schema's struct and enum tables during extraction.

use std::collections::BTreeMap;

use crate::descriptor::PrimitiveKind;

/// An unresolved type as the loader reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawType {
    /// A bare base-type code with no auxiliary metadata.
    Primitive(PrimitiveKind),
    /// A `list` code with one nested type.
    List(Box<RawType>),
    /// A `set` code with one nested type.
    Set(Box<RawType>),
    /// A `map` code with a (key, value) pair.
    Map(Box<RawType>, Box<RawType>),
    /// A reference to a named struct, exception, or enum declared in the
    /// same schema (includes already flattened by the loader).
    Named(String),
}

/// One field-level entry: an argument, a struct field, or a result variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    /// On-wire positional identity.
    pub id: i16,
    /// Declared name.
    pub name: String,
    /// Whether the declaration marked the field `required`.
    pub required: bool,
    /// The field's unresolved type.
    pub ty: RawType,
}

/// One result variant of an operation, with its error marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResult {
    /// The variant's field entry (`success` carries field id 0).
    pub field: RawField,
    /// True for entries originating from a `throws` clause.
    pub error: bool,
}

/// One callable operation as the loader reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOperation {
    /// The operation's name.
    pub name: String,
    /// Argument entries in declaration order.
    pub args: Vec<RawField>,
    /// Result variants, `success` first unless the operation is void.
    pub results: Vec<RawResult>,
}

/// One service as the loader reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawService {
    /// The service's declared name.
    pub name: String,
    /// Operations in declaration order.
    pub operations: Vec<RawOperation>,
}

/// Everything the loader reports for one schema file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSchema {
    /// Struct and exception definitions: name → field entries in
    /// declaration order.
    pub structs: BTreeMap<String, Vec<RawField>>,
    /// Enum definitions: name → (symbol, code) pairs in declaration order.
    pub enums: BTreeMap<String, Vec<(String, i32)>>,
    /// Service definitions keyed by name.
    pub services: BTreeMap<String, RawService>,
}
