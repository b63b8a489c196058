//! # Native Values
//!
//! The strongly-typed representation the transport collaborator requires to
//! perform a call. Integer widths are exact, collections are homogeneous by
//! construction of the translator, and structs carry the declaration's
//! `(field id, name)` identity so a wire codec can emit fields positionally.
//!
//! Unlike [`Value`](crate::value::Value), this shape is self-describing: the
//! reverse translation dispatches on it without consulting descriptors.

/// One field of a native struct.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeField {
    /// On-wire positional identity.
    pub id: i16,
    /// Declared field name.
    pub name: String,
    /// The field's value; `None` marks a declared field the remote end left
    /// unset. Translation of a request omits absent optional fields
    /// entirely instead of producing `None` entries.
    pub value: Option<NativeValue>,
}

/// A strongly-typed value ready for (or produced by) the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// No value (void results, unset fields surfaced by the wire).
    Null,
    /// `bool`
    Bool(bool),
    /// `byte`
    Byte(i8),
    /// `i16`
    I16(i16),
    /// `i32` — also every enum value, normalized to its code.
    I32(i32),
    /// `i64`
    I64(i64),
    /// `double`
    Double(f64),
    /// `string`
    String(String),
    /// `binary`
    Binary(Vec<u8>),
    /// An ordered collection.
    List(Vec<NativeValue>),
    /// An unordered collection, deduplicated by equality.
    Set(Vec<NativeValue>),
    /// A keyed collection.
    Map(Vec<(NativeValue, NativeValue)>),
    /// A named record with its declared fields.
    Struct {
        /// The struct type's name.
        name: String,
        /// Fields in declaration order.
        fields: Vec<NativeField>,
    },
}

impl NativeValue {
    /// True for [`NativeValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null)
    }
}
