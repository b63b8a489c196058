//! # Error Hierarchy
//!
//! Two disjoint request-error families share one wire shape
//! ([`RequestError`]): structural lookup failures are fatal and reported
//! alone, while field validation errors accumulate so a caller can fix a
//! request in one round trip. Extraction and translation failures are
//! internal `thiserror` enums and never reach the wire directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptor::FieldDescriptor;
use crate::value::ValueKind;

/// Machine-readable code for one request error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The named schema file is not loaded.
    ThriftNotLoaded,
    /// The schema file is loaded but does not declare the named service.
    ServiceNotInThrift,
    /// The service exists but does not declare the named operation.
    EndpointNotInService,
    /// A required argument is absent from the request body.
    RequiredFieldMissing,
    /// An argument is present but fails validation.
    FieldValidationError,
    /// The request envelope itself is malformed (bad host/port/protocol,
    /// non-object body).
    InvalidRequest,
}

/// One error in a rejected request, in the wire shape the HTTP surface
/// returns: `{code, message, field?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestError {
    /// Machine-readable code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// The offending argument's descriptor, for the two field-level codes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldDescriptor>,
}

impl RequestError {
    /// A fatal structural lookup error. Never combined with field errors.
    pub fn structural(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    /// A malformed-envelope error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InvalidRequest,
            message: message.into(),
            field: None,
        }
    }

    /// A required argument was absent from the request body.
    pub fn required_missing(field: &FieldDescriptor) -> Self {
        Self {
            code: ErrorCode::RequiredFieldMissing,
            message: format!("Required Field '{}' not found", field.name),
            field: Some(field.clone()),
        }
    }

    /// An argument was present but one of its leaves failed validation.
    pub fn field_invalid(field: &FieldDescriptor, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::FieldValidationError,
            message: message.into(),
            field: Some(field.clone()),
        }
    }
}

/// Failures while reconstructing descriptors from raw loader metadata.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// A named type reference matched neither a struct nor an enum.
    #[error("schema '{schema_file}' references unknown type '{name}'")]
    UnknownType {
        /// The schema file being extracted.
        schema_file: String,
        /// The unresolved name.
        name: String,
    },

    /// Two fields in one struct or argument list share a field id.
    #[error("duplicate field id {field_id} in '{owner}'")]
    DuplicateFieldId {
        /// The struct name or `Service.operation` owning the sequence.
        owner: String,
        /// The repeated id.
        field_id: i16,
    },

    /// An enum's symbol table is not invertible (a duplicate name or a
    /// duplicate code).
    #[error("enum '{name}' has a non-inverse symbol table: duplicate {kind} '{symbol}'")]
    EnumNotInvertible {
        /// The enum's name.
        name: String,
        /// `"name"` or `"value"`.
        kind: &'static str,
        /// The duplicated symbol or code, rendered as text.
        symbol: String,
    },
}

/// Failures while converting a validated value tree into native form.
///
/// Validation runs first, so these indicate a value that bypassed
/// validation (or drifted descriptors) rather than an operator mistake.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslateError {
    /// The value's shape does not fit the descriptor.
    #[error("cannot translate {got} into {expected}")]
    TypeMismatch {
        /// What the descriptor required.
        expected: &'static str,
        /// The shape actually supplied.
        got: ValueKind,
    },

    /// An integer does not fit the target width.
    #[error("integer {value} does not fit a {width}")]
    IntegerOutOfRange {
        /// Width name, e.g. `"32 bit integer"`.
        width: &'static str,
        /// The offending value.
        value: i128,
    },

    /// A numeric string failed to parse for an integer or float field.
    #[error("string '{input}' is not numeric")]
    NotNumeric {
        /// The offending input.
        input: String,
    },

    /// A value matched neither a symbolic name nor a code of the enum.
    #[error("value is not a member of enum '{enum_name}'")]
    UnknownEnumValue {
        /// The enum's name.
        enum_name: String,
    },

    /// A struct reference had no definition in the schema's table.
    #[error("struct '{0}' has no definition in this schema")]
    UnknownStruct(String),
}
