#![deny(missing_docs)]

//! # texplore-core — Schema-Driven Type System for the Thrift Explorer
//!
//! This crate is the algorithmic heart of the explorer. It sits between
//! "untyped structured input" (nested maps/lists/scalars parsed from JSON)
//! and "the strongly-typed values a remote Thrift call actually requires",
//! and it owns the mirror image on the way back.
//!
//! ## Design Principles
//!
//! 1. **Closed tagged unions, exhaustive matching.** Every type a schema can
//!    express is one variant of [`TypeDescriptor`]; the validation engine and
//!    the value translator match exhaustively, so a new variant cannot be
//!    silently unhandled anywhere.
//!
//! 2. **Name-indirection for struct descriptors.** A struct may reference its
//!    own type in its schema. [`TypeDescriptor::Struct`] therefore holds only
//!    the struct's name; definitions live in a per-schema [`StructTable`] and
//!    are resolved lazily during validation and translation.
//!
//! 3. **The registry is a value, not a singleton.** [`SchemaRegistry`] is
//!    built once at startup from loader output and passed by `Arc` into every
//!    request handler. No writer exists after construction.
//!
//! 4. **Pure, synchronous recursion.** Nothing in this crate performs I/O or
//!    holds shared mutable state. Validation and translation are bounded by
//!    input tree size, not by any resource pool.
//!
//! 5. **Structured errors with `thiserror`.** No `Box<dyn Error>`, no
//!    `.unwrap()` outside tests. Field validation errors accumulate; only
//!    structural lookup errors short-circuit.

pub mod descriptor;
pub mod error;
pub mod extract;
pub mod native;
pub mod raw;
pub mod registry;
pub mod translate;
pub mod validate;
pub mod value;

// Re-export primary types at crate root for ergonomic imports.
pub use descriptor::{
    EnumDescriptor, FieldDescriptor, OperationDescriptor, PrimitiveKind, SchemaDescriptor,
    ServiceDescriptor, StructDescriptor, StructTable, TypeDescriptor,
};
pub use error::{ErrorCode, ExtractError, RequestError, TranslateError};
pub use extract::extract_schema;
pub use native::{NativeField, NativeValue};
pub use raw::{RawField, RawOperation, RawResult, RawSchema, RawService, RawType};
pub use registry::{SchemaRegistry, ServiceListing};
pub use translate::{from_native, to_native, translate_args};
pub use validate::validate_value;
pub use value::{Value, ValueKind};
