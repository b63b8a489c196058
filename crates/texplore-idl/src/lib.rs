//! # texplore-idl — Thrift IDL Loader
//!
//! The schema-source collaborator: turns a directory of `.thrift` files into
//! the raw metadata ([`texplore_core::RawSchema`]) and verbatim source text
//! the core's registry consumes. The core never sees schema source; this
//! crate never sees a descriptor.
//!
//! ## Supported subset
//!
//! `include`, `namespace` (ignored), `typedef` (aliases resolved at load),
//! `const` (values parsed and discarded), `enum` (implicit and explicit
//! values), `struct` / `exception`, `service` with `throws`, `oneway`, and
//! `void`; base types `bool byte i8 i16 i32 i64 double string binary` and
//! the `list<>` / `set<>` / `map<,>` containers. Service inheritance
//! (`extends`) is rejected with a parse error rather than silently dropped.
//!
//! Included files are loaded relative to the including file; their types
//! become visible both under their bare names and qualified by the included
//! file's stem (`Core.Location`).

pub mod error;
mod lexer;
mod loader;
mod parser;

pub use error::IdlError;
pub use loader::{load_schema_dir, load_schema_file};
