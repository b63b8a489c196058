//! # texplore-wire — Thrift Wire Transport
//!
//! The transport collaborator: given a host, a port, and a protocol/framing
//! selection, performs one network call identified by operation name and a
//! list of native argument values, returning either a native success value,
//! a native declared-error value, or a transport-level failure distinct from
//! both.
//!
//! The interesting part lives in [`codec`]: because the explorer has no
//! generated client types, argument structs are written and result structs
//! read *dynamically*, driven by the core's type descriptors. The `thrift`
//! crate supplies the protocol encodings (binary, compact) and the framing
//! (buffered, framed); this crate never touches bytes directly.
//!
//! The client is deliberately thin: one synchronous call per invocation,
//! connect and request timing measured around it, no retries, no pooling.
//! Callers that must not block (the HTTP surface) wrap it in
//! `spawn_blocking`.

pub mod codec;
pub mod error;
pub mod options;

mod client;

pub use client::call;
pub use error::{CallOutcome, WireError, WireResponse};
pub use options::{Endpoint, InvalidProtocol, InvalidTransport, Protocol, Transport};
