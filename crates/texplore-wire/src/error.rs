//! Transport-level failures and call outcomes.

use std::time::Duration;

use texplore_core::NativeValue;
use thiserror::Error;

/// What the remote end answered with.
///
/// A declared error variant is a legitimate response outcome, not a
/// failure: it surfaces as a response status equal to the variant's type
/// name with its structured body as data.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The success result ([`NativeValue::Null`] for void operations).
    Success(NativeValue),
    /// One of the operation's declared error variants.
    DeclaredError {
        /// The variant's type name, e.g. `NotFound`.
        name: String,
        /// The variant's structured body.
        value: NativeValue,
    },
}

/// One completed call with its timing.
#[derive(Debug, Clone, PartialEq)]
pub struct WireResponse {
    /// What came back.
    pub outcome: CallOutcome,
    /// Time to establish the TCP connection.
    pub time_to_connect: Duration,
    /// Time from the first request byte to the decoded response.
    pub time_to_make_request: Duration,
}

/// A transport-level failure, distinct from a declared error variant.
#[derive(Debug, Error)]
pub enum WireError {
    /// The connection could not be established. Carries no timing: the
    /// failure happened before any call was made.
    #[error("{0}")]
    Connect(String),

    /// The call itself failed mid-flight: protocol mismatch, the server
    /// missing the method, an unexpected disconnect.
    #[error("{0}")]
    Call(String),
}

impl From<thrift::Error> for WireError {
    fn from(err: thrift::Error) -> Self {
        WireError::Call(err.to_string())
    }
}
