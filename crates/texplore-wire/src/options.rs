//! Protocol and framing selection.
//!
//! Names parse case-insensitively and accept both the bare form (`binary`)
//! and the class-name style (`TBinaryProtocol`) operators tend to paste from
//! other tooling. The original JSON protocol has no counterpart in the
//! `thrift` crate and is intentionally absent.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// The wire encoding for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Thrift binary protocol (strict mode).
    Binary,
    /// Thrift compact protocol.
    Compact,
}

/// The framing for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Buffered transport.
    Buffered,
    /// Framed transport (length-prefixed messages).
    Framed,
}

/// The parse failure for an unknown protocol name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid protocol")]
pub struct InvalidProtocol(pub String);

/// The parse failure for an unknown transport name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid transport")]
pub struct InvalidTransport(pub String);

impl FromStr for Protocol {
    type Err = InvalidProtocol;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "binary" | "tbinaryprotocol" => Ok(Protocol::Binary),
            "compact" | "tcompactprotocol" => Ok(Protocol::Compact),
            _ => Err(InvalidProtocol(input.to_string())),
        }
    }
}

impl FromStr for Transport {
    type Err = InvalidTransport;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "buffered" | "tbufferedtransport" => Ok(Transport::Buffered),
            "framed" | "tframedtransport" => Ok(Transport::Framed),
            _ => Err(InvalidTransport(input.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Protocol::Binary => "binary",
            Protocol::Compact => "compact",
        })
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transport::Buffered => "buffered",
            Transport::Framed => "framed",
        })
    }
}

/// Where and how to reach one remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Wire encoding.
    pub protocol: Protocol,
    /// Framing.
    pub transport: Transport,
}
