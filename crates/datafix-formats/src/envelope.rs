//! Persisted payload envelope: `(version, body)`.
//!
//! The version is part of the envelope, never part of the body. The
//! migration engine itself neither parses nor writes envelopes; hosts use
//! these helpers at the adapter boundary. Versions are raw `u32` here —
//! wrapping them into the engine's `DataVersion` happens on the host side.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::node::Node;

/// Errors from envelope reading and writing.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("envelope is not an object: {0}")]
    NotAnObject(String),

    #[error("envelope is missing the 'version' field")]
    MissingVersion,

    #[error("envelope is missing the 'body' field")]
    MissingBody,

    #[error("binary envelope encoding failed: {0}")]
    Encode(String),

    #[error("binary envelope decoding failed: {0}")]
    Decode(String),
}

/// Wraps a JSON body into a `{"version": N, "body": …}` envelope.
pub fn write_json(version: u32, body: &Value) -> Value {
    json!({
        "version": version,
        "body": body,
    })
}

/// Splits a JSON envelope into `(version, body)`.
pub fn read_json(envelope: &Value) -> Result<(u32, Value), EnvelopeError> {
    let object = envelope
        .as_object()
        .ok_or_else(|| EnvelopeError::NotAnObject(envelope.to_string()))?;
    let version = object
        .get("version")
        .and_then(Value::as_u64)
        .ok_or(EnvelopeError::MissingVersion)? as u32;
    let body = object.get("body").ok_or(EnvelopeError::MissingBody)?.clone();
    Ok((version, body))
}

#[derive(Debug, Serialize, Deserialize)]
struct BinaryEnvelope {
    version: u32,
    body: Node,
}

/// Serializes a `(version, body)` envelope to bytes.
pub fn write_binary(version: u32, body: &Node) -> Result<Vec<u8>, EnvelopeError> {
    let envelope = BinaryEnvelope {
        version,
        body: body.clone(),
    };
    bincode::serde::encode_to_vec(&envelope, bincode::config::standard())
        .map_err(|e| EnvelopeError::Encode(e.to_string()))
}

/// Deserializes a binary envelope back into `(version, body)`.
pub fn read_binary(bytes: &[u8]) -> Result<(u32, Node), EnvelopeError> {
    let (envelope, _): (BinaryEnvelope, usize) =
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| EnvelopeError::Decode(e.to_string()))?;
    Ok((envelope.version, envelope.body))
}
