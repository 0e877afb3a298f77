//! Finds and parses the JSON document inside a raw HTTP response.
//!
//! The response is not stripped of its status line or headers; the document
//! starts at the first `{` within the received bytes.

use serde_json::{Deserializer, Value};

use crate::error::TransactionError;

const JSON_START: u8 = b'{';

/// Offset of the first `{` in `received`.
///
/// Only the given slice is scanned, so callers pass exactly the valid bytes.
pub fn locate_payload(received: &[u8]) -> Result<usize, TransactionError> {
    received
        .iter()
        .position(|&b| b == JSON_START)
        .ok_or(TransactionError::PayloadNotFound {
            scanned: received.len(),
        })
}

/// Parsed JSON tree owned by the extraction step that requested it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    root: Value,
}

impl ParsedDocument {
    /// Parses the first JSON value in `bytes`, ignoring anything after it.
    pub fn parse(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut values = Deserializer::from_slice(bytes).into_iter::<Value>();
        match values.next() {
            Some(Ok(root)) => Ok(Self { root }),
            Some(Err(e)) => Err(TransactionError::ParseFailure(e)),
            // Only reachable for whitespace-only input.
            None => Err(TransactionError::PayloadNotFound { scanned: bytes.len() }),
        }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }
}

impl From<Value> for ParsedDocument {
    fn from(root: Value) -> Self {
        Self { root }
    }
}
