use std::fmt;

use thiserror::Error;

/// Transport operation that failed during a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStep {
    Resolve,
    Connect,
    Send,
    Receive,
    Close,
}

impl TransportStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportStep::Resolve => "resolve",
            TransportStep::Connect => "connect",
            TransportStep::Send => "send",
            TransportStep::Receive => "receive",
            TransportStep::Close => "close",
        }
    }
}

impl fmt::Display for TransportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON type a field was required to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    String,
    Number,
    Array,
    Object,
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonKind::String => "string",
            JsonKind::Number => "number",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// Everything that can end a single transaction without a reading.
///
/// None of these stop the worker: the loop reports them and goes back to
/// waiting for the next trigger.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("request needs {required} bytes but the request buffer holds {capacity}")]
    BufferOverflow { required: usize, capacity: usize },

    #[error("transport {step} failed: {source}")]
    Transport {
        step: TransportStep,
        #[source]
        source: std::io::Error,
    },

    #[error("no JSON object start found in {scanned} received bytes")]
    PayloadNotFound { scanned: usize },

    #[error("payload is not valid JSON: {0}")]
    ParseFailure(#[from] serde_json::Error),

    #[error("field '{0}' is missing from the weather payload")]
    FieldMissing(&'static str),

    #[error("field '{field}' has the wrong type, expected {expected}")]
    FieldTypeMismatch {
        field: &'static str,
        expected: JsonKind,
    },
}

impl TransactionError {
    pub(crate) fn transport(step: TransportStep, source: std::io::Error) -> Self {
        TransactionError::Transport { step, source }
    }

    /// Name of the offending field for extraction errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            TransactionError::FieldMissing(field)
            | TransactionError::FieldTypeMismatch { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_names_the_step() {
        let err = TransactionError::transport(
            TransportStep::Connect,
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        );
        assert_eq!(err.to_string(), "transport connect failed: refused");
    }

    #[test]
    fn field_is_reported_for_extraction_errors_only() {
        let missing = TransactionError::FieldMissing("wind_dir");
        let mismatch = TransactionError::FieldTypeMismatch {
            field: "precip",
            expected: JsonKind::Number,
        };
        assert_eq!(missing.field(), Some("wind_dir"));
        assert_eq!(mismatch.field(), Some("precip"));
        assert!(mismatch.to_string().contains("expected number"));
        assert_eq!(TransactionError::PayloadNotFound { scanned: 4 }.field(), None);
    }
}
