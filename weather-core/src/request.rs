//! Formats the weatherstack `current` request for a city.

use std::io::Write;

use crate::error::TransactionError;

const REQUEST_PREFIX: &str = "GET /current?access_key=";
const QUERY_PARAM: &str = "&query=";
const PROTOCOL_SUFFIX: &str = " HTTP/1.1\r\n";
const HOST_HEADER: &str = "Host: ";
const HEADER_END: &str = "\r\n\r\n";

/// Bytes of one request, never longer than the capacity they were built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMessage {
    bytes: Vec<u8>,
}

impl RequestMessage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Builds requests against a fixed host and access key.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    host: String,
    access_key: String,
    capacity: usize,
}

impl RequestBuilder {
    pub fn new(host: impl Into<String>, access_key: impl Into<String>, capacity: usize) -> Self {
        Self {
            host: host.into(),
            access_key: access_key.into(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Length the request for `city` would have.
    pub fn required_len(&self, city: &str) -> usize {
        REQUEST_PREFIX.len()
            + self.access_key.len()
            + QUERY_PARAM.len()
            + city.len()
            + PROTOCOL_SUFFIX.len()
            + HOST_HEADER.len()
            + self.host.len()
            + HEADER_END.len()
    }

    /// Formats the request line and host header for `city`.
    ///
    /// The city must already be safe to place in a query string.
    pub fn build(&self, city: &str) -> Result<RequestMessage, TransactionError> {
        let required = self.required_len(city);
        if required > self.capacity {
            return Err(TransactionError::BufferOverflow {
                required,
                capacity: self.capacity,
            });
        }

        let mut bytes = Vec::with_capacity(required);
        // Writing into a Vec cannot fail.
        let _ = write!(
            bytes,
            "{REQUEST_PREFIX}{}{QUERY_PARAM}{city}{PROTOCOL_SUFFIX}{HOST_HEADER}{}{HEADER_END}",
            self.access_key, self.host,
        );
        debug_assert_eq!(bytes.len(), required);

        Ok(RequestMessage { bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(capacity: usize) -> RequestBuilder {
        RequestBuilder::new("api.weatherstack.com", "KEY123", capacity)
    }

    #[test]
    fn builds_exact_wire_format() {
        let msg = builder(300).build("London").unwrap();
        assert_eq!(
            msg.as_bytes(),
            b"GET /current?access_key=KEY123&query=London HTTP/1.1\r\nHost: api.weatherstack.com\r\n\r\n"
        );
    }

    #[test]
    fn message_filling_capacity_exactly_is_accepted() {
        let exact = builder(0).required_len("Oslo");
        let msg = builder(exact).build("Oslo").unwrap();
        assert_eq!(msg.len(), exact);
    }

    #[test]
    fn one_byte_over_capacity_overflows() {
        let required = builder(0).required_len("Oslo");
        let err = builder(required - 1).build("Oslo").unwrap_err();

        match err {
            TransactionError::BufferOverflow {
                required: r,
                capacity,
            } => {
                assert_eq!(r, required);
                assert_eq!(capacity, required - 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn long_city_overflows_default_capacity() {
        let city = "x".repeat(400);
        assert!(matches!(
            builder(300).build(&city),
            Err(TransactionError::BufferOverflow { .. })
        ));
    }
}
