//! Core library for the weatherstack lookup worker.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Request formatting and bounded response buffering
//! - Payload location and extraction of the current conditions
//! - The trigger-driven transaction loop, over pluggable transport and display
//!
//! It is used by `weather-worker`, but the loop can be hosted by any tokio
//! runtime that supplies triggers.

pub mod buffer;
pub mod config;
pub mod display;
pub mod error;
pub mod extract;
pub mod model;
pub mod payload;
pub mod request;
pub mod transport;
pub mod worker;

pub use buffer::ResponseBuffer;
pub use config::WorkerConfig;
pub use display::{ConsoleDisplay, DisplaySink, NullDisplay};
pub use error::{JsonKind, TransactionError, TransportStep};
pub use extract::extract_reading;
pub use model::{LoopState, Trigger, WeatherReading, WorkerStatus};
pub use payload::{ParsedDocument, locate_payload};
pub use request::{RequestBuilder, RequestMessage};
pub use transport::{Connection, StreamConnection, TcpTransport, Transport};
pub use worker::{Delivery, TransactionLoop, TriggerError, TriggerHandle};
