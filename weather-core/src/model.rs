use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request for one weather lookup, carrying the city to query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub city: String,
}

impl Trigger {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into() }
    }
}

/// Current conditions extracted from one successful transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub conditions: String,
    pub wind_direction: String,
    pub precipitation_percent: i32,
    pub temperature_celsius: i32,
}

/// Where the transaction loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopState {
    #[default]
    Idle,
    Building,
    Connecting,
    Sending,
    Receiving,
    Extracting,
    Rendering,
}

/// Snapshot published by the worker after every state change.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatus {
    pub state: LoopState,
    pub completed: u64,
    pub failed: u64,
    pub last_reading: Option<WeatherReading>,
    /// Error of the latest transaction; cleared when one succeeds.
    pub last_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for WorkerStatus {
    fn default() -> Self {
        Self {
            state: LoopState::Idle,
            completed: 0,
            failed: 0,
            last_reading: None,
            last_error: None,
            updated_at: Utc::now(),
        }
    }
}

impl WorkerStatus {
    /// Number of transactions that have run to an outcome.
    pub fn finished(&self) -> u64 {
        self.completed + self.failed
    }
}
