//! The trigger-driven transaction loop.
//!
//! One trigger runs one transaction: build the request, connect, send,
//! receive into the response buffer, locate and extract the reading, render
//! it. Any failure ends only that transaction; the loop goes back to `Idle`
//! and waits for the next trigger.

use std::io;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

use crate::{
    buffer::ResponseBuffer,
    config::WorkerConfig,
    display::DisplaySink,
    error::{TransactionError, TransportStep},
    extract::extract_reading,
    model::{LoopState, Trigger, WeatherReading, WorkerStatus},
    payload::{ParsedDocument, locate_payload},
    request::{RequestBuilder, RequestMessage},
    transport::{Connection, Transport},
};

/// How a trigger was taken in by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Stored in the pending slot.
    Queued,
    /// A trigger was already pending; this one was dropped.
    Coalesced,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TriggerError {
    #[error("city name must not be empty")]
    EmptyCity,
    #[error("weather worker has stopped")]
    WorkerGone,
}

/// Producer side of the trigger slot. Cheap to clone.
///
/// At most one trigger waits while a transaction is in flight.
#[derive(Debug, Clone)]
pub struct TriggerHandle {
    tx: mpsc::Sender<Trigger>,
}

impl TriggerHandle {
    pub fn fire(&self, city: &str) -> Result<Delivery, TriggerError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(TriggerError::EmptyCity);
        }

        match self.tx.try_send(Trigger::new(city)) {
            Ok(()) => Ok(Delivery::Queued),
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                info!(city = %dropped.city, "trigger already pending, dropping this one");
                Ok(Delivery::Coalesced)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(TriggerError::WorkerGone),
        }
    }
}

/// Single sequential worker owning the request builder, transport, display
/// and the reusable response buffer.
#[derive(Debug)]
pub struct TransactionLoop<T, D> {
    host: String,
    port: u16,
    builder: RequestBuilder,
    transport: T,
    display: D,
    response: ResponseBuffer,
    triggers: mpsc::Receiver<Trigger>,
    status: watch::Sender<WorkerStatus>,
}

impl<T, D> TransactionLoop<T, D>
where
    T: Transport,
    D: DisplaySink,
{
    /// Creates the loop together with its trigger handle and a status feed.
    pub fn new(
        config: &WorkerConfig,
        transport: T,
        display: D,
    ) -> (Self, TriggerHandle, watch::Receiver<WorkerStatus>) {
        let (tx, triggers) = mpsc::channel(1);
        let (status, status_rx) = watch::channel(WorkerStatus::default());

        let worker = Self {
            host: config.host.clone(),
            port: config.port,
            builder: RequestBuilder::new(
                config.host.clone(),
                config.access_key.clone(),
                config.request_capacity,
            ),
            transport,
            display,
            response: ResponseBuffer::with_capacity(config.response_capacity),
            triggers,
            status,
        };

        (worker, TriggerHandle { tx }, status_rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkerStatus> {
        self.status.subscribe()
    }

    /// Runs until every [`TriggerHandle`] has been dropped.
    pub async fn run(mut self) {
        info!(host = %self.host, port = self.port, "weather worker waiting for triggers");

        while let Some(trigger) = self.triggers.recv().await {
            // Failures are already reported inside `handle`.
            let _ = self.handle(trigger).await;
        }

        info!("trigger sources closed, weather worker stopping");
    }

    /// Runs one transaction to completion and returns to `Idle`.
    #[instrument(skip(self, trigger), fields(city = %trigger.city))]
    pub async fn handle(&mut self, trigger: Trigger) -> Result<WeatherReading, TransactionError> {
        info!("requesting weather");

        match self.transact(&trigger.city).await {
            Ok(reading) => {
                self.enter(LoopState::Rendering);
                self.display.render(&reading);
                info!(
                    conditions = %reading.conditions,
                    wind = %reading.wind_direction,
                    precip = reading.precipitation_percent,
                    temperature = reading.temperature_celsius,
                    "weather updated"
                );

                self.status.send_modify(|s| {
                    s.state = LoopState::Idle;
                    s.completed += 1;
                    s.last_reading = Some(reading.clone());
                    s.last_error = None;
                    s.updated_at = Utc::now();
                });
                Ok(reading)
            }
            Err(e) => {
                warn!(error = %e, "weather transaction failed");

                self.status.send_modify(|s| {
                    s.state = LoopState::Idle;
                    s.failed += 1;
                    s.last_error = Some(e.to_string());
                    s.updated_at = Utc::now();
                });
                Err(e)
            }
        }
    }

    async fn transact(&mut self, city: &str) -> Result<WeatherReading, TransactionError> {
        self.enter(LoopState::Building);
        self.response.clear();
        let request = self.builder.build(city)?;

        self.enter(LoopState::Connecting);
        let addr = self
            .transport
            .resolve(&self.host, self.port)
            .await
            .map_err(|e| TransactionError::transport(TransportStep::Resolve, e))?;
        let mut conn = self
            .transport
            .connect(addr)
            .await
            .map_err(|e| TransactionError::transport(TransportStep::Connect, e))?;

        // From here on the connection is closed whatever the exchange did.
        let exchanged = self.exchange(conn.as_mut(), &request).await;
        if let Err(e) = conn.close().await {
            warn!(error = %e, "failed to close connection");
        }
        exchanged?;

        self.enter(LoopState::Extracting);
        let received = self.response.filled();
        let offset = locate_payload(received)?;
        debug!(offset, "located JSON payload");

        let document = ParsedDocument::parse(&received[offset..])?;
        extract_reading(document)
    }

    async fn exchange(
        &mut self,
        conn: &mut dyn Connection,
        request: &RequestMessage,
    ) -> Result<(), TransactionError> {
        self.enter(LoopState::Sending);
        let sent = conn
            .send(request.as_bytes())
            .await
            .map_err(|e| TransactionError::transport(TransportStep::Send, e))?;
        if sent != request.len() {
            return Err(TransactionError::transport(
                TransportStep::Send,
                io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("sent {sent} of {} bytes", request.len()),
                ),
            ));
        }
        info!(bytes = sent, "request sent");

        self.enter(LoopState::Receiving);
        let received = conn
            .receive(self.response.unfilled_mut())
            .await
            .map_err(|e| TransactionError::transport(TransportStep::Receive, e))?;
        self.response
            .commit(received)
            .map_err(|e| TransactionError::transport(TransportStep::Receive, e))?;
        info!(bytes = received, "response received");

        Ok(())
    }

    fn enter(&self, state: LoopState) {
        debug!(?state, "state transition");
        self.status.send_modify(|s| {
            s.state = state;
            s.updated_at = Utc::now();
        });
    }
}
