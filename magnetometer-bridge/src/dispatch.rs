//! Action dispatcher
//!
//! [`Bridge::execute`] answers one request on the reply channel it is given.
//! The availability check for sensor actions happens before any work is
//! scheduled, so a device without a magnetometer gets its code-3 error
//! without touching the blocking pool.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use magnetometer_core::{MagnetometerService, SensorError, WatchSink};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;
use crate::codec;
use crate::config::BridgeConfig;
use crate::envelope::{Reply, Request};
use crate::info::MagnetometerInfo;
use crate::BridgeError;

/// Counters over the bridge's lifetime
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchStats {
    /// Requests received
    pub requests: u64,
    /// Terminal error replies sent
    pub errors: u64,
    /// Requests naming an unknown action
    pub unknown_actions: u64,
    /// Replies streamed by watches
    pub stream_replies: u64,
}

type SharedStats = Arc<Mutex<DispatchStats>>;

fn update(stats: &SharedStats, f: impl FnOnce(&mut DispatchStats)) {
    f(&mut stats.lock().unwrap_or_else(PoisonError::into_inner));
}

/// The `noResult` reply of one watch request, sent at most once
///
/// Sent by whichever comes first: the dispatcher once the watch is
/// attached, or the first delivery. Either way it precedes every streamed
/// reply, and a watch that fails to start never sends it.
struct Acknowledgement {
    id: String,
    replies: UnboundedSender<Reply>,
    sent: Mutex<bool>,
}

impl Acknowledgement {
    fn new(id: &str, replies: &UnboundedSender<Reply>) -> Arc<Self> {
        Arc::new(Self { id: id.to_string(), replies: replies.clone(), sent: Mutex::new(false) })
    }

    fn send(&self) {
        let mut sent = self.sent.lock().unwrap_or_else(PoisonError::into_inner);
        if !*sent {
            *sent = true;
            if self.replies.send(Reply::no_result(self.id.as_str())).is_err() {
                log::debug!("reply channel closed before watch {} was acknowledged", self.id);
            }
        }
    }
}

/// Streams watch deliveries back to the host as keep-alive replies
struct ReplyStream<T> {
    ack: Arc<Acknowledgement>,
    stats: SharedStats,
    _item: PhantomData<fn(T)>,
}

impl<T> ReplyStream<T> {
    fn new(ack: Arc<Acknowledgement>, stats: SharedStats) -> Self {
        Self { ack, stats, _item: PhantomData }
    }
}

impl<T: Serialize> WatchSink<T> for ReplyStream<T> {
    fn deliver(&self, item: T) -> bool {
        let payload = match codec::to_payload(&item) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("watch {} payload encoding failed: {}", self.ack.id, e);
                return false;
            }
        };
        self.ack.send();
        let reply = Reply::ok(self.ack.id.clone(), payload).keep_alive();
        let sent = self.ack.replies.send(reply).is_ok();
        if sent {
            update(&self.stats, |s| s.stream_replies += 1);
        }
        sent
    }
}

/// Maps host requests onto a [`MagnetometerService`]
pub struct Bridge {
    service: Arc<MagnetometerService>,
    config: BridgeConfig,
    stats: SharedStats,
}

impl Bridge {
    /// Bridge over a shared service
    pub fn new(service: Arc<MagnetometerService>, config: BridgeConfig) -> Self {
        Self {
            service,
            config,
            stats: Arc::new(Mutex::new(DispatchStats::default())),
        }
    }

    /// The underlying service
    pub fn service(&self) -> &Arc<MagnetometerService> {
        &self.service
    }

    /// Active configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Snapshot of the dispatch counters
    pub fn stats(&self) -> DispatchStats {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Handle one request
    ///
    /// One-shot actions send exactly one terminal reply before this returns.
    /// Watch actions send `noResult` and keep replying from the sensor
    /// dispatch thread after this returns.
    pub async fn execute(&self, request: Request, replies: UnboundedSender<Reply>) {
        update(&self.stats, |s| s.requests += 1);

        let action = match Action::parse(&request.action, &request.args, &self.config) {
            Ok(action) => action,
            Err(e) => {
                if matches!(e, BridgeError::UnknownAction(_)) {
                    update(&self.stats, |s| s.unknown_actions += 1);
                }
                log::warn!("request {} rejected: {}", request.id, e);
                self.send_error(&request.id, &replies, &e);
                return;
            }
        };
        log::debug!("request {}: {:?}", request.id, action);

        let id = request.id;
        let outcome = if action.is_watch() {
            self.start_watch(&id, action, &replies)
        } else {
            self.run(action).await
        };

        match outcome {
            Ok(Some(payload)) => self.send(&replies, Reply::ok(id, payload)),
            Ok(None) => {}
            Err(e) => self.send_error(&id, &replies, &e),
        }
    }

    /// Decode a JSON request and handle it
    ///
    /// A document that is not a request has no id to answer on and is
    /// returned as an error instead.
    pub async fn execute_json(
        &self,
        text: &str,
        replies: UnboundedSender<Reply>,
    ) -> Result<(), BridgeError> {
        let request = codec::decode_request(text)?;
        self.execute(request, replies).await;
        Ok(())
    }

    /// Stop both watches; called when the host page reloads or is torn down
    pub fn reset(&self) {
        log::debug!("bridge reset");
        self.service.reset();
    }

    async fn run(&self, action: Action) -> Result<Option<serde_json::Value>, BridgeError> {
        let service = &self.service;
        let payload = match action {
            Action::IsAvailable => codec::flag(service.is_available()),
            Action::GetAccuracy => serde_json::Value::from(service.current_accuracy().as_raw()),
            Action::IsCalibrationNeeded => codec::flag(service.is_calibration_needed()),
            Action::StopWatch => {
                service.stop_raw_watch();
                serde_json::Value::Null
            }
            Action::StopWatchHeading => {
                service.stop_heading_watch();
                serde_json::Value::Null
            }
            Action::GetMagnetometerInfo => {
                let config = self.config.clone();
                let info = self
                    .blocking(move |service| Ok(MagnetometerInfo::collect(service, &config)))
                    .await?;
                codec::to_payload(&info)?
            }
            Action::GetReading => {
                self.ensure_available()?;
                codec::to_payload(&self.blocking(|s| s.read_once()).await?)?
            }
            Action::GetHeading => {
                self.ensure_available()?;
                codec::to_payload(&self.blocking(|s| s.read_heading_once()).await?)?
            }
            Action::GetFieldStrength => {
                self.ensure_available()?;
                serde_json::Value::from(self.blocking(|s| s.read_field_strength()).await?)
            }
            Action::WatchReadings { .. } | Action::WatchHeading { .. } => {
                return Err(BridgeError::WorkerFailed(format!(
                    "{} is not a one-shot action",
                    action.name()
                )));
            }
        };
        Ok(Some(payload))
    }

    // A failed start answers with its error alone, never after a noResult
    fn start_watch(
        &self,
        id: &str,
        action: Action,
        replies: &UnboundedSender<Reply>,
    ) -> Result<Option<serde_json::Value>, BridgeError> {
        let ack = Acknowledgement::new(id, replies);

        match action {
            Action::WatchReadings { period_ms } => {
                let sink = ReplyStream::new(Arc::clone(&ack), Arc::clone(&self.stats));
                self.service.start_raw_watch_into(sink, period_ms)?;
            }
            Action::WatchHeading { period_ms, filter_deg } => {
                let sink = ReplyStream::new(Arc::clone(&ack), Arc::clone(&self.stats));
                self.service.start_heading_watch_into(sink, period_ms, filter_deg)?;
            }
            other => {
                return Err(BridgeError::WorkerFailed(format!(
                    "{} is not a watch action",
                    other.name()
                )));
            }
        }
        ack.send();
        Ok(None)
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, BridgeError>
    where
        T: Send + 'static,
        F: FnOnce(&MagnetometerService) -> Result<T, SensorError> + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        match tokio::task::spawn_blocking(move || f(&service)).await {
            Ok(result) => Ok(result?),
            Err(e) => {
                log::error!("blocking worker failed: {}", e);
                Err(BridgeError::WorkerFailed(e.to_string()))
            }
        }
    }

    fn ensure_available(&self) -> Result<(), BridgeError> {
        if self.service.is_available() {
            Ok(())
        } else {
            Err(SensorError::SensorUnavailable.into())
        }
    }

    fn send(&self, replies: &UnboundedSender<Reply>, reply: Reply) {
        if replies.send(reply).is_err() {
            log::debug!("reply channel closed");
        }
    }

    fn send_error(&self, id: &str, replies: &UnboundedSender<Reply>, error: &BridgeError) {
        update(&self.stats, |s| s.errors += 1);
        self.send(replies, Reply::error(id, error));
    }
}
