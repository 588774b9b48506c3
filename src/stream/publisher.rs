use crate::auth::{AuthError, Claims, CredentialVerifier};
use crate::models::config::StreamConfig;
use crate::stream::error::StreamError;
use crate::stream::providers::{SnapshotQuery, SnapshotSource};
use crate::stream::topics::{Topic, route};
use chrono::{DateTime, Utc};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};

/// Outbound frame, independent of the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
    Close,
}

impl Frame {
    pub fn error(message: &str) -> Self {
        Frame::Text(json!({ "error": message }).to_string())
    }
}

/// What the client sent. Only used to notice disconnects.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Message,
    Close,
}

/// Path and query string of the upgrade request.
#[derive(Debug, Clone, Default)]
pub struct SubscribeRequest {
    pub path: String,
    pub params: HashMap<String, String>,
}

impl SubscribeRequest {
    pub fn token(&self) -> Option<&str> {
        self.params.get("token").map(String::as_str)
    }
}

#[derive(Debug, PartialEq)]
pub enum SessionEnd {
    UnknownTopic,
    Unauthorized(AuthError),
    CredentialExpired,
    ClientClosed,
    TransportClosed,
}

/// Remembers the last value sent on a connection.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Option<Value>,
}

impl ChangeDetector {
    /// Returns the encoded frame when `snapshot` differs from the last one sent.
    pub fn observe(&mut self, snapshot: Value) -> Result<Option<String>, serde_json::Error> {
        if self.last.as_ref() == Some(&snapshot) {
            return Ok(None);
        }
        let text = serde_json::to_string(&snapshot)?;
        self.last = Some(snapshot);
        Ok(Some(text))
    }
}

#[derive(Debug, Clone)]
pub struct PublisherSettings {
    pub poll_interval: Duration,
    pub recheck_expiry: bool,
}

impl From<&StreamConfig> for PublisherSettings {
    fn from(cfg: &StreamConfig) -> Self {
        Self {
            poll_interval: cfg.poll_interval,
            recheck_expiry: cfg.recheck_expiry,
        }
    }
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Authenticates a subscriber once, then polls its topic and pushes every
/// snapshot that differs from the previous one.
pub struct Publisher<S> {
    source: Arc<S>,
    verifier: CredentialVerifier,
    settings: PublisherSettings,
    clock: Clock,
}

impl<S: SnapshotSource> Publisher<S> {
    pub fn new(source: Arc<S>, verifier: CredentialVerifier, settings: PublisherSettings) -> Self {
        Self {
            source,
            verifier,
            settings,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Drives one connection until it closes. `tx` carries frames to the
    /// client and `rx` reports what the client sent.
    pub async fn serve<Tx, Rx>(&self, request: SubscribeRequest, mut tx: Tx, mut rx: Rx) -> SessionEnd
    where
        Tx: Sink<Frame> + Unpin,
        Tx::Error: Display,
        Rx: Stream<Item = Inbound> + Unpin,
    {
        let topic = match route(&request.path) {
            Ok(topic) => topic,
            Err(err) => {
                info!("rejecting websocket: {err}");
                reject(&mut tx, err.client_message()).await;
                return SessionEnd::UnknownTopic;
            }
        };

        let claims = match self.verifier.authorize(
            request.token(),
            topic.required_role().as_ref(),
            (self.clock)(),
        ) {
            Ok(claims) => claims,
            Err(err) => {
                info!("unauthorized subscription to {topic}: {err}");
                reject(&mut tx, err.client_message()).await;
                return SessionEnd::Unauthorized(err);
            }
        };

        info!(
            "subscribed to {topic} (session {:?}, role {:?})",
            claims.session_id, claims.role
        );

        let query = topic.query(&request.params);
        let end = self.stream(topic, &query, &claims, &mut tx, &mut rx).await;
        info!("{topic} subscription ended: {end:?}");
        end
    }

    async fn stream<Tx, Rx>(
        &self,
        topic: Topic,
        query: &SnapshotQuery,
        claims: &Claims,
        tx: &mut Tx,
        rx: &mut Rx,
    ) -> SessionEnd
    where
        Tx: Sink<Frame> + Unpin,
        Tx::Error: Display,
        Rx: Stream<Item = Inbound> + Unpin,
    {
        let mut detector = ChangeDetector::default();
        // The first tick fires immediately, so the client gets data without waiting.
        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                inbound = rx.next() => match inbound {
                    Some(Inbound::Message) => trace!("ignoring client message on {topic}"),
                    Some(Inbound::Close) | None => return SessionEnd::ClientClosed,
                },

                _ = ticker.tick() => {
                    if self.settings.recheck_expiry {
                        if let Err(err) = claims.check_expiry((self.clock)()) {
                            info!("closing {topic}: {err}");
                            reject(tx, err.client_message()).await;
                            return SessionEnd::CredentialExpired;
                        }
                    }

                    let frame = match self.next_frame(topic, query, &mut detector).await {
                        Some(frame) => frame,
                        None => continue,
                    };

                    if let Err(err) = tx.send(Frame::Text(frame)).await {
                        debug!("send on {topic} failed: {err}");
                        return SessionEnd::TransportClosed;
                    }
                }
            }
        }
    }

    /// One tick: fetch, compare, encode. Failures skip the tick.
    async fn next_frame(
        &self,
        topic: Topic,
        query: &SnapshotQuery,
        detector: &mut ChangeDetector,
    ) -> Option<String> {
        let snapshot = match self.source.fetch(query).await {
            Ok(snapshot) => snapshot,
            Err(StreamError::Serialization(err)) => {
                error!("failed to encode {topic} snapshot: {err}");
                return None;
            }
            Err(err) => {
                warn!("{topic} tick skipped: {err}");
                return None;
            }
        };

        match detector.observe(snapshot) {
            Ok(Some(frame)) => Some(frame),
            Ok(None) => {
                trace!("{topic} unchanged");
                None
            }
            Err(err) => {
                error!("failed to encode {topic} snapshot: {err}");
                None
            }
        }
    }
}

async fn reject<Tx>(tx: &mut Tx, message: &str)
where
    Tx: Sink<Frame> + Unpin,
    Tx::Error: Display,
{
    if let Err(err) = tx.send(Frame::error(message)).await {
        debug!("could not deliver error frame: {err}");
        return;
    }
    if let Err(err) = tx.send(Frame::Close).await {
        debug!("could not close connection: {err}");
    }
}
