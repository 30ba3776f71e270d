//! Request/response channel between the settings surface and page sessions
//!
//! Two message kinds cross the channel: `GET_PREFS {host}` answered with the
//! host's preferences, and `SET_PREFS {host, data}` answered with an
//! acknowledgement. Requests travel over a tokio `mpsc` queue and carry a
//! `oneshot` responder, the same shape the overlay threads use for their
//! commands. Successful writes are also broadcast so live page sessions can
//! re-render with the new values.
//!
//! There is no timeout and no retry. A write that cannot be delivered is
//! reported to the caller (or logged, for fire-and-forget writes).

use delight_types::Preferences;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::error::{ChannelError, WireError};
use crate::store::PreferencesStore;

/// Capacity of the update broadcast; slow subscribers skip stale updates
const UPDATE_CAPACITY: usize = 16;

// ─────────────────────────────────────────────────────────────────────────────
// Wire Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Messages as they appear on the wire.
///
/// ```json
/// {"type":"GET_PREFS","host":"example.com"}
/// {"type":"SET_PREFS","host":"example.com","data":{...}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PrefsMessage {
    #[serde(rename = "GET_PREFS", alias = "getPrefs")]
    GetPrefs { host: String },
    #[serde(rename = "SET_PREFS", alias = "setPrefs")]
    SetPrefs { host: String, data: Preferences },
}

impl PrefsMessage {
    pub fn from_json(json: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn host(&self) -> &str {
        match self {
            PrefsMessage::GetPrefs { host } | PrefsMessage::SetPrefs { host, .. } => host,
        }
    }
}

/// Broadcast after a `SET_PREFS` has been persisted
#[derive(Debug, Clone, PartialEq)]
pub struct PrefsUpdate {
    pub host: String,
    pub data: Preferences,
}

#[derive(Debug)]
enum Request {
    Get {
        host: String,
        reply: oneshot::Sender<Preferences>,
    },
    Set {
        host: String,
        data: Preferences,
        ack: Option<oneshot::Sender<()>>,
    },
}

/// Create a connected client/service pair over `store`.
///
/// The service must be driven with [`PrefsService::run`]; it stops once every
/// client clone has been dropped.
pub fn channel<S: PreferencesStore>(store: S, capacity: usize) -> (PrefsClient, PrefsService<S>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let (updates, _) = broadcast::channel(UPDATE_CAPACITY);

    let client = PrefsClient {
        tx,
        updates: updates.clone(),
    };
    let service = PrefsService { store, rx, updates };
    (client, service)
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Cloneable handle used by settings surfaces and page sessions
#[derive(Debug, Clone)]
pub struct PrefsClient {
    tx: mpsc::Sender<Request>,
    updates: broadcast::Sender<PrefsUpdate>,
}

impl PrefsClient {
    /// `GET_PREFS`: fetch the preferences for `host`
    pub async fn get(&self, host: &str) -> Result<Preferences, ChannelError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Request::Get {
                host: host.to_string(),
                reply,
            })
            .await
            .map_err(|_| ChannelError::Closed)?;
        response.await.map_err(|_| ChannelError::NoReply)
    }

    /// `SET_PREFS`: store preferences for `host` and wait for the acknowledgement
    pub async fn set(&self, host: &str, data: Preferences) -> Result<(), ChannelError> {
        let (ack, acked) = oneshot::channel();
        self.tx
            .send(Request::Set {
                host: host.to_string(),
                data,
                ack: Some(ack),
            })
            .await
            .map_err(|_| ChannelError::Closed)?;
        acked.await.map_err(|_| ChannelError::NoReply)
    }

    /// Fire-and-forget `SET_PREFS`; fails only if the request cannot be queued
    pub fn notify(&self, host: &str, data: Preferences) -> Result<(), ChannelError> {
        self.tx
            .try_send(Request::Set {
                host: host.to_string(),
                data,
                ack: None,
            })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => ChannelError::Full,
                mpsc::error::TrySendError::Closed(_) => ChannelError::Closed,
            })
    }

    /// Dispatch a decoded wire message. `GET_PREFS` yields the preferences,
    /// `SET_PREFS` yields `None` once acknowledged.
    pub async fn request(&self, message: PrefsMessage) -> Result<Option<Preferences>, ChannelError> {
        match message {
            PrefsMessage::GetPrefs { host } => self.get(&host).await.map(Some),
            PrefsMessage::SetPrefs { host, data } => self.set(&host, data).await.map(|()| None),
        }
    }

    /// Receive every persisted `SET_PREFS` from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PrefsUpdate> {
        self.updates.subscribe()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Service
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the store and answers requests in arrival order
pub struct PrefsService<S> {
    store: S,
    rx: mpsc::Receiver<Request>,
    updates: broadcast::Sender<PrefsUpdate>,
}

impl<S: PreferencesStore> PrefsService<S> {
    /// Serve until all clients are gone, then hand the store back
    pub async fn run(mut self) -> S {
        tracing::debug!("Preferences service started");
        while let Some(request) = self.rx.recv().await {
            self.handle(request);
        }
        tracing::debug!("Preferences service stopped");
        self.store
    }

    fn handle(&mut self, request: Request) {
        match request {
            Request::Get { host, reply } => {
                let prefs = self.store.get(&host);
                tracing::debug!(%host, enabled = prefs.enabled, "GET_PREFS");
                // Requester may have gone away; nothing to do then
                let _ = reply.send(prefs);
            }
            Request::Set { host, data, ack } => {
                match self.store.set(&host, data) {
                    Ok(()) => {
                        tracing::debug!(%host, enabled = data.enabled, "SET_PREFS");
                        let _ = self.updates.send(PrefsUpdate { host, data });
                    }
                    Err(e) => {
                        tracing::warn!(%host, error = %e, "Failed to store preferences");
                    }
                }
                if let Some(ack) = ack {
                    let _ = ack.send(());
                }
            }
        }
    }
}
