//! Session status and the guarded cell that publishes it.
//!
//! Both the connect protocol and the connector's session events write here.
//! Every write goes through one of four transitions, so the account is
//! present exactly when the status is `connected`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WalletError;
use crate::event_bus::{EventBus, STATE_EVENT_PREFIX};
use crate::network::Network;
use crate::trace_log::{trace_line, TraceHandle};

/// Connection status of a wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Initializing,
    Ready,
    Connecting,
    Connected,
    Error,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Initializing => "initializing",
            SessionStatus::Ready => "ready",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Connected => "connected",
            SessionStatus::Error => "error",
        }
    }

    /// An operation is in flight; the connect action must stay disabled.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionStatus::Initializing | SessionStatus::Connecting)
    }

    pub fn can_connect(&self) -> bool {
        !self.is_busy()
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identifier for a session manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagerId(pub String);

impl ManagerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ManagerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ManagerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only view of the session, as published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    pub status: SessionStatus,
    pub account_id: Option<String>,
    pub network: Network,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Default)]
struct Inner {
    status: SessionStatus,
    account_id: Option<String>,
    last_error: Option<WalletError>,
}

/// Shared, guarded session state.
pub(crate) struct StateCell {
    id: ManagerId,
    network: Network,
    inner: Mutex<Inner>,
    event_bus: Arc<EventBus>,
    trace: TraceHandle,
}

impl StateCell {
    pub(crate) fn new(
        id: ManagerId,
        network: Network,
        event_bus: Arc<EventBus>,
        trace: TraceHandle,
    ) -> Self {
        Self {
            id,
            network,
            inner: Mutex::new(Inner::default()),
            event_bus,
            trace,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn id(&self) -> &ManagerId {
        &self.id
    }

    pub(crate) fn network(&self) -> Network {
        self.network
    }

    pub(crate) fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Event type this cell publishes snapshots under.
    pub(crate) fn event_type(&self) -> String {
        format!("{}:{}", STATE_EVENT_PREFIX, self.id)
    }

    pub(crate) fn snapshot(&self) -> WalletState {
        let inner = self.lock();
        self.view(&inner)
    }

    pub(crate) fn status(&self) -> SessionStatus {
        self.lock().status
    }

    pub(crate) fn account_id(&self) -> Option<String> {
        self.lock().account_id.clone()
    }

    pub(crate) fn last_error(&self) -> Option<WalletError> {
        self.lock().last_error.clone()
    }

    /// Start an attempt (`initializing` or `connecting`); clears the last error.
    pub(crate) fn begin(&self, status: SessionStatus) {
        debug_assert!(status.is_busy());
        self.commit(|inner| {
            inner.status = status;
            inner.account_id = None;
            inner.last_error = None;
        });
    }

    pub(crate) fn set_connected(&self, account_id: String) {
        self.commit(|inner| {
            inner.status = SessionStatus::Connected;
            inner.account_id = Some(account_id);
        });
    }

    pub(crate) fn set_ready(&self) {
        self.commit(|inner| {
            inner.status = SessionStatus::Ready;
            inner.account_id = None;
        });
    }

    /// Record a terminal failure for the current attempt.
    pub(crate) fn fail(&self, error: WalletError) {
        self.commit(|inner| {
            inner.status = SessionStatus::Error;
            inner.account_id = None;
            inner.last_error = Some(error);
        });
    }

    /// Write a line to the trace file.
    pub(crate) fn trace(&self, kind: &str, data: &str) {
        trace_line(&self.trace, kind, data);
    }

    fn view(&self, inner: &Inner) -> WalletState {
        WalletState {
            status: inner.status,
            account_id: inner.account_id.clone(),
            network: self.network,
            error: inner.last_error.as_ref().map(ToString::to_string),
        }
    }

    /// Apply `update`, then trace and publish before releasing the guard so
    /// subscribers see transitions in the order they were applied.
    fn commit(&self, update: impl FnOnce(&mut Inner)) {
        let mut inner = self.lock();
        let previous = inner.status;
        update(&mut inner);
        let snapshot = self.view(&inner);

        let line = match snapshot.account_id.as_deref() {
            Some(account) => format!("{} -> {} ({})", previous, snapshot.status, account),
            None => format!("{} -> {}", previous, snapshot.status),
        };
        log::debug!("wallet [{}] {}", self.id, line);
        self.trace("STATUS", &line);
        self.event_bus.publish(&self.event_type(), &snapshot);
    }
}
