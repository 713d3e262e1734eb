//! Session-event wiring.
//!
//! The connector pushes session changes as named events. These handlers are
//! the second producer writing the session state; the connect protocol is
//! the first. An accounts-changed event that carries no account leaves the
//! state alone so it cannot undo a successful connect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::connector::{event_keys, Connector, EventHandler, SdkModule};
use crate::extract::extract_account_id;

use super::state::StateCell;

/// Wire names of the three session events the manager follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEventNames {
    pub connected: String,
    pub accounts_changed: String,
    pub disconnected: String,
}

impl SessionEventNames {
    /// Names from the SDK's constants, with fixed fallbacks.
    pub fn from_module(module: &SdkModule) -> Self {
        let name = |key: &str, fallback: &str| {
            module.event_name(key).unwrap_or(fallback).to_string()
        };
        Self {
            connected: name(event_keys::SESSION_CONNECTED, "SESSION_CONNECTED"),
            accounts_changed: name(event_keys::ACCOUNTS_CHANGED, "ACCOUNTS_CHANGED"),
            disconnected: name(event_keys::SESSION_DISCONNECTED, "SESSION_DISCONNECTED"),
        }
    }
}

/// Attach the three session handlers. Unsupported subscriptions are skipped.
///
/// Handlers act only while `live` is set; the manager clears it when it
/// releases the connector, so a connector kept alive elsewhere can no longer
/// drive the session.
pub(crate) fn wire_session_events(
    connector: &Arc<dyn Connector>,
    names: &SessionEventNames,
    state: &Arc<StateCell>,
    live: &Arc<AtomicBool>,
) {
    let weak = Arc::downgrade(connector);

    let handler = {
        let (state, weak, live) = (Arc::clone(state), weak.clone(), Arc::clone(live));
        let event = names.connected.clone();
        Arc::new(move |payload: Value| {
            if accepts(&state, &live, &event, &payload) {
                on_session_connected(&state, &weak, &payload);
            }
        })
    };
    subscribe(connector.as_ref(), &names.connected, handler);

    let handler = {
        let (state, weak, live) = (Arc::clone(state), weak.clone(), Arc::clone(live));
        let event = names.accounts_changed.clone();
        Arc::new(move |payload: Value| {
            if accepts(&state, &live, &event, &payload) {
                on_accounts_changed(&state, &weak, &payload);
            }
        })
    };
    subscribe(connector.as_ref(), &names.accounts_changed, handler);

    let handler = {
        let (state, live) = (Arc::clone(state), Arc::clone(live));
        let event = names.disconnected.clone();
        Arc::new(move |payload: Value| {
            if accepts(&state, &live, &event, &payload) {
                on_session_disconnected(&state);
            }
        })
    };
    subscribe(connector.as_ref(), &names.disconnected, handler);
}

fn accepts(state: &StateCell, live: &AtomicBool, event: &str, payload: &Value) -> bool {
    if !live.load(Ordering::Acquire) {
        log::debug!("Ignoring {} from released connector", event);
        return false;
    }
    state.trace("EVENT", &format!("{event} {payload}"));
    true
}

fn subscribe(connector: &dyn Connector, event: &str, handler: EventHandler) {
    match connector.on(event, handler) {
        Ok(()) => log::debug!("Subscribed to {}", event),
        Err(e) => log::debug!("Skipping {} subscription: {}", event, e),
    }
}

/// Payload first, then the connector's own state.
fn account_from(payload: &Value, connector: &Weak<dyn Connector>) -> Option<String> {
    extract_account_id(payload).or_else(|| {
        connector
            .upgrade()
            .and_then(|connector| extract_account_id(&connector.state()))
    })
}

pub(crate) fn on_session_connected(
    state: &StateCell,
    connector: &Weak<dyn Connector>,
    payload: &Value,
) {
    log::debug!("Session connected event: {}", payload);
    match account_from(payload, connector) {
        Some(account_id) => {
            log::info!("Account {} from session-connected event", account_id);
            state.set_connected(account_id);
        }
        None => state.set_ready(),
    }
}

pub(crate) fn on_accounts_changed(
    state: &StateCell,
    connector: &Weak<dyn Connector>,
    payload: &Value,
) {
    log::debug!("Accounts changed event: {}", payload);
    if let Some(account_id) = account_from(payload, connector) {
        log::info!("Account {} from accounts-changed event", account_id);
        state.set_connected(account_id);
    }
}

pub(crate) fn on_session_disconnected(state: &StateCell) {
    log::info!("Session disconnected by wallet");
    state.set_ready();
}
