//! WalletSessionManager - owns the connector and drives the session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use crate::config::WalletConfig;
use crate::connector::{Connector, SdkLoader};
use crate::error::{ConnectorError, WalletError};
use crate::event_bus::{EventBus, WalletEvent};
use crate::extract::{extract_account_id, session_account_id};
use crate::network::Network;
use crate::trace_log::open_trace_file;

use super::bootstrap::build_connector;
use super::events::wire_session_events;
use super::state::{ManagerId, SessionStatus, StateCell, WalletState};

/// Manages one wallet session and the connector behind it.
///
/// The connector is built lazily on the first [`connect`](Self::connect),
/// reused afterwards, and released by [`teardown`](Self::teardown).
/// State changes are published on the event bus as [`WalletState`]
/// snapshots; presentation layers read those or call [`snapshot`](Self::snapshot).
///
/// Call `teardown().await` when the manager goes away. Dropping it without
/// teardown detaches the session handlers and spawns the wallet disconnect on
/// the current tokio runtime; outside a runtime the disconnect is skipped.
pub struct WalletSessionManager {
    config: WalletConfig,
    loader: Arc<dyn SdkLoader>,
    state: Arc<StateCell>,
    connector: Mutex<Option<WiredConnector>>,
}

/// The live connector and the switch its session handlers check.
struct WiredConnector {
    connector: Arc<dyn Connector>,
    live: Arc<AtomicBool>,
}

impl WiredConnector {
    /// Stop the session handlers and hand back the connector.
    fn release(self) -> Arc<dyn Connector> {
        self.live.store(false, Ordering::Release);
        self.connector
    }
}

impl WalletSessionManager {
    /// Create a manager publishing on its own event bus.
    pub fn new(config: WalletConfig, loader: Arc<dyn SdkLoader>) -> Self {
        Self::with_event_bus(config, loader, Arc::new(EventBus::new()))
    }

    /// Publish on an existing bus (shared with other components).
    pub fn with_event_bus(
        config: WalletConfig,
        loader: Arc<dyn SdkLoader>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let id = ManagerId::new();
        let trace = open_trace_file(
            config.log_dir.as_deref().map(std::path::Path::new),
            &format!("wallet-{id}"),
        );
        let state = Arc::new(StateCell::new(id, config.network, event_bus, trace));

        Self {
            config,
            loader,
            state,
            connector: Mutex::new(None),
        }
    }

    /// Unique id, also the suffix of the state event type.
    pub fn id(&self) -> &ManagerId {
        self.state.id()
    }

    /// Configuration the manager was built with.
    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Current state, as last published.
    pub fn snapshot(&self) -> WalletState {
        self.state.snapshot()
    }

    /// Current session status.
    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    /// Connected account; present exactly when the status is `connected`.
    pub fn account_id(&self) -> Option<String> {
        self.state.account_id()
    }

    /// The fixed target network.
    pub fn network(&self) -> Network {
        self.state.network()
    }

    /// Failure of the latest attempt, cleared when a new one begins.
    pub fn last_error(&self) -> Option<WalletError> {
        self.state.last_error()
    }

    /// Event type of this manager's state snapshots on the bus.
    pub fn state_event_type(&self) -> String {
        self.state.event_type()
    }

    /// Receive state events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.state.event_bus().subscribe()
    }

    /// Return the connector, building it on first use.
    ///
    /// Concurrent callers share one construction. A failed construction is
    /// not remembered; the next call starts over.
    pub async fn ensure_connector(&self) -> Result<Arc<dyn Connector>, WalletError> {
        let mut slot = self.connector.lock().await;
        if let Some(wired) = slot.as_ref() {
            return Ok(Arc::clone(&wired.connector));
        }

        self.state.begin(SessionStatus::Initializing);

        let built = match build_connector(&self.config, self.loader.as_ref()).await {
            Ok(built) => built,
            Err(e) => {
                log::error!("Wallet connector bootstrap failed: {}", e);
                self.state.fail(e.clone());
                return Err(e);
            }
        };

        let live = Arc::new(AtomicBool::new(true));
        wire_session_events(&built.connector, &built.events, &self.state, &live);
        self.publish_initial_state(built.connector.as_ref());

        *slot = Some(WiredConnector {
            connector: Arc::clone(&built.connector),
            live,
        });
        Ok(built.connector)
    }

    /// Resumed sessions come back connected; anything else is ready.
    fn publish_initial_state(&self, connector: &dyn Connector) {
        match extract_account_id(&connector.state()) {
            Some(account_id) => {
                log::info!("Resumed wallet session for {}", account_id);
                self.state.set_connected(account_id);
            }
            None => self.state.set_ready(),
        }
    }

    /// Open the wallet prompt and resolve to the connected account.
    ///
    /// Fails with [`WalletError::UserRejected`] when the prompt closes
    /// without an account, and with [`WalletError::ConnectionFailed`] for
    /// any other prompt failure. Bootstrap failures are returned as is.
    pub async fn connect(&self) -> Result<String, WalletError> {
        let connector = self.ensure_connector().await?;

        // Subscribe before the prompt so an event landing during it is seen.
        let mut events = self.subscribe();
        self.state.begin(SessionStatus::Connecting);

        log::info!("Opening wallet prompt for {}", self.config.network);
        if let Err(e) = connector.open_modal().await {
            return Err(self.prompt_failed(e));
        }

        self.await_session_event(&mut events).await;

        match self.resolve_account(connector.as_ref()) {
            Some(account_id) => {
                log::info!("Connected wallet account {}", account_id);
                self.state.set_connected(account_id.clone());
                Ok(account_id)
            }
            None => {
                log::info!("No account after prompt, treating as user rejection");
                self.state.set_ready();
                Err(WalletError::UserRejected)
            }
        }
    }

    fn prompt_failed(&self, error: ConnectorError) -> WalletError {
        if error.is_rejection() {
            log::info!("Wallet prompt rejected: {}", error);
            self.state.set_ready();
            return WalletError::UserRejected;
        }

        log::error!("Wallet prompt failed: {}", error);
        let error = WalletError::ConnectionFailed(error.to_string());
        self.state.fail(error.clone());
        error
    }

    /// Wait for a `connected` snapshot from the session-event handlers, at
    /// most the grace period.
    async fn await_session_event(&self, events: &mut broadcast::Receiver<WalletEvent>) {
        let event_type = self.state.event_type();
        let connected = async {
            loop {
                match events.recv().await {
                    Ok(event) if event.event_type == event_type => {
                        if event.payload["status"] == SessionStatus::Connected.as_str() {
                            return;
                        }
                    }
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => {
                        std::future::pending::<()>().await
                    }
                }
            }
        };

        if tokio::time::timeout(self.config.grace_period(), connected)
            .await
            .is_err()
        {
            log::debug!("No session event within {:?}", self.config.grace_period());
        }
    }

    /// Direct session fields, then signers, then generic extraction, then
    /// whatever a session event already published during this attempt.
    fn resolve_account(&self, connector: &dyn Connector) -> Option<String> {
        let state = connector.state();
        session_account_id(&state)
            .or_else(|| {
                connector.signers().iter().find_map(|signer| {
                    signer.account_id().filter(|id| !id.is_empty())
                })
            })
            .or_else(|| extract_account_id(&state))
            .or_else(|| self.state.account_id())
    }

    /// Disconnect the wallet. Always leaves the session `ready`.
    ///
    /// Does not build a connector if none exists yet.
    pub async fn disconnect(&self) {
        let connector = self
            .connector
            .lock()
            .await
            .as_ref()
            .map(|wired| Arc::clone(&wired.connector));
        if let Some(connector) = connector {
            if let Err(e) = connector.disconnect().await {
                log::warn!("Wallet disconnect failed: {}", e);
            }
        }

        self.state.set_ready();
        log::info!("Wallet disconnected");
    }

    /// Release the connector. The next `connect` builds a fresh one.
    ///
    /// Events the released connector emits afterwards are ignored.
    pub async fn teardown(&self) {
        let wired = self.connector.lock().await.take();
        if let Some(connector) = wired.map(WiredConnector::release) {
            if let Err(e) = connector.disconnect().await {
                log::warn!("Wallet teardown disconnect failed: {}", e);
            }
            log::debug!("Wallet connector released");
        }
    }
}

impl Drop for WalletSessionManager {
    fn drop(&mut self) {
        let Some(connector) = self.connector.get_mut().take().map(WiredConnector::release) else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = connector.disconnect().await {
                        log::warn!("Wallet disconnect on drop failed: {}", e);
                    }
                });
            }
            Err(_) => log::warn!("Wallet manager dropped outside a runtime, session left open"),
        }
    }
}
