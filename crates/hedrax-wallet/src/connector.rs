//! Capability boundary to the wallet connector SDK.
//!
//! The SDK is loaded at first use and its shape varies between releases.
//! Everything the session manager needs from it is expressed here as narrow
//! traits plus [`SdkModule`], the loaded exports. An adapter for a concrete
//! SDK implements [`SdkLoader`] and translates its exports into this shape;
//! all shape-guessing stays behind that one boundary.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::AppMetadata;
use crate::error::ConnectorError;
use crate::network::Network;

/// Callback attached to a named session event.
pub type EventHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// Keys of the session-event constants in [`SdkModule::session_events`].
pub mod event_keys {
    pub const CHAIN_CHANGED: &str = "ChainChanged";
    pub const ACCOUNTS_CHANGED: &str = "AccountsChanged";
    pub const SESSION_CONNECTED: &str = "SessionConnected";
    pub const SESSION_DISCONNECTED: &str = "SessionDisconnected";
}

/// Opaque ledger identifier produced by the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerId(pub String);

/// Source of ledger identifiers exported by the SDK.
pub trait LedgerIdProvider: Send + Sync {
    /// Look up a predefined identifier by accessor name (e.g. `MAINNET`).
    fn accessor(&self, name: &str) -> Option<LedgerId>;

    /// Build an identifier from its canonical string.
    fn from_string(&self, name: &str) -> Result<LedgerId, ConnectorError>;
}

/// Everything the connector is constructed with.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorOptions {
    pub metadata: AppMetadata,
    pub ledger_id: LedgerId,
    pub project_id: String,
    pub methods: Vec<String>,
    pub events: Vec<String>,
    pub chains: Vec<String>,
}

pub trait ConnectorFactory: Send + Sync {
    fn construct(&self, options: ConnectorOptions) -> Result<Arc<dyn Connector>, ConnectorError>;
}

/// A signer exposed by a connected session.
pub trait Signer: Send + Sync {
    fn account_id(&self) -> Option<String>;
}

/// A live connector instance.
///
/// Optional capabilities have defaults matching an SDK that lacks them:
/// `on` reports unsupported, `disconnect` does nothing, `state` is empty and
/// there are no signers.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Handshake/setup. Must succeed before anything else is called.
    async fn init(&self) -> Result<(), ConnectorError>;

    /// Attach `handler` to the named session event.
    fn on(&self, event: &str, handler: EventHandler) -> Result<(), ConnectorError> {
        let _ = (event, handler);
        Err(ConnectorError::unsupported("on"))
    }

    /// Open the pairing prompt. May resolve without yielding an account.
    async fn open_modal(&self) -> Result<(), ConnectorError>;

    async fn disconnect(&self) -> Result<(), ConnectorError> {
        Ok(())
    }

    /// Current observable session state, for account extraction.
    fn state(&self) -> Value {
        Value::Null
    }

    fn signers(&self) -> Vec<Arc<dyn Signer>> {
        Vec::new()
    }
}

/// Loads the SDK module on first use.
#[async_trait]
pub trait SdkLoader: Send + Sync {
    async fn load(&self) -> Result<SdkModule, ConnectorError>;
}

/// Exports of a loaded SDK module.
///
/// Any field may be missing or partially filled; the session manager
/// validates what it needs and filters empty entries from the rest.
#[derive(Clone, Default)]
pub struct SdkModule {
    pub connector: Option<Arc<dyn ConnectorFactory>>,
    pub ledger_ids: Option<Arc<dyn LedgerIdProvider>>,
    /// Event constant name to wire event name.
    pub session_events: HashMap<String, String>,
    /// RPC method enumeration.
    pub rpc_methods: Vec<String>,
    /// Network key (e.g. `Mainnet`) to chain identifier.
    pub chain_ids: HashMap<String, String>,
}

impl SdkModule {
    /// Wire name of a session-event constant, if exported and non-empty.
    pub fn event_name(&self, key: &str) -> Option<&str> {
        self.session_events
            .get(key)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn wanted_methods(&self) -> Vec<String> {
        self.rpc_methods
            .iter()
            .filter(|m| !m.is_empty())
            .cloned()
            .collect()
    }

    pub fn wanted_events(&self) -> Vec<String> {
        [
            event_keys::CHAIN_CHANGED,
            event_keys::ACCOUNTS_CHANGED,
            event_keys::SESSION_CONNECTED,
            event_keys::SESSION_DISCONNECTED,
        ]
        .iter()
        .filter_map(|key| self.event_name(key))
        .map(str::to_string)
        .collect()
    }

    pub fn supported_chains(&self, network: Network) -> Vec<String> {
        self.chain_ids
            .get(network.chain_key())
            .filter(|chain| !chain.is_empty())
            .cloned()
            .into_iter()
            .collect()
    }
}

impl std::fmt::Debug for SdkModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkModule")
            .field("connector", &self.connector.is_some())
            .field("ledger_ids", &self.ledger_ids.is_some())
            .field("session_events", &self.session_events)
            .field("rpc_methods", &self.rpc_methods)
            .field("chain_ids", &self.chain_ids)
            .finish()
    }
}
