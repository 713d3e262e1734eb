//! Scripted in-memory SDK for session manager tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hedrax_wallet::connector::{
    event_keys, ConnectorOptions, EventHandler, LedgerId, LedgerIdProvider,
};
use hedrax_wallet::{
    Connector, ConnectorError, ConnectorFactory, SdkLoader, SdkModule, Signer, WalletConfig,
    WalletSessionManager,
};
use serde_json::Value;

pub const SESSION_CONNECTED: &str = "sessionConnected";
pub const ACCOUNTS_CHANGED: &str = "accountsChanged";
pub const SESSION_DISCONNECTED: &str = "sessionDisconnected";
pub const CHAIN_CHANGED: &str = "chainChanged";

/// Something the connector does while its prompt is open.
#[derive(Clone)]
pub enum ModalStep {
    SetState(Value),
    Emit(&'static str, Value),
}

pub struct ScriptedConnector {
    state: Mutex<Value>,
    handlers: Mutex<HashMap<String, Vec<EventHandler>>>,
    supports_events: bool,
    init_error: Mutex<Option<ConnectorError>>,
    modal_steps: Mutex<Vec<ModalStep>>,
    modal_error: Mutex<Option<ConnectorError>>,
    disconnect_error: Mutex<Option<ConnectorError>>,
    signers: Mutex<Vec<Arc<dyn Signer>>>,
    pub init_calls: AtomicUsize,
    pub modal_calls: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(true))
    }

    /// A connector whose SDK cannot attach listeners.
    pub fn without_events() -> Arc<Self> {
        Arc::new(Self::build(false))
    }

    fn build(supports_events: bool) -> Self {
        Self {
            state: Mutex::new(Value::Null),
            handlers: Mutex::new(HashMap::new()),
            supports_events,
            init_error: Mutex::new(None),
            modal_steps: Mutex::new(Vec::new()),
            modal_error: Mutex::new(None),
            disconnect_error: Mutex::new(None),
            signers: Mutex::new(Vec::new()),
            init_calls: AtomicUsize::new(0),
            modal_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_state(&self, state: Value) {
        *self.state.lock().unwrap() = state;
    }

    pub fn fail_init(&self, error: ConnectorError) {
        *self.init_error.lock().unwrap() = Some(error);
    }

    pub fn on_modal(&self, steps: Vec<ModalStep>) {
        *self.modal_steps.lock().unwrap() = steps;
    }

    pub fn fail_modal(&self, error: ConnectorError) {
        *self.modal_error.lock().unwrap() = Some(error);
    }

    pub fn clear_modal_failure(&self) {
        *self.modal_error.lock().unwrap() = None;
    }

    pub fn fail_disconnect(&self, error: ConnectorError) {
        *self.disconnect_error.lock().unwrap() = Some(error);
    }

    pub fn add_signer(&self, account_id: Option<&str>) {
        let signer = StaticSigner(account_id.map(str::to_string));
        self.signers.lock().unwrap().push(Arc::new(signer));
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().unwrap().values().map(Vec::len).sum()
    }

    /// Deliver a session event to every handler registered for it.
    pub fn emit(&self, event: &str, payload: Value) {
        let handlers = self
            .handlers
            .lock()
            .unwrap()
            .get(event)
            .cloned()
            .unwrap_or_default();
        for handler in handlers {
            handler(payload.clone());
        }
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn init(&self) -> Result<(), ConnectorError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        match self.init_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn on(&self, event: &str, handler: EventHandler) -> Result<(), ConnectorError> {
        if !self.supports_events {
            return Err(ConnectorError::unsupported("on"));
        }
        self.handlers
            .lock()
            .unwrap()
            .entry(event.to_string())
            .or_default()
            .push(handler);
        Ok(())
    }

    async fn open_modal(&self) -> Result<(), ConnectorError> {
        self.modal_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.modal_error.lock().unwrap().clone() {
            return Err(error);
        }

        let steps = self.modal_steps.lock().unwrap().clone();
        for step in steps {
            match step {
                ModalStep::SetState(state) => self.set_state(state),
                ModalStep::Emit(event, payload) => self.emit(event, payload),
            }
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ConnectorError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.set_state(Value::Null);
        match self.disconnect_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn state(&self) -> Value {
        self.state.lock().unwrap().clone()
    }

    fn signers(&self) -> Vec<Arc<dyn Signer>> {
        self.signers.lock().unwrap().clone()
    }
}

struct StaticSigner(Option<String>);

impl Signer for StaticSigner {
    fn account_id(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Hands out the same scripted connector, optionally failing first.
pub struct ScriptedFactory {
    connector: Arc<ScriptedConnector>,
    failures_left: AtomicUsize,
    pub constructions: AtomicUsize,
    pub last_options: Mutex<Option<ConnectorOptions>>,
}

impl ScriptedFactory {
    pub fn new(connector: Arc<ScriptedConnector>) -> Arc<Self> {
        Arc::new(Self {
            connector,
            failures_left: AtomicUsize::new(0),
            constructions: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        })
    }

    pub fn fail_next(&self, times: usize) {
        self.failures_left.store(times, Ordering::SeqCst);
    }

    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }
}

impl ConnectorFactory for ScriptedFactory {
    fn construct(&self, options: ConnectorOptions) -> Result<Arc<dyn Connector>, ConnectorError> {
        self.constructions.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options);

        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(ConnectorError::new("invalid projectId"));
        }
        Ok(self.connector.clone())
    }
}

/// Ledger ids the way the Hedera SDK exports them.
pub struct HederaLedgers;

impl LedgerIdProvider for HederaLedgers {
    fn accessor(&self, name: &str) -> Option<LedgerId> {
        match name {
            "MAINNET" => Some(LedgerId("mainnet".to_string())),
            "TESTNET" => Some(LedgerId("testnet".to_string())),
            _ => None,
        }
    }

    fn from_string(&self, name: &str) -> Result<LedgerId, ConnectorError> {
        Ok(LedgerId(name.to_string()))
    }
}

pub struct ScriptedLoader {
    module: Mutex<Result<SdkModule, ConnectorError>>,
    pub loads: AtomicUsize,
}

impl ScriptedLoader {
    pub fn new(module: Result<SdkModule, ConnectorError>) -> Arc<Self> {
        Arc::new(Self {
            module: Mutex::new(module),
            loads: AtomicUsize::new(0),
        })
    }

    pub fn set_module(&self, module: Result<SdkModule, ConnectorError>) {
        *self.module.lock().unwrap() = module;
    }
}

#[async_trait]
impl SdkLoader for ScriptedLoader {
    async fn load(&self) -> Result<SdkModule, ConnectorError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.module.lock().unwrap().clone()
    }
}

/// A module shaped like the Hedera WalletConnect SDK exports.
pub fn hedera_module(factory: Arc<ScriptedFactory>) -> SdkModule {
    SdkModule {
        connector: Some(factory),
        ledger_ids: Some(Arc::new(HederaLedgers)),
        session_events: HashMap::from([
            (event_keys::CHAIN_CHANGED.to_string(), CHAIN_CHANGED.to_string()),
            (event_keys::ACCOUNTS_CHANGED.to_string(), ACCOUNTS_CHANGED.to_string()),
            (event_keys::SESSION_CONNECTED.to_string(), SESSION_CONNECTED.to_string()),
            (
                event_keys::SESSION_DISCONNECTED.to_string(),
                SESSION_DISCONNECTED.to_string(),
            ),
        ]),
        rpc_methods: vec![
            "hedera_getNodeAddresses".to_string(),
            "hedera_signMessage".to_string(),
            String::new(),
            "hedera_signAndExecuteTransaction".to_string(),
        ],
        chain_ids: HashMap::from([
            ("Mainnet".to_string(), "hedera:mainnet".to_string()),
            ("Testnet".to_string(), "hedera:testnet".to_string()),
        ]),
    }
}

pub fn test_config() -> WalletConfig {
    WalletConfig {
        grace_period_ms: 20,
        ..WalletConfig::default()
    }
}

pub struct Harness {
    pub manager: WalletSessionManager,
    pub connector: Arc<ScriptedConnector>,
    pub factory: Arc<ScriptedFactory>,
    pub loader: Arc<ScriptedLoader>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(ScriptedConnector::new(), test_config())
    }

    pub fn with(connector: Arc<ScriptedConnector>, config: WalletConfig) -> Self {
        let factory = ScriptedFactory::new(Arc::clone(&connector));
        let loader = ScriptedLoader::new(Ok(hedera_module(Arc::clone(&factory))));
        let manager = WalletSessionManager::new(config, loader.clone());
        Self {
            manager,
            connector,
            factory,
            loader,
        }
    }

    /// Assert the account is present exactly when connected.
    pub fn assert_invariant(&self) {
        let state = self.manager.snapshot();
        assert_eq!(
            state.account_id.is_some(),
            state.status == hedrax_wallet::SessionStatus::Connected,
            "{state:?}"
        );
    }
}
