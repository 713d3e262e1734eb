//! Building a connector from the loaded SDK module.

use std::sync::Arc;

use crate::config::WalletConfig;
use crate::connector::{Connector, ConnectorOptions, LedgerId, LedgerIdProvider, SdkLoader};
use crate::error::{ConnectorError, WalletError};
use crate::network::Network;

use super::events::SessionEventNames;

/// A constructed and initialized connector, not yet wired.
pub(crate) struct Bootstrapped {
    pub connector: Arc<dyn Connector>,
    pub events: SessionEventNames,
}

/// Load the SDK, construct the connector and run its handshake.
///
/// Each step maps to its own [`WalletError`] variant; the caller records it.
pub(crate) async fn build_connector(
    config: &WalletConfig,
    loader: &dyn SdkLoader,
) -> Result<Bootstrapped, WalletError> {
    let module = loader
        .load()
        .await
        .map_err(|e| WalletError::ModuleUnavailable(e.to_string()))?;

    let factory = module.connector.clone().ok_or_else(|| {
        WalletError::ModuleUnavailable("connector constructor not available".to_string())
    })?;
    let ledger_ids = module.ledger_ids.clone().ok_or_else(|| {
        WalletError::ModuleUnavailable("ledger id provider not available".to_string())
    })?;

    log::info!("WalletConnect project id = {}", config.project_id);

    let ledger_id = resolve_ledger_id(ledger_ids.as_ref(), config.network)
        .map_err(|e| WalletError::ModuleUnavailable(e.to_string()))?;
    log::debug!("Using ledger id {:?} for {}", ledger_id, config.network);

    let options = ConnectorOptions {
        metadata: config.metadata.clone(),
        ledger_id,
        project_id: config.project_id.clone(),
        methods: module.wanted_methods(),
        events: module.wanted_events(),
        chains: module.supported_chains(config.network),
    };

    let connector = factory
        .construct(options)
        .map_err(|e| WalletError::ConstructionFailed(e.to_string()))?;

    connector
        .init()
        .await
        .map_err(|e| WalletError::InitFailed(e.to_string()))?;
    log::info!("Wallet connector initialized ({})", config.network);

    Ok(Bootstrapped {
        connector,
        events: SessionEventNames::from_module(&module),
    })
}

/// Named accessors first, then the canonical string.
pub(crate) fn resolve_ledger_id(
    provider: &dyn LedgerIdProvider,
    network: Network,
) -> Result<LedgerId, ConnectorError> {
    match network
        .ledger_accessors()
        .iter()
        .find_map(|name| provider.accessor(name))
    {
        Some(ledger_id) => Ok(ledger_id),
        None => provider.from_string(network.as_str()),
    }
}
