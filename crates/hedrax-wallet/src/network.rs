//! The ledger network a session targets.

use serde::{Deserialize, Serialize};

/// Target network. One is fixed per manager; there is no runtime switching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Previewnet,
}

impl Network {
    /// Canonical lowercase name, also used as the ledger-id string fallback.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Previewnet => "previewnet",
        }
    }

    /// Accessor names tried on the SDK's ledger-id provider, in order.
    pub fn ledger_accessors(&self) -> &'static [&'static str] {
        match self {
            Network::Mainnet => &["MAINNET", "Mainnet"],
            Network::Testnet => &["TESTNET", "Testnet"],
            Network::Previewnet => &["PREVIEWNET", "Previewnet"],
        }
    }

    /// Key of this network in the SDK's chain-id table.
    pub fn chain_key(&self) -> &'static str {
        match self {
            Network::Mainnet => "Mainnet",
            Network::Testnet => "Testnet",
            Network::Previewnet => "Previewnet",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
