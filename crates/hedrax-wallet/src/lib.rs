//! # hedrax-wallet
//!
//! Wallet session adapter for HedraX.
//!
//! Establishes, maintains and tears down a session with an external wallet
//! reachable only through an event-driven connector SDK, and exposes a
//! stable account identity and connection status to the rest of the app.
//!
//! This crate is framework-agnostic. Presentation layers read
//! [`WalletState`] snapshots (directly or from the [`event_bus`]) and call
//! `connect` / `disconnect`.
//!
//! ## Key Concepts
//!
//! - **Connector**: the SDK object speaking the wallet session protocol,
//!   reached through the traits in [`connector`]
//! - **Session event**: connector notification that the session changed
//! - **Account identifier**: opaque string handle of the connected account
//!
//! ```text
//!  idle ──► initializing ──► ready ──► connecting ──► connected
//!               │             ▲           │  │            │
//!               │             └───────────┘  │            │ disconnect /
//!               │               rejected     │            ▼ session end
//!               └──────────► error ◄─────────┘          ready
//! ```

pub mod config;
pub mod connector;
pub mod error;
pub mod event_bus;
pub mod extract;
pub mod network;
pub mod session;
pub mod trace_log;

// Re-export commonly used types
pub use config::{load_config, save_config, AppMetadata, WalletConfig};
pub use connector::{Connector, ConnectorFactory, LedgerIdProvider, SdkLoader, SdkModule, Signer};
pub use error::{ConnectorError, WalletError};
pub use extract::extract_account_id;
pub use network::Network;
pub use session::{ManagerId, SessionStatus, WalletSessionManager, WalletState};
