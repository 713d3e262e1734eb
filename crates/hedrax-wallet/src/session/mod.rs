//! Wallet session management.
//!
//! One [`WalletSessionManager`] per application session. It owns the
//! connector, runs the connect/disconnect protocols and publishes the
//! resulting [`WalletState`].

mod bootstrap;
mod events;
mod manager;
mod state;

pub use events::SessionEventNames;
pub use manager::WalletSessionManager;
pub use state::{ManagerId, SessionStatus, WalletState};
