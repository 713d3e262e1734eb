//! Account identifier extraction.
//!
//! Connector payloads are loosely structured, so the identifier is pulled out
//! by trying a fixed, ordered table of JSON paths. Extraction is pure and
//! total: anything that does not match simply yields `None`.

use serde_json::Value;

/// One step into a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
    Key(&'static str),
    Index(usize),
}

/// A named path to a candidate account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountPath {
    pub name: &'static str,
    pub segments: &'static [PathSegment],
}

use PathSegment::{Index, Key};

impl AccountPath {
    /// Follow the path; only a non-empty string leaf counts as a match.
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a str> {
        let leaf = self
            .segments
            .iter()
            .try_fold(value, |node, segment| match segment {
                Key(key) => node.get(*key),
                Index(index) => node.get(*index),
            })?;

        leaf.as_str().filter(|s| !s.is_empty())
    }
}

/// Shapes seen in session events and connector state, highest priority first.
pub const ACCOUNT_PATHS: &[AccountPath] = &[
    AccountPath {
        name: "accountId",
        segments: &[Key("accountId")],
    },
    AccountPath {
        name: "account.accountId",
        segments: &[Key("account"), Key("accountId")],
    },
    AccountPath {
        name: "accounts[0].accountId",
        segments: &[Key("accounts"), Index(0), Key("accountId")],
    },
    AccountPath {
        name: "accounts[0]",
        segments: &[Key("accounts"), Index(0)],
    },
    AccountPath {
        name: "accountIds[0]",
        segments: &[Key("accountIds"), Index(0)],
    },
];

/// Fields a connector fills in synchronously when the prompt succeeds.
pub const SESSION_PATHS: &[AccountPath] = &[
    AccountPath {
        name: "session.accounts[0]",
        segments: &[Key("session"), Key("accounts"), Index(0)],
    },
    AccountPath {
        name: "accounts[0]",
        segments: &[Key("accounts"), Index(0)],
    },
    AccountPath {
        name: "accountIds[0]",
        segments: &[Key("accountIds"), Index(0)],
    },
];

/// First path in `paths` that resolves against `value`.
pub fn first_match(paths: &[AccountPath], value: &Value) -> Option<String> {
    paths.iter().find_map(|path| {
        let found = path.resolve(value)?;
        log::debug!("Extracted account via {}: {}", path.name, found);
        Some(found.to_string())
    })
}

/// Extract an account identifier from an event payload or connector state.
pub fn extract_account_id(value: &Value) -> Option<String> {
    first_match(ACCOUNT_PATHS, value)
}

/// Extract from the connector's direct session/account fields only.
pub fn session_account_id(value: &Value) -> Option<String> {
    first_match(SESSION_PATHS, value)
}
