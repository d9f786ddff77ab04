use std::collections::BTreeSet;
use std::fmt;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use super::amount::decimal;
use super::vault::VaultRecord;

/// Which source contributed a fact.
///
/// The declaration order is the merge precedence: earlier variants win
/// field conflicts against later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    IndexedApi,
    OnchainFallback,
    FactoryAdmin,
    EventLog,
}

impl SourceId {
    pub fn name(&self) -> &'static str {
        match self {
            SourceId::IndexedApi => "indexed_api",
            SourceId::OnchainFallback => "onchain_fallback",
            SourceId::FactoryAdmin => "factory_admin",
            SourceId::EventLog => "event_log",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Allowlist status as one source reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allowlist {
    /// The source has no opinion (did not look, or the allowlist is off).
    #[default]
    Unknown,
    Allowed,
    Denied,
}

impl Allowlist {
    pub fn from_flag(allowed: bool) -> Self {
        if allowed {
            Allowlist::Allowed
        } else {
            Allowlist::Denied
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Allowlist::Allowed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Member,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Member => f.write_str("member"),
        }
    }
}

/// A user's merged standing in one vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub vault: VaultRecord,
    pub role: Role,
    #[serde(with = "decimal")]
    pub user_balance: U256,
    pub is_on_allowlist: bool,
    /// Sources that reported this vault. Diagnostic only.
    pub source_origins: BTreeSet<SourceId>,
}
