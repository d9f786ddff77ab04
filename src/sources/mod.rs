//! Membership sources.
//!
//! Each adapter answers "which vaults, and what standing, for this user?"
//! on its own and may fail independently. Failures stay inside the
//! adapter's [`SourceReport`]; nothing here aborts a reconciliation pass.

pub mod events;
pub mod factory;
pub mod indexer;
pub mod log_range;
pub mod onchain;

use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use thiserror::Error;

use crate::evm::ReadError;
use crate::model::{Allowlist, SourceId, VaultFields};

pub use events::EventLogAdapter;
pub use factory::FactoryAdminAdapter;
pub use indexer::{IndexedApiAdapter, IndexerClient};
pub use log_range::{BlockRange, BoundedRecentWindow, CheckpointedIncremental, LogRangeStrategy};

// ── Partial facts ────────────────────────────────────────────────────

/// What one source knows about one vault for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialMembership {
    /// `None` marks a malformed record; the merger drops it.
    pub vault: Option<Address>,
    pub fields: VaultFields,
    pub user_balance: Option<U256>,
    pub allowlist: Allowlist,
}

impl PartialMembership {
    pub fn for_vault(vault: Address) -> Self {
        PartialMembership {
            vault: Some(vault),
            ..Default::default()
        }
    }
}

// ── Errors ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("http request failed: {0}")]
    Http(String),

    #[error("indexer answered with status {0}")]
    Status(u16),

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AdapterError::Decode(err.to_string())
        } else {
            AdapterError::Http(err.to_string())
        }
    }
}

// ── Adapter trait ────────────────────────────────────────────────────

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn id(&self) -> SourceId;

    async fn fetch(&self, user: Address) -> Result<Vec<PartialMembership>, AdapterError>;
}

/// Settled outcome of one source for one pass.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: SourceId,
    pub result: Result<Vec<PartialMembership>, AdapterError>,
}

impl SourceReport {
    pub fn ok(source: SourceId, records: Vec<PartialMembership>) -> Self {
        SourceReport {
            source,
            result: Ok(records),
        }
    }

    pub fn failed(source: SourceId, err: AdapterError) -> Self {
        SourceReport {
            source,
            result: Err(err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn records(&self) -> &[PartialMembership] {
        match &self.result {
            Ok(records) => records,
            Err(_) => &[],
        }
    }
}
