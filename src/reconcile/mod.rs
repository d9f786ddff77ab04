//! Reconciliation passes.
//!
//! A pass runs every source concurrently under a per-source timeout,
//! joins them all-settled, reads on-chain for the vaults it found when the
//! indexed source is down, merges, and summarizes. Concurrent triggers for
//! the same user join the pass already in flight.
//!
//! ```text
//! idle ──refresh──▶ fetching ──▶ Ok(success | partial) | Err(failed) ──▶ idle
//!                      ▲                                                    │
//!                      └───────────────── refresh / poll tick ──────────────┘
//! ```

pub mod watcher;

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::evm::ContractReader;
use crate::merge::{MergeStatus, merge};
use crate::model::{AddressError, Membership, SourceId};
use crate::portfolio::{DEFAULT_BASE_UNIT_DIVISOR, PortfolioSummary, summarize};
use crate::sources::onchain::read_partial;
use crate::sources::{AdapterError, IndexerClient, PartialMembership, SourceAdapter, SourceReport};

pub use watcher::MembershipWatcher;

// ── Outcome types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassStatus {
    /// Every source answered.
    Success,
    /// Some sources failed; the result is usable but incomplete.
    Partial,
}

/// Where a user's reconciliation currently stands. A settled pass drops
/// the user back to `Idle`; its outcome lives in the returned result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
}

fn source_list(sources: &[SourceId]) -> String {
    sources.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassError {
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    #[error("all membership sources unavailable [{}]; retry later", source_list(.failed))]
    AllSourcesUnavailable { failed: Vec<SourceId> },

    #[error("no membership facts could be established; unavailable: [{}]", source_list(.failed))]
    Inconclusive { failed: Vec<SourceId> },

    #[error("reconciliation pass aborted: {0}")]
    Aborted(String),
}

/// How one source fared in a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOutcome {
    pub source: SourceId,
    pub ok: bool,
    pub records: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&SourceReport> for SourceOutcome {
    fn from(report: &SourceReport) -> Self {
        SourceOutcome {
            source: report.source,
            ok: report.is_ok(),
            records: report.records().len(),
            error: report.result.as_ref().err().map(|e| e.to_string()),
        }
    }
}

/// Immutable result of one successful or partial pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipSnapshot {
    pub user: Address,
    pub status: PassStatus,
    pub merge_status: MergeStatus,
    pub memberships: Vec<Membership>,
    pub summary: PortfolioSummary,
    pub sources: Vec<SourceOutcome>,
    pub completed_at: DateTime<Utc>,
}

impl MembershipSnapshot {
    pub fn is_partial(&self) -> bool {
        self.status == PassStatus::Partial
    }
}

/// `Err` is a failed pass.
pub type PassResult = Result<Arc<MembershipSnapshot>, PassError>;

type SharedPass = Shared<BoxFuture<'static, PassResult>>;

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    /// Upper bound for each source call and each fallback vault read.
    pub adapter_timeout: Duration,
    pub base_unit_divisor: U256,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        ReconcileSettings {
            adapter_timeout: Duration::from_secs(8),
            base_unit_divisor: U256::from(DEFAULT_BASE_UNIT_DIVISOR),
        }
    }
}

// ── Controller ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ReconciliationController {
    inner: Arc<Inner>,
}

struct Inner {
    sources: Vec<Arc<dyn SourceAdapter>>,
    fallback: Option<Arc<dyn ContractReader>>,
    indexer: Option<IndexerClient>,
    settings: ReconcileSettings,
    inflight: Mutex<HashMap<Address, SharedPass>>,
    passes_started: AtomicU64,
}

#[derive(Default)]
pub struct ControllerBuilder {
    sources: Vec<Arc<dyn SourceAdapter>>,
    fallback: Option<Arc<dyn ContractReader>>,
    indexer: Option<IndexerClient>,
    settings: ReconcileSettings,
}

impl ControllerBuilder {
    pub fn source(mut self, source: Arc<dyn SourceAdapter>) -> Self {
        self.sources.push(source);
        self
    }

    /// Reader used for the on-chain fallback and single-vault lookups.
    pub fn fallback_reader(mut self, reader: Arc<dyn ContractReader>) -> Self {
        self.fallback = Some(reader);
        self
    }

    /// Client used for single-vault lookups.
    pub fn indexer(mut self, client: IndexerClient) -> Self {
        self.indexer = Some(client);
        self
    }

    pub fn adapter_timeout(mut self, timeout: Duration) -> Self {
        self.settings.adapter_timeout = timeout;
        self
    }

    pub fn base_unit_divisor(mut self, divisor: U256) -> Self {
        self.settings.base_unit_divisor = divisor;
        self
    }

    pub fn build(self) -> ReconciliationController {
        ReconciliationController {
            inner: Arc::new(Inner {
                sources: self.sources,
                fallback: self.fallback,
                indexer: self.indexer,
                settings: self.settings,
                inflight: Mutex::new(HashMap::new()),
                passes_started: AtomicU64::new(0),
            }),
        }
    }
}

impl ReconciliationController {
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::default()
    }

    pub fn phase(&self, user: Address) -> Phase {
        let inflight = self.inner.inflight.lock().unwrap_or_else(|e| e.into_inner());
        if inflight.contains_key(&user) {
            Phase::Fetching
        } else {
            Phase::Idle
        }
    }

    /// Number of passes actually started (joined triggers not counted).
    pub fn passes_started(&self) -> u64 {
        self.inner.passes_started.load(Ordering::Relaxed)
    }

    /// Run a pass for `user`, or join the one already in flight.
    ///
    /// The pass runs on its own task, so it settles and clears its in-flight
    /// entry even when every caller stops waiting.
    pub async fn refresh(&self, user: Address) -> PassResult {
        if user.is_zero() {
            return Err(PassError::InvalidAddress(AddressError::Zero));
        }

        let pass = {
            let mut inflight = self.inner.inflight.lock().unwrap_or_else(|e| e.into_inner());
            match inflight.get(&user) {
                Some(pass) => {
                    debug!(%user, "joining in-flight pass");
                    pass.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let task = tokio::spawn(
                        async move {
                            let _entry = InflightEntry {
                                inner: Arc::clone(&inner),
                                user,
                            };
                            inner.run_pass(user).await
                        }
                        .instrument(info_span!("reconcile", %user)),
                    );
                    let pass = async move {
                        task.await
                            .unwrap_or_else(|e| Err(PassError::Aborted(e.to_string())))
                    }
                    .boxed()
                    .shared();
                    inflight.insert(user, pass.clone());
                    pass
                }
            }
        };

        pass.await
    }

    /// Ad hoc lookup of one vault, possibly unknown to discovery. Uses the
    /// check endpoint and falls back to on-chain reads when it is down.
    /// `Ok(None)` means the user holds no role in the vault.
    pub async fn lookup_vault(&self, vault: Address, user: Address) -> Result<Option<Membership>, PassError> {
        if vault.is_zero() || user.is_zero() {
            return Err(PassError::InvalidAddress(AddressError::Zero));
        }
        let limit = self.inner.settings.adapter_timeout;
        let mut reports = Vec::new();

        if let Some(indexer) = &self.inner.indexer {
            let check = async {
                let answer = indexer.check_membership(vault, user).await?;
                Ok::<_, AdapterError>(vec![answer.into_partial(vault, user)])
            };
            reports.push(settle(SourceId::IndexedApi, limit, check).await);
        }

        let indexed_ok = reports.iter().any(|r| r.is_ok());
        if !indexed_ok {
            if let Some(reader) = &self.inner.fallback {
                let read = async { Ok::<_, AdapterError>(vec![read_partial(reader.as_ref(), vault, user).await]) };
                reports.push(settle(SourceId::OnchainFallback, limit, read).await);
            }
        }

        let merged = merge(user, &reports);
        if merged.status == MergeStatus::AllSourcesUnavailable {
            return Err(PassError::AllSourcesUnavailable {
                failed: reports.iter().map(|r| r.source).collect(),
            });
        }
        Ok(merged.memberships.into_iter().next())
    }
}

/// Clears a user's in-flight entry when its pass task ends, panics included.
struct InflightEntry {
    inner: Arc<Inner>,
    user: Address,
}

impl Drop for InflightEntry {
    fn drop(&mut self) {
        self.inner
            .inflight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.user);
    }
}

impl Inner {
    async fn run_pass(&self, user: Address) -> PassResult {
        self.passes_started.fetch_add(1, Ordering::Relaxed);
        let limit = self.settings.adapter_timeout;

        let mut reports = join_all(self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            async move { settle(source.id(), limit, source.fetch(user)).await }
        }))
        .await;

        let indexed_answered = reports
            .iter()
            .any(|r| r.source == SourceId::IndexedApi && r.is_ok());
        if !indexed_answered {
            if let Some(report) = self.fallback_report(user, &reports).await {
                reports.push(report);
            }
        }

        let merged = merge(user, &reports);
        let failed: Vec<SourceId> = reports
            .iter()
            .filter(|r| !r.is_ok())
            .map(|r| r.source)
            .collect();

        let result = if failed.is_empty() {
            Ok(PassStatus::Success)
        } else if merged.status == MergeStatus::AllSourcesUnavailable {
            Err(PassError::AllSourcesUnavailable {
                failed: failed.clone(),
            })
        } else if merged.vaults_seen == 0 {
            Err(PassError::Inconclusive {
                failed: failed.clone(),
            })
        } else {
            Ok(PassStatus::Partial)
        };

        let status = match result {
            Ok(status) => status,
            Err(err) => {
                warn!(error = %err, "reconciliation failed");
                return Err(err);
            }
        };

        let summary = summarize(&merged.memberships, self.settings.base_unit_divisor);
        info!(
            ?status,
            vaults = summary.total_vaults,
            admin = summary.admin_vault_count,
            member = summary.member_vault_count,
            failed = %source_list(&failed),
            "reconciliation settled"
        );

        Ok(Arc::new(MembershipSnapshot {
            user,
            status,
            merge_status: merged.status,
            memberships: merged.memberships,
            summary,
            sources: reports.iter().map(SourceOutcome::from).collect(),
            completed_at: Utc::now(),
        }))
    }

    /// On-chain reads for every vault the surviving sources mentioned.
    /// Each vault is read and timed out on its own; a slow vault is left
    /// out rather than holding the pass.
    async fn fallback_report(&self, user: Address, reports: &[SourceReport]) -> Option<SourceReport> {
        let reader = self.fallback.as_ref()?;
        let vaults: BTreeSet<Address> = reports
            .iter()
            .flat_map(|r| r.records())
            .filter_map(|p| p.vault)
            .collect();
        if vaults.is_empty() {
            return None;
        }

        let limit = self.settings.adapter_timeout;
        debug!(vaults = vaults.len(), "indexed source unavailable, reading on-chain");
        let reads = join_all(vaults.into_iter().map(|vault| {
            let reader = Arc::clone(reader);
            async move {
                tokio::time::timeout(limit, read_partial(reader.as_ref(), vault, user))
                    .await
                    .ok()
            }
        }))
        .await;

        let records: Vec<PartialMembership> = reads.into_iter().flatten().collect();
        Some(SourceReport::ok(SourceId::OnchainFallback, records))
    }
}

/// Await one source under `limit`. Errors and timeouts become a failed
/// report; they never propagate.
async fn settle<F>(source: SourceId, limit: Duration, fetch: F) -> SourceReport
where
    F: Future<Output = Result<Vec<PartialMembership>, AdapterError>>,
{
    match tokio::time::timeout(limit, fetch).await {
        Ok(Ok(records)) => {
            debug!(%source, records = records.len(), "source answered");
            SourceReport::ok(source, records)
        }
        Ok(Err(err)) => {
            warn!(%source, error = %err, "source unavailable");
            SourceReport::failed(source, err)
        }
        Err(_) => {
            warn!(%source, ?limit, "source timed out");
            SourceReport::failed(source, AdapterError::Timeout(limit))
        }
    }
}
