//! Folding per-source partial facts into one membership set.
//!
//! The merge is a pure function of the settled reports. Reports are
//! ordered by source precedence before folding and the output is keyed by
//! vault address, so the result does not depend on which source answered
//! first.

use std::collections::{BTreeMap, BTreeSet};

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Membership, Role, SourceId, VaultFields, VaultRecord};
use crate::sources::{PartialMembership, SourceReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    /// At least one vault qualified.
    Merged,
    /// Sources answered, but the user holds no role in any vault they know.
    NoQualifyingVaults,
    /// Every source failed; nothing could be said about the user.
    AllSourcesUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSet {
    /// Sorted by vault address.
    pub memberships: Vec<Membership>,
    pub status: MergeStatus,
    /// Distinct vault keys seen across all sources, qualifying or not.
    pub vaults_seen: usize,
    /// Records dropped for lacking a vault address.
    pub malformed: usize,
}

/// Role of `user` in a merged vault, or `None` if the vault does not
/// belong in the result at all.
pub fn classify(user: Address, record: &VaultRecord, balance: U256, allowlisted: bool) -> Option<Role> {
    if record.owned_by(user) {
        Some(Role::Admin)
    } else if balance > U256::ZERO || allowlisted {
        Some(Role::Member)
    } else {
        None
    }
}

pub fn merge(user: Address, reports: &[SourceReport]) -> MergedSet {
    if reports.iter().all(|r| !r.is_ok()) {
        return MergedSet {
            memberships: Vec::new(),
            status: MergeStatus::AllSourcesUnavailable,
            vaults_seen: 0,
            malformed: 0,
        };
    }

    let mut answered: Vec<&SourceReport> = reports.iter().filter(|r| r.is_ok()).collect();
    answered.sort_by_key(|r| r.source);

    let mut malformed = 0;
    let mut by_vault: BTreeMap<Address, Vec<(SourceId, &PartialMembership)>> = BTreeMap::new();
    for report in answered {
        for partial in report.records() {
            match partial.vault {
                Some(vault) => by_vault.entry(vault).or_default().push((report.source, partial)),
                None => malformed += 1,
            }
        }
    }
    if malformed > 0 {
        debug!(malformed, "dropped records without a vault address");
    }

    let vaults_seen = by_vault.len();
    let mut memberships = Vec::new();
    for (address, parts) in by_vault {
        // Highest precedence first: each fold step only fills gaps.
        let fields = parts
            .iter()
            .fold(VaultFields::default(), |acc, (_, p)| acc.or(&p.fields));
        let user_balance = parts.iter().find_map(|(_, p)| p.user_balance);
        let is_on_allowlist = parts.iter().any(|(_, p)| p.allowlist.is_allowed());
        let source_origins: BTreeSet<SourceId> = parts.iter().map(|(s, _)| *s).collect();

        let vault = VaultRecord { address, fields };
        let balance = user_balance.unwrap_or(U256::ZERO);
        let Some(role) = classify(user, &vault, balance, is_on_allowlist) else {
            continue;
        };

        memberships.push(Membership {
            vault,
            role,
            user_balance: balance,
            is_on_allowlist,
            source_origins,
        });
    }

    let status = if memberships.is_empty() {
        MergeStatus::NoQualifyingVaults
    } else {
        MergeStatus::Merged
    };

    MergedSet {
        memberships,
        status,
        vaults_seen,
        malformed,
    }
}
