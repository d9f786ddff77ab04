//! Block-range policies for the allowlist event scan.
//!
//! Scanning from genesis does not scale, so the range is a policy:
//!
//! - [`BoundedRecentWindow`] looks at the last N blocks only. Allowlist
//!   grants older than the window are invisible to this source; the other
//!   sources still surface the vault once the user deposits.
//! - [`CheckpointedIncremental`] scans from a start block once, then only
//!   the blocks after its per-user checkpoint, folding new events over the
//!   state it already folded. Complete history at the cost of keeping that
//!   folded state in memory for the life of the process.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use alloy::primitives::Address;

/// Latest allowlist flag per vault.
pub type AllowlistState = BTreeMap<Address, bool>;

/// Inclusive block range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub from: u64,
    pub to: u64,
}

impl BlockRange {
    pub fn new(from: u64, to: u64) -> Self {
        BlockRange { from, to }
    }

    pub fn len(&self) -> u64 {
        if self.from > self.to {
            0
        } else {
            self.to - self.from + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split into consecutive sub-ranges of at most `size` blocks.
    pub fn chunks(&self, size: u64) -> Vec<BlockRange> {
        let size = size.max(1);
        let mut out = Vec::new();
        let mut start = self.from;
        while start <= self.to {
            let end = start.saturating_add(size - 1).min(self.to);
            out.push(BlockRange::new(start, end));
            if end == u64::MAX {
                break;
            }
            start = end + 1;
        }
        out
    }
}

pub trait LogRangeStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Blocks to scan for `user` with the chain at `head`.
    /// `None` means there is nothing new to scan.
    fn plan(&self, user: Address, head: u64) -> Option<BlockRange>;

    /// Fold a successful scan of `scanned` into the state to report.
    fn settle(&self, user: Address, scanned: Option<BlockRange>, fresh: AllowlistState) -> AllowlistState;
}

// ── Bounded recent window ────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct BoundedRecentWindow {
    pub window: u64,
}

impl BoundedRecentWindow {
    pub fn new(window: u64) -> Self {
        BoundedRecentWindow {
            window: window.max(1),
        }
    }
}

impl LogRangeStrategy for BoundedRecentWindow {
    fn name(&self) -> &'static str {
        "bounded_recent_window"
    }

    fn plan(&self, _user: Address, head: u64) -> Option<BlockRange> {
        Some(BlockRange::new(head.saturating_sub(self.window - 1), head))
    }

    fn settle(&self, _user: Address, _scanned: Option<BlockRange>, fresh: AllowlistState) -> AllowlistState {
        fresh
    }
}

// ── Checkpointed incremental ─────────────────────────────────────────

#[derive(Debug, Default)]
struct Checkpoint {
    last_block: Option<u64>,
    state: AllowlistState,
}

#[derive(Debug)]
pub struct CheckpointedIncremental {
    start_block: u64,
    checkpoints: Mutex<HashMap<Address, Checkpoint>>,
}

impl CheckpointedIncremental {
    pub fn new(start_block: u64) -> Self {
        CheckpointedIncremental {
            start_block,
            checkpoints: Mutex::new(HashMap::new()),
        }
    }

    /// Last block scanned for `user`, if any scan has settled.
    pub fn checkpoint(&self, user: Address) -> Option<u64> {
        let checkpoints = self.checkpoints.lock().unwrap_or_else(|e| e.into_inner());
        checkpoints.get(&user).and_then(|c| c.last_block)
    }
}

impl LogRangeStrategy for CheckpointedIncremental {
    fn name(&self) -> &'static str {
        "checkpointed_incremental"
    }

    fn plan(&self, user: Address, head: u64) -> Option<BlockRange> {
        let from = match self.checkpoint(user) {
            Some(last) => last.saturating_add(1),
            None => self.start_block,
        };
        let range = BlockRange::new(from, head);
        (!range.is_empty()).then_some(range)
    }

    fn settle(&self, user: Address, scanned: Option<BlockRange>, fresh: AllowlistState) -> AllowlistState {
        let mut checkpoints = self.checkpoints.lock().unwrap_or_else(|e| e.into_inner());
        let entry = checkpoints.entry(user).or_default();
        entry.state.extend(fresh);
        if let Some(range) = scanned {
            entry.last_block = Some(entry.last_block.map_or(range.to, |b| b.max(range.to)));
        }
        entry.state.clone()
    }
}
