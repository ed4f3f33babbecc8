//! Dedup ledger: at-most-once bookkeeping keyed by content hash.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::models::ContentHash;

/// State of one ledger entry.
///
/// Transitions are one-way: `Pending -> Done` or `Pending -> Failed`,
/// written exactly once. Entries are never deleted for the life of the
/// process; the ledger is in-memory, so a restart starts clean and any
/// entry left `Pending` by a crash is implicitly discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    /// Claimed; a worker is (or will be) reformatting this content.
    Pending,
    /// Reformatted output was written.
    Done,
    /// Reformatting failed; not retried silently.
    Failed,
}

/// Outcome of a claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// This caller owns the hash; it must later mark it done or failed.
    Claimed,
    /// Someone already claimed (or finished) this hash.
    AlreadyClaimed,
}

/// Tracks which content hashes have been scheduled or completed so
/// identical content is reformatted at most once.
#[derive(Default)]
pub struct DedupLedger {
    entries: Mutex<HashMap<ContentHash, LedgerState>>,
}

impl DedupLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims `hash`, transitioning it from absent to
    /// [`LedgerState::Pending`].
    ///
    /// At most one caller gets [`Claim::Claimed`] for a given hash; this is
    /// the pipeline's core at-most-once guarantee.
    pub fn try_claim(&self, hash: ContentHash) -> Claim {
        let mut entries = self.lock_entries();
        match entries.entry(hash) {
            Entry::Occupied(_) => Claim::AlreadyClaimed,
            Entry::Vacant(vacant) => {
                vacant.insert(LedgerState::Pending);
                Claim::Claimed
            }
        }
    }

    /// Marks a pending entry as done.
    pub fn mark_done(&self, hash: ContentHash) {
        self.transition(hash, LedgerState::Done);
    }

    /// Marks a pending entry as failed.
    pub fn mark_failed(&self, hash: ContentHash) {
        self.transition(hash, LedgerState::Failed);
    }

    /// Returns the current state of `hash`, if it has ever been claimed.
    pub fn state(&self, hash: &ContentHash) -> Option<LedgerState> {
        self.lock_entries().get(hash).copied()
    }

    /// Number of entries currently in the given state.
    pub fn count_in_state(&self, state: LedgerState) -> usize {
        self.lock_entries()
            .values()
            .filter(|current| **current == state)
            .count()
    }

    /// Total number of distinct hashes ever claimed.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// True when no hash has been claimed yet.
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    fn transition(&self, hash: ContentHash, to: LedgerState) {
        let mut entries = self.lock_entries();
        match entries.get_mut(&hash) {
            Some(state @ LedgerState::Pending) => *state = to,
            Some(other) => {
                log::error!("Invalid ledger transition for {hash}: {other:?} -> {to:?}");
            }
            None => {
                log::error!("Ledger transition for unknown hash {hash} -> {to:?}");
            }
        }
    }

    fn lock_entries(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<ContentHash, LedgerState>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
