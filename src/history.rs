//! An ordered view over one user's ledger entries.
//!
//! Mutations need to reason about "the target entry and everything
//! chronologically newer than it". [History] names that concept explicitly
//! instead of spreading raw index arithmetic across the engine: entries are
//! held newest-first (the order the store returns them in), recomputation
//! walks them chronologically, and the *affected suffix* is the contiguous
//! run that must be persisted after a mutation.

use crate::{
    budget::{compute_budget, recompute_budgets},
    database_id::EntryID,
    entry::Entry,
};

/// One user's ledger entries, ordered newest-first.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: Vec<Entry>,
}

impl History {
    /// Wrap `entries` that are already ordered newest-first, with ties broken
    /// by descending ID (the order produced by
    /// [EntryStore::get_by_user](crate::EntryStore::get_by_user)).
    pub fn from_newest_first(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// The number of entries in the history.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries in newest-first order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Find the position of the entry with `id`, if present.
    pub fn position_of(&self, id: EntryID) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// The chronological predecessor of the entry at `index`, i.e. the
    /// next-older entry. `None` for the chronologically oldest entry.
    pub fn predecessor_of(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index + 1)
    }

    /// Apply a new balance and ratio to the entry at `index`.
    ///
    /// The entry's budget is stale afterwards; call [History::reanchor] to fix
    /// it before recomputing the suffix.
    pub fn amend(&mut self, index: usize, balance: f64, ratio: f64) {
        self.entries[index].balance = balance;
        self.entries[index].ratio = ratio;
    }

    /// Remove and return the entry at `index`.
    ///
    /// The budgets of entries newer than `index` are stale afterwards; the
    /// entry at `index - 1` (if any) must be re-anchored on its new
    /// predecessor.
    pub fn remove(&mut self, index: usize) -> Entry {
        self.entries.remove(index)
    }

    /// Recompute the budget of the entry at `index` from its current
    /// chronological predecessor.
    pub fn reanchor(&mut self, index: usize) {
        let budget = compute_budget(
            self.entries[index].balance,
            self.entries[index].ratio,
            self.predecessor_of(index),
        );
        self.entries[index].budget = budget;
    }

    /// Recompute the budgets of every entry newer than `anchor`, propagating
    /// forward in chronological order from the entry at `anchor`, which is
    /// left untouched.
    pub fn recompute_suffix(&mut self, anchor: usize) {
        recompute_budgets(&mut self.entries[..=anchor]);
    }

    /// The contiguous suffix of entries at or after the mutation point
    /// `anchor`: the entries whose budgets a mutation (re)derived and which
    /// must be persisted as one atomic batch.
    pub fn affected_suffix(&self, anchor: usize) -> &[Entry] {
        &self.entries[..=anchor]
    }

    /// Consume the history, returning the entries in newest-first order.
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}
