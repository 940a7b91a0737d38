//! Implements the ledger mutation engine.
//!
//! [LedgerService] orchestrates the three mutating operations on a user's
//! ledger: inserting a new entry, amending an existing one and deleting one.
//! For each operation it determines the minimal contiguous suffix of entries
//! whose budgets must be re-derived, recomputes that suffix in chronological
//! order, and persists it as one atomic batch alongside the structural
//! change.
//!
//! The service holds no durable state; everything lives behind the
//! [EntryStore]. Mutations on the same user's ledger are serialized with a
//! per-user lock held for the whole read-compute-write sequence, so
//! concurrent requests cannot interleave between reading a history and
//! writing back the recomputed suffix. Operations on different users' ledgers
//! do not block one another.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    Error,
    budget::compute_budget,
    database_id::EntryID,
    entry::{Entry, NewEntry},
    history::History,
    stores::EntryStore,
    user::UserID,
};

/// A registry of per-user locks.
///
/// Lock values are handed out as `Arc`s so a ledger lock can be held across
/// the whole operation without keeping the registry itself locked. Locks that
/// no in-flight operation holds are evicted on the next lookup, so the
/// registry is bounded by the number of concurrent operations rather than by
/// the number of user IDs ever touched.
#[derive(Debug, Clone, Default)]
struct UserLocks {
    locks: Arc<Mutex<HashMap<UserID, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    fn lock_for(&self, user_id: UserID) -> Result<Arc<Mutex<()>>, Error> {
        let mut locks = self.locks.lock().map_err(|_| Error::DatabaseLockError)?;

        // A strong count of 1 means only the registry itself still refers to
        // the lock, so no operation can be holding it.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);

        Ok(Arc::clone(locks.entry(user_id).or_default()))
    }
}

/// Mutates users' ledgers, keeping every entry's derived budget consistent
/// with its chronological predecessor.
///
/// Callers are expected to have authenticated the actor already; the service
/// still re-verifies that the actor owns the target entry and fails closed
/// with [Error::Forbidden] on a mismatch.
#[derive(Debug, Clone)]
pub struct LedgerService<S> {
    store: S,
    user_locks: UserLocks,
}

impl<S: EntryStore> LedgerService<S> {
    /// Create a new service on top of `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            user_locks: UserLocks::default(),
        }
    }

    /// Insert a new entry at the chronological end of `owner`'s ledger.
    ///
    /// The entry's budget is derived from the owner's current newest entry
    /// (zero if the owner has no history yet). No existing entry is read for
    /// mutation or rewritten: insertion only ever appends, so nothing depends
    /// on the new entry yet.
    ///
    /// Returns the persisted entry with its store-assigned ID.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the store fails, or an
    /// [Error::DatabaseLockError] if the owner's ledger lock is poisoned.
    pub fn insert(&mut self, new_entry: NewEntry, owner: UserID) -> Result<Entry, Error> {
        let ledger_lock = self.user_locks.lock_for(owner)?;
        let _guard = ledger_lock.lock().map_err(|_| Error::DatabaseLockError)?;

        let newest = self.store.get_by_user(owner, Some(1))?;
        let budget = compute_budget(new_entry.balance, new_entry.ratio, newest.first());

        let entry = self
            .store
            .create(owner, new_entry.balance, new_entry.ratio, budget)?;

        tracing::debug!(
            "inserted entry {} for user {} with budget {}",
            entry.id,
            owner,
            entry.budget
        );

        Ok(entry)
    }

    /// Apply a new balance and ratio to the entry with `entry_id`, then
    /// re-derive the budgets of the entry and everything chronologically
    /// newer than it.
    ///
    /// The edited entry is re-anchored on its true predecessor first, then
    /// the recompute propagates forward in chronological order. Entries older
    /// than the target are never read for mutation and are not rewritten. The
    /// recomputed suffix is persisted as one atomic batch.
    ///
    /// Returns the owner's full updated ledger, newest first.
    ///
    /// # Errors
    /// Returns an:
    /// - [Error::NotFound] if `entry_id` does not refer to an entry,
    /// - [Error::Forbidden] if `actor` does not own the entry,
    /// - [Error::SqlError] if the store fails (in which case no partial
    ///   recompute is durably visible),
    /// - [Error::DatabaseLockError] if the ledger lock is poisoned.
    pub fn update(
        &mut self,
        entry_id: EntryID,
        actor: UserID,
        new_balance: f64,
        new_ratio: f64,
    ) -> Result<Vec<Entry>, Error> {
        let ledger_lock = self.user_locks.lock_for(actor)?;
        let _guard = ledger_lock.lock().map_err(|_| Error::DatabaseLockError)?;

        let target = self.store.get(entry_id)?;
        if target.user_id != actor {
            tracing::debug!(
                "user {} attempted to update entry {} owned by user {}",
                actor,
                entry_id,
                target.user_id
            );
            return Err(Error::Forbidden);
        }

        let mut history = History::from_newest_first(self.store.get_by_user(actor, None)?);
        let index = history.position_of(entry_id).ok_or(Error::NotFound)?;

        history.amend(index, new_balance, new_ratio);
        history.reanchor(index);
        history.recompute_suffix(index);

        self.store.batch_update(history.affected_suffix(index))?;

        tracing::debug!(
            "updated entry {} for user {}, rewrote {} entries",
            entry_id,
            actor,
            index + 1
        );

        Ok(history.into_entries())
    }

    /// Delete the entry with `entry_id`, then re-derive the budgets of every
    /// entry chronologically newer than it.
    ///
    /// Deleting the newest entry requires no recompute since nothing depends
    /// on it. Otherwise the entry adjacent to the target is re-anchored on
    /// the target's predecessor, the strictly-newer suffix is recomputed, and
    /// the delete and the batch update are persisted as a single atomic step.
    /// Entries older than the target are untouched.
    ///
    /// Returns the owner's remaining ledger, newest first.
    ///
    /// # Errors
    /// Returns an:
    /// - [Error::NotFound] if `entry_id` does not refer to an entry,
    /// - [Error::Forbidden] if `actor` does not own the entry,
    /// - [Error::SqlError] if the store fails (in which case neither the
    ///   delete nor any recompute is durably visible),
    /// - [Error::DatabaseLockError] if the ledger lock is poisoned.
    pub fn delete(&mut self, entry_id: EntryID, actor: UserID) -> Result<Vec<Entry>, Error> {
        let ledger_lock = self.user_locks.lock_for(actor)?;
        let _guard = ledger_lock.lock().map_err(|_| Error::DatabaseLockError)?;

        let target = self.store.get(entry_id)?;
        if target.user_id != actor {
            tracing::debug!(
                "user {} attempted to delete entry {} owned by user {}",
                actor,
                entry_id,
                target.user_id
            );
            return Err(Error::Forbidden);
        }

        let mut history = History::from_newest_first(self.store.get_by_user(actor, None)?);
        let index = history.position_of(entry_id).ok_or(Error::NotFound)?;

        history.remove(index);

        if index == 0 {
            // Nothing depends on the newest entry.
            self.store.delete(entry_id)?;
            tracing::debug!("deleted newest entry {} for user {}", entry_id, actor);
            return Ok(history.into_entries());
        }

        let anchor = index - 1;
        history.reanchor(anchor);
        history.recompute_suffix(anchor);

        self.store
            .delete_and_update(entry_id, history.affected_suffix(anchor))?;

        tracing::debug!(
            "deleted entry {} for user {}, rewrote {} entries",
            entry_id,
            actor,
            anchor + 1
        );

        Ok(history.into_entries())
    }
}
