//! Defines the store for ledger entries.

use crate::{
    Error,
    database_id::EntryID,
    entry::Entry,
    user::UserID,
};

/// Handles the persistence of ledger [entries](Entry).
///
/// This is the narrow gateway the ledger engine mutates durable state
/// through: the engine itself holds no state between calls.
pub trait EntryStore {
    /// Persist a new entry for `user_id` and return it with its
    /// store-assigned ID and creation timestamp.
    ///
    /// `budget` has already been derived by the engine; the store must not
    /// recompute or alter it.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the insert fails.
    fn create(
        &mut self,
        user_id: UserID,
        balance: f64,
        ratio: f64,
        budget: f64,
    ) -> Result<Entry, Error>;

    /// Retrieve the entry with `id`.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to an entry, or an
    /// [Error::SqlError] for any other SQL error.
    fn get(&self, id: EntryID) -> Result<Entry, Error>;

    /// Retrieve the entries owned by `user_id`, ordered newest-first with
    /// ties broken by descending ID, optionally limited to the `limit` most
    /// recent entries.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the query fails.
    fn get_by_user(&self, user_id: UserID, limit: Option<u32>) -> Result<Vec<Entry>, Error>;

    /// Rewrite the balance, ratio and budget of each of `entries`.
    ///
    /// Atomic: either every update applies or none do.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if any entry's ID does not refer to a
    /// stored entry (in which case nothing is applied), or an
    /// [Error::SqlError] if the batch fails.
    fn batch_update(&mut self, entries: &[Entry]) -> Result<(), Error>;

    /// Delete the entry with `id`.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to an entry, or an
    /// [Error::SqlError] if the delete fails.
    fn delete(&mut self, id: EntryID) -> Result<(), Error>;

    /// Delete the entry with `id` and rewrite `entries` as a single atomic
    /// step: both succeed together or neither takes effect.
    ///
    /// Used when deleting an entry forces the budgets of newer entries to be
    /// re-derived; a partially applied recompute must never become durable.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` or any entry's ID is
    /// unresolvable, or an [Error::SqlError] if the write fails. In both
    /// cases the store is left unchanged.
    fn delete_and_update(&mut self, id: EntryID, entries: &[Entry]) -> Result<(), Error>;
}
