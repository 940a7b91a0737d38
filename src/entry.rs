//! Defines the core data model for balance entries.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{database_id::EntryID, user::UserID};

/// One balance observation belonging to a user, carrying a derived budget.
///
/// Entries are only ever created through
/// [LedgerService::insert](crate::LedgerService::insert) and mutated through
/// its update operation, which keeps `budget` consistent with the entry's
/// chronological predecessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The ID of the entry.
    pub id: EntryID,
    /// The user that owns the entry. Entries are never shared or reassigned.
    pub user_id: UserID,
    /// The observed account balance.
    pub balance: f64,
    /// The share of a balance increase that counts towards the budget.
    ///
    /// Expected to lie in `[0, 1]`. The engine passes the value through
    /// unvalidated, range checks are the caller's responsibility.
    pub ratio: f64,
    /// The derived budget.
    ///
    /// Never client-supplied: it is a pure function of `balance`, `ratio` and
    /// the chronological predecessor's `balance` and `budget`.
    pub budget: f64,
    /// When the entry was recorded. Used only for ordering a user's history.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The caller-supplied fields for creating an [Entry].
///
/// Deliberately omits `budget`: the engine derives it, and a budget field in
/// an incoming payload is ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewEntry {
    /// The observed account balance.
    pub balance: f64,
    /// The share of a balance increase that counts towards the budget.
    pub ratio: f64,
}
