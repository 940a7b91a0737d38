//! Money Manager tracks, per user, a chronological sequence of account
//! balance observations, each carrying a derived budget computed from the
//! observation's own fields and from its chronological predecessor.
//!
//! This library implements the ledger recompute engine: on insertion,
//! amendment or removal of any entry in a user's history it decides exactly
//! which other entries' budgets must be re-derived, in what order, and
//! persists the affected range atomically. HTTP routing, authentication and
//! authorization policy live outside this crate; the engine only re-verifies
//! that the acting user owns the entry it is about to mutate.
//!
//! The main entry points are [LedgerService] for mutations, [EntryStore] for
//! plugging in a persistence backend, and [SQLiteEntryStore] as the bundled
//! SQLite backend.

#![warn(missing_docs)]

mod budget;
mod database_id;
mod db;
mod entry;
mod error;
mod history;
mod service;
mod stores;
mod user;

pub use budget::{compute_budget, recompute_budgets};
pub use database_id::{DatabaseID, EntryID};
pub use db::{CreateTable, MapRow, initialize as initialize_db};
pub use entry::{Entry, NewEntry};
pub use error::Error;
pub use history::History;
pub use service::LedgerService;
pub use stores::{EntryStore, sqlite::SQLiteEntryStore};
pub use user::UserID;
