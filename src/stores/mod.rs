//! Contains traits and implementations for objects that store ledger
//! [entries](crate::Entry).

mod entry;

pub mod sqlite;

pub use entry::EntryStore;
