//! SQLite backed implementations of the store traits.

mod entry;

pub use entry::SQLiteEntryStore;
