//! Defines the errors that may occur while reading or mutating a user's ledger.

/// The errors that may occur in the ledger engine.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested entry could not be found.
    ///
    /// Callers should check that the ID is correct and that the entry has not
    /// already been deleted. Internally, this error may occur when a query
    /// returns no rows.
    #[error("the requested entry could not be found")]
    NotFound,

    /// The acting user does not own the target entry.
    ///
    /// Reported as-is and never silently corrected. Distinct from
    /// [Error::NotFound] so that an authorization failure is never mistaken
    /// for a missing entry.
    #[error("the entry is owned by another user")]
    Forbidden,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database connection lock or a user's ledger lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        let got: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(Error::NotFound, got);
    }
}
