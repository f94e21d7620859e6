use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Depot operations.
#[derive(Debug, Error, Diagnostic)]
pub enum DepotError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A requested coordinate has no stored record and the artifact
    /// repository cannot supply one.
    #[error("Unknown coordinate: {coordinate}")]
    #[diagnostic(help("Check that the version has been published and ingested"))]
    MissingCoordinate { coordinate: String },

    /// The external artifact repository could not be reached or answered
    /// with an unexpected response while fetching raw dependency metadata.
    ///
    /// This is the one failure mode allowed to cross the resolver boundary:
    /// it means the input data itself could not be obtained.
    #[error("Repository access failed for {coordinate}: {message}")]
    RepositoryAccess { coordinate: String, message: String },

    /// Reading or writing persisted project metadata failed.
    #[error("Store error: {message}")]
    Store { message: String },

    /// Constraint encoding produced an inconsistent instance (e.g. a clause
    /// referencing an unmapped variable). Indicates a bug, not bad input.
    #[error("Encoding invariant violated: {message}")]
    Encoding { message: String },

    /// Invalid or malformed input (fixture files, coordinate strings).
    #[error("Invalid input: {message}")]
    #[diagnostic(help("Coordinates are written as group:artifact:version"))]
    Input { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type DepotResult<T> = miette::Result<T>;
