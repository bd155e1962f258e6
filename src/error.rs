//! Error type shared by every stage of the engine.

use thiserror::Error as ThisError;

/// Errors raised while partitioning, caching travel times, or sequencing.
///
/// Provider and cache-integrity errors abort the whole run. Malformed records
/// are reported individually by the pipeline and never abort it.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The distance provider could not be reached or gave no response.
    #[error("distance provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The distance provider answered but returned no usable result.
    #[error("distance provider error: {status}")]
    ProviderError {
        /// Status description reported by the provider.
        status: String,
    },

    /// A cache entry was about to be written a second time.
    #[error("cache integrity violation: {origin} -> {destination} is already cached")]
    CacheIntegrityViolation {
        /// Origin address of the pair.
        origin: String,
        /// Destination address of the pair.
        destination: String,
    },

    /// A lookup asked for a pair that was never populated.
    #[error("no cached travel time for {origin} -> {destination}")]
    NotFound {
        /// Origin address of the pair.
        origin: String,
        /// Destination address of the pair.
        destination: String,
    },

    /// An input record is missing its address or geometry.
    #[error("malformed record {address:?}: {reason}")]
    MalformedInput {
        /// Address of the record, or an empty string if it had none.
        address: String,
        /// What was wrong with it.
        reason: String,
    },

    /// An address sits directly north or south of (or exactly on) the origin.
    ///
    /// Partitioners place such addresses by latitude sign and list them in
    /// [`Partition::degenerate`](crate::partition::Partition::degenerate);
    /// this error is raised only by
    /// [`Partition::require_regular`](crate::partition::Partition::require_regular).
    #[error("degenerate geometry for {address}: zero longitude offset from origin")]
    DegenerateGeometry {
        /// The offending address.
        address: String,
    },

    /// Configuration values are out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn provider_error(status: impl Into<String>) -> Self {
        Self::ProviderError {
            status: status.into(),
        }
    }

    pub fn malformed(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            address: address.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn not_found(origin: &str, destination: &str) -> Self {
        Self::NotFound {
            origin: origin.to_string(),
            destination: destination.to_string(),
        }
    }

    /// Returns `true` for errors that must abort a pipeline run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::MalformedInput { .. } | Self::DegenerateGeometry { .. }
        )
    }
}
