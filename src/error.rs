//! Error types for u-stowage.
//!
//! Planning outcomes that are expected in normal operation (an item that
//! fits nowhere, a rearrangement without a plan) are reported through the
//! result types of each module, not through [`Error`].

use thiserror::Error;

/// Result type alias for u-stowage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors caused by malformed input or misconfiguration.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid item or container geometry.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An item id that does not resolve in the snapshot.
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// A container id that does not resolve in the snapshot.
    #[error("Unknown container: {0}")]
    UnknownContainer(String),

    /// The item has no current position in the given container.
    #[error("Item '{item}' has no position in container '{container}'")]
    NotInContainer {
        /// Item that was looked up.
        item: String,
        /// Container that was searched.
        container: String,
    },

    /// Computation cancelled.
    #[error("Computation cancelled")]
    Cancelled,
}
