//! Error types for environments and map object loading

use thiserror::Error;

/// A map object a loader could not turn into entities
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The record is malformed for this kind of map object
    #[error("cannot interpret map object #{id} of kind {kind}: {reason}")]
    CannotInterpret {
        id: i32,
        kind: String,
        reason: String,
    },
}

impl LoaderError {
    pub fn cannot_interpret(id: i32, kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CannotInterpret {
            id,
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

/// Environment errors
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// Map or configuration JSON could not be parsed
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A map object could not be loaded
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// A map object id that isn't part of the map
    #[error("map has no object with id {0}")]
    UnknownMapObject(i32),

    /// The operation needs map data but the environment has none
    #[error("environment has no map")]
    NoMap,
}

/// Result type for environment operations
pub type Result<T> = std::result::Result<T, EnvironmentError>;
