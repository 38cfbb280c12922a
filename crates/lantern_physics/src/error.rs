//! Error types for the physics registry

use lantern_core::MapId;
use thiserror::Error;

/// Physics registry errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Entity has no collision box or collision is disabled
    #[error("Entity {0} has no collision")]
    NoCollision(MapId),

    /// Entity is already registered
    #[error("Entity {0} is already registered with physics")]
    AlreadyRegistered(MapId),

    /// Static bounds without an area
    #[error("Static bounds must have an area: {0:?}")]
    EmptyBounds(lantern_math::Rect),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
