//! Physics configuration

use lantern_math::Rect;
use serde::{Deserialize, Serialize};

/// Physics registry configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Area queries are clipped to (usually the map size). `None` is unbounded.
    pub bounds: Option<Rect>,
}

impl PhysicsConfig {
    /// Set the world bounds
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Whether `area` overlaps the world
    pub fn covers(&self, area: &Rect) -> bool {
        self.bounds.map_or(true, |b| b.intersects(area))
    }
}
