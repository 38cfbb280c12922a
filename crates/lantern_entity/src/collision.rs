//! Collision boxes
//!
//! The collision box of an entity is derived from its transform and its
//! [`CollisionInfo`]. [`resolve_collision_box`] is the pure computation; the
//! [`CollisionComponent`] caches its result and must be invalidated whenever
//! any input changes.

use core::fmt;
use core::str::FromStr;
use lantern_core::ParseEnumError;
use lantern_math::{Align, Rect, Valign, Vec2};
use serde::{Deserialize, Serialize};

/// Fraction of the entity width used when no box width is configured
pub const WIDTH_FACTOR: f64 = 0.4;
/// Fraction of the entity height used when no box height is configured
pub const HEIGHT_FACTOR: f64 = 0.4;
/// Box dimension sentinel meaning "derive from the entity size"
pub const DERIVED_BOX_SIZE: f64 = -1.0;

/// How the physics engine treats an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CollisionType {
    Static,
    #[default]
    Dynamic,
    /// Only valid as a query filter, never on an entity
    Any,
}

impl CollisionType {
    pub const fn name(self) -> &'static str {
        match self {
            CollisionType::Static => "STATIC",
            CollisionType::Dynamic => "DYNAMIC",
            CollisionType::Any => "ANY",
        }
    }

    /// Whether an entity of type `self` matches the query filter `filter`
    pub fn matches(self, filter: CollisionType) -> bool {
        filter == CollisionType::Any || self == filter
    }
}

impl FromStr for CollisionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("static") => Ok(CollisionType::Static),
            v if v.eq_ignore_ascii_case("dynamic") => Ok(CollisionType::Dynamic),
            v if v.eq_ignore_ascii_case("any") => Ok(CollisionType::Any),
            _ => Err(ParseEnumError::new("CollisionType", s)),
        }
    }
}

impl fmt::Display for CollisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Collision configuration of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionInfo {
    /// Whether the entity takes part in collision resolution
    pub enabled: bool,
    /// Box width, or [`DERIVED_BOX_SIZE`]
    pub box_width: f64,
    /// Box height, or [`DERIVED_BOX_SIZE`]
    pub box_height: f64,
    pub align: Align,
    pub valign: Valign,
    pub collision_type: CollisionType,
    /// Keep the box the same size as the entity (triggers)
    pub box_follows_size: bool,
}

impl Default for CollisionInfo {
    fn default() -> Self {
        Self {
            enabled: true,
            box_width: DERIVED_BOX_SIZE,
            box_height: DERIVED_BOX_SIZE,
            align: Align::Center,
            valign: Valign::Down,
            collision_type: CollisionType::Dynamic,
            box_follows_size: false,
        }
    }
}

impl CollisionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collision box for triggers and areas: covers the whole entity, no collision
    pub fn covering() -> Self {
        Self {
            enabled: false,
            box_follows_size: true,
            ..Self::default()
        }
    }

    pub fn with_box_size(mut self, width: f64, height: f64) -> Self {
        self.box_width = width;
        self.box_height = height;
        self
    }

    pub fn with_align(mut self, align: Align, valign: Valign) -> Self {
        self.align = align;
        self.valign = valign;
        self
    }

    pub fn with_collision_type(mut self, collision_type: CollisionType) -> Self {
        self.collision_type = collision_type;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Box dimensions with the derived-size sentinel resolved
pub fn effective_box_size(width: f64, height: f64, box_width: f64, box_height: f64) -> (f64, f64) {
    let w = if box_width == DERIVED_BOX_SIZE {
        (width * WIDTH_FACTOR).round()
    } else {
        box_width
    };
    let h = if box_height == DERIVED_BOX_SIZE {
        (height * HEIGHT_FACTOR).round()
    } else {
        box_height
    };
    (w, h)
}

/// Compute a collision box.
///
/// `box_width` and `box_height` must already be resolved (see
/// [`effective_box_size`]).
pub fn resolve_collision_box(
    location: Vec2,
    width: f64,
    height: f64,
    box_width: f64,
    box_height: f64,
    align: Align,
    valign: Valign,
) -> Rect {
    let x = location.x + align.location(width, box_width);
    let y = location.y + valign.location(height, box_height);
    Rect::new(x, y, box_width, box_height)
}

/// Collision state of an entity
#[derive(Debug, Clone)]
pub struct CollisionComponent {
    info: CollisionInfo,
    cached: Option<Rect>,
}

impl CollisionComponent {
    pub fn new(info: CollisionInfo) -> Self {
        Self { info, cached: None }
    }

    pub fn info(&self) -> &CollisionInfo {
        &self.info
    }

    /// Drop the cached box
    #[inline]
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// The collision box for an entity with the given transform
    pub fn collision_box(&mut self, location: Vec2, width: f64, height: f64) -> Rect {
        if let Some(cached) = self.cached {
            return cached;
        }

        let rect = self.compute(location, width, height);
        self.cached = Some(rect);
        rect
    }

    /// Compute the box without touching the cache
    pub fn compute(&self, location: Vec2, width: f64, height: f64) -> Rect {
        let (bw, bh) = effective_box_size(width, height, self.info.box_width, self.info.box_height);
        resolve_collision_box(location, width, height, bw, bh, self.info.align, self.info.valign)
    }

    /// Enabled and the resolved box has an area
    pub fn has_collision(&self, width: f64, height: f64) -> bool {
        let (bw, bh) = effective_box_size(width, height, self.info.box_width, self.info.box_height);
        self.info.enabled && bw > 0.0 && bh > 0.0
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.info.enabled = enabled;
    }

    pub fn set_box_size(&mut self, width: f64, height: f64) {
        self.info.box_width = width;
        self.info.box_height = height;
        self.invalidate();
    }

    pub fn set_align(&mut self, align: Align) {
        self.info.align = align;
        self.invalidate();
    }

    pub fn set_valign(&mut self, valign: Valign) {
        self.info.valign = valign;
        self.invalidate();
    }

    /// Change the collision type. `Any` is refused and leaves the type unchanged.
    pub fn set_collision_type(&mut self, collision_type: CollisionType) -> bool {
        if collision_type == CollisionType::Any {
            log::warn!(
                "CollisionType::Any can't be assigned to an entity, it may only be used to filter physics queries"
            );
            return false;
        }

        self.info.collision_type = collision_type;
        true
    }

    /// Follow a size change of the entity
    pub fn entity_resized(&mut self, width: f64, height: f64) {
        if self.info.box_follows_size {
            self.info.box_width = width;
            self.info.box_height = height;
        }
        self.invalidate();
    }
}
