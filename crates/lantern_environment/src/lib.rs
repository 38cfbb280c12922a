//! # lantern_environment - Level Container
//!
//! An [`Environment`] owns every entity of a loaded level and keeps its
//! lookup indices (map id, name, tag, kind, render phase) consistent as
//! entities come and go.
//!
//! ## Features
//!
//! - Lifecycle: `init` loads map objects once, `load`/`unload` admit and
//!   evict entities, `clear` starts over
//! - Admission registers entities with physics, the update scheduler,
//!   gravity, their controllers and the lighting layers
//! - Map objects are turned into entities by a per-environment
//!   [`LoaderRegistry`], extensible at runtime
//! - Render dispatch in a fixed phase order with shadow and light passes
//!
//! ## Example
//!
//! ```ignore
//! use lantern_environment::prelude::*;
//!
//! let map = TileMap::from_json(&std::fs::read_to_string("level.json")?)?;
//! let env = Environment::from_map(map);
//! env.load();
//!
//! env.set_gravity(50.0);
//! for goblin in env.get_by_tag("goblin") {
//!     goblin.send_message(None, "wake up");
//! }
//! ```

pub mod config;
pub mod environment;
pub mod error;
pub mod lighting;
pub mod loader;
pub mod loaders;
pub mod map;
pub mod render;
pub mod scheduler;

pub use config::{EnvironmentConfig, Quality};
pub use environment::{
    Environment, EnvironmentBuilder, EntityListener, EnvironmentListener, RenderPhaseListener,
};
pub use error::{EnvironmentError, LoaderError, Result};
pub use lighting::{AmbientLight, DirtyRegions, Invalidation, StaticShadowLayer};
pub use loader::{apply_default_properties, sanitize_tag, FnLoader, LoadResult, LoaderRegistry, MapObjectLoader};
pub use map::{keys, MapObject, MapObjectLayer, MapObjectType, TileMap};
pub use render::{render_passes, RenderPass, RenderTarget, PHASE_ORDER};
pub use scheduler::{UpdateLoop, UpdateScheduler};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{EnvironmentConfig, Quality};
    pub use crate::environment::{Environment, EnvironmentBuilder};
    pub use crate::error::{EnvironmentError, LoaderError};
    pub use crate::lighting::{AmbientLight, StaticShadowLayer};
    pub use crate::loader::{FnLoader, LoaderRegistry, MapObjectLoader};
    pub use crate::map::{MapObject, MapObjectLayer, MapObjectType, TileMap};
    pub use crate::render::{RenderPass, RenderTarget};
    pub use crate::scheduler::{UpdateLoop, UpdateScheduler};
    pub use lantern_entity::prelude::*;
    pub use lantern_physics::{PhysicsEngine, PhysicsWorld};
}
