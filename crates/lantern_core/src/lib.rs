//! # lantern_core - Lantern Engine Core
//!
//! Primitives shared by every other crate:
//! - map ids and the environment-local id sequence
//! - process-wide instance ids for object identity
//! - clocks used for cooldowns and timestamps
//! - the error type for parsing enum values out of map properties
//! - listener registries that are safe to mutate while dispatching

pub mod error;
pub mod id;
pub mod listener;
pub mod time;

pub use error::*;
pub use id::*;
pub use listener::*;
pub use time::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::ParseEnumError;
    pub use crate::id::{InstanceId, LocalIdSequence, MapId};
    pub use crate::listener::{ListenerId, Listeners};
    pub use crate::time::{Clock, ManualClock, SystemClock};
}
