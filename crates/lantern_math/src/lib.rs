//! # lantern_math - 2D Geometry
//!
//! Points, rectangles, query shapes and alignment helpers used for
//! collision boxes and spatial lookups.

pub mod align;
pub mod bounds;
pub mod intersect;
pub mod vector;

pub use align::*;
pub use bounds::*;
pub use intersect::*;
pub use vector::*;
