//! Ambient light and static shadow layers
//!
//! Both layers are images the renderer composites over the map. They are
//! rebuilt lazily: entities entering or leaving the environment only mark
//! the area they cover as dirty.

use crate::config::Quality;
use lantern_math::Rect;
use parking_lot::Mutex;

/// Pending redraw work of a layer
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Invalidation {
    /// Nothing changed
    #[default]
    Clean,
    /// Only these areas changed
    Regions(Vec<Rect>),
    /// The whole layer has to be rebuilt
    Full,
}

impl Invalidation {
    pub fn is_clean(&self) -> bool {
        matches!(self, Invalidation::Clean)
    }
}

/// Accumulates dirty areas until the renderer consumes them
#[derive(Debug, Default)]
pub struct DirtyRegions {
    pending: Mutex<Invalidation>,
}

impl DirtyRegions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an area for redraw
    pub fn invalidate(&self, area: Rect) {
        if area.is_empty() {
            return;
        }

        let mut pending = self.pending.lock();
        match &mut *pending {
            Invalidation::Full => {}
            Invalidation::Regions(regions) => {
                if !regions.iter().any(|r| r.contains_rect(&area)) {
                    regions.push(area);
                }
            }
            Invalidation::Clean => *pending = Invalidation::Regions(vec![area]),
        }
    }

    /// Mark the whole layer for redraw
    pub fn invalidate_all(&self) {
        *self.pending.lock() = Invalidation::Full;
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.lock().is_clean()
    }

    /// Pending work, without consuming it
    pub fn pending(&self) -> Invalidation {
        self.pending.lock().clone()
    }

    /// Consume the pending work
    pub fn take(&self) -> Invalidation {
        std::mem::take(&mut *self.pending.lock())
    }
}

/// Darkening overlay that light sources cut into
#[derive(Debug)]
pub struct AmbientLight {
    color: Mutex<String>,
    alpha: Mutex<u8>,
    dirty: DirtyRegions,
}

impl AmbientLight {
    pub fn new(color: impl Into<String>, alpha: u8) -> Self {
        let light = Self {
            color: Mutex::new(color.into()),
            alpha: Mutex::new(alpha),
            dirty: DirtyRegions::new(),
        };
        light.dirty.invalidate_all();
        light
    }

    pub fn color(&self) -> String {
        self.color.lock().clone()
    }

    pub fn set_color(&self, color: impl Into<String>) {
        *self.color.lock() = color.into();
        self.dirty.invalidate_all();
    }

    pub fn alpha(&self) -> u8 {
        *self.alpha.lock()
    }

    pub fn set_alpha(&self, alpha: u8) {
        *self.alpha.lock() = alpha;
        self.dirty.invalidate_all();
    }

    /// Whether the overlay is drawn at the given quality
    pub fn is_visible(&self, quality: Quality) -> bool {
        quality >= Quality::Medium && self.alpha() != 0
    }

    pub fn dirty(&self) -> &DirtyRegions {
        &self.dirty
    }
}

/// Pre-rendered shadows of static level geometry
#[derive(Debug)]
pub struct StaticShadowLayer {
    dirty: DirtyRegions,
}

impl StaticShadowLayer {
    pub fn new() -> Self {
        let layer = Self {
            dirty: DirtyRegions::new(),
        };
        layer.dirty.invalidate_all();
        layer
    }

    pub fn dirty(&self) -> &DirtyRegions {
        &self.dirty
    }
}

impl Default for StaticShadowLayer {
    fn default() -> Self {
        Self::new()
    }
}
