//! Render dispatch
//!
//! The environment hands its entities to a [`RenderTarget`] phase by phase.
//! Static shadows and ambient light are composited over `NORMAL` entities
//! but below `OVERLAY` and `UI`.

use crate::lighting::{AmbientLight, StaticShadowLayer};
use lantern_entity::{EntityRef, RenderType};

/// One step of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPass {
    Entities(RenderType),
    StaticShadows,
    AmbientLight,
}

/// Entity phases in the order they are drawn
pub const PHASE_ORDER: [RenderType; 6] = [
    RenderType::Background,
    RenderType::Ground,
    RenderType::Surface,
    RenderType::Normal,
    RenderType::Overlay,
    RenderType::Ui,
];

/// Build the pass list of a frame
pub fn render_passes(shadows: bool, ambient_light: bool) -> Vec<RenderPass> {
    let mut passes = Vec::with_capacity(PHASE_ORDER.len() + 2);
    for phase in PHASE_ORDER {
        passes.push(RenderPass::Entities(phase));
        if phase == RenderType::Normal {
            if shadows {
                passes.push(RenderPass::StaticShadows);
            }
            if ambient_light {
                passes.push(RenderPass::AmbientLight);
            }
        }
    }
    passes
}

/// The rendering backend
pub trait RenderTarget {
    /// Draw the entities of one phase
    fn render_entities(&mut self, phase: RenderType, entities: &[EntityRef]);

    /// Composite the static shadow layer
    fn render_static_shadows(&mut self, layer: &StaticShadowLayer, casters: &[EntityRef]);

    /// Composite the ambient light
    fn render_ambient_light(&mut self, light: &AmbientLight, sources: &[EntityRef]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_order() {
        let passes = render_passes(true, true);
        let normal = passes
            .iter()
            .position(|p| *p == RenderPass::Entities(RenderType::Normal))
            .unwrap();
        assert_eq!(passes[normal + 1], RenderPass::StaticShadows);
        assert_eq!(passes[normal + 2], RenderPass::AmbientLight);
        assert_eq!(passes[normal + 3], RenderPass::Entities(RenderType::Overlay));
        assert_eq!(passes.last(), Some(&RenderPass::Entities(RenderType::Ui)));
        assert_eq!(passes[0], RenderPass::Entities(RenderType::Background));
    }

    #[test]
    fn test_optional_passes() {
        let passes = render_passes(false, false);
        assert_eq!(passes.len(), PHASE_ORDER.len());
        assert!(!passes.contains(&RenderPass::StaticShadows));

        let passes = render_passes(false, true);
        assert!(passes.contains(&RenderPass::AmbientLight));
    }
}
