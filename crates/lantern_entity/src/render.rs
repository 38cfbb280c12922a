//! Render phases

use core::fmt;
use core::str::FromStr;
use lantern_core::ParseEnumError;
use serde::{Deserialize, Serialize};

/// The rendering bucket an entity is drawn in.
///
/// Phases are drawn in declaration order. `None` entities are never drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum RenderType {
    Background,
    Ground,
    Surface,
    #[default]
    Normal,
    Overlay,
    Ui,
    None,
}

impl RenderType {
    /// Every render type, including `None`
    pub const ALL: [RenderType; 7] = [
        RenderType::Background,
        RenderType::Ground,
        RenderType::Surface,
        RenderType::Normal,
        RenderType::Overlay,
        RenderType::Ui,
        RenderType::None,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            RenderType::Background => "BACKGROUND",
            RenderType::Ground => "GROUND",
            RenderType::Surface => "SURFACE",
            RenderType::Normal => "NORMAL",
            RenderType::Overlay => "OVERLAY",
            RenderType::Ui => "UI",
            RenderType::None => "NONE",
        }
    }

    /// Whether entities of this type get drawn at all
    pub const fn is_rendered(self) -> bool {
        !matches!(self, RenderType::None)
    }
}

impl FromStr for RenderType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseEnumError::new("RenderType", s))
    }
}

impl fmt::Display for RenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
