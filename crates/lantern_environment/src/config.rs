//! Environment configuration

use crate::error::Result;
use core::fmt;
use core::str::FromStr;
use lantern_core::ParseEnumError;
use serde::{Deserialize, Serialize};

/// Graphics quality, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
    VeryHigh,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Low, Quality::Medium, Quality::High, Quality::VeryHigh];

    pub const fn name(self) -> &'static str {
        match self {
            Quality::Low => "LOW",
            Quality::Medium => "MEDIUM",
            Quality::High => "HIGH",
            Quality::VeryHigh => "VERYHIGH",
        }
    }
}

impl FromStr for Quality {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|q| q.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseEnumError::new("Quality", s))
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Strength of the gravity force applied to mobile entities (0 = none)
    pub gravity: f64,

    /// Quality the ambient light and shadows are rendered at
    pub graphics_quality: Quality,

    /// Alpha of the ambient light overlay (0 = invisible)
    pub ambient_alpha: u8,

    /// Hex color of the ambient light
    pub ambient_color: String,

    /// Edge length of a map tile in pixels
    pub tile_size: u32,
}

impl EnvironmentConfig {
    pub const DEFAULT_AMBIENT_COLOR: &'static str = "#000000";
    pub const DEFAULT_TILE_SIZE: u32 = 16;

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set gravity
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set graphics quality
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.graphics_quality = quality;
        self
    }

    /// Set the ambient light
    pub fn with_ambient_light(mut self, color: impl Into<String>, alpha: u8) -> Self {
        self.ambient_color = color.into();
        self.ambient_alpha = alpha;
        self
    }

    /// Set the tile size
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            gravity: 0.0,
            graphics_quality: Quality::Medium,
            ambient_alpha: 0,
            ambient_color: Self::DEFAULT_AMBIENT_COLOR.to_string(),
            tile_size: Self::DEFAULT_TILE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_defaults() {
        let config = EnvironmentConfig::from_json(r#"{ "gravity": 9.5, "graphics_quality": "High" }"#).unwrap();
        assert_eq!(config.gravity, 9.5);
        assert_eq!(config.graphics_quality, Quality::High);
        assert_eq!(config.tile_size, EnvironmentConfig::DEFAULT_TILE_SIZE);
        assert_eq!(config.ambient_color, "#000000");
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(EnvironmentConfig::from_json("{ gravity: }").is_err());
    }

    #[test]
    fn test_quality_order() {
        assert!(Quality::Low < Quality::Medium);
        assert!(Quality::VeryHigh > Quality::High);
        assert_eq!("veryhigh".parse::<Quality>().unwrap(), Quality::VeryHigh);
    }
}
