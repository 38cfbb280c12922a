//! Horizontal and vertical alignment of an object inside a span

use core::fmt;
use core::str::FromStr;

use lantern_core::ParseEnumError;

/// Place an object of `object_size` inside `size` at `portion` of the span.
///
/// The object is centered on the anchor point and kept inside the span,
/// unless it doesn't fit in the first place.
fn aligned_location(size: f64, object_size: f64, portion: f64) -> f64 {
    let value = size * portion - object_size * 0.5;
    if object_size > size {
        return value;
    }

    value.max(0.0).min(size - object_size)
}

/// Horizontal alignment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Left,
    CenterLeft,
    #[default]
    Center,
    CenterRight,
    Right,
}

impl Align {
    pub const ALL: [Align; 5] = [
        Align::Left,
        Align::CenterLeft,
        Align::Center,
        Align::CenterRight,
        Align::Right,
    ];

    /// Anchor position as a fraction of the width
    pub const fn portion(self) -> f64 {
        match self {
            Align::Left => 0.0,
            Align::CenterLeft => 0.25,
            Align::Center => 0.5,
            Align::CenterRight => 0.75,
            Align::Right => 1.0,
        }
    }

    /// Horizontal offset of an object of `object_width` inside `width`
    pub fn location(self, width: f64, object_width: f64) -> f64 {
        aligned_location(width, object_width, self.portion())
    }

    pub const fn name(self) -> &'static str {
        match self {
            Align::Left => "LEFT",
            Align::CenterLeft => "CENTER_LEFT",
            Align::Center => "CENTER",
            Align::CenterRight => "CENTER_RIGHT",
            Align::Right => "RIGHT",
        }
    }

    /// Parse leniently, falling back to the default
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for Align {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseEnumError::new("Align", s))
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Vertical alignment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Valign {
    Top,
    MiddleTop,
    Middle,
    MiddleDown,
    #[default]
    Down,
}

impl Valign {
    pub const ALL: [Valign; 5] = [
        Valign::Top,
        Valign::MiddleTop,
        Valign::Middle,
        Valign::MiddleDown,
        Valign::Down,
    ];

    /// Anchor position as a fraction of the height
    pub const fn portion(self) -> f64 {
        match self {
            Valign::Top => 0.0,
            Valign::MiddleTop => 0.25,
            Valign::Middle => 0.5,
            Valign::MiddleDown => 0.75,
            Valign::Down => 1.0,
        }
    }

    /// Vertical offset of an object of `object_height` inside `height`
    pub fn location(self, height: f64, object_height: f64) -> f64 {
        aligned_location(height, object_height, self.portion())
    }

    pub const fn name(self) -> &'static str {
        match self {
            Valign::Top => "TOP",
            Valign::MiddleTop => "MIDDLE_TOP",
            Valign::Middle => "MIDDLE",
            Valign::MiddleDown => "MIDDLE_DOWN",
            Valign::Down => "DOWN",
        }
    }

    /// Parse leniently, falling back to the default
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for Valign {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseEnumError::new("Valign", s))
    }
}

impl fmt::Display for Valign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
