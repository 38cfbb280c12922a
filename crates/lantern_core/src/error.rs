//! Error types for the core library

use core::fmt;

/// Raised when a map property cannot be parsed into one of the engine's enums
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    /// Name of the enum that was being parsed
    pub kind: &'static str,
    /// The offending input
    pub value: Box<str>,
}

impl ParseEnumError {
    /// Create a new parse error
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid {}", self.value, self.kind)
    }
}

impl std::error::Error for ParseEnumError {}
