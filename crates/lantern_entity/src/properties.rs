//! Custom key/value properties

use core::str::FromStr;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Typed access to string properties.
///
/// Lookups never fail loudly: a missing or malformed value yields `None` or
/// the supplied fallback.
pub trait PropertyProvider {
    /// Raw property value
    fn property(&self, name: &str) -> Option<String>;

    fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    fn string_value(&self, name: &str) -> Option<String> {
        self.property(name).filter(|v| !v.is_empty())
    }

    fn parse_value<T: FromStr>(&self, name: &str) -> Option<T> {
        self.property(name)?.trim().parse().ok()
    }

    fn bool_value(&self, name: &str, fallback: bool) -> bool {
        self.parse_value(name).unwrap_or(fallback)
    }

    fn int_value(&self, name: &str, fallback: i32) -> i32 {
        self.parse_value(name).unwrap_or(fallback)
    }

    fn u32_value(&self, name: &str, fallback: u32) -> u32 {
        self.parse_value(name).unwrap_or(fallback)
    }

    fn u64_value(&self, name: &str, fallback: u64) -> u64 {
        self.parse_value(name).unwrap_or(fallback)
    }

    fn f64_value(&self, name: &str, fallback: f64) -> f64 {
        self.parse_value(name).unwrap_or(fallback)
    }

    /// Comma separated list, trimmed, empty entries skipped
    fn list_value(&self, name: &str) -> Vec<String> {
        self.property(name)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Comma separated list of parseable values; malformed entries are skipped
    fn parsed_list<T: FromStr>(&self, name: &str) -> Vec<T> {
        self.list_value(name)
            .iter()
            .filter_map(|v| v.parse().ok())
            .collect()
    }
}

/// Thread-safe property bag of an entity
#[derive(Debug, Default)]
pub struct CustomProperties {
    values: RwLock<BTreeMap<String, String>>,
}

impl CustomProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.values.write().insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.values.write().remove(name)
    }

    /// Copy all properties from a map
    pub fn extend<'a>(&self, values: impl IntoIterator<Item = (&'a String, &'a String)>) {
        let mut map = self.values.write();
        for (k, v) in values {
            map.insert(k.clone(), v.clone());
        }
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.values.read().clone()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl PropertyProvider for CustomProperties {
    fn property(&self, name: &str) -> Option<String> {
        self.values.read().get(name).cloned()
    }
}

impl PropertyProvider for BTreeMap<String, String> {
    fn property(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
