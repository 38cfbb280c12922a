//! Map object loaders
//!
//! Loaders turn declarative [`MapObject`] records into entities. Each
//! environment owns a [`LoaderRegistry`] with the built-in loaders already
//! registered; games add loaders for their own kinds at runtime.

use crate::error::LoaderError;
use crate::loaders;
use crate::map::{keys, MapObject};
use lantern_entity::{EntityBuilder, EntityRef, PropertyProvider, RenderType};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of loading one map object
pub type LoadResult = Result<Vec<EntityRef>, LoaderError>;

/// Creates entities from map objects of one kind
pub trait MapObjectLoader: Send + Sync {
    /// Kind string this loader handles
    fn kind(&self) -> &str;

    /// Create the entities described by `object`.
    ///
    /// A record may yield several entities, or none.
    fn load(&self, object: &MapObject) -> LoadResult;
}

/// A loader backed by a closure
pub struct FnLoader<F> {
    kind: String,
    load: F,
}

impl<F> FnLoader<F>
where
    F: Fn(&MapObject) -> LoadResult + Send + Sync,
{
    pub fn new(kind: impl Into<String>, load: F) -> Self {
        Self {
            kind: kind.into(),
            load,
        }
    }
}

impl<F> MapObjectLoader for FnLoader<F>
where
    F: Fn(&MapObject) -> LoadResult + Send + Sync,
{
    fn kind(&self) -> &str {
        &self.kind
    }

    fn load(&self, object: &MapObject) -> LoadResult {
        (self.load)(object)
    }
}

/// Keep only characters allowed in tags
pub fn sanitize_tag(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Apply the properties every entity shares: id, size, name, location,
/// tags, render type and the game specific custom properties.
pub fn apply_default_properties(mut builder: EntityBuilder, object: &MapObject) -> EntityBuilder {
    builder = builder
        .with_map_id(object.id)
        .with_size(object.width, object.height)
        .with_location(object.x, object.y);

    if let Some(name) = object.name.as_deref().filter(|n| !n.is_empty()) {
        builder = builder.with_name(name);
    }

    for tag in object.list_value(keys::TAGS) {
        let tag = sanitize_tag(&tag);
        if !tag.is_empty() {
            builder = builder.with_tag(tag);
        }
    }

    if let Some(render_type) = object.parse_value::<RenderType>(keys::RENDER_TYPE) {
        builder = builder.with_render_type(render_type);
    }

    for (name, value) in &object.properties {
        if keys::is_custom(name) {
            builder = builder.with_property(name.clone(), value.clone());
        }
    }

    builder
}

/// Map object kinds to their loaders
pub struct LoaderRegistry {
    /// Loaders by uppercased kind
    loaders: RwLock<BTreeMap<String, Arc<dyn MapObjectLoader>>>,
    /// Loader for records without a kind
    fallback: RwLock<Option<Arc<dyn MapObjectLoader>>>,
}

impl LoaderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            loaders: RwLock::new(BTreeMap::new()),
            fallback: RwLock::new(None),
        }
    }

    /// Create a registry with every built-in loader registered
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        loaders::register_defaults(&registry);
        registry
    }

    /// Register a loader, replacing any previous loader for the same kind
    pub fn register<L: MapObjectLoader + 'static>(&self, loader: L) {
        self.register_arc(Arc::new(loader));
    }

    pub fn register_arc(&self, loader: Arc<dyn MapObjectLoader>) {
        let kind = loader.kind().trim().to_uppercase();
        if self.loaders.write().insert(kind.clone(), loader).is_some() {
            log::debug!("replaced map object loader for {}", kind);
        }
    }

    pub fn unregister(&self, kind: &str) -> Option<Arc<dyn MapObjectLoader>> {
        self.loaders.write().remove(&kind.trim().to_uppercase())
    }

    /// Set the loader for records without a kind
    pub fn set_fallback<L: MapObjectLoader + 'static>(&self, loader: L) {
        *self.fallback.write() = Some(Arc::new(loader));
    }

    pub fn clear_fallback(&self) {
        *self.fallback.write() = None;
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn MapObjectLoader>> {
        self.loaders.read().get(&kind.trim().to_uppercase()).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.get(kind).is_some()
    }

    /// Registered kinds, uppercased
    pub fn kinds(&self) -> Vec<String> {
        self.loaders.read().keys().cloned().collect()
    }

    /// The loader responsible for `object`
    pub fn resolve(&self, object: &MapObject) -> Option<Arc<dyn MapObjectLoader>> {
        if object.is_untyped() {
            self.fallback.read().clone()
        } else {
            self.get(&object.kind)
        }
    }

    /// Load a record. Records without a loader yield no entities.
    pub fn load(&self, object: &MapObject) -> LoadResult {
        match self.resolve(object) {
            Some(loader) => loader.load(object),
            None => {
                log::info!(
                    "no loader registered for map object #{} of kind '{}'",
                    object.id,
                    object.kind
                );
                Ok(Vec::new())
            }
        }
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
