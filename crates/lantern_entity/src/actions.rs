//! Named entity actions
//!
//! Actions are zero-argument operations that can be invoked by name, e.g.
//! from scripts or map data. Each entity gets the actions of its kinds from
//! static descriptor tables and can register more at runtime.

use crate::entity::Entity;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Action callback
pub type ActionFn = dyn Fn(&Entity) + Send + Sync;

/// A registered action
#[derive(Clone)]
pub struct EntityAction {
    name: String,
    description: Option<String>,
    action: Arc<ActionFn>,
}

impl EntityAction {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Entity) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            action: Arc::new(action),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn perform(&self, entity: &Entity) {
        (self.action)(entity)
    }
}

impl fmt::Debug for EntityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityAction")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Static description of an action, used for per-kind action tables
#[derive(Clone, Copy)]
pub struct ActionDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub perform: fn(&Entity),
}

impl ActionDescriptor {
    pub fn to_action(&self) -> EntityAction {
        let perform = self.perform;
        EntityAction::new(self.name, move |e: &Entity| perform(e)).with_description(self.description)
    }
}

/// The actions of one entity
#[derive(Default)]
pub struct EntityActionMap {
    actions: RwLock<BTreeMap<String, EntityAction>>,
}

impl EntityActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action, replacing any action of the same name
    pub fn register(&self, action: EntityAction) {
        self.actions.write().insert(action.name.clone(), action);
    }

    /// Register all actions of a descriptor table
    pub fn register_all(&self, descriptors: &[ActionDescriptor]) {
        let mut actions = self.actions.write();
        for descriptor in descriptors {
            actions.insert(descriptor.name.to_string(), descriptor.to_action());
        }
    }

    pub fn unregister(&self, name: &str) -> Option<EntityAction> {
        self.actions.write().remove(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.actions.read().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<EntityAction> {
        self.actions.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.actions.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.actions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.read().is_empty()
    }
}

impl fmt::Debug for EntityActionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.actions.read().keys()).finish()
    }
}

// ==== Built-in action tables ====

pub const COMBAT_ACTIONS: &[ActionDescriptor] = &[
    ActionDescriptor {
        name: "die",
        description: "Drops the hit points of the entity to zero",
        perform: |e| e.kill(),
    },
    ActionDescriptor {
        name: "resurrect",
        description: "Restores the hit points of the entity",
        perform: |e| e.resurrect(),
    },
];

pub const LIGHT_ACTIONS: &[ActionDescriptor] = &[ActionDescriptor {
    name: "toggle",
    description: "Switches the light on or off",
    perform: |e| e.toggle_light(),
}];

pub const EMITTER_ACTIONS: &[ActionDescriptor] = &[
    ActionDescriptor {
        name: "activate",
        description: "Starts emitting particles",
        perform: |e| e.activate_emitter(),
    },
    ActionDescriptor {
        name: "deactivate",
        description: "Stops emitting particles",
        perform: |e| e.deactivate_emitter(),
    },
];

pub const TRIGGER_ACTIONS: &[ActionDescriptor] = &[ActionDescriptor {
    name: "reset",
    description: "Forgets the activation state of the trigger",
    perform: |e| e.reset_trigger(),
}];
