//! Forces and mobile entities

use lantern_math::Vec2;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Identifier of the force an environment applies for gravity
pub const GRAVITY_IDENTIFIER: &str = "GRAVITY";

/// A force acting on a mobile entity until it is ended
#[derive(Debug)]
pub struct Force {
    identifier: String,
    direction: Vec2,
    strength: RwLock<f64>,
    ended: AtomicBool,
}

/// Shared handle to a force
pub type ForceRef = Arc<Force>;

impl Force {
    pub fn new(identifier: impl Into<String>, direction: Vec2, strength: f64) -> Self {
        Self {
            identifier: identifier.into(),
            direction: direction.normalize(),
            strength: RwLock::new(strength),
            ended: AtomicBool::new(false),
        }
    }

    /// A downward force tagged with [`GRAVITY_IDENTIFIER`]
    pub fn gravity(strength: f64) -> Self {
        Self::new(GRAVITY_IDENTIFIER, Vec2::DOWN, strength)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn is_gravity(&self) -> bool {
        self.identifier == GRAVITY_IDENTIFIER
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn strength(&self) -> f64 {
        *self.strength.read()
    }

    pub fn set_strength(&self, strength: f64) {
        *self.strength.write() = strength;
    }

    /// Displacement this force contributes per second
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.strength()
    }

    /// Stop the force. Ended forces are dropped by their entity.
    pub fn end(&self) {
        self.ended.store(true, Ordering::Release);
    }

    pub fn has_ended(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }
}

/// Movement configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileInfo {
    /// Maximum velocity in pixels per second
    pub velocity: f64,
    /// Milliseconds to reach full velocity
    pub acceleration: u32,
    /// Milliseconds to come to a halt
    pub deceleration: u32,
    pub turn_on_move: bool,
}

impl MobileInfo {
    pub const DEFAULT_VELOCITY: f64 = 100.0;
}

impl Default for MobileInfo {
    fn default() -> Self {
        Self {
            velocity: Self::DEFAULT_VELOCITY,
            acceleration: 0,
            deceleration: 0,
            turn_on_move: true,
        }
    }
}

/// Movement state of a mobile entity
#[derive(Debug, Default)]
pub struct MobileComponent {
    pub info: MobileInfo,
    forces: Vec<ForceRef>,
}

impl MobileComponent {
    pub fn new(info: MobileInfo) -> Self {
        Self {
            info,
            forces: Vec::new(),
        }
    }

    /// Apply a force. Applying the same force twice has no effect.
    pub fn apply(&mut self, force: ForceRef) {
        self.prune();
        if !self.forces.iter().any(|f| Arc::ptr_eq(f, &force)) {
            self.forces.push(force);
        }
    }

    /// Active forces
    pub fn forces(&self) -> Vec<ForceRef> {
        self.forces.iter().filter(|f| !f.has_ended()).cloned().collect()
    }

    /// Active forces with the given identifier
    pub fn forces_by_identifier(&self, identifier: &str) -> Vec<ForceRef> {
        self.forces
            .iter()
            .filter(|f| !f.has_ended() && f.identifier() == identifier)
            .cloned()
            .collect()
    }

    /// Drop ended forces
    pub fn prune(&mut self) {
        self.forces.retain(|f| !f.has_ended());
    }

    /// Sum of all active forces
    pub fn velocity(&self) -> Vec2 {
        self.forces
            .iter()
            .filter(|f| !f.has_ended())
            .fold(Vec2::ZERO, |acc, f| acc + f.velocity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gravity_force() {
        let force = Force::gravity(50.0);
        assert!(force.is_gravity());
        assert_relative_eq!(force.velocity().y, 50.0);
        force.set_strength(20.0);
        assert_relative_eq!(force.strength(), 20.0);
    }

    #[test]
    fn test_apply_and_end() {
        let mut mobile = MobileComponent::new(MobileInfo::default());
        let force = Arc::new(Force::gravity(10.0));
        mobile.apply(force.clone());
        mobile.apply(force.clone());
        mobile.apply(Arc::new(Force::new("push", Vec2::new(1.0, 0.0), 5.0)));
        assert_eq!(mobile.forces().len(), 2);
        assert_eq!(mobile.forces_by_identifier(GRAVITY_IDENTIFIER).len(), 1);

        force.end();
        assert_eq!(mobile.forces().len(), 1);
        assert_relative_eq!(mobile.velocity().x, 5.0);
    }
}
