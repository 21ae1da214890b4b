//! Component types driven by the harness.
//!
//! Stored instances are shared and immutable from the dataset's point of
//! view, so per-tick state lives in [`Cell`]s.

use std::cell::Cell;

use engine_component::Component;
use glam::Vec3;

/// World-space position, advanced by the movement system.
#[derive(Debug, Default)]
pub struct Position(pub Cell<Vec3>);

impl Position {
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self(Cell::new(position))
    }

    #[must_use]
    pub fn get(&self) -> Vec3 {
        self.0.get()
    }

    /// Move by `offset`.
    pub fn translate(&self, offset: Vec3) {
        self.0.set(self.0.get() + offset);
    }
}

impl Component for Position {
    fn type_name() -> &'static str {
        "Position"
    }
}

/// Units per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity(pub Vec3);

impl Component for Velocity {
    fn type_name() -> &'static str {
        "Velocity"
    }
}

/// Ticks of movement left before the entity stops.
#[derive(Debug)]
pub struct Fuel(pub Cell<u32>);

impl Fuel {
    #[must_use]
    pub fn new(ticks: u32) -> Self {
        Self(Cell::new(ticks))
    }

    /// Spend one tick of fuel. Returns `true` once the tank is empty.
    pub fn burn(&self) -> bool {
        let left = self.0.get().saturating_sub(1);
        self.0.set(left);
        left == 0
    }
}

impl Component for Fuel {
    fn type_name() -> &'static str {
        "Fuel"
    }
}

/// Marks an entity that has come to rest. Only registered after the final
/// schema change.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parked;

impl Component for Parked {
    fn type_name() -> &'static str {
        "Parked"
    }
}
