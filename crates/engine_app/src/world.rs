//! Simulation state for the harness.
//!
//! The [`World`] owns the dataset and the systems that run against it each
//! tick. Systems poll with traversals; a `[Position, Velocity]` observer keeps
//! [`MotionStats`] current without any system having to count.

// Accessors used by tests and by callers embedding the world elsewhere.
#![allow(dead_code)]

use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;

use engine_component::{Component, ComponentType, Entity};
use engine_dataset::{DatasetConfig, EntityComponentDataset, Observer, ObserverId, Result};
use glam::Vec3;
use tracing::{debug, info};

use crate::components::{Fuel, Parked, Position, Velocity};

/// Counters maintained by the motion observer.
#[derive(Debug, Default)]
pub struct MotionStats {
    moving: Cell<usize>,
    started: Cell<u64>,
    stopped: Cell<u64>,
}

impl MotionStats {
    /// Entities currently holding both a position and a velocity.
    #[must_use]
    pub fn moving(&self) -> usize {
        self.moving.get()
    }

    /// Times an entity started moving.
    #[must_use]
    pub fn started(&self) -> u64 {
        self.started.get()
    }

    /// Times an entity stopped moving.
    #[must_use]
    pub fn stopped(&self) -> u64 {
        self.stopped.get()
    }
}

/// The harness world.
#[derive(Debug)]
pub struct World {
    dataset: EntityComponentDataset,
    stats: Rc<MotionStats>,
    motion_observer: ObserverId,
}

impl World {
    /// Create a world with the starting schema `[Position, Velocity, Fuel]`.
    ///
    /// # Errors
    ///
    /// Propagates dataset construction errors.
    pub fn new(config: DatasetConfig) -> Result<Self> {
        let mut dataset = EntityComponentDataset::with_config(
            [
                Position::component_type(),
                Velocity::component_type(),
                Fuel::component_type(),
            ],
            config,
        )?;

        let stats = Rc::new(MotionStats::default());
        let on_start = Rc::clone(&stats);
        let on_stop = Rc::clone(&stats);
        let observer = Observer::new(
            [Position::component_type(), Velocity::component_type()],
            move |_, _, _| {
                on_start.moving.set(on_start.moving.get() + 1);
                on_start.started.set(on_start.started.get() + 1);
            },
            move |_, _, _| {
                on_stop.moving.set(on_stop.moving.get().saturating_sub(1));
                on_stop.stopped.set(on_stop.stopped.get() + 1);
            },
        )?;
        let motion_observer = dataset.add_observer(observer, true)?;

        Ok(Self {
            dataset,
            stats,
            motion_observer,
        })
    }

    /// Returns a reference to the dataset.
    #[must_use]
    pub fn dataset(&self) -> &EntityComponentDataset {
        &self.dataset
    }

    /// Returns a mutable reference to the dataset.
    pub fn dataset_mut(&mut self) -> &mut EntityComponentDataset {
        &mut self.dataset
    }

    /// Returns the motion counters.
    #[must_use]
    pub fn stats(&self) -> &MotionStats {
        &self.stats
    }

    /// Id of the observer feeding [`MotionStats`].
    #[must_use]
    pub fn motion_observer(&self) -> ObserverId {
        self.motion_observer
    }

    /// Spawn a resting entity at `position`.
    ///
    /// # Errors
    ///
    /// Propagates dataset errors.
    pub fn spawn(&mut self, position: Vec3) -> Result<Entity> {
        let entity = self.dataset.create_entity()?;
        self.dataset.add_component(entity, Position::new(position))?;
        Ok(entity)
    }

    /// Spawn an entity moving at `velocity` for `fuel` ticks.
    ///
    /// # Errors
    ///
    /// Propagates dataset errors.
    pub fn spawn_moving(&mut self, position: Vec3, velocity: Vec3, fuel: u32) -> Result<Entity> {
        let entity = self.spawn(position)?;
        self.dataset.add_component(entity, Fuel::new(fuel))?;
        self.dataset.add_component(entity, Velocity(velocity))?;
        Ok(entity)
    }

    /// Spawn `count` entities along the x axis. Every other one moves, with
    /// fuel for between 1 and `max_fuel` ticks.
    ///
    /// # Errors
    ///
    /// Propagates dataset errors.
    pub fn populate(&mut self, count: u32, max_fuel: u32) -> Result<()> {
        let max_fuel = max_fuel.max(1);
        for i in 0..count {
            let position = Vec3::new(i as f32, 0.0, 0.0);
            if i % 2 == 0 {
                self.spawn_moving(position, Vec3::Y, 1 + i % max_fuel)?;
            } else {
                self.spawn(position)?;
            }
        }
        info!(
            entities = self.dataset.entity_count(),
            moving = self.stats.moving(),
            "world populated"
        );
        Ok(())
    }

    /// Movement system: advance every moving entity by `velocity * dt`.
    /// Returns the number of entities moved.
    ///
    /// # Errors
    ///
    /// Fails if the motion types are no longer registered.
    pub fn integrate(&self, dt: f32) -> Result<usize> {
        let mut moved = 0;
        self.dataset.traverse_entities(
            &[Position::component_type_id(), Velocity::component_type_id()],
            |components, _| {
                let position = components[0].downcast_ref::<Position>();
                let velocity = components[1].downcast_ref::<Velocity>();
                if let (Some(position), Some(velocity)) = (position, velocity) {
                    position.translate(velocity.0 * dt);
                    moved += 1;
                }
                ControlFlow::Continue(())
            },
        )?;
        Ok(moved)
    }

    /// Fuel system: burn one tick of fuel per fuelled entity and bring the
    /// empty ones to a stop. Returns the number of entities stopped.
    ///
    /// # Errors
    ///
    /// Propagates dataset errors.
    pub fn burn_fuel(&mut self) -> Result<usize> {
        let mut empty = Vec::new();
        self.dataset
            .traverse_entities(&[Fuel::component_type_id()], |components, entity| {
                if components[0].downcast_ref::<Fuel>().is_some_and(Fuel::burn) {
                    empty.push(entity);
                }
                ControlFlow::Continue(())
            })?;

        for &entity in &empty {
            self.dataset.remove_component::<Velocity>(entity)?;
            self.dataset.remove_component::<Fuel>(entity)?;
        }
        if !empty.is_empty() {
            debug!(stopped = empty.len(), "entities out of fuel");
        }
        Ok(empty.len())
    }

    /// Retire `Fuel` from the schema in favour of `Parked`, and park every
    /// entity that is not moving. Remaining fuel is drained first, since a
    /// type with live instances cannot be removed. Returns the number of
    /// entities parked.
    ///
    /// # Errors
    ///
    /// Propagates dataset errors.
    pub fn park(&mut self) -> Result<usize> {
        let fuelled: Vec<Entity> = self
            .dataset
            .entities()
            .filter(|entity| self.dataset.has_component::<Fuel>(*entity))
            .collect();
        for &entity in &fuelled {
            self.dataset.remove_component::<Fuel>(entity)?;
        }

        let schema: Vec<ComponentType> = vec![
            Position::component_type(),
            Velocity::component_type(),
            Parked::component_type(),
        ];
        self.dataset.set_component_type_map(schema)?;

        let resting: Vec<Entity> = self
            .dataset
            .entities()
            .filter(|entity| {
                self.dataset.has_component::<Position>(*entity)
                    && !self.dataset.has_component::<Velocity>(*entity)
            })
            .collect();
        for &entity in &resting {
            self.dataset.add_component(entity, Parked)?;
        }
        info!(drained = fuelled.len(), parked = resting.len(), "world parked");
        Ok(resting.len())
    }
}
