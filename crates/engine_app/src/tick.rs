//! Harness tick loop.
//!
//! Each tick runs, in order:
//!
//! 1. The movement system (positions advance by velocity).
//! 2. The fuel system (entities out of fuel lose their velocity).
//! 3. One budgeted step of the position snapshot.
//! 4. Advance the tick counter.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::snapshot::SnapshotWriter;
use crate::world::World;

/// Configuration for the harness tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// Snapshot records written per tick.
    pub snapshot_budget: usize,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
            snapshot_budget: 64,
        }
    }
}

/// The harness tick loop state.
#[derive(Debug)]
pub struct TickLoop {
    /// Current tick counter.
    tick_id: u64,
    /// Tick configuration.
    config: TickConfig,
    /// The simulated world.
    world: World,
    /// Snapshot in progress.
    snapshot: SnapshotWriter,
    /// Encoded size of every completed snapshot, oldest first.
    completed: Vec<usize>,
}

impl TickLoop {
    /// Create a new tick loop over `world`.
    #[must_use]
    pub fn new(config: TickConfig, world: World) -> Self {
        Self {
            tick_id: 0,
            config,
            world,
            snapshot: SnapshotWriter::new(),
            completed: Vec::new(),
        }
    }

    /// Returns the current tick counter.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// Returns a reference to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns a mutable reference to the world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Encoded sizes of the snapshots completed so far.
    #[must_use]
    pub fn completed_snapshots(&self) -> &[usize] {
        &self.completed
    }

    /// Run one tick of the simulation.
    ///
    /// # Errors
    ///
    /// Propagates dataset and snapshot errors.
    pub fn tick(&mut self, dt: f64) -> Result<()> {
        self.tick_id += 1;

        let moved = self.world.integrate(dt as f32)?;
        let stopped = self.world.burn_fuel()?;
        let written = self.snapshot.step(self.world.dataset(), self.config.snapshot_budget)?;

        if self.snapshot.is_finished() {
            let records = self.snapshot.records();
            let bytes = self.snapshot.finish();
            info!(
                tick_id = self.tick_id,
                records,
                bytes = bytes.len(),
                "snapshot complete"
            );
            self.completed.push(bytes.len());
        }

        debug!(
            tick_id = self.tick_id,
            dt,
            moved,
            stopped,
            written,
            moving = self.world.stats().moving(),
            "tick complete"
        );
        Ok(())
    }

    /// Run the tick loop for the configured number of ticks, or indefinitely.
    ///
    /// # Errors
    ///
    /// Stops at the first failing tick.
    pub fn run(&mut self) -> Result<()> {
        let tick_duration = Duration::from_secs_f64(1.0 / self.config.tick_rate);
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            let dt = tick_duration.as_secs_f64();
            self.tick(dt)?;

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
        Ok(())
    }
}
