//! # engine_app: dataset harness
//!
//! Drives an entity/component dataset the way a game loop would: systems
//! poll it with traversals each tick, an observer keeps live counters, and a
//! snapshot writer serializes one component type a slice at a time.
//!
//! ## Run sequence
//!
//! 1. Load [`AppConfig`](config::AppConfig) (path in `ENGINE_APP_CONFIG`).
//! 2. Populate the world.
//! 3. Run the fixed-timestep tick loop.
//! 4. Retire the `Fuel` type with a schema remap and park resting entities.

mod components;
mod config;
mod snapshot;
mod tick;
mod world;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use tick::TickLoop;
use world::World;

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let config = AppConfig::load()?;
    info!(
        ticks = config.ticks,
        entities = config.entities,
        "engine harness starting"
    );

    let mut world = World::new(config.dataset.clone())?;
    world.populate(config.entities, config.max_fuel)?;

    let mut tick_loop = TickLoop::new(config.tick_config(), world);
    tick_loop.run()?;

    let parked = tick_loop.world_mut().park()?;
    let stats = tick_loop.world().stats();
    info!(
        snapshots = tick_loop.completed_snapshots().len(),
        started = stats.started(),
        stopped = stats.stopped(),
        still_moving = stats.moving(),
        parked,
        "engine harness shut down"
    );
    Ok(())
}
