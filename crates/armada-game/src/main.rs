//! Armada entry point.

mod game;
mod objects;

use anyhow::Result;

use armada_engine::device::GpuInit;
use armada_engine::logging::{init_logging, LoggingConfig};
use armada_engine::window::{LogicalSize, Runtime, RuntimeConfig};

use game::Game;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    log::info!("hello, armada");

    let config = RuntimeConfig {
        title: "Armada".to_string(),
        initial_size: LogicalSize::new(1000.0, 618.0),
    };

    Runtime::run(config, GpuInit::default(), Game::new())
}
