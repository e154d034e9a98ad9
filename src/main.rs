use log::{error, info, LevelFilter};
use std::error::Error;
use std::path::PathBuf;

mod app;
mod config;
mod core;
mod demo;
mod utils;

fn main() -> Result<(), Box<dyn Error>> {
    // --- Logging Setup ---
    // RUST_LOG wins; otherwise the level comes from the config file once it is loaded.
    let env_override = std::env::var_os("RUST_LOG").is_some();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .filter_module("winit", LevelFilter::Warn)
        .filter_module("glutin", LevelFilter::Warn)
        .parse_default_env()
        .init();
    if !env_override {
        log::set_max_level(LevelFilter::Info);
    }

    // --- Config ---
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_PATH));
    let config = config::load(&config_path);
    if !env_override {
        log::set_max_level(config.log_level);
    }

    info!("Application starting ({} variant)...", config.demo.variant);

    if let Err(e) = app::run(config) {
        error!("Application exited with error: {}", e);
        return Err(e);
    }

    info!("Application exited gracefully.");
    Ok(())
}
