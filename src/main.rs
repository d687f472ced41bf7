use anyhow::Result;

mod assets;
mod camera;
mod config;
mod controls;
mod engine;
mod interaction;
mod math;
mod picking;
mod rendering;
mod scene_graph;
mod viewer;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = config::ViewerConfig::from_env();
    log::info!("Loading room assets from {}", config.asset_root.display());

    pollster::block_on(window::run(config))?;

    Ok(())
}
