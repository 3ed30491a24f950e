mod graphics; // window, drawing and keyboard teleop
mod telemetry; // periodic snapshot logging

use anyhow::Context;
use graphics::window_conf;
use robosim::config::{DEFAULT_CONFIG_PATH, load_config};
use robosim::{Scene, Simulator};
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("robosim (Macroquad Frontend) Started. Loading configuration and scene...");

    if let Err(e) = run().await {
        error!("robosim failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let app = load_config(DEFAULT_CONFIG_PATH).context("failed to load configuration")?;

    let mut scene = Scene::load(&app.scene.path)?;
    if app.scene.recenter {
        scene = scene.recentered();
    }
    let obstacles = scene.obstacles.clone();
    let robot_length = scene.robot_length;

    let simulator = Simulator::new(scene, app.simulation.clone())?;
    let handle = simulator.start()?;

    let tokio_rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let telemetry_link = handle.link();
    let telemetry_config = app.telemetry.clone();
    tokio_rt.spawn(async move {
        match telemetry::run(telemetry_link, telemetry_config).await {
            Ok(()) => info!("Telemetry task finished."),
            Err(e) => error!("Telemetry task failed: {:?}", e),
        }
    });

    graphics::run_visualization_loop(handle.link(), &obstacles, robot_length, &app.teleop).await;

    handle.stop();
    let outcome = handle.join()?;
    info!(?outcome, "Simulation finished");
    tokio_rt.shutdown_background();
    Ok(())
}
