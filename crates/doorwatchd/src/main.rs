use anyhow::{Context, Result};
use clap::Parser;
use doorwatch_core::{Doorbell, EuclideanMatcher};
use doorwatch_hw::Camera;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;
mod engine;
mod telegram;
mod vision;

use config::{Config, DEFAULT_CONFIG_PATH};
use engine::LoopSettings;

#[derive(Parser)]
#[command(name = "doorwatchd", about = "Watch the door camera and tell residents who is there")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "DOORWATCH_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    tracing::info!(config = %args.config.display(), "doorwatchd starting");

    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let roster = config.roster().context("building roster")?;

    tracing::info!(
        persons = roster.len(),
        names = ?roster.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        tolerance = config.vision.tolerance,
        "roster loaded"
    );
    if roster.is_empty() {
        tracing::warn!("roster is empty; notifications will have no recipients");
    }

    if args.check {
        tracing::info!("configuration OK");
        return Ok(());
    }

    let mut camera = match Camera::open(&config.camera.device, config.camera.width, config.camera.height) {
        Ok(camera) => camera,
        Err(e) => {
            for dev in Camera::list_devices() {
                tracing::info!(path = %dev.path, name = %dev.name, driver = %dev.driver, "available camera");
            }
            return Err(e).context("opening camera");
        }
    };
    tracing::info!(
        device = %camera.device_path,
        width = camera.width,
        height = camera.height,
        fourcc = ?camera.fourcc,
        "camera ready"
    );

    let mut encoder = vision::HttpFaceEncoder::new(
        &config.vision.endpoint,
        Duration::from_secs(config.vision.timeout_secs),
    )
    .context("creating vision client")?;
    let mut transport = telegram::TelegramTransport::new(&config.telegram.api_url, &config.telegram.token)
        .context("creating telegram client")?;

    let mut doorbell = Doorbell::new(roster, EuclideanMatcher::new(config.vision.tolerance));
    let settings = LoopSettings {
        interval: config.interval(),
        downscale: config.camera.downscale,
    };

    engine::discard_warmup(&mut camera, config.camera.warmup_frames);
    let stats = engine::run_capture_loop(&mut camera, &mut encoder, &mut transport, &mut doorbell, &settings);

    tracing::info!(
        frames = stats.frames,
        notifications = stats.notifications,
        "camera closed; doorwatchd exiting"
    );
    Ok(())
}
