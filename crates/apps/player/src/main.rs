use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use lumen_world::devices::VirtualInput;
use scripting::facade::TICK_RATE;
use scripting::{EngineFacade, KdlReader, LuaEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "lumen-player")]
#[command(about = "Run a Lua game script against the Lumen engine", long_about = None)]
struct Args {
    /// Lua script to run once the engine is up
    script: PathBuf,

    /// KDL file with engine settings (winTitle, fullScreen, ...)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scene package to load before the script runs (repeatable)
    #[arg(long = "package")]
    packages: Vec<PathBuf>,

    /// Step this many frames instead of running until the script exits
    #[arg(long)]
    frames: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("lumen_player={0},scripting={0},lumen_world={0}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Lumen player v{}", env!("CARGO_PKG_VERSION"));

    let mut facade = EngineFacade::new();

    if let Some(path) = &args.config {
        let settings = KdlReader::from_file(path)
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let applied = KdlReader::apply(facade.user_defs(), &settings);
        tracing::info!("Applied {} of {} settings from {}", applied, settings.len(), path.display());
    }

    // No window system here; scripts see an idle mouse and keyboard
    let engine = facade.engine();
    {
        let mut engine = engine.borrow_mut();
        let size = engine.user_defs.win_size;
        engine.set_input(Box::new(VirtualInput::with_window_size(size.x, size.y)));
    }
    facade.initialize();

    for package in &args.packages {
        match facade.load_blend_file(package) {
            Some(scene) => tracing::info!("Active scene: {}", scene.name()),
            None => tracing::warn!("Skipping package {}", package.display()),
        }
    }

    let mut lua = LuaEngine::new().map_err(|e| anyhow!("Failed to create Lua: {}", e))?;
    lua.install_api(engine.clone())
        .map_err(|e| anyhow!("Failed to install the engine API: {}", e))?;
    lua.exec_file(&args.script)
        .map_err(|e| anyhow!("Script {} failed: {}", args.script.display(), e))?;

    match args.frames {
        Some(frames) => {
            tracing::info!("Stepping {} frames", frames);
            for _ in 0..frames {
                if engine.borrow().exit_requested() {
                    break;
                }
                facade.step(1.0 / TICK_RATE);
            }
        }
        None => facade.run(),
    }

    tracing::info!("Player finished after {} frames", engine.borrow().frame());
    Ok(())
}
