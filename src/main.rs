// src/main.rs - Camera host: motion worker plus HTTP control surface
use clap::Parser;
use gridcam_rs::{config, web, Camera, Config};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "gridcam-host", version, about = "Grid camera simulator with an HTTP control API")]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Listen address, overrides `server.bind`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .init();

    tracing::info!("Starting gridcam host");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = match cli.config.as_deref() {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            config::load_config(path).map_err(|e| {
                tracing::error!("Failed to load config from '{}': {}", path, e);
                Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
            })?
        }
        None => Config::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
        config.validate()?;
    }

    tracing::info!("Base step delay: {} s", config.motion.base_step_secs);
    tracing::info!("Capture dwell: {} ms", config.motion.capture_dwell_ms);

    let state = Arc::new(web::api::AppStateInner {
        camera: Camera::new(config.motion.clone()),
    });
    state.camera.start();

    let app = web::api::create_router_with_state(state.clone());
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("Web API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown requested");
        })
        .await?;

    state.camera.shutdown().await;
    tracing::info!("Camera host stopped");
    Ok(())
}
