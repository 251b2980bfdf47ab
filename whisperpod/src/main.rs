#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod encode;
mod smoke;

use args::{Args, Command};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use whisperpod_config::Config;
use whisperpod_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        // The encoder only reads a file and prints JSON; it needs no config
        Some(Command::Encode(ref encode)) => {
            if let Err(e) = encode::run(encode) {
                eprintln!("{e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Smoke(ref smoke)) => {
            let config = resolve_config(&args)?;
            let _telemetry_guard = whisperpod_telemetry::init(config.telemetry.as_ref(), &config.model, &args.log)?;

            smoke::run(&config, smoke).await
        }
        Some(Command::Serve) | None => {
            let config = resolve_config(&args)?;

            // Initialize telemetry
            let _telemetry_guard = whisperpod_telemetry::init(config.telemetry.as_ref(), &config.model, &args.log)?;

            serve(config, &args).await
        }
    }
}

/// Load the configuration file, if any, and apply command-line overrides
fn resolve_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(listen) = args.listen {
        config.server.listen_address = Some(listen);
    }

    if let Some(ref model) = args.model {
        config.model.name.clone_from(model);
    }

    if let Some(compute_type) = args.compute_type {
        config.model.compute_type = compute_type;
    }

    if let Some(device) = args.device {
        config.model.device = device;
    }

    config.validate()?;

    Ok(config)
}

async fn serve(config: Config, args: &Args) -> anyhow::Result<()> {
    tracing::info!(
        config_path = ?args.config.as_ref().map(|p| p.display().to_string()),
        model = %config.model.name,
        compute_type = %config.model.compute_type,
        device = %config.model.device,
        "starting whisperpod"
    );

    let server = Server::new(&config)?;

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    server.serve(shutdown).await?;

    tracing::info!("whisperpod stopped");
    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
