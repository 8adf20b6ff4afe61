//! `evinet-server` entry point.

use clap::Parser;
use evinet_core::{init_logging_with, LogOptions};
use evinet_server::{open_repository, router, AppState, CliArgs, ServerConfig, StartupError};
use log::{error, info};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    if let Err(err) = run(args).await {
        error!("event=server_exit module=server status=error error={err}");
        eprintln!("evinet-server: {err}");
        std::process::exit(1);
    }
}

async fn run(args: CliArgs) -> Result<(), StartupError> {
    let config = ServerConfig::resolve(&args)?;
    let log_dir = config.log_dir.to_string_lossy().into_owned();
    init_logging_with(&LogOptions::new(config.log_level.as_str(), log_dir).with_stderr_echo(true))
        .map_err(StartupError::Logging)?;

    let state = AppState::new(open_repository(&config)?);
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("event=server_start module=server status=ok addr={addr}");
    println!("evinet-server listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=signal_wait module=server status=error error={err}");
        std::future::pending::<()>().await;
    }
}
