#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use cornerstone::adapters::upstream::UpstreamIssuer;
use cornerstone::api::AppState;
use cornerstone::config::Config;
use cornerstone::telemetry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    cornerstone::setup_panic_hook();

    if config.session.uses_insecure_secret() {
        tracing::warn!("CORNERSTONE_SESSION_SECRET is not set; sessions are signed with the insecure fallback secret");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    cornerstone::spawn_signal_handler(shutdown_tx);

    let http = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
    let issuer = Arc::new(UpstreamIssuer::new(http, &config.client.api_base_url));
    let app = cornerstone::api::app_router(AppState::new(config.clone(), issuer));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, environment = ?config.environment, "listening");

    let mut server_rx = shutdown_rx.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = server_rx.wait_for(|&s| s).await;
    });

    let mut drain_rx = shutdown_rx;
    tokio::select! {
        result = server.into_future() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server error");
            }
        }
        () = async {
            let _ = drain_rx.wait_for(|&s| s).await;
            tokio::time::sleep(Duration::from_secs(config.server.shutdown_timeout_secs)).await;
        } => {
            tracing::warn!("Timeout waiting for in-flight requests to finish.");
        }
    }

    telemetry_guard.shutdown();
    Ok(())
}
