//! Warden Identity API server

use std::net::SocketAddr;

use identity_api::config::Config;
use identity_api::state::AppState;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use warden_auth_core::metrics as auth_metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("identity_api=debug".parse()?)
                .add_directive("warden_auth_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Warden Identity API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        issuer = %config.auth.issuer,
        jwks_url = %config.auth.jwks_url,
        keys_from_file = config.keys_from_file,
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    let http_port = config.http_port;
    let state = AppState::new(config)?;

    // Warm the key cache; a provider outage here is not fatal
    match state.verifier.resolver().prefetch().await {
        Ok(count) => tracing::info!(count, "Signing keys loaded"),
        Err(e) => tracing::warn!(error = %e, "Could not prefetch signing keys, will fetch on demand"),
    }

    let app = identity_api::build_router(state, metrics_handle);

    let addr = SocketAddr::from(([0, 0, 0, 0], http_port));
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Provider fetches are network calls; most complete well under a second
    let fetch_buckets = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(auth_metrics::JWKS_FETCH_DURATION_SECONDS.to_string()),
            fetch_buckets,
        )?
        .install_recorder()?;

    // Register metrics with descriptions
    metrics::describe_counter!(
        auth_metrics::VERIFICATIONS_TOTAL,
        "Token verifications by outcome"
    );
    metrics::describe_counter!(
        auth_metrics::JWKS_FETCHES_TOTAL,
        "Key-set fetches by result"
    );
    metrics::describe_histogram!(
        auth_metrics::JWKS_FETCH_DURATION_SECONDS,
        "Key-set fetch latency in seconds"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
