use std::path::PathBuf;

use opentelemetry::global;
use student_records::config::{Configuration, DEFAULT_CONFIG_PATH};
use student_records::{app, initialize_state, telemetry};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let path = std::env::var("CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    // read configuration file with a temporary logger.
    let config = tracing::subscriber::with_default(fmt().finish(), || {
        Configuration::default().path(path).read()
    })?;

    // initialize logs.
    let (otel_logs, logs_error) = match config
        .telemetry
        .logs_endpoint
        .as_deref()
        .map(telemetry::setup_logging)
    {
        Some(Ok(layer)) => (Some(layer), None),
        Some(Err(err)) => (None, Some(err)),
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(otel_logs)
        .init();
    if let Some(err) = logs_error {
        tracing::error!(error = %err, "logs are not exported over OTLP");
    }

    // initialize tracing.
    let tracer = if config.telemetry.tracing {
        match telemetry::setup_tracer() {
            Ok(provider) => {
                global::set_tracer_provider(provider.clone());
                Some(provider)
            },
            Err(err) => {
                tracing::error!(error = %err, "spans are not exported over OTLP");
                None
            },
        }
    } else {
        None
    };

    // initialize metrics.
    let metrics = if config.telemetry.metrics {
        telemetry::setup_metrics_recorder()
            .inspect_err(|err| tracing::error!(error = %err, "metrics recorder not installed"))
            .ok()
    } else {
        None
    };

    let port = config.port();
    let state = initialize_state(config, metrics).await?;

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(%port, "server is listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(provider) = tracer {
        if let Err(err) = provider.shutdown() {
            tracing::error!(error = %err, "cannot flush pending spans");
        }
    }

    Ok(())
}
