//! Checkout HTTP server.
//!
//! Reads configuration from the environment (after `.env` and `.env.local`),
//! migrates the database and serves the checkout API until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use storefront_checkout::config::{Config, load_dotenv_files};
use storefront_checkout::metrics::MetricsServer;
use storefront_checkout::{
    CheckoutEnvironment, PostgresOrderStore, SmtpEmailProvider, checkout_router,
};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_files = load_dotenv_files()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_checkout=info,checkout_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(env_files = ?env_files, "Starting checkout server");

    let config = Config::from_env()?;
    info!(
        store = %config.store.name,
        order_prefix = %config.store.order_prefix,
        smtp_host = %config.smtp.host,
        "Configuration loaded"
    );

    if let Some(port) = config.server.metrics_port {
        match format!("{}:{port}", config.server.host).parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = MetricsServer::new(addr).start() {
                    warn!(error = %e, "Metrics exporter disabled");
                }
            }
            Err(e) => warn!(error = %e, "Invalid metrics address, exporter disabled"),
        }
    }

    info!("Connecting to database...");
    let orders = PostgresOrderStore::connect(
        &config.database.url,
        config.database.max_connections,
        config.database.connect_timeout(),
        config.store.order_prefix.clone(),
    )
    .await?;
    orders.migrate().await?;
    info!("Database ready");

    let email = SmtpEmailProvider::new(&config.smtp, config.store.clone())?;

    let env = Arc::new(CheckoutEnvironment::new(orders, email));
    let app = checkout_router(env);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
