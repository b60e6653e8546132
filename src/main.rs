use anyhow::Context;
use std::sync::Arc;
use student_records::{
    api,
    config::{self, Config, StoreBackend},
    logging,
    store::{MemoryStudentStore, MongoStudentStore, StudentStore},
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::init_config().context("Failed to load config from environment")?;
    logging::init_tracing(config.log_file.as_deref());
    tracing::debug!(
        store = ?config.store_backend,
        mongodb = ?config.mongodb,
        database = %config.database_name,
        collection = %config.collection_name,
        route_prefix = %config.route_prefix,
        server_port = ?config.server_port,
        "Loaded configuration"
    );

    match config.store_backend {
        StoreBackend::MongoDb => {
            let connection = config
                .mongodb
                .as_ref()
                .context("MongoDB backend selected without a connection")?;
            let store = MongoStudentStore::connect(
                connection,
                &config.database_name,
                &config.collection_name,
            )
            .await
            .context("Failed to connect to MongoDB")?;
            serve(Arc::new(store), config).await
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; records are lost on exit");
            serve(Arc::new(MemoryStudentStore::new()), config).await
        }
    }
}

async fn serve<S>(store: Arc<S>, config: &Config) -> anyhow::Result<()>
where
    S: StudentStore + 'static,
{
    let app = api::create_router(store.clone(), &config.route_prefix);

    let (listener, port) = bind_listener(config.server_port)
        .await
        .context("Failed to bind listener")?;
    tracing::info!(
        "Listening on http://0.0.0.0:{}{}/",
        port,
        config.route_prefix
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    store.shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn bind_listener(server_port: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = server_port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 8000..=8099;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 8000-8099",
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}
