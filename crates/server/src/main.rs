use std::process::ExitCode;
use std::sync::Arc;

use gazette::{AppState, Config, MediaStore};
use gazette_core::{BoxedError, DocumentStore, MemoryStore, MongoStore};
use salvo::prelude::*;
use salvo::server::ServerHandle;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "gazette stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BoxedError> {
    let config = Config::from_env()?;

    let store: Arc<dyn DocumentStore> = if config.uses_memory_store() {
        tracing::warn!("using the in-memory store, nothing will be persisted");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(MongoStore::connect(&config.database_url, &config.database_name).await?)
    };
    store.ensure_indexes().await?;

    let media = MediaStore::new(&config.upload_dir);
    media.ensure_root().await?;
    tracing::info!(dir = %media.root().display(), "upload directory ready");

    let state = Arc::new(AppState::new(store.clone(), media));
    let service = gazette::service(state, &config);

    let acceptor = TcpListener::new(config.listen_addr.clone()).bind().await;
    let server = Server::new(acceptor);
    tokio::spawn(listen_shutdown_signal(server.handle()));

    tracing::info!(addr = %config.listen_addr, "listening");
    server.serve(service).await;

    store.close().await;
    tracing::info!("store closed, bye");
    Ok(())
}

async fn listen_shutdown_signal(handle: ServerHandle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("ctrl-c received, shutting down"),
        _ = terminate => tracing::info!("terminate signal received, shutting down"),
    };

    handle.stop_graceful(None);
}
