use std::sync::Arc;

use anyhow::{Context, Result};
use meetings_service::{
    app::build_router,
    application::meeting_service::MeetingService,
    config::{AppConfig, StoreBackend},
    domain::meeting::Meeting,
    state::AppState,
    store::{DocumentStoreHandler, InMemoryCollection},
    transcription::{UploadSpool, WhisperHttpTranscriber},
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env().context("failed to load configuration")?;

    let store = match &config.store {
        StoreBackend::MongoDb { url } => DocumentStoreHandler::<Meeting>::connect(
            url,
            &config.database,
            &config.collection,
        )
        .await
        .context("failed to connect to the document store")?,
        StoreBackend::InMemory => {
            warn!("using in-memory meeting store; data is lost on shutdown");
            DocumentStoreHandler::new(Arc::new(InMemoryCollection::new(
                config.collection.clone(),
            )))
        }
    };

    let transcriber = Arc::new(WhisperHttpTranscriber::new(
        &config.transcriber_url,
        config.transcriber_model.clone(),
        config.transcriber_api_key.clone(),
    ));
    let service = Arc::new(MeetingService::new(
        store,
        transcriber,
        UploadSpool::new(config.upload_dir.clone()),
    ));
    let state = AppState::new(service);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(
        bind_addr = %config.bind_addr,
        database = %config.database,
        collection = %config.collection,
        "meetings service started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("meetings_service=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install ctrl+c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install sigterm handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
