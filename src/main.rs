mod builder;
mod catalog;
mod config;
mod error;
mod kv;
mod model;
mod render;
mod routes;
mod services;
mod state;
mod store;
mod validation;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env();
    let kv = kv::FileKv::open(config.data_dir.clone()).expect("data directory init failed");
    let store = store::FormStore::load(&kv).expect("failed to load stored forms");
    tracing::info!(data_dir = %kv.dir().display(), "storage directory ready");

    let port = config.port;
    let pages = render::PageRenderer::new().expect("page templates failed to compile");
    let state = state::AppState::new(store, Arc::new(kv), config, pages);

    // Spawn background persistence task.
    let (stop_persistence, persistence_shutdown) = tokio::sync::oneshot::channel();
    let persistence = services::persistence::spawn_persistence_task(state.clone(), persistence_shutdown);

    let app = routes::app(state.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "formflow listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");

    if stop_persistence.send(()).is_err() {
        tracing::warn!("persistence task already stopped");
    }
    if let Err(e) = persistence.await {
        tracing::error!(error = %e, "persistence task failed");
    }
    match state.store.write().await.flush(state.kv.as_ref()) {
        Ok(flushed) => tracing::info!(flushed, "final flush complete"),
        Err(e) => tracing::error!(error = %e, "final flush failed"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
