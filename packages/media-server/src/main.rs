use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

use media_store::{MediaStore, StoreConfig};

mod handler;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MediaStore>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = StoreConfig::from_env();
    tracing::info!(
        upload_root = %config.upload_root.display(),
        original_max_dim = config.original_max_dim,
        "starting media server"
    );

    let state = AppState {
        store: Arc::new(MediaStore::new(config)),
    };

    let app = Router::new()
        .route("/healthz", get(handler::health))
        .route("/a/{tenant}/files", post(handler::upload))
        .route("/a/{tenant}/files/{name}", delete(handler::delete_file))
        .route("/a/{tenant}/img/{name}", get(handler::serve_image))
        .route(
            "/a/{tenant}/cache",
            get(handler::list_cache).delete(handler::clear_cache),
        )
        .with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    tracing::info!(addr = %addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, app).await.expect("server error");
}
