pub mod config;
pub mod download;
pub mod error;
pub mod list;
pub mod storage;
pub mod upload;

use crate::{
    config::Config, download::download_file, list::list_files, storage::Storage,
    upload::upload_file,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Builds the route table serving `storage`, with limits taken from `config`.
pub fn app(config: &Config, storage: Arc<Storage>) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(Extension(storage));

    Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(config.max_upload_size)),
        )
        .route("/files/:file_name", get(download_file))
        .route("/files", get(list_files))
        .layer(middleware_stack)
}
