use crate::{error::AppError, storage::Storage};
use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    Extension,
};
use std::sync::Arc;

pub async fn list_files(
    Extension(storage): Extension<Arc<Storage>>,
) -> Result<impl IntoResponse, AppError> {
    let names = storage.list_names().await.map_err(|e| {
        AppError::from(e).with_context(format!("reading {}", storage.root().display()))
    })?;

    let mut body = String::new();
    for name in &names {
        body.push_str(name);
        body.push('\n');
    }

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    ))
}
