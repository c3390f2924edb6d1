use crate::{error::AppError, storage::Storage};
use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use std::{io, sync::Arc};
use tokio_util::io::ReaderStream;

pub async fn download_file(
    Extension(storage): Extension<Arc<Storage>>,
    file_name: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(file_name) = file_name.map_err(|e| {
        tracing::warn!(error = %e, "undecodable file name");
        AppError::not_found("File", "<undecodable>")
    })?;

    let path = storage
        .resolve(&file_name)
        .ok_or_else(|| AppError::not_found("File", file_name.as_str()))?;

    let (file, len) = storage.open(&path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AppError::not_found("File", file_name.as_str()),
        _ => AppError::from(e).with_context(format!("opening {}", path.display())),
    })?;

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let content_type = HeaderValue::from_str(mime.as_ref())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    tracing::info!(file = %file_name, size = len, "download");
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_LENGTH, HeaderValue::from(len)),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}
