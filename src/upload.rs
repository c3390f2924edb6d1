use crate::{error::AppError, storage::Storage};
use axum::{
    extract::{multipart::MultipartRejection, Multipart},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension,
};
use std::sync::Arc;

pub const FILE_FIELD: &str = "file";

pub async fn upload_file(
    Extension(storage): Extension<Arc<Storage>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::warn!(error = %e, "upload without a multipart body");
        AppError::client_input("File too large or incorrect format")
    })?;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let submitted = field.file_name().unwrap_or_default().to_string();
        let path = storage
            .resolve(&submitted)
            .ok_or_else(|| AppError::client_input("Invalid file name"))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // body limit is enforced while reading, so nothing is written for an oversized upload
        let data = field.bytes().await.map_err(malformed)?;

        storage
            .write(&path, &data)
            .await
            .map_err(|e| AppError::from(e).with_context(format!("writing {}", name)))?;

        tracing::info!(file = %name, bytes = data.len(), "file uploaded");
        return Ok((
            StatusCode::CREATED,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("File uploaded successfully: {}", name),
        ));
    }

    Err(AppError::client_input("Missing form field: file"))
}

fn malformed(err: axum::extract::multipart::MultipartError) -> AppError {
    tracing::warn!(error = %err, status = %err.status(), "unreadable multipart body");
    AppError::client_input("File too large or incorrect format")
}
