use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {message}")]
    ClientInput { message: String },

    #[error("{resource} {name} not found")]
    NotFound { resource: String, name: String },

    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
        context: Option<String>,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
            context: None,
        }
    }
}

impl AppError {
    pub fn with_context(self, context: impl Into<String>) -> Self {
        match self {
            Self::Io {
                message, source, ..
            } => Self::Io {
                message,
                source,
                context: Some(context.into()),
            },
            error => error,
        }
    }

    pub fn client_input(message: impl Into<String>) -> Self {
        Self::ClientInput {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            name: name.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::ClientInput { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Io { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The text a client gets to see. Filesystem details stay in the log.
    pub fn public_message(&self) -> &str {
        match self {
            Self::ClientInput { message } => message,
            Self::NotFound { .. } => "File not found",
            Self::Io { .. } | Self::Internal(_) => "An error occurred",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::ClientInput { message } => {
                tracing::warn!(%message, "rejected request");
            }
            AppError::NotFound { resource, name } => {
                tracing::warn!(%resource, %name, "not found");
            }
            AppError::Io {
                message,
                source,
                context,
            } => {
                tracing::error!(
                    %message,
                    error = ?source,
                    context = context.as_deref().unwrap_or("-"),
                    "i/o failure"
                );
            }
            AppError::Internal(message) => {
                tracing::error!(%message, "internal error");
            }
        }

        (self.status(), self.public_message().to_string()).into_response()
    }
}
