use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Failures a caller gets to see. Everything else degrades silently into a
/// best-effort document.
#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Nothing to render: {0}")]
    NothingToRender(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// HTTP status reported for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NothingToRender(_) | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Archive(_) | Error::Render(_) | Error::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{self}");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<pdf::PdfError> for Error {
    fn from(e: pdf::PdfError) -> Self {
        Error::Render(e.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Archive(e.to_string())
    }
}
