use super::models::{ErrorDetail, ErrorResponse};
use crate::utils::error::{ErrorKind, ProcessError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug)]
pub struct AppError(pub ProcessError);

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError(ProcessError::BadRequest {
            message: message.into(),
        })
    }

    pub fn status_code(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::NotFound | ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            // 客戶端多半已經斷線，這個狀態碼只會出現在日誌裡
            ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::StreamReadError | ErrorKind::Config | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!("❌ {} ({:?})", self.0, self.0.kind());
        } else {
            tracing::warn!("⚠️ {} ({:?})", self.0, self.0.kind());
        }

        let path = match &self.0 {
            ProcessError::InputNotFound { path } => Some(path.clone()),
            _ => None,
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                kind: self.0.kind(),
                message: self.0.user_friendly_message(),
                path,
            },
        });
        (status_code, body).into_response()
    }
}

impl From<ProcessError> for AppError {
    fn from(err: ProcessError) -> Self {
        AppError(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError(ProcessError::IoError(err))
    }
}
