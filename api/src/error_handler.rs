use ai_llm_service::AiLlmError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fact_pipeline::{PipelineError, SourceError, StoreError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,

            // custom mapped
            AppError::Http { status, .. } => *status,

            // 5xx
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Bind(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }

    fn http(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        AppError::Http {
            status,
            code,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        } else {
            warn!(%status, error = %self, "request rejected");
        }

        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<axum::extract::rejection::QueryRejection> for AppError {
    fn from(err: axum::extract::rejection::QueryRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<axum::extract::rejection::PathRejection> for AppError {
    fn from(err: axum::extract::rejection::PathRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

/// Caller mistakes → 4xx, upstream (LLM / source site) failures → 502.
impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(msg) => {
                AppError::http(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
            }
            PipelineError::Source(e) if e.is_client_error() => {
                AppError::http(StatusCode::BAD_REQUEST, "INVALID_INPUT", e.to_string())
            }
            PipelineError::Source(e) => AppError::from(e),
            PipelineError::Store(e) => AppError::from(e),
            PipelineError::Llm(e) => AppError::Llm(e),
            e @ PipelineError::EmptyOutput { .. } => {
                AppError::http(StatusCode::BAD_GATEWAY, "LLM_EMPTY_OUTPUT", e.to_string())
            }
            other => AppError::http(
                StatusCode::INTERNAL_SERVER_ERROR,
                "PIPELINE_ERROR",
                other.to_string(),
            ),
        }
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        if err.is_client_error() {
            return AppError::http(StatusCode::BAD_REQUEST, "INVALID_INPUT", err.to_string());
        }
        AppError::http(StatusCode::BAD_GATEWAY, "SOURCE_FETCH_FAILED", err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            return AppError::http(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string());
        }
        match err {
            StoreError::InvalidSettings(_) => {
                AppError::http(StatusCode::BAD_REQUEST, "INVALID_SETTINGS", err.to_string())
            }
            StoreError::InvalidUpdate(msg) => {
                AppError::http(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
            }
            other => AppError::http(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                other.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_errors_map_to_http_statuses() {
        let cases = [
            (PipelineError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (PipelineError::Source(SourceError::InvalidUrl), StatusCode::BAD_REQUEST),
            (PipelineError::Source(SourceError::HttpStatus(500)), StatusCode::BAD_GATEWAY),
            (PipelineError::Store(StoreError::NotFound(3)), StatusCode::NOT_FOUND),
            (PipelineError::EmptyOutput { stage: "generate-gaps" }, StatusCode::BAD_GATEWAY),
            (
                PipelineError::Llm(AiLlmError::InvalidJson { step: "s".into() }),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn review_errors_map_to_client_statuses() {
        let cases = [
            (StoreError::FactNotFound(4), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (StoreError::GapNotFound(4), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                StoreError::InvalidUpdate("no gap fields provided".into()),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            let err = AppError::from(err);
            assert_eq!(err.status_code(), status);
            assert_eq!(err.error_code(), code);
        }
    }

    #[test]
    fn source_messages_survive_mapping() {
        let err = AppError::from(PipelineError::Source(SourceError::MissingInput));
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(err.to_string(), "provide either text or url");
    }
}
