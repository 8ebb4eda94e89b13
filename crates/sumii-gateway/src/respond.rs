use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sumii_core::{ErrorKind, SumiiError};

/// Maps the coarse error taxonomy onto HTTP statuses. REST
/// handlers return `Result<T, ApiError>` and let this conversion happen
/// once, centrally, rather than per handler.
pub struct ApiError(pub SumiiError);

/// Any boundary error that already knows how to become a `SumiiError`
/// (`sumii-db`, `sumii-blob`, `sumii-ocr`, `sumii-agent`, `sumii-artifact`,
/// `sumii-orchestrator`) converts into an `ApiError` for free via `?`, so
/// handlers never write a per-crate match arm.
impl<E: Into<SumiiError>> From<E> for ApiError {
    fn from(e: E) -> Self {
        ApiError(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::InputValidation => StatusCode::BAD_REQUEST,
            ErrorKind::Auth => StatusCode::UNAUTHORIZED,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::BAD_REQUEST,
            ErrorKind::RemoteDependency => StatusCode::BAD_GATEWAY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        }));
        (status, body).into_response()
    }
}
