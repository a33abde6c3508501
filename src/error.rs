use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// ErrorBody
///
/// The JSON error envelope returned by all failing endpoints that carry a
/// body: `{ "error": "<message>" }`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    #[schema(example = "title is required")]
    pub error: String,
}

/// ApiError
///
/// Application-level error type covering the full failure taxonomy:
/// validation failures (400), authorization failures (401), missing records
/// (404, empty body) and store/driver failures (500, generic body). Any
/// failure aborts the remaining workflow steps for the request; effects
/// already committed are not rolled back.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing required input (missing title, short username).
    Validation(String),
    /// Missing, malformed or non-owning credential.
    Unauthorized(String),
    /// The referenced id has no record.
    NotFound,
    /// Store or driver failure. The detail is logged, never sent.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: msg })).into_response()
            }
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, Json(ErrorBody { error: msg })).into_response()
            }
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "internal server error".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
