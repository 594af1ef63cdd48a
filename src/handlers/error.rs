use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use tracing::error;

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur in request handlers
#[derive(Debug)]
pub(crate) enum Error {
    /// The caller did not present the shared secret
    Unauthorized,
    Database(database::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Database(_) => write!(f, "unexpected database error"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            Self::Unauthorized => None,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        use std::error::Error as _;

        match self {
            Self::Unauthorized => ApiError::response("unauthorized", StatusCode::UNAUTHORIZED),
            Self::Database(error) => {
                match error.source() {
                    Some(source) => error!(%error, %source, "unexpected database error"),
                    None => error!(%error, "unexpected database error"),
                }
                ApiError::internal_server_error()
            }
        }
    }
}

impl From<database::Error> for Error {
    fn from(error: database::Error) -> Self {
        Self::Database(error)
    }
}

#[derive(Serialize)]
struct ApiError {
    ok: bool,
    message: &'static str,
}

impl ApiError {
    fn response(message: &'static str, status: StatusCode) -> Response {
        (status, Json(ApiError { ok: false, message })).into_response()
    }

    fn internal_server_error() -> Response {
        ApiError::response("internal server error", StatusCode::INTERNAL_SERVER_ERROR)
    }
}
