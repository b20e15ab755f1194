use axum::{
    http::StatusCode,
    response::{IntoResponse, Response}
};
use anyhow;
use log::error;

use asset_transfer::{AssetError, InvokeError};

pub(crate) enum ServerError{
    NotFound(String),
    BadRequest(String),
    InternalError(anyhow::Error)
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(msg) =>
                (StatusCode::NOT_FOUND, format!("Resource not found: {}", msg)).into_response(),
            Self::BadRequest(msg) =>
                (StatusCode::BAD_REQUEST, format!("Bad request: {}", msg)).into_response(),
            Self::InternalError(err) => {
                error!("internal error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {}", err)).into_response()
            }
        }
    }
}

impl From<InvokeError> for ServerError {
    fn from(err: InvokeError) -> Self {
        match err {
            InvokeError::Asset(AssetError::NotFound(_)) => Self::NotFound(err.to_string()),
            InvokeError::Asset(AssetError::Decode { .. })
                | InvokeError::UnknownFunction(_)
                | InvokeError::Arity { .. } => Self::BadRequest(err.to_string()),
            other => Self::InternalError(other.into())
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err)
    }
}
