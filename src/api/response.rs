//! Response envelope and error-to-status mapping

use crate::error::{ErrorKind, ReposcoreError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Code carried by every successful response
pub const OK_CODE: &str = "OK";

/// `{code, message, data}` envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: OK_CODE.to_string(),
            message: "success".to_string(),
            data: Some(data),
        }
    }
}

/// Handler error; renders as an envelope with the matching status
#[derive(Debug)]
pub struct ApiError(pub ReposcoreError);

impl From<ReposcoreError> for ApiError {
    fn from(err: ReposcoreError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError(ReposcoreError::InvalidInput(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MalformedResponse
            | ErrorKind::ScoreOutOfRange
            | ErrorKind::EmptySummary => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::GatewayUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::PersistenceFailure | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self.0);
        } else {
            warn!("Request rejected ({}): {}", status, self.0);
        }

        let body = ApiResponse::<()> {
            code: self.0.kind().code().to_string(),
            message: self.0.to_string(),
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScoreField;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ReposcoreError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (ReposcoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ReposcoreError::MalformedResponse("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (
                ReposcoreError::ScoreOutOfRange {
                    field: ScoreField::Readme,
                    value: 40,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ReposcoreError::EmptySummary, StatusCode::UNPROCESSABLE_ENTITY),
            (ReposcoreError::GatewayUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (
                ReposcoreError::PersistenceFailure("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn test_success_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::ok(7)).unwrap();
        assert_eq!(value["code"], "OK");
        assert_eq!(value["data"], 7);
    }
}
