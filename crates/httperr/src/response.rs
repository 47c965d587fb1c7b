use axum::Json;
use axum::response::{IntoResponse, Response};

use crate::shared::SharedApiError;
use crate::value::ApiError;

/// Answers with [`ApiError::response_status`] and the JSON form as body
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.response_status();
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for SharedApiError {
    fn into_response(self) -> Response {
        self.into_inner().into_response()
    }
}
