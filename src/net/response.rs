use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::types::dto::place::PlacesResponse;

pub struct ResponseError(Response);

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        self.0
    }
}

impl<E> From<E> for ResponseError
where
    E: Into<color_eyre::eyre::Error>,
{
    fn from(value: E) -> Self {
        let report = Into::<color_eyre::eyre::Error>::into(value);
        error!("request failed: {report:?}");
        Self((StatusCode::INTERNAL_SERVER_ERROR, report.to_string()).into_response())
    }
}

impl ResponseError {
    pub fn with_status<T>(status_code: StatusCode, data: T) -> Self
    where
        (StatusCode, T): IntoResponse,
    {
        ResponseError((status_code, data).into_response())
    }

    pub fn bad_request<T>(data: T) -> Self
    where
        (StatusCode, T): IntoResponse,
    {
        Self::with_status(StatusCode::BAD_REQUEST, data)
    }

    pub fn not_found<T>(data: T) -> Self
    where
        (StatusCode, T): IntoResponse,
    {
        Self::with_status(StatusCode::NOT_FOUND, data)
    }

    /// The `{"Status": 500}` body map clients fall back to on their own
    pub fn places_unavailable() -> Self {
        Self::with_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(PlacesResponse::fallback()),
        )
    }
}

pub type Result<T, E = ResponseError> = axum::response::Result<T, E>;
