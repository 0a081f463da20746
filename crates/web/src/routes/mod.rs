use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use syzygy_tables_core::{render_position, Error, RenderModel};

use crate::AppState;

pub mod tables;

/// Error returned by handlers, mapped onto an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    Core(Error),
    NotFound,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Core(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Core(err) => match err {
                Error::InvalidMaterial(_) | Error::InvalidFen(_) | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                Error::Backend { status, .. } => StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                Error::Http(_) | Error::Json(_) | Error::IncompleteProbe(_) => StatusCode::BAD_GATEWAY,
                Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::NotFound => "Not found".to_string(),
            ApiError::Core(Error::Backend { body, .. }) => body,
            ApiError::Core(err) => {
                if status.is_server_error() {
                    warn!(error = %err, "request failed");
                }
                err.to_string()
            }
        };
        (status, body).into_response()
    }
}

#[derive(Deserialize)]
pub struct ProbeQuery {
    pub fen: Option<String>,
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ProbeQuery>,
) -> Result<Json<RenderModel>, ApiError> {
    let forwarded_for = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok());
    let stats = state.stats.load();

    let model = render_position(
        &state.client,
        &stats,
        query.fen.as_deref(),
        forwarded_for,
        state.config.rounding,
    )
    .await?;

    Ok(Json(model))
}

pub async fn health() -> &'static str {
    "OK"
}
