use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use syzygy_tables_core::material::listing::{
    download_list, graph_dot, parse_roots, resolve_stats_file, DownloadParams, DtzMode, Source, StatsFile,
    DEFAULT_ROOTS,
};
use syzygy_tables_core::render::{endgame_groups, PieceGroup};
use syzygy_tables_core::MaterialKey;

use super::ApiError;
use crate::AppState;

fn roots_from_file(file: &str, suffix: &str) -> Result<Vec<MaterialKey>, ApiError> {
    let roots = file.strip_suffix(suffix).ok_or(ApiError::NotFound)?;
    parse_roots(roots).map_err(|_| ApiError::NotFound)
}

fn default_roots() -> Result<Vec<MaterialKey>, ApiError> {
    Ok(parse_roots(DEFAULT_ROOTS)?)
}

pub async fn stats_json(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    match resolve_stats_file(&file).ok_or(ApiError::NotFound)? {
        StatsFile::Redirect(normalized) => {
            let location = format!("/stats/{}", normalized);
            Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response())
        }
        StatsFile::Table(table) => {
            let stats = state.stats.load();
            let entry = stats.raw(&table).ok_or(ApiError::NotFound)?;
            Ok(Json(entry).into_response())
        }
    }
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub tables: usize,
    pub loaded_at: DateTime<Utc>,
}

pub async fn reload_stats(State(state): State<Arc<AppState>>) -> Result<Json<ReloadResponse>, (StatusCode, String)> {
    let path = state.config.stats_path.clone();
    let table = tokio::task::spawn_blocking(move || state.stats.reload(&path))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(ReloadResponse {
        tables: table.len(),
        loaded_at: table.loaded_at(),
    }))
}

pub async fn graph_default() -> Result<String, ApiError> {
    Ok(graph_dot(&default_roots()?))
}

pub async fn graph(Path(file): Path<String>) -> Result<String, ApiError> {
    Ok(graph_dot(&roots_from_file(&file, ".dot")?))
}

#[derive(Deserialize)]
pub struct DownloadQuery {
    pub source: Option<String>,
    pub dtz: Option<String>,
    #[serde(rename = "min-pieces")]
    pub min_pieces: Option<usize>,
    #[serde(rename = "max-pieces")]
    pub max_pieces: Option<usize>,
}

impl DownloadQuery {
    fn params(&self) -> Result<DownloadParams, ApiError> {
        let defaults = DownloadParams::default();
        Ok(DownloadParams {
            source: match &self.source {
                Some(source) => source.parse::<Source>()?,
                None => defaults.source,
            },
            dtz: match &self.dtz {
                Some(dtz) => dtz.parse::<DtzMode>()?,
                None => defaults.dtz,
            },
            min_pieces: self.min_pieces.unwrap_or(defaults.min_pieces),
            max_pieces: self.max_pieces.unwrap_or(defaults.max_pieces),
        })
    }
}

pub async fn download_default(Query(query): Query<DownloadQuery>) -> Result<String, ApiError> {
    Ok(download_list(&default_roots()?, &query.params()?))
}

pub async fn download(
    Path(file): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<String, ApiError> {
    let roots = roots_from_file(&file, ".txt")?;
    Ok(download_list(&roots, &query.params()?))
}

pub async fn endgames(State(state): State<Arc<AppState>>) -> Json<Vec<PieceGroup>> {
    let stats = state.stats.load();
    Json(endgame_groups(&stats))
}
