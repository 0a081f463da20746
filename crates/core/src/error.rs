//! Error types for syzygy-tables-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tablebase backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Invalid material key: {0}")]
    InvalidMaterial(String),

    #[error("Invalid FEN: {0}")]
    InvalidFen(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Incomplete probe result: {0}")]
    IncompleteProbe(String),
}

pub type Result<T> = std::result::Result<T, Error>;
