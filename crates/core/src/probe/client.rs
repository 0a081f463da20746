//! HTTP client for the tablebase probe backend

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::types::ProbeResponse;
use crate::error::{Error, Result};

pub const DEFAULT_BACKEND: &str = "http://localhost:9001";

pub struct TablebaseClient {
    client: Client,
    backend: String,
}

impl TablebaseClient {
    pub fn new(backend: &str) -> Result<Self> {
        Self::with_timeout(backend, Duration::from_secs(30))
    }

    pub fn with_timeout(backend: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            backend: backend.trim_end_matches('/').to_string(),
        })
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    fn headers(&self, forwarded_for: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(addr) = forwarded_for {
            if let Ok(value) = HeaderValue::from_str(addr) {
                headers.insert("X-Forwarded-For", value);
            }
        }

        headers
    }

    /// Probe a position and all of its legal moves.
    ///
    /// Move categories come back from the backend for the side to move
    /// after the move; they are flipped so that every returned move
    /// category describes the outcome for the side making the move.
    pub async fn probe(&self, fen: &str, forwarded_for: Option<&str>) -> Result<ProbeResponse> {
        debug!(backend = %self.backend, fen, "probing tablebase");

        let response = self.client
            .get(&self.backend)
            .headers(self.headers(forwarded_for))
            .query(&[("fen", fen)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Backend {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let text = response.text().await?;
        parse_probe(&text)
    }
}

impl Default for TablebaseClient {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND).expect("Failed to create HTTP client")
    }
}

fn parse_probe(text: &str) -> Result<ProbeResponse> {
    let mut probe: ProbeResponse = serde_json::from_str(text)?;
    for probe_move in &mut probe.moves {
        probe_move.outcome.category = probe_move.outcome.category.flipped();
    }
    Ok(probe)
}
