//! Loading and atomic replacement of the stats table

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::models::EndgameStats;
use crate::error::Result;

const KNVK_FEN: &str = "4k3/8/8/8/8/8/8/1N2K3 w - - 0 1";
const KBVK_FEN: &str = "4k3/8/8/8/8/8/8/2B1K3 w - - 0 1";

/// Immutable stats keyed by table name, as produced by the offline job.
///
/// Each entry is kept both parsed and as the JSON it was stored as.
#[derive(Debug, Clone)]
pub struct StatsTable {
    entries: HashMap<String, EndgameStats>,
    raw: HashMap<String, Value>,
    loaded_at: DateTime<Utc>,
}

impl StatsTable {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let raw: HashMap<String, Value> = serde_json::from_str(text)?;
        let entries = raw
            .iter()
            .map(|(material, value)| -> Result<(String, EndgameStats)> {
                Ok((material.clone(), EndgameStats::deserialize(value)?))
            })
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self {
            entries,
            raw,
            loaded_at: Utc::now(),
        })
    }

    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            raw: HashMap::new(),
            loaded_at: Utc::now(),
        }
    }

    pub fn get(&self, material: &str) -> Option<&EndgameStats> {
        self.entries.get(material)
    }

    /// The entry exactly as stored in the artifact.
    pub fn raw(&self, material: &str) -> Option<&Value> {
        self.raw.get(material)
    }

    pub fn contains(&self, material: &str) -> bool {
        self.entries.contains_key(material)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// A representative position for the table: the start of its longest
    /// endgame. Tables without decisive positions get a fixed example.
    pub fn longest_fen(&self, material: &str) -> Option<String> {
        match material {
            "KNvK" => return Some(KNVK_FEN.to_string()),
            "KBvK" => return Some(KBVK_FEN.to_string()),
            _ => {}
        }
        self.get(material)?
            .longest_entry()
            .map(|entry| format!("{} 0 1", entry.epd))
    }
}

/// Shared handle to the current stats table.
///
/// Readers take a snapshot with [`StatsStore::load`] and keep it for the
/// whole request; a reload swaps in a complete new table.
pub struct StatsStore {
    current: ArcSwap<StatsTable>,
}

impl StatsStore {
    pub fn new(table: StatsTable) -> Self {
        Self {
            current: ArcSwap::from_pointee(table),
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let table = StatsTable::open(path)?;
        info!(path = %path.display(), tables = table.len(), "loaded stats");
        Ok(Self::new(table))
    }

    pub fn load(&self) -> Arc<StatsTable> {
        self.current.load_full()
    }

    /// Re-reads the artifact and swaps it in. On failure the previous
    /// table stays in place.
    pub fn reload<P: AsRef<Path>>(&self, path: P) -> Result<Arc<StatsTable>> {
        let path = path.as_ref();
        match StatsTable::open(path) {
            Ok(table) => {
                info!(path = %path.display(), tables = table.len(), "reloaded stats");
                let table = Arc::new(table);
                self.current.store(Arc::clone(&table));
                Ok(table)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "stats reload failed, keeping previous table");
                Err(err)
            }
        }
    }
}
