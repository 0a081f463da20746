//! Tablebase probe collaborator and result adapter

mod adapter;
mod client;
mod types;

pub use adapter::{badge, candidates_from_probe, derive_wdl, move_to_uci, MoveCandidate};
pub use client::{TablebaseClient, DEFAULT_BACKEND};
pub use types::{Category, ProbeMove, ProbeOutcome, ProbeResponse, Wdl};
