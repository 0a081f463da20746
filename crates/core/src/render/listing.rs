//! Overview of every table grouped by size

use std::sync::LazyLock;

use serde::Serialize;

use crate::material::{all_tables, MaterialKey, MAX_TABLE_PIECES};
use crate::stats::StatsTable;

/// Tables containing the longest known endgame of their size.
const MAXIMAL: [&str; 5] = ["KRvK", "KBNvK", "KNNvKP", "KRNvKNN", "KRBNvKQN"];

static ALL_TABLES: LazyLock<Vec<MaterialKey>> = LazyLock::new(|| all_tables(MAX_TABLE_PIECES));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndgameEntry {
    pub material: String,
    pub has_stats: bool,
    pub longest_fen: Option<String>,
    pub maximal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PawnGroup {
    pub num_pawns: usize,
    pub endgames: Vec<EndgameEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceGroup {
    pub num_pieces: usize,
    pub split_pawns: bool,
    pub subgroups: Vec<PawnGroup>,
}

pub fn endgame_groups(stats: &StatsTable) -> Vec<PieceGroup> {
    (3..=MAX_TABLE_PIECES)
        .map(|num_pieces| PieceGroup {
            num_pieces,
            split_pawns: num_pieces >= 5,
            subgroups: (0..=num_pieces - 2)
                .map(|num_pawns| PawnGroup {
                    num_pawns,
                    endgames: ALL_TABLES
                        .iter()
                        .filter(|key| key.piece_count() == num_pieces && key.pawn_count() == num_pawns)
                        .map(|key| {
                            let material = key.to_string();
                            EndgameEntry {
                                has_stats: stats.contains(&material),
                                longest_fen: stats.longest_fen(&material),
                                maximal: MAXIMAL.contains(&material.as_str()),
                                material,
                            }
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}
