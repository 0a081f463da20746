//! Everything the presentation layer needs for one position

use serde::Serialize;
use shakmaty::{Color, Position};
use tracing::debug;

use super::board::{BoardStrings, QueryBoard};
use crate::error::{Error, Result};
use crate::material::dependencies;
use crate::probe::{candidates_from_probe, MoveCandidate, ProbeResponse, TablebaseClient, Wdl};
use crate::ranking::{best_move, rank_moves, RankedMoves};
use crate::stats::{prepare_stats, ActiveDtz, StatsTable, StatsView};

/// Status line and flags describing the root position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RootStatus {
    pub status: String,
    pub winning_side: Option<&'static str>,
    pub frustrated: bool,
    pub blessed_loss: bool,
    pub cursed_win: bool,
    pub illegal: bool,
    pub insufficient_material: bool,
}

impl RootStatus {
    fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
            ..Self::default()
        }
    }
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

fn capitalized(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

/// Root states that are decided without asking the tablebase.
fn terminal_status(board: &QueryBoard) -> Option<(RootStatus, Option<ActiveDtz>)> {
    let Some(pos) = board.position() else {
        let mut root = RootStatus::new("Invalid position");
        root.illegal = true;
        return Some((root, None));
    };

    if pos.is_stalemate() {
        return Some((RootStatus::new("Draw by stalemate"), None));
    }

    if pos.is_checkmate() {
        let winner = !pos.turn();
        let mut root = RootStatus::new(&format!("{} won by checkmate", capitalized(winner)));
        root.winning_side = Some(color_name(winner));
        return Some((root, Some(ActiveDtz::exact(0))));
    }

    None
}

/// Status of a probed root from the side to move's point of view.
pub fn probed_status(turn: Color, insufficient_material: bool, probe: &ProbeResponse) -> RootStatus {
    let wdl = probe.wdl();
    let mut root = RootStatus {
        blessed_loss: wdl == Some(Wdl::BlessedLoss),
        cursed_win: wdl == Some(Wdl::CursedWin),
        frustrated: wdl.is_some_and(Wdl::is_frustrated),
        ..RootStatus::default()
    };

    match (wdl, probe.dtz) {
        _ if insufficient_material => {
            root.status = "Draw by insufficient material".to_string();
            root.insufficient_material = true;
        }
        (None, _) | (_, None) => root.status = "Position not found in tablebases".to_string(),
        (Some(Wdl::Draw), _) => root.status = "Tablebase draw".to_string(),
        (Some(wdl), Some(dtz)) => {
            let winning = dtz > 0 || (dtz == 0 && wdl.value() > 0);
            let winner = if winning { turn } else { !turn };
            root.status = format!(
                "{} is {} with DTZ {}",
                capitalized(turn),
                if winning { "winning" } else { "losing" },
                dtz.abs()
            );
            root.winning_side = Some(color_name(winner));
        }
    }

    root
}

/// An immediate sub-table with a position to jump to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub material: String,
    pub longest_fen: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderModel {
    #[serde(flatten)]
    pub board: BoardStrings,
    pub material: String,
    pub normalized_material: String,
    pub piece_count: usize,
    #[serde(flatten)]
    pub root: RootStatus,
    pub moves: RankedMoves,
    pub bestmove: Option<MoveCandidate>,
    pub stats: Option<StatsView>,
    pub is_table: bool,
    pub deps: Vec<Dependency>,
}

/// Whether the backend has to be asked about this position.
pub fn needs_probe(board: &QueryBoard) -> bool {
    terminal_status(board).is_none()
}

/// Assembles the render model from a parsed board and, for positions that
/// need one, the backend's probe result.
///
/// `rounding` enables the extra histogram marker when the reported root
/// dtz may be one ply short.
pub fn build_render_model(
    board: &QueryBoard,
    probe: Option<&ProbeResponse>,
    stats: &StatsTable,
    rounding: bool,
) -> Result<RenderModel> {
    let (root, active, candidates) = match terminal_status(board) {
        Some((root, active)) => (root, active, Vec::new()),
        None => {
            let pos = board
                .position()
                .ok_or_else(|| Error::InvalidFen(board.fen().to_string()))?;
            let probe = probe.ok_or_else(|| Error::IncompleteProbe("root was not probed".to_string()))?;

            let root = probed_status(pos.turn(), pos.is_insufficient_material(), probe);
            let active = probe.dtz.filter(|dtz| *dtz != 0).map(|dtz| ActiveDtz {
                dtz,
                rounded: rounding && probe.maybe_rounded(),
            });
            (root, active, candidates_from_probe(pos, probe)?)
        }
    };

    let bestmove = best_move(&candidates).cloned();
    let moves = rank_moves(candidates);

    let material = board.material();
    let material_name = material.to_string();
    let stats_view = prepare_stats(stats, &material_name, board.fen(), active);

    let is_table = material.is_table();
    let deps = if is_table {
        dependencies(&material)
            .into_iter()
            .map(|dep| {
                let name = dep.to_string();
                Dependency {
                    longest_fen: stats.longest_fen(&name),
                    material: name,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(RenderModel {
        board: board.strings(),
        normalized_material: material.normalize().key.to_string(),
        material: material_name,
        piece_count: board.piece_count(),
        root,
        moves,
        bestmove,
        stats: stats_view,
        is_table,
        deps,
    })
}

/// Parses `fen`, probes the backend when needed and builds the model.
pub async fn render_position(
    client: &TablebaseClient,
    stats: &StatsTable,
    fen: Option<&str>,
    forwarded_for: Option<&str>,
    rounding: bool,
) -> Result<RenderModel> {
    let board = QueryBoard::parse(fen);
    let probe = if needs_probe(&board) {
        Some(client.probe(board.fen(), forwarded_for).await?)
    } else {
        debug!(fen = board.fen(), "terminal root, skipping probe");
        None
    };
    build_render_model(&board, probe.as_ref(), stats, rounding)
}
