//! Turns a raw probe response into typed move candidates

use std::collections::HashMap;

use serde::Serialize;
use shakmaty::{fen::Fen, Chess, EnPassantMode, File, Move, Position, Role, Square};
use tracing::warn;

use super::types::{Category, ProbeOutcome, ProbeResponse, Wdl};
use crate::error::{Error, Result};

/// A legal move of the queried position together with its probe outcome.
///
/// `wdl` is from the point of view of the side making the move, while
/// `dtz` and `dtm` keep the backend's convention: they describe the
/// position after the move, for the side to move there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveCandidate {
    pub uci: String,
    pub san: String,
    pub fen: String,
    pub capture: bool,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
    pub wdl: Option<Wdl>,
    pub badge: String,
}

impl MoveCandidate {
    pub fn new(uci: &str, san: &str, fen: &str, capture: bool, outcome: ProbeOutcome) -> Self {
        Self {
            uci: uci.to_string(),
            san: san.to_string(),
            fen: fen.to_string(),
            capture,
            wdl: derive_wdl(&outcome),
            badge: badge(&outcome),
            outcome,
        }
    }

    pub fn dtz(&self) -> Option<i32> {
        self.outcome.dtz
    }

    pub fn dtm(&self) -> Option<i32> {
        self.outcome.dtm
    }

    pub fn zeroing(&self) -> bool {
        self.outcome.zeroing
    }

    pub fn checkmate(&self) -> bool {
        self.outcome.checkmate
    }

    pub fn stalemate(&self) -> bool {
        self.outcome.stalemate
    }

    pub fn insufficient_material(&self) -> bool {
        self.outcome.insufficient_material
    }
}

/// Terminal conditions override the backend category.
pub fn derive_wdl(outcome: &ProbeOutcome) -> Option<Wdl> {
    if outcome.checkmate {
        Some(Wdl::Win)
    } else if outcome.stalemate || outcome.insufficient_material {
        Some(Wdl::Draw)
    } else {
        outcome.category.wdl()
    }
}

pub fn badge(outcome: &ProbeOutcome) -> String {
    if outcome.checkmate {
        return "Checkmate".to_string();
    }
    if outcome.stalemate {
        return "Stalemate".to_string();
    }
    if outcome.insufficient_material {
        return "Insufficient material".to_string();
    }
    match outcome.dtz {
        Some(0) => "Draw".to_string(),
        None => "Unknown".to_string(),
        Some(_) if outcome.zeroing => "Zeroing".to_string(),
        Some(dtz) if dtz < 0 => format!("Win with DTZ {}", dtz.abs()),
        Some(dtz) => format!("Loss with DTZ {}", dtz),
    }
}

/// Pairs every legal move of `position` with its entry in `probe`.
///
/// The probe must cover exactly the legal moves; anything else is an
/// incomplete result and nothing is ranked.
pub fn candidates_from_probe(position: &Chess, probe: &ProbeResponse) -> Result<Vec<MoveCandidate>> {
    let mut by_uci = HashMap::with_capacity(probe.moves.len());
    for probe_move in &probe.moves {
        if by_uci.insert(probe_move.uci.as_str(), probe_move).is_some() {
            return Err(Error::IncompleteProbe(format!("duplicate move {}", probe_move.uci)));
        }
    }

    let legal_moves = position.legal_moves();
    if legal_moves.len() != by_uci.len() {
        return Err(Error::IncompleteProbe(format!(
            "expected {} moves, got {}",
            legal_moves.len(),
            by_uci.len()
        )));
    }

    let mut candidates = Vec::with_capacity(legal_moves.len());
    for mv in legal_moves {
        let uci = move_to_uci(&mv);
        let probe_move = by_uci
            .get(uci.as_str())
            .ok_or_else(|| Error::IncompleteProbe(format!("missing move {}", uci)))?;

        let capture = mv.is_capture();
        let after = position
            .clone()
            .play(mv)
            .map_err(|_| Error::IncompleteProbe(format!("unplayable move {}", uci)))?;

        if let Category::Unrecognized(raw) = &probe_move.outcome.category {
            warn!(uci = %uci, category = %raw, "unrecognized probe category");
        }

        let mut outcome = probe_move.outcome.clone();
        outcome.checkmate |= after.is_checkmate();
        outcome.stalemate |= after.is_stalemate();
        outcome.insufficient_material |= after.is_insufficient_material();
        outcome.dtm = outcome.dtm.map(i32::abs);

        let fen = Fen::from_position(&after, EnPassantMode::Legal).to_string();
        candidates.push(MoveCandidate::new(&uci, &probe_move.san, &fen, capture, outcome));
    }

    Ok(candidates)
}

/// Convert shakmaty Move to UCI string
pub fn move_to_uci(mv: &Move) -> String {
    match mv {
        Move::Normal { from, to, promotion, .. } => {
            let promo = promotion.map(|r| match r {
                Role::Queen => "q",
                Role::Rook => "r",
                Role::Bishop => "b",
                Role::Knight => "n",
                _ => "",
            }).unwrap_or("");
            format!("{}{}{}", from, to, promo)
        }
        Move::EnPassant { from, to, .. } => format!("{}{}", from, to),
        Move::Castle { king, rook } => {
            let king_to = if rook.file() > king.file() {
                Square::from_coords(File::G, king.rank())
            } else {
                Square::from_coords(File::C, king.rank())
            };
            format!("{}{}", king, king_to)
        }
        Move::Put { .. } => String::new(),
    }
}
