use std::cmp::Reverse;

use crate::probe::{MoveCandidate, Wdl};

/// Preference tier of a move, lower is better.
fn tier(candidate: &MoveCandidate) -> u8 {
    if candidate.checkmate() {
        return 0;
    }
    match candidate.wdl {
        Some(Wdl::Win) if candidate.zeroing() => 1,
        Some(Wdl::Win) => 2,
        Some(Wdl::CursedWin) => 3,
        _ if candidate.stalemate() => 4,
        _ if candidate.insufficient_material() => 5,
        Some(Wdl::Draw) => 6,
        Some(Wdl::BlessedLoss) => 7,
        Some(Wdl::Loss) => 8,
        None => 9,
    }
}

/// Picks the single move to highlight.
///
/// Independent of input order: within a tier the move with a known and
/// larger dtz wins, then the smaller uci.
pub fn best_move(candidates: &[MoveCandidate]) -> Option<&MoveCandidate> {
    candidates.iter().min_by_key(|c| {
        (
            tier(c),
            c.dtz().is_none(),
            Reverse(c.dtz().unwrap_or(0)),
            c.uci.as_str(),
        )
    })
}
