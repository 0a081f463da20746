//! Composition of the per-position and listing views

mod board;
mod listing;
mod model;

pub use board::{BoardStrings, QueryBoard, DEFAULT_FEN};
pub use listing::{endgame_groups, EndgameEntry, PawnGroup, PieceGroup};
pub use model::{
    build_render_model, needs_probe, probed_status, render_position, Dependency, RenderModel, RootStatus,
};
