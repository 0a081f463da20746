//! Syzygy tablebase query core: material keys, probe results, move
//! ranking, endgame statistics and the render model built from them.

pub mod error;
pub mod material;
pub mod probe;
pub mod ranking;
pub mod render;
pub mod stats;

pub use error::{Error, Result};
pub use material::MaterialKey;
pub use probe::{MoveCandidate, TablebaseClient, DEFAULT_BACKEND};
pub use ranking::{best_move, rank_moves, RankedMoves};
pub use render::{build_render_model, render_position, QueryBoard, RenderModel, DEFAULT_FEN};
pub use stats::{prepare_stats, StatsStore, StatsTable, StatsView};
