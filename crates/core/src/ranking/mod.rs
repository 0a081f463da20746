//! Move ranking: outcome buckets and the highlighted best move

mod bestmove;
mod buckets;

pub use bestmove::best_move;
pub use buckets::{rank_moves, Bucket, RankedMoves};
