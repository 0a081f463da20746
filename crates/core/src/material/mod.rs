//! Material keys, their canonical ordering, and the dependency relation

mod deps;
mod key;
pub mod listing;

pub use deps::{all_dependencies, all_tables, dependencies, with_dependencies};
pub use key::{
    cmp_listing, is_valid, MaterialKey, MaterialSide, Normalized, SortKey, MAX_NON_KING_PIECES,
    MAX_TABLE_PIECES, PIECE_CHARS,
};
