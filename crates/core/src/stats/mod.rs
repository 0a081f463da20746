//! Precomputed endgame statistics and their per-query view

mod models;
mod store;
mod view;

pub use models::{EndgameStats, Histograms, LongEndgame, SideHistogram, TableFileStats, WdlCounts};
pub use store::{StatsStore, StatsTable};
pub use view::{prepare_stats, ActiveDtz, HistogramEntry, LongestExample, OutcomeShare, Outcomes, StatsView};
