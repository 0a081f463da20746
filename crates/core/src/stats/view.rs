//! Per-query view over the stats of one table

use serde::Serialize;

use super::models::{EndgameStats, SideHistogram, WdlCounts};
use super::store::StatsTable;
use crate::material::MaterialKey;

/// Zero runs longer than this collapse into one marker.
const MAX_ZERO_RUN: usize = 5;

/// The root position's own dtz, used to highlight its ply in the histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveDtz {
    pub dtz: i32,
    /// The reported dtz may be one ply short of the precise value.
    pub rounded: bool,
}

impl ActiveDtz {
    pub fn exact(dtz: i32) -> Self {
        Self { dtz, rounded: false }
    }

    fn marks(&self, ply: usize) -> bool {
        let distance = self.dtz.unsigned_abs() as usize;
        distance == ply || (self.rounded && self.dtz != 0 && distance + 1 == ply)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutcomeShare {
    pub count: u64,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcomes {
    pub white: OutcomeShare,
    pub cursed: OutcomeShare,
    pub draws: OutcomeShare,
    pub blessed: OutcomeShare,
    pub black: OutcomeShare,
}

impl Outcomes {
    fn combine(side: &WdlCounts, other: &WdlCounts) -> Option<Self> {
        let counts = [
            side.win + other.loss,
            side.cursed_win + other.blessed_loss,
            side.draw + other.draw,
            side.blessed_loss + other.cursed_win,
            side.loss + other.win,
        ];
        let total: u64 = counts.iter().sum();
        if total == 0 {
            return None;
        }
        let share = |count: u64| OutcomeShare {
            count,
            pct: round1(count as f64 * 100.0 / total as f64),
        };
        Some(Self {
            white: share(counts[0]),
            cursed: share(counts[1]),
            draws: share(counts[2]),
            blessed: share(counts[3]),
            black: share(counts[4]),
        })
    }

    pub fn total(&self) -> u64 {
        self.white.count + self.cursed.count + self.draws.count + self.blessed.count + self.black.count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongestExample {
    pub label: String,
    pub fen: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HistogramEntry {
    Ply {
        ply: usize,
        num: u64,
        width: f64,
        active: bool,
    },
    Empty {
        empty: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsView {
    pub material_side: String,
    pub material_other: String,
    #[serde(flatten)]
    pub outcomes: Outcomes,
    pub longest: Vec<LongestExample>,
    pub verb: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Vec<HistogramEntry>>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Builds the stats view for `material` as seen from the query position.
///
/// The table is looked up under the given name first. When only the
/// normalized name is present, white and black are swapped. Returns `None`
/// when there is no entry or no counted position at all.
pub fn prepare_stats(
    table: &StatsTable,
    material: &str,
    fen: &str,
    active: Option<ActiveDtz>,
) -> Option<StatsView> {
    let (stats, white) = match table.get(material) {
        Some(stats) => (stats, true),
        None => {
            let key: MaterialKey = material.parse().ok()?;
            (table.get(&key.normalize().key.to_string())?, false)
        }
    };
    let (material_side, material_other) = material.split_once('v')?;

    let side = stats.histogram.side(white);
    let other = stats.histogram.side(!white);
    let outcomes = Outcomes::combine(&side.wdl, &other.wdl)?;

    let side_marker = if white { " w" } else { " b" };
    let longest = longest_examples(stats, material_side, side_marker);

    let side_winning = fen.contains(" w") == active.is_some_and(|a| a.dtz > 0);

    Some(StatsView {
        material_side: material_side.to_string(),
        material_other: material_other.to_string(),
        outcomes,
        longest,
        verb: if side_winning { "winning" } else { "losing" },
        histogram: histogram(side, other, side_winning, active),
    })
}

fn longest_examples(stats: &EndgameStats, material_side: &str, side_marker: &str) -> Vec<LongestExample> {
    stats
        .longest
        .iter()
        .map(|entry| {
            let winning = (entry.wdl > 0) == entry.epd.contains(side_marker);
            LongestExample {
                label: format!(
                    "{} {} with DTZ {}{}",
                    material_side,
                    if winning { "winning" } else { "losing" },
                    entry.ply,
                    if entry.wdl.abs() == 1 { " (frustrated)" } else { "" },
                ),
                fen: format!("{} 0 1", entry.epd),
            }
        })
        .collect()
}

fn merge(a: &[u64], b: &[u64]) -> Vec<u64> {
    (0..a.len().max(b.len()))
        .map(|i| a.get(i).copied().unwrap_or(0) + b.get(i).copied().unwrap_or(0))
        .collect()
}

fn histogram(
    side: &SideHistogram,
    other: &SideHistogram,
    side_winning: bool,
    active: Option<ActiveDtz>,
) -> Option<Vec<HistogramEntry>> {
    let merged = if side_winning {
        merge(&side.win, &other.loss)
    } else {
        merge(&side.loss, &other.win)
    };
    compress(&merged, active)
}

/// Log-scaled bars with long zero runs collapsed. Trailing zeros are
/// dropped. `None` when every count is zero.
fn compress(counts: &[u64], active: Option<ActiveDtz>) -> Option<Vec<HistogramEntry>> {
    let max_log = counts
        .iter()
        .filter(|&&num| num > 0)
        .map(|&num| (num as f64).ln())
        .reduce(f64::max)?;

    let is_active = |ply: usize| active.is_some_and(|a| a.marks(ply));
    let width = |num: u64| {
        if max_log > 0.0 {
            round1((num as f64).ln() * 100.0 / max_log)
        } else {
            100.0
        }
    };

    let mut entries = Vec::new();
    let mut empty = 0;
    for (ply, &num) in counts.iter().enumerate() {
        if num == 0 {
            empty += 1;
            continue;
        }

        if empty > MAX_ZERO_RUN {
            entries.push(HistogramEntry::Empty { empty });
        } else {
            for zero_ply in ply - empty..ply {
                entries.push(HistogramEntry::Ply {
                    ply: zero_ply,
                    num: 0,
                    width: 0.0,
                    active: is_active(zero_ply),
                });
            }
        }
        empty = 0;

        entries.push(HistogramEntry::Ply {
            ply,
            num,
            width: width(num),
            active: is_active(ply),
        });
    }

    Some(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS: &str = r#"{
        "KRvK": {
            "histogram": {
                "white": {"win": [0, 1, 0, 4], "loss": [], "wdl": {"2": 300, "0": 20}},
                "black": {"win": [], "loss": [0, 0, 6, 0, 2, 0, 0], "wdl": {"-2": 150, "0": 30}}
            },
            "longest": [
                {"epd": "8/8/8/8/8/8/1k6/KR6 w - -", "ply": 31, "wdl": 2},
                {"epd": "8/8/8/8/8/8/k7/1R5K b - -", "ply": 32, "wdl": -2}
            ]
        },
        "KBvKN": {
            "histogram": {
                "white": {"win": [], "loss": [], "wdl": {"1": 2, "0": 8}},
                "black": {"win": [], "loss": [], "wdl": {"-1": 3, "0": 7}}
            },
            "longest": [
                {"epd": "8/8/8/8/8/1n6/k7/1B5K w - -", "ply": 200, "wdl": 1}
            ]
        },
        "KQvKQ": {
            "histogram": {
                "white": {"win": [], "loss": [], "wdl": {}},
                "black": {"win": [], "loss": [], "wdl": {}}
            },
            "longest": []
        }
    }"#;

    fn table() -> StatsTable {
        StatsTable::from_json(STATS).unwrap()
    }

    fn plies(entries: &[HistogramEntry]) -> Vec<String> {
        entries
            .iter()
            .map(|entry| match entry {
                HistogramEntry::Ply { ply, num, .. } => format!("{}:{}", ply, num),
                HistogramEntry::Empty { empty } => format!("empty {}", empty),
            })
            .collect()
    }

    #[test]
    fn test_absent_material_and_zero_total() {
        assert!(prepare_stats(&table(), "KPvK", "8/8/8/8/8/8/8/8 w - - 0 1", None).is_none());
        assert!(prepare_stats(&table(), "KQvKQ", "8/8/8/8/8/8/8/8 w - - 0 1", None).is_none());
        assert!(prepare_stats(&table(), "garbage", "8/8/8/8/8/8/8/8 w - - 0 1", None).is_none());
    }

    #[test]
    fn test_outcomes_and_percentages() {
        let view = prepare_stats(&table(), "KRvK", "8/8/8/8/8/8/1k6/KR6 w - - 0 1", Some(ActiveDtz::exact(3))).unwrap();
        assert_eq!(view.outcomes.white.count, 450);
        assert_eq!(view.outcomes.draws.count, 50);
        assert_eq!(view.outcomes.black.count, 0);
        assert_eq!(view.outcomes.total(), 500);
        assert_eq!(view.outcomes.white.pct, 90.0);
        assert_eq!(view.outcomes.draws.pct, 10.0);
        assert_eq!(view.material_side, "KR");
        assert_eq!(view.material_other, "K");
    }

    #[test]
    fn test_mirrored_lookup_swaps_sides() {
        let view = prepare_stats(&table(), "KvKR", "8/8/8/8/8/8/1K6/kr6 b - - 0 1", Some(ActiveDtz::exact(3))).unwrap();
        assert_eq!(view.material_side, "K");
        assert_eq!(view.outcomes.white.count, 0);
        assert_eq!(view.outcomes.black.count, 450);
        assert_eq!(view.longest[0].label, "K losing with DTZ 31");
        assert_eq!(view.longest[1].label, "K losing with DTZ 32");
    }

    #[test]
    fn test_longest_labels() {
        let view = prepare_stats(&table(), "KRvK", "8/8/8/8/8/8/1k6/KR6 w - - 0 1", None).unwrap();
        assert_eq!(view.longest[0].label, "KR winning with DTZ 31");
        assert_eq!(view.longest[0].fen, "8/8/8/8/8/8/1k6/KR6 w - - 0 1");
        assert_eq!(view.longest[1].label, "KR winning with DTZ 32");

        let view = prepare_stats(&table(), "KBvKN", "8/8/8/8/8/1n6/k7/1B5K w - - 0 1", None).unwrap();
        assert_eq!(view.longest[0].label, "KB winning with DTZ 200 (frustrated)");
        assert_eq!(view.outcomes.cursed.count, 5);
        assert_eq!(view.outcomes.cursed.pct, 25.0);
        assert!(view.histogram.is_none());
    }

    #[test]
    fn test_histogram_merge_and_active_marker() {
        let view = prepare_stats(&table(), "KRvK", "8/8/8/8/8/8/1k6/KR6 w - - 0 1", Some(ActiveDtz::exact(3))).unwrap();
        assert_eq!(view.verb, "winning");
        let histogram = view.histogram.unwrap();
        assert_eq!(plies(&histogram), vec!["0:0", "1:1", "2:6", "3:4", "4:2"]);

        let active: Vec<bool> = histogram
            .iter()
            .map(|entry| matches!(entry, HistogramEntry::Ply { active: true, .. }))
            .collect();
        assert_eq!(active, vec![false, false, false, true, false]);

        match &histogram[2] {
            HistogramEntry::Ply { width, .. } => assert_eq!(*width, 100.0),
            other => panic!("unexpected entry {:?}", other),
        }
        match &histogram[1] {
            HistogramEntry::Ply { width, .. } => assert_eq!(*width, 0.0),
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn test_rounded_active_marks_next_ply() {
        let counts = [0, 0, 5, 5, 5];
        let rounded = ActiveDtz { dtz: -2, rounded: true };
        let entries = compress(&counts, Some(rounded)).unwrap();
        let active: Vec<bool> = entries
            .iter()
            .map(|entry| matches!(entry, HistogramEntry::Ply { active: true, .. }))
            .collect();
        assert_eq!(active, vec![false, false, true, true, false]);

        let zero = ActiveDtz { dtz: 0, rounded: true };
        let entries = compress(&counts, Some(zero)).unwrap();
        assert!(matches!(entries[0], HistogramEntry::Ply { active: true, .. }));
        assert!(matches!(entries[1], HistogramEntry::Ply { active: false, .. }));
    }

    #[test]
    fn test_verb_follows_side_to_move_and_dtz_sign() {
        let view = prepare_stats(&table(), "KRvK", "8/8/8/8/8/8/1k6/KR6 b - - 0 1", Some(ActiveDtz::exact(4))).unwrap();
        assert_eq!(view.verb, "losing");
        assert!(view.histogram.is_none());

        let view = prepare_stats(&table(), "KRvK", "8/8/8/8/8/8/1k6/KR6 b - - 0 1", Some(ActiveDtz::exact(-4))).unwrap();
        assert_eq!(view.verb, "winning");
        assert!(view.histogram.is_some());

        let view = prepare_stats(&table(), "KRvK", "8/8/8/8/8/8/1k6/KR6 w - - 0 1", None).unwrap();
        assert_eq!(view.verb, "losing");
    }

    #[test]
    fn test_six_zero_run_collapses() {
        let counts = [3, 0, 0, 0, 0, 0, 0, 9];
        let entries = compress(&counts, None).unwrap();
        assert_eq!(plies(&entries), vec!["0:3", "empty 6", "7:9"]);
    }

    #[test]
    fn test_five_zero_run_is_kept() {
        let counts = [3, 0, 0, 0, 0, 0, 9, 0, 0];
        let entries = compress(&counts, None).unwrap();
        assert_eq!(plies(&entries), vec!["0:3", "1:0", "2:0", "3:0", "4:0", "5:0", "6:9"]);
        assert!(entries[1..6]
            .iter()
            .all(|entry| matches!(entry, HistogramEntry::Ply { num: 0, width, .. } if *width == 0.0)));
    }

    #[test]
    fn test_all_zero_histogram_and_single_counts() {
        assert!(compress(&[0, 0, 0], None).is_none());
        assert!(compress(&[], None).is_none());

        let entries = compress(&[0, 1, 1], None).unwrap();
        assert!(matches!(entries[1], HistogramEntry::Ply { width, .. } if width == 100.0));
    }

    #[test]
    fn test_view_serializes_flat_outcomes() {
        let view = prepare_stats(&table(), "KRvK", "8/8/8/8/8/8/1k6/KR6 w - - 0 1", Some(ActiveDtz::exact(3))).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["white"]["count"], 450);
        assert_eq!(json["histogram"][0]["ply"], 0);
        assert!(json.get("outcomes").is_none());
    }
}
