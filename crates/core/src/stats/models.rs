//! Precomputed per-material statistics

use serde::{Deserialize, Serialize};

/// Position counts by signed wdl, for one side to move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WdlCounts {
    #[serde(rename = "2", default)]
    pub win: u64,
    #[serde(rename = "1", default)]
    pub cursed_win: u64,
    #[serde(rename = "0", default)]
    pub draw: u64,
    #[serde(rename = "-1", default)]
    pub blessed_loss: u64,
    #[serde(rename = "-2", default)]
    pub loss: u64,
}

impl WdlCounts {
    pub fn total(&self) -> u64 {
        self.win + self.cursed_win + self.draw + self.blessed_loss + self.loss
    }
}

/// Counts of positions won or lost in exactly `ply` plies, indexed by ply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideHistogram {
    #[serde(default)]
    pub win: Vec<u64>,
    #[serde(default)]
    pub loss: Vec<u64>,
    #[serde(default)]
    pub wdl: WdlCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histograms {
    #[serde(default)]
    pub white: SideHistogram,
    #[serde(default)]
    pub black: SideHistogram,
}

impl Histograms {
    pub fn side(&self, white: bool) -> &SideHistogram {
        if white {
            &self.white
        } else {
            &self.black
        }
    }
}

/// One of the longest endgames of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongEndgame {
    pub epd: String,
    pub ply: u32,
    pub wdl: i8,
}

/// File checksums and sizes of one table file, kept as published.
pub type TableFileStats = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndgameStats {
    #[serde(default)]
    pub histogram: Histograms,
    #[serde(default)]
    pub longest: Vec<LongEndgame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtbw: Option<TableFileStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtbz: Option<TableFileStats>,
}

impl EndgameStats {
    /// The longest entry by ply, first one on ties.
    pub fn longest_entry(&self) -> Option<&LongEndgame> {
        self.longest
            .iter()
            .reduce(|best, entry| if entry.ply > best.ply { entry } else { best })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endgame_stats() {
        let json = r#"{
            "histogram": {
                "white": {"win": [0, 3, 1], "loss": [], "wdl": {"2": 4, "1": 0, "0": 10, "-1": 0, "-2": 0}},
                "black": {"win": [], "loss": [0, 0, 5], "wdl": {"-2": 5, "0": 9}}
            },
            "longest": [
                {"epd": "8/8/8/8/8/8/1k6/KR6 w - -", "ply": 31, "wdl": 2},
                {"epd": "8/8/8/8/8/8/1k6/KR6 b - -", "ply": 32, "wdl": -2}
            ],
            "rtbw": {"bytes": 1024, "md5": "abc"}
        }"#;
        let stats: EndgameStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.histogram.white.wdl.win, 4);
        assert_eq!(stats.histogram.black.wdl.loss, 5);
        assert_eq!(stats.histogram.black.wdl.cursed_win, 0);
        assert_eq!(stats.histogram.white.wdl.total(), 14);
        assert_eq!(stats.longest_entry().unwrap().ply, 32);
        assert!(stats.rtbz.is_none());
        assert_eq!(stats.rtbw.unwrap()["bytes"], 1024);
    }

    #[test]
    fn test_missing_sections_default() {
        let stats: EndgameStats = serde_json::from_str("{}").unwrap();
        assert!(stats.longest_entry().is_none());
        assert_eq!(stats.histogram.side(true).wdl.total(), 0);
    }
}
