//! Tablebase probe data types

use serde::{Deserialize, Serialize};

/// Outcome category reported by the probe backend.
///
/// Unknown strings are kept in [`Category::Unrecognized`] so newer backends
/// cannot break ranking; they classify like [`Category::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Win,
    MaybeWin,
    SyzygyWin,
    CursedWin,
    Draw,
    BlessedLoss,
    MaybeLoss,
    SyzygyLoss,
    Loss,
    Unknown,
    Unrecognized(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Win => "win",
            Category::MaybeWin => "maybe-win",
            Category::SyzygyWin => "syzygy-win",
            Category::CursedWin => "cursed-win",
            Category::Draw => "draw",
            Category::BlessedLoss => "blessed-loss",
            Category::MaybeLoss => "maybe-loss",
            Category::SyzygyLoss => "syzygy-loss",
            Category::Loss => "loss",
            Category::Unknown => "unknown",
            Category::Unrecognized(raw) => raw,
        }
    }

    /// The same outcome seen from the other side.
    pub fn flipped(&self) -> Category {
        match self {
            Category::Win => Category::Loss,
            Category::MaybeWin => Category::MaybeLoss,
            Category::SyzygyWin => Category::SyzygyLoss,
            Category::CursedWin => Category::BlessedLoss,
            Category::Draw => Category::Draw,
            Category::BlessedLoss => Category::CursedWin,
            Category::MaybeLoss => Category::MaybeWin,
            Category::SyzygyLoss => Category::SyzygyWin,
            Category::Loss => Category::Win,
            Category::Unknown => Category::Unknown,
            Category::Unrecognized(raw) => Category::Unrecognized(raw.clone()),
        }
    }

    pub fn wdl(&self) -> Option<Wdl> {
        match self {
            Category::Win | Category::MaybeWin | Category::SyzygyWin => Some(Wdl::Win),
            Category::CursedWin => Some(Wdl::CursedWin),
            Category::Draw => Some(Wdl::Draw),
            Category::BlessedLoss => Some(Wdl::BlessedLoss),
            Category::Loss | Category::MaybeLoss | Category::SyzygyLoss => Some(Wdl::Loss),
            Category::Unknown | Category::Unrecognized(_) => None,
        }
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "win" => Category::Win,
            "maybe-win" => Category::MaybeWin,
            "syzygy-win" => Category::SyzygyWin,
            "cursed-win" => Category::CursedWin,
            "draw" => Category::Draw,
            "blessed-loss" => Category::BlessedLoss,
            "maybe-loss" => Category::MaybeLoss,
            "syzygy-loss" => Category::SyzygyLoss,
            "loss" => Category::Loss,
            "unknown" => Category::Unknown,
            _ => Category::Unrecognized(raw),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

/// Signed win/draw/loss value, positive when good for the side it is
/// reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Wdl {
    Loss = -2,
    BlessedLoss = -1,
    Draw = 0,
    CursedWin = 1,
    Win = 2,
}

impl Wdl {
    pub fn value(self) -> i8 {
        self as i8
    }

    /// Decided by the 50-move rule rather than by the material.
    pub fn is_frustrated(self) -> bool {
        matches!(self, Wdl::CursedWin | Wdl::BlessedLoss)
    }
}

impl From<Wdl> for i8 {
    fn from(wdl: Wdl) -> Self {
        wdl.value()
    }
}

impl TryFrom<i8> for Wdl {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -2 => Ok(Wdl::Loss),
            -1 => Ok(Wdl::BlessedLoss),
            0 => Ok(Wdl::Draw),
            1 => Ok(Wdl::CursedWin),
            2 => Ok(Wdl::Win),
            _ => Err(format!("wdl out of range: {}", value)),
        }
    }
}

/// Per-move outcome as reported by the probe backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub category: Category,
    #[serde(default)]
    pub dtz: Option<i32>,
    #[serde(default)]
    pub precise_dtz: Option<i32>,
    #[serde(default)]
    pub dtm: Option<i32>,
    #[serde(default)]
    pub zeroing: bool,
    #[serde(default)]
    pub checkmate: bool,
    #[serde(default)]
    pub stalemate: bool,
    #[serde(default)]
    pub insufficient_material: bool,
}

impl ProbeOutcome {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            dtz: None,
            precise_dtz: None,
            dtm: None,
            zeroing: false,
            checkmate: false,
            stalemate: false,
            insufficient_material: false,
        }
    }

    pub fn dtz(mut self, dtz: i32) -> Self {
        self.dtz = Some(dtz);
        self
    }

    pub fn dtm(mut self, dtm: i32) -> Self {
        self.dtm = Some(dtm);
        self
    }

    pub fn zeroing(mut self) -> Self {
        self.zeroing = true;
        self
    }

    pub fn checkmate(mut self) -> Self {
        self.checkmate = true;
        self
    }

    pub fn stalemate(mut self) -> Self {
        self.stalemate = true;
        self
    }

    pub fn insufficient_material(mut self) -> Self {
        self.insufficient_material = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeMove {
    pub uci: String,
    pub san: String,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
}

/// Full probe response for one position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResponse {
    pub category: Category,
    #[serde(default)]
    pub dtz: Option<i32>,
    #[serde(default)]
    pub precise_dtz: Option<i32>,
    #[serde(default)]
    pub dtm: Option<i32>,
    #[serde(default)]
    pub moves: Vec<ProbeMove>,
}

impl ProbeResponse {
    /// Root wdl from the side to move's point of view.
    pub fn wdl(&self) -> Option<Wdl> {
        self.category.wdl()
    }

    /// The reported dtz may be off by one.
    pub fn maybe_rounded(&self) -> bool {
        self.dtz.is_some() && self.precise_dtz != self.dtz
    }
}
