//! Material keys such as `KRvK`

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use shakmaty::{Board, Color, Role};

use crate::error::{Error, Result};

/// Piece letters, strongest first.
pub const PIECE_CHARS: [char; 6] = ['K', 'Q', 'R', 'B', 'N', 'P'];

/// Upper bound on non-king pieces accepted by [`is_valid`].
pub const MAX_NON_KING_PIECES: usize = 7;

/// Two kings, the separator and at most [`MAX_NON_KING_PIECES`] pieces.
const MAX_KEY_LEN: usize = MAX_NON_KING_PIECES + 3;

/// Largest endgame (kings included) that has Syzygy tables.
pub const MAX_TABLE_PIECES: usize = 7;

static KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^KQ*R*B*N*P*vKQ*R*B*N*P*$").expect("material key regex"));

pub(crate) const KING: usize = 0;
pub(crate) const PAWN: usize = 5;

pub(crate) fn role_index(role: Role) -> usize {
    match role {
        Role::King => 0,
        Role::Queen => 1,
        Role::Rook => 2,
        Role::Bishop => 3,
        Role::Knight => 4,
        Role::Pawn => 5,
    }
}

/// Piece counts for one side, indexed like [`PIECE_CHARS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialSide {
    counts: [u8; 6],
}

impl MaterialSide {
    fn from_letters(letters: &str) -> Option<Self> {
        let mut counts = [0u8; 6];
        for c in letters.chars() {
            let idx = PIECE_CHARS.iter().position(|p| *p == c)?;
            counts[idx] = counts[idx].checked_add(1)?;
        }
        Some(Self { counts })
    }

    /// Number of pieces on this side, king included.
    pub fn len(&self) -> usize {
        self.counts.iter().map(|c| *c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, idx: usize) -> u8 {
        self.counts[idx]
    }

    pub fn non_king_count(&self) -> usize {
        self.len() - self.counts[KING] as usize
    }

    pub fn pawns(&self) -> usize {
        self.counts[PAWN] as usize
    }

    /// Piece indices in listing order, e.g. `KRP` -> `[0, 2, 5]`.
    ///
    /// Comparing these lexicographically ranks the stronger side first.
    pub fn profile(&self) -> Vec<usize> {
        let mut profile = Vec::with_capacity(self.len());
        for (idx, count) in self.counts.iter().enumerate() {
            profile.extend(std::iter::repeat(idx).take(*count as usize));
        }
        profile
    }

    pub(crate) fn without(&self, idx: usize) -> Option<Self> {
        if self.counts[idx] == 0 {
            return None;
        }
        let mut side = *self;
        side.counts[idx] -= 1;
        Some(side)
    }

    pub(crate) fn with(&self, idx: usize) -> Self {
        let mut side = *self;
        side.counts[idx] += 1;
        side
    }
}

impl fmt::Display for MaterialSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, c) in PIECE_CHARS.iter().enumerate() {
            for _ in 0..self.counts[idx] {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

/// Material signature of a position. `own` is listed before the `v`.
///
/// Keys parsed from strings always satisfy the grammar; keys computed from
/// a board may not (extra kings, too many pieces) and should be checked
/// with [`MaterialKey::is_valid`] before use as a table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MaterialKey {
    pub own: MaterialSide,
    pub other: MaterialSide,
}

/// Result of [`MaterialKey::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalized {
    pub key: MaterialKey,
    /// The sides were swapped to reach the canonical form.
    pub mirrored: bool,
}

impl MaterialKey {
    pub fn new(own: MaterialSide, other: MaterialSide) -> Self {
        Self { own, other }
    }

    /// `KvK`
    pub fn bare_kings() -> Self {
        let king = MaterialSide::default().with(KING);
        Self::new(king, king)
    }

    /// Material signature of a board, white first.
    pub fn calc_key(board: &Board) -> Self {
        let side = |color: Color| {
            let mut counts = [0u8; 6];
            for role in Role::ALL {
                counts[role_index(role)] = (board.by_color(color) & board.by_role(role)).count() as u8;
            }
            MaterialSide { counts }
        };
        Self::new(side(Color::White), side(Color::Black))
    }

    /// Canonical side ordering: the side with more pieces first, or on a
    /// tie the stronger side first. Piece counts are never altered.
    pub fn normalize(&self) -> Normalized {
        let keep = (self.own.len(), self.other.profile());
        let swap = (self.other.len(), self.own.profile());
        if keep < swap {
            Normalized { key: self.mirror(), mirrored: true }
        } else {
            Normalized { key: *self, mirrored: false }
        }
    }

    pub fn is_normalized(&self) -> bool {
        !self.normalize().mirrored
    }

    pub fn mirror(&self) -> Self {
        Self::new(self.other, self.own)
    }

    pub fn is_valid(&self) -> bool {
        self.own.count(KING) == 1
            && self.other.count(KING) == 1
            && self.own.non_king_count() + self.other.non_king_count() <= MAX_NON_KING_PIECES
    }

    /// A Syzygy table exists for this material (in either orientation).
    pub fn is_table(&self) -> bool {
        self.is_valid() && self.piece_count() <= MAX_TABLE_PIECES && *self != Self::bare_kings()
    }

    pub fn piece_count(&self) -> usize {
        self.own.len() + self.other.len()
    }

    pub fn pawn_count(&self) -> usize {
        self.own.pawns() + self.other.pawns()
    }

    pub fn has_pawns(&self) -> bool {
        self.pawn_count() > 0
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey {
            pieces: self.piece_count(),
            own_len: self.own.len(),
            own_profile: self.own.profile(),
            other_len: self.other.len(),
            other_profile: self.other.profile(),
        }
    }
}

/// Listing order for endgames: fewer pieces first, then the longer first
/// side, then stronger pieces first on each side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pieces: usize,
    own_len: usize,
    own_profile: Vec<usize>,
    other_len: usize,
    other_profile: Vec<usize>,
}

pub fn cmp_listing(a: &MaterialKey, b: &MaterialKey) -> Ordering {
    a.sort_key().cmp(&b.sort_key())
}

/// Grammar and piece-count check on a raw key string.
pub fn is_valid(key: &str) -> bool {
    key.parse::<MaterialKey>().is_ok()
}

impl FromStr for MaterialKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() > MAX_KEY_LEN || !KEY_REGEX.is_match(s) {
            return Err(Error::InvalidMaterial(s.to_string()));
        }
        let (own, other) = s
            .split_once('v')
            .ok_or_else(|| Error::InvalidMaterial(s.to_string()))?;
        let key = match (MaterialSide::from_letters(own), MaterialSide::from_letters(other)) {
            (Some(own), Some(other)) => MaterialKey::new(own, other),
            _ => return Err(Error::InvalidMaterial(s.to_string())),
        };
        if !key.is_valid() {
            return Err(Error::InvalidMaterial(s.to_string()));
        }
        Ok(key)
    }
}

impl TryFrom<String> for MaterialKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MaterialKey> for String {
    fn from(key: MaterialKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for MaterialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.own, self.other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;

    fn key(s: &str) -> MaterialKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(key("KRvK").to_string(), "KRvK");
        assert_eq!(key("KQRBNPvKP").to_string(), "KQRBNPvKP");
        assert_eq!(key("KvK").piece_count(), 2);
    }

    #[test]
    fn test_grammar_rejects() {
        for bad in ["", "KRK", "RKvK", "KRvKvK", "KPRvK", "krvk", "KvKK", "KKvK", "KRvR", "KQQQQQQQQvK"] {
            assert!(!is_valid(bad), "{} should be rejected", bad);
        }
        assert!(is_valid("KQQQQQQQvK"));
        assert!(is_valid("KQQQQQQvKP"));
    }

    #[test]
    fn test_oversized_keys_are_rejected_not_wrapped() {
        let long = format!("K{}vK", "Q".repeat(259));
        assert!(!is_valid(&long));
        assert!(long.parse::<MaterialKey>().is_err());
        assert!(!is_valid(&format!("KvK{}", "P".repeat(300))));
        assert!(MaterialSide::from_letters(&format!("K{}", "Q".repeat(256))).is_none());
    }

    #[test]
    fn test_normalize() {
        let n = key("KvKR").normalize();
        assert_eq!(n.key.to_string(), "KRvK");
        assert!(n.mirrored);

        let n = key("KRvKQ").normalize();
        assert_eq!(n.key.to_string(), "KQvKR");
        assert!(n.mirrored);

        let n = key("KPvKP").normalize();
        assert_eq!(n.key.to_string(), "KPvKP");
        assert!(!n.mirrored);
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in ["KvK", "KRvK", "KvKR", "KNNvKP", "KPvKNN", "KBvKN", "KNvKB", "KRPvKR", "KRvKRP"] {
            let once = key(s).normalize().key;
            let twice = once.normalize();
            assert_eq!(once, twice.key);
            assert!(!twice.mirrored);
        }
    }

    #[test]
    fn test_calc_key() {
        let board: Board = "6N1/5KR1/2n5/8/8/8/2n5/1k6".parse().unwrap();
        assert_eq!(MaterialKey::calc_key(&board).to_string(), "KRNvKNN");
    }

    #[test]
    fn test_is_table() {
        assert!(key("KRvK").is_table());
        assert!(key("KvKR").is_table());
        assert!(!key("KvK").is_table());
        assert!(!key("KQRBNPvKP").is_table());
    }

    #[test]
    fn test_sort_key_is_stable_across_input_order() {
        let expected: Vec<MaterialKey> =
            ["KQvK", "KRvK", "KBvK", "KNvK", "KPvK", "KQvKQ", "KQvKR", "KQvKP", "KPvKP", "KQQvK"]
                .iter()
                .map(|s| key(s))
                .collect();

        let mut rng = rand::rng();
        for _ in 0..10 {
            let mut shuffled = expected.clone();
            shuffled.shuffle(&mut rng);
            shuffled.sort_by(cmp_listing);
            assert_eq!(shuffled, expected);
        }
    }

    #[test]
    fn test_serde_round_trip_rejects_invalid() {
        let parsed: MaterialKey = serde_json::from_str("\"KBNvK\"").unwrap();
        assert_eq!(parsed.to_string(), "KBNvK");
        assert!(serde_json::from_str::<MaterialKey>("\"KBNK\"").is_err());
    }
}
