//! Grouping of moves by outcome and the order within each group

use std::cmp::Ordering;

use serde::Serialize;

use crate::probe::{MoveCandidate, Wdl};

/// Outcome group of a move, from the mover's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Winning,
    Cursed,
    Drawing,
    Blessed,
    Losing,
    Unknown,
}

impl Bucket {
    pub const ALL: [Bucket; 6] = [
        Bucket::Winning,
        Bucket::Cursed,
        Bucket::Drawing,
        Bucket::Blessed,
        Bucket::Losing,
        Bucket::Unknown,
    ];

    pub fn of(wdl: Option<Wdl>) -> Bucket {
        match wdl {
            Some(Wdl::Win) => Bucket::Winning,
            Some(Wdl::CursedWin) => Bucket::Cursed,
            Some(Wdl::Draw) => Bucket::Drawing,
            Some(Wdl::BlessedLoss) => Bucket::Blessed,
            Some(Wdl::Loss) => Bucket::Losing,
            None => Bucket::Unknown,
        }
    }

    /// Total order of moves inside this bucket, most significant key first.
    pub fn compare(self, a: &MoveCandidate, b: &MoveCandidate) -> Ordering {
        let keys = match self {
            Bucket::Winning => flag_desc(a.checkmate(), b.checkmate())
                .then(flag_desc(a.capture, b.capture))
                .then(flag_desc(a.zeroing(), b.zeroing()))
                .then(unset_first_desc(a.dtz(), b.dtz()))
                .then(unset_last_asc(a.dtm(), b.dtm())),
            Bucket::Cursed => flag_desc(a.capture, b.capture)
                .then(flag_desc(a.zeroing(), b.zeroing()))
                .then(unset_first_desc(a.dtz(), b.dtz()))
                .then(unset_last_asc(a.dtm(), b.dtm())),
            Bucket::Drawing => flag_desc(a.stalemate(), b.stalemate())
                .then(flag_desc(a.insufficient_material(), b.insufficient_material()))
                .then(flag_desc(a.capture, b.capture))
                .then(flag_desc(a.zeroing(), b.zeroing())),
            Bucket::Blessed | Bucket::Losing => a.capture.cmp(&b.capture)
                .then(a.zeroing().cmp(&b.zeroing()))
                .then(unset_first_desc(a.dtz(), b.dtz()))
                .then(set_first_desc(a.dtm(), b.dtm())),
            Bucket::Unknown => flag_desc(a.capture, b.capture)
                .then(flag_desc(a.zeroing(), b.zeroing())),
        };
        keys.then_with(|| a.uci.cmp(&b.uci))
    }
}

fn flag_desc(a: bool, b: bool) -> Ordering {
    b.cmp(&a)
}

/// Missing values first, then larger values first.
fn unset_first_desc(a: Option<i32>, b: Option<i32>) -> Ordering {
    let key = |v: Option<i32>| (v.is_none(), v.unwrap_or(0));
    key(b).cmp(&key(a))
}

/// Smaller values first, missing values last.
fn unset_last_asc(a: Option<i32>, b: Option<i32>) -> Ordering {
    let key = |v: Option<i32>| (v.is_none(), v.unwrap_or(0));
    key(a).cmp(&key(b))
}

/// Larger values first, missing values last.
fn set_first_desc(a: Option<i32>, b: Option<i32>) -> Ordering {
    let key = |v: Option<i32>| (v.is_some(), v.unwrap_or(0));
    key(b).cmp(&key(a))
}

/// The six ordered move lists shown for a position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankedMoves {
    pub winning: Vec<MoveCandidate>,
    pub cursed: Vec<MoveCandidate>,
    pub drawing: Vec<MoveCandidate>,
    pub blessed: Vec<MoveCandidate>,
    pub losing: Vec<MoveCandidate>,
    pub unknown: Vec<MoveCandidate>,
}

impl RankedMoves {
    pub fn bucket(&self, bucket: Bucket) -> &[MoveCandidate] {
        match bucket {
            Bucket::Winning => &self.winning,
            Bucket::Cursed => &self.cursed,
            Bucket::Drawing => &self.drawing,
            Bucket::Blessed => &self.blessed,
            Bucket::Losing => &self.losing,
            Bucket::Unknown => &self.unknown,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<MoveCandidate> {
        match bucket {
            Bucket::Winning => &mut self.winning,
            Bucket::Cursed => &mut self.cursed,
            Bucket::Drawing => &mut self.drawing,
            Bucket::Blessed => &mut self.blessed,
            Bucket::Losing => &mut self.losing,
            Bucket::Unknown => &mut self.unknown,
        }
    }

    pub fn len(&self) -> usize {
        Bucket::ALL.iter().map(|b| self.bucket(*b).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partitions candidates by wdl and orders every partition.
pub fn rank_moves(candidates: Vec<MoveCandidate>) -> RankedMoves {
    let mut ranked = RankedMoves::default();
    for candidate in candidates {
        ranked.bucket_mut(Bucket::of(candidate.wdl)).push(candidate);
    }
    for bucket in Bucket::ALL {
        ranked.bucket_mut(bucket).sort_by(|a, b| bucket.compare(a, b));
    }
    ranked
}
