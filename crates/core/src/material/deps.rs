//! Dependency relation between material keys
//!
//! Probing an endgame requires the tables of every endgame reachable by a
//! single capture or promotion.

use std::collections::HashSet;

use super::key::{cmp_listing, MaterialKey, MaterialSide, KING, MAX_TABLE_PIECES, PAWN};

/// Promotion targets, by piece index.
const PROMOTIONS: [usize; 4] = [1, 2, 3, 4];

/// Immediate lower-material endgames of `key`, normalized and in listing
/// order.
///
/// Covers captures of any non-king piece, pawn promotions, and promotions
/// that capture an enemy piece on the way.
pub fn dependencies(key: &MaterialKey) -> Vec<MaterialKey> {
    let mut produced = HashSet::new();

    for (mover, victim, swap) in [(key.own, key.other, false), (key.other, key.own, true)] {
        let emit = |mover: MaterialSide, victim: MaterialSide, produced: &mut HashSet<MaterialKey>| {
            let key = if swap {
                MaterialKey::new(victim, mover)
            } else {
                MaterialKey::new(mover, victim)
            };
            produced.insert(key.normalize().key);
        };

        // Captures by `mover` remove a piece of `victim`.
        for idx in KING + 1..=PAWN {
            if let Some(victim) = victim.without(idx) {
                emit(mover, victim, &mut produced);
            }
        }

        let Some(pawnless) = mover.without(PAWN) else {
            continue;
        };
        for promoted in PROMOTIONS {
            let mover = pawnless.with(promoted);
            emit(mover, victim, &mut produced);
            for idx in KING + 1..PAWN {
                if let Some(victim) = victim.without(idx) {
                    emit(mover, victim, &mut produced);
                }
            }
        }
    }

    let mut deps: Vec<MaterialKey> = produced.into_iter().collect();
    deps.sort_by(cmp_listing);
    deps
}

/// Every key reachable from `roots` through one or more dependency edges,
/// in listing order. Roots only appear if another root depends on them.
pub fn all_dependencies(roots: &[MaterialKey]) -> Vec<MaterialKey> {
    let mut closed: HashSet<MaterialKey> = HashSet::new();
    let mut open: Vec<MaterialKey> = roots.iter().flat_map(dependencies).collect();

    while let Some(key) = open.pop() {
        if !closed.insert(key) {
            continue;
        }
        open.extend(dependencies(&key));
    }

    let mut result: Vec<MaterialKey> = closed.into_iter().collect();
    result.sort_by(cmp_listing);
    result
}

/// Roots together with their dependency closure, deduplicated, normalized
/// and in listing order. `KvK` is left out.
pub fn with_dependencies(roots: &[MaterialKey]) -> Vec<MaterialKey> {
    let mut seen: HashSet<MaterialKey> = roots.iter().map(|r| r.normalize().key).collect();
    seen.extend(all_dependencies(roots));
    seen.remove(&MaterialKey::bare_kings());

    let mut result: Vec<MaterialKey> = seen.into_iter().collect();
    result.sort_by(cmp_listing);
    result
}

/// All normalized tables with up to `piece_count` pieces, kings included.
pub fn all_tables(piece_count: usize) -> Vec<MaterialKey> {
    let piece_count = piece_count.min(MAX_TABLE_PIECES);
    if piece_count < 3 {
        return Vec::new();
    }

    // Every table is reachable from an all-pawn endgame of the same size.
    let mut roots = Vec::new();
    let mut own_pawns = piece_count - 2;
    let mut other_pawns = 0;
    while own_pawns >= other_pawns {
        roots.push(MaterialKey::new(pawns(own_pawns), pawns(other_pawns)));
        if own_pawns == 0 {
            break;
        }
        own_pawns -= 1;
        other_pawns += 1;
    }

    with_dependencies(&roots)
}

fn pawns(count: usize) -> MaterialSide {
    (0..count).fold(MaterialSide::default().with(KING), |side, _| side.with(PAWN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> MaterialKey {
        s.parse().unwrap()
    }

    fn names(keys: &[MaterialKey]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_rook_endgame_depends_on_bare_kings() {
        assert_eq!(names(&dependencies(&key("KRvK"))), vec!["KvK"]);
        assert_eq!(names(&dependencies(&key("KvKR"))), vec!["KvK"]);
    }

    #[test]
    fn test_bare_kings_have_no_dependencies() {
        assert!(dependencies(&MaterialKey::bare_kings()).is_empty());
    }

    #[test]
    fn test_pawn_promotions() {
        assert_eq!(
            names(&dependencies(&key("KPvK"))),
            vec!["KvK", "KQvK", "KRvK", "KBvK", "KNvK"]
        );
    }

    #[test]
    fn test_promotion_with_capture() {
        let deps = names(&dependencies(&key("KPvKR")));
        // Plain captures.
        assert!(deps.contains(&"KRvK".to_string()));
        assert!(deps.contains(&"KPvK".to_string()));
        // Promotions.
        assert!(deps.contains(&"KQvKR".to_string()));
        assert!(deps.contains(&"KRvKR".to_string()));
        // Promotion capturing the rook.
        assert!(deps.contains(&"KQvK".to_string()));
        assert!(deps.contains(&"KNvK".to_string()));
        assert!(!deps.contains(&"KPvKR".to_string()));
    }

    #[test]
    fn test_all_dependencies_closure() {
        let deps = names(&all_dependencies(&[key("KPvK")]));
        for expected in ["KQvK", "KRvK", "KBvK", "KNvK", "KvK"] {
            assert!(deps.contains(&expected.to_string()), "missing {}", expected);
        }
        assert!(!deps.contains(&"KPvK".to_string()));
    }

    #[test]
    fn test_all_dependencies_terminates_and_deduplicates() {
        let deps = all_dependencies(&[key("KQRvKR"), key("KRvKQR")]);
        let unique: HashSet<_> = deps.iter().collect();
        assert_eq!(unique.len(), deps.len());
        assert!(deps.contains(&MaterialKey::bare_kings()));
    }

    #[test]
    fn test_all_tables() {
        assert_eq!(
            names(&all_tables(3)),
            vec!["KQvK", "KRvK", "KBvK", "KNvK", "KPvK"]
        );
        let four = all_tables(4);
        assert!(four.contains(&key("KBNvK")));
        assert!(four.contains(&key("KQvKR")));
        assert!(four.iter().all(|k| k.is_normalized() && k.is_table()));
    }
}
