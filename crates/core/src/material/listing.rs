//! Plain-text listings derived from the dependency relation

use std::collections::HashSet;
use std::str::FromStr;

use super::deps::{dependencies, with_dependencies};
use super::key::MaterialKey;
use crate::error::{Error, Result};

/// Roots used when no material is requested.
pub const DEFAULT_ROOTS: &str = "KPPPPPvK,KPPPPvKP,KPPPvKPP";

const LICHESS_BASE: &str = "https://tablebase.lichess.ovh/tables/standard";
const SESSE_BASE: &str = "http://tablebase.sesse.net/syzygy";
const IPFS_UP_TO_6: &str = "QmNbKYpPyXFAHFMnAxoc2i28Jf7jhShM8EEnfWUMv6u2DQ";
const IPFS_7: &str = "QmVgcSADsoW5w19MkL2RNKNPGtaz7UhGhU62XRm6pQmzct";

/// Parses a comma separated list of normalized table names.
pub fn parse_roots(roots: &str) -> Result<Vec<MaterialKey>> {
    roots
        .split(',')
        .map(|root| {
            let key: MaterialKey = root.parse()?;
            if !key.is_table() || !key.is_normalized() {
                return Err(Error::InvalidMaterial(root.to_string()));
            }
            Ok(key)
        })
        .collect()
}

/// Longest table name, `KRBNvKQN`.
const MAX_TABLE_NAME_LEN: usize = 8;

/// Outcome of looking up a `{material}.json` stats file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsFile {
    /// Already normalized; serve the entry stored under this name.
    Table(String),
    /// Same material in the other orientation; the normalized file name.
    Redirect(String),
}

/// `None` for names that can never be a stats file.
pub fn resolve_stats_file(file: &str) -> Option<StatsFile> {
    let table = file.strip_suffix(".json")?;
    if table.len() > MAX_TABLE_NAME_LEN {
        return None;
    }
    let key: MaterialKey = table.parse().ok()?;
    let normalized = key.normalize().key.to_string();
    if normalized == table {
        Some(StatsFile::Table(normalized))
    } else {
        Some(StatsFile::Redirect(format!("{}.json", normalized)))
    }
}

/// Graphviz digraph of the dependency closure of `roots`.
pub fn graph_dot(roots: &[MaterialKey]) -> String {
    let mut closed: HashSet<MaterialKey> = HashSet::from([MaterialKey::bare_kings()]);
    let mut target: Vec<MaterialKey> = roots.to_vec();

    let mut lines = vec!["digraph Syzygy {".to_string()];
    while let Some(material) = target.pop() {
        if closed.contains(&material) {
            continue;
        }

        let deps = dependencies(&material);
        if deps.is_empty() && roots.contains(&material) {
            lines.push(format!("  {};", material));
        }
        for dep in &deps {
            lines.push(format!("  {} -> {};", material, dep));
        }
        target.extend(deps);

        closed.insert(material);
    }
    lines.push("}".to_string());
    lines.push(String::new());
    lines.join("\n")
}

/// Mirror serving the table files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Lichess,
    Sesse,
    Ipfs,
    /// Bare material keys.
    Stem,
    /// Bare file names.
    File,
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lichess" | "lichess.org" | "lichess.ovh" | "tablebase.lichess.ovh" => Ok(Source::Lichess),
            "sesse" | "sesse.net" | "tablebase.sesse.net" => Ok(Source::Sesse),
            "ipfs" | "ipfs.syzygy-tables.info" => Ok(Source::Ipfs),
            "stem" | "material" => Ok(Source::Stem),
            "file" | "filename" => Ok(Source::File),
            _ => Err(Error::InvalidRequest(format!("unknown source: {}", s))),
        }
    }
}

/// Which DTZ tables to list next to the WDL tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtzMode {
    All,
    /// DTZ tables only, no WDL.
    Only,
    /// DTZ only for the requested roots.
    Root,
    None,
}

impl FromStr for DtzMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(DtzMode::All),
            "only" => Ok(DtzMode::Only),
            "root" => Ok(DtzMode::Root),
            "none" => Ok(DtzMode::None),
            _ => Err(Error::InvalidRequest(format!("unknown dtz mode: {}", s))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadParams {
    pub source: Source,
    pub dtz: DtzMode,
    pub min_pieces: usize,
    pub max_pieces: usize,
}

impl Default for DownloadParams {
    fn default() -> Self {
        Self {
            source: Source::Lichess,
            dtz: DtzMode::All,
            min_pieces: 3,
            max_pieces: 7,
        }
    }
}

/// One line per table file needed to probe `roots`, newline terminated.
pub fn download_list(roots: &[MaterialKey], params: &DownloadParams) -> String {
    let mut result = Vec::new();

    for table in with_dependencies(roots) {
        let pieces = table.piece_count();
        if pieces > params.max_pieces || pieces < params.min_pieces {
            continue;
        }

        let include_dtz = match params.dtz {
            DtzMode::All | DtzMode::Only => true,
            DtzMode::Root => roots.contains(&table),
            DtzMode::None => false,
        };
        let include_wdl = params.dtz != DtzMode::Only;

        let name = table.to_string();
        let (wdl_dir, dtz_dir) = match params.source {
            Source::Stem => {
                result.push(name);
                continue;
            }
            Source::File => (String::new(), String::new()),
            Source::Ipfs => {
                let dir = format!("/ipfs/{}/", if pieces <= 5 { IPFS_UP_TO_6 } else { IPFS_7 });
                (dir.clone(), dir)
            }
            Source::Lichess => match pieces {
                0..=5 => (format!("{}/3-4-5/", LICHESS_BASE), format!("{}/3-4-5/", LICHESS_BASE)),
                6 => (format!("{}/6-wdl/", LICHESS_BASE), format!("{}/6-dtz/", LICHESS_BASE)),
                _ => {
                    let suffix = if table.has_pawns() { "pawnful" } else { "pawnless" };
                    let dir = format!(
                        "{}/7/{}v{}_{}/",
                        LICHESS_BASE,
                        table.own.len(),
                        table.other.len(),
                        suffix
                    );
                    (dir.clone(), dir)
                }
            },
            Source::Sesse => match pieces {
                0..=5 => (format!("{}/3-4-5/", SESSE_BASE), format!("{}/3-4-5/", SESSE_BASE)),
                6 => (format!("{}/6-WDL/", SESSE_BASE), format!("{}/6-DTZ/", SESSE_BASE)),
                _ => (format!("{}/7-WDL/", SESSE_BASE), format!("{}/7-DTZ/", SESSE_BASE)),
            },
        };

        if include_wdl {
            result.push(format!("{}{}.rtbw", wdl_dir, name));
        }
        if include_dtz {
            result.push(format!("{}{}.rtbz", dtz_dir, name));
        }
    }

    result.push(String::new());
    result.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roots() {
        let roots = parse_roots("KRvK,KPvKP").unwrap();
        assert_eq!(roots.len(), 2);
        assert!(parse_roots("KvKR").is_err());
        assert!(parse_roots("KvK").is_err());
        assert!(parse_roots("KRvK,junk").is_err());
        assert_eq!(parse_roots(DEFAULT_ROOTS).unwrap().len(), 3);
    }

    #[test]
    fn test_resolve_stats_file() {
        assert_eq!(resolve_stats_file("KRvK.json"), Some(StatsFile::Table("KRvK".to_string())));
        assert_eq!(resolve_stats_file("KRBNvKQN.json"), Some(StatsFile::Table("KRBNvKQN".to_string())));
        assert_eq!(resolve_stats_file("KvKR.json"), Some(StatsFile::Redirect("KRvK.json".to_string())));
        assert_eq!(resolve_stats_file("KPvKQ.json"), Some(StatsFile::Redirect("KQvKP.json".to_string())));
    }

    #[test]
    fn test_resolve_stats_file_rejects() {
        // Nine characters, even though the grammar would accept it.
        assert_eq!(resolve_stats_file("KRBNPvKQN.json"), None);
        assert_eq!(resolve_stats_file(&format!("K{}vK.json", "Q".repeat(300))), None);
        for bad in ["KRK.json", "krvk.json", "KRvK", "KRvK.txt", ".json", "KKvK.json"] {
            assert_eq!(resolve_stats_file(bad), None, "{}", bad);
        }
    }

    #[test]
    fn test_graph_dot() {
        let dot = graph_dot(&parse_roots("KRvK").unwrap());
        assert_eq!(dot, "digraph Syzygy {\n  KRvK -> KvK;\n}\n");

        let dot = graph_dot(&parse_roots("KPvK").unwrap());
        assert!(dot.contains("  KPvK -> KQvK;\n"));
        assert!(dot.contains("  KQvK -> KvK;\n"));
        assert_eq!(dot.matches("KPvK ->").count(), 5);
    }

    #[test]
    fn test_download_list_lichess() {
        let roots = parse_roots("KRvK").unwrap();
        let list = download_list(&roots, &DownloadParams::default());
        assert_eq!(
            list,
            "https://tablebase.lichess.ovh/tables/standard/3-4-5/KRvK.rtbw\n\
             https://tablebase.lichess.ovh/tables/standard/3-4-5/KRvK.rtbz\n"
        );
    }

    #[test]
    fn test_download_list_filters_and_modes() {
        let roots = parse_roots("KPvK").unwrap();
        let params = DownloadParams {
            source: Source::File,
            dtz: DtzMode::Root,
            ..DownloadParams::default()
        };
        let list = download_list(&roots, &params);
        let lines: Vec<&str> = list.lines().collect();
        assert_eq!(lines.first(), Some(&"KQvK.rtbw"));
        assert!(lines.contains(&"KPvK.rtbz"));
        assert!(!lines.contains(&"KQvK.rtbz"));
        assert!(!lines.iter().any(|l| l.starts_with("KvK")));

        let params = DownloadParams {
            source: Source::Stem,
            min_pieces: 4,
            ..DownloadParams::default()
        };
        assert_eq!(download_list(&roots, &params), "");
    }

    #[test]
    fn test_seven_piece_lichess_layout() {
        let roots = parse_roots("KRPPvKRP").unwrap();
        let params = DownloadParams {
            dtz: DtzMode::Only,
            min_pieces: 7,
            ..DownloadParams::default()
        };
        let list = download_list(&roots, &params);
        assert!(list.contains("/7/4v3_pawnful/KRPPvKRP.rtbz"));
        assert!(!list.contains(".rtbw"));
    }

    #[test]
    fn test_unknown_source() {
        assert!("dropbox".parse::<Source>().is_err());
        assert_eq!("sesse.net".parse::<Source>().unwrap(), Source::Sesse);
    }
}
