//! Offline pattern database: construction, persistence and lookup.
//!
//! A *positional signature* reduces a full grid to where one color's four
//! tokens sit, as sorted 1-based cell indices. Many full states collapse to
//! the same signature, and the signature space for a 4x4 grid holds exactly
//! C(16, 4) = 1820 classes per color, small enough to tabulate the exact
//! number of moves needed to bring that color home from every class. The
//! resulting table backs [`crate::heuristics::pattern_database`].
//!
//! On disk a database is a directory with one file per color (`red.txt`,
//! `green.txt`, `yellow.txt`, `blue.txt`), each line of the form
//! `"p1 p2 p3 p4:distance"`.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Context, Result};

use crate::engine::{self, State, Token};
use crate::solver::{Bidirectional, Search};

/// Sorted 1-based cell indices of one color's tokens.
pub type Signature = Vec<usize>;

/// Extracts `color`'s positional signature from `state`, ascending.
pub fn signature(state: &State, color: Token) -> Signature {
    state
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, token)| **token == color)
        .map(|(index, _)| index + 1)
        .collect()
}

/// Per-color lookup tables mapping positional signatures to exact distances.
#[derive(Debug, Default, Clone)]
pub struct PatternDatabase {
    tables: HashMap<Token, HashMap<Signature, u32>>,
}

impl PatternDatabase {
    pub fn new() -> Self {
        PatternDatabase::default()
    }

    /// Replaces the whole table for one color.
    pub fn insert_table(&mut self, color: Token, table: HashMap<Signature, u32>) {
        self.tables.insert(color, table);
    }

    /// Exact distance for `color`'s signature, or `None` when the signature
    /// (or the whole color) is absent.
    pub fn lookup(&self, color: Token, signature: &Signature) -> Option<u32> {
        self.tables.get(&color)?.get(signature).copied()
    }

    /// Loads a database from a directory holding one file per color. Every
    /// color file must be present and well formed.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut db = PatternDatabase::new();
        for color in Token::COLORS {
            let path = dir.join(format!("{}.txt", color.name()));
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading pattern table {}", path.display()))?;
            let table = parse_table(&text)
                .with_context(|| format!("parsing pattern table {}", path.display()))?;
            db.insert_table(color, table);
        }
        Ok(db)
    }

    /// Writes one file per stored color into `dir`, creating it if needed.
    pub fn save_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating database directory {}", dir.display()))?;
        for (color, table) in &self.tables {
            let path = dir.join(format!("{}.txt", color.name()));
            fs::write(&path, format_table(table))
                .with_context(|| format!("writing pattern table {}", path.display()))?;
        }
        Ok(())
    }
}

/// Parses `"p1 p2 p3 p4:distance"` lines. Blank lines are skipped.
pub fn parse_table(text: &str) -> Result<HashMap<Signature, u32>> {
    let mut table = HashMap::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (positions, distance) = line
            .split_once(':')
            .with_context(|| format!("line {}: missing ':' separator", number + 1))?;
        let signature: Signature = positions
            .split_whitespace()
            .map(|part| {
                part.parse::<usize>()
                    .with_context(|| format!("line {}: bad cell index {:?}", number + 1, part))
            })
            .collect::<Result<_>>()?;
        let distance: u32 = distance
            .trim()
            .parse()
            .with_context(|| format!("line {}: bad distance {:?}", number + 1, distance))?;
        table.insert(signature, distance);
    }
    Ok(table)
}

/// Renders a table back into the line format, signatures sorted so the
/// output is deterministic.
pub fn format_table(table: &HashMap<Signature, u32>) -> String {
    let mut entries: Vec<(&Signature, &u32)> = table.iter().collect();
    entries.sort();
    let mut out = String::new();
    for (signature, distance) in entries {
        let positions: Vec<String> = signature.iter().map(|p| p.to_string()).collect();
        out.push_str(&positions.join(" "));
        out.push(':');
        out.push_str(&distance.to_string());
        out.push('\n');
    }
    out
}

/// Enumerates every positional signature reachable for `color`, with the
/// depth at which breadth-first search from the solved grid first produces
/// it.
///
/// States are deduplicated by signature rather than by full value: which
/// signature a move produces depends only on the signature it starts from,
/// so one representative per class covers the whole class. The first
/// discovery depth is therefore the minimum move count from the solved
/// arrangement.
pub fn enumerate_signatures(color: Token) -> Vec<(Signature, u32)> {
    let mut found: Vec<(Signature, u32)> = Vec::new();
    let mut seen: HashSet<Signature> = HashSet::new();
    let mut open: VecDeque<Rc<State>> = VecDeque::new();

    let root = Rc::new(State::solved());
    seen.insert(signature(&root, color));
    open.push_back(root);

    while let Some(node) = open.pop_front() {
        found.push((signature(&node, color), node.depth() as u32));
        for child in engine::discover_full(&node) {
            let sig = signature(&child, color);
            if seen.insert(sig) {
                open.push_back(child);
            }
        }
    }
    found
}

/// Computes, for each seed signature, the exact move count to the
/// partial-goal target where only `color`'s home row is fixed. Each seed is
/// solved independently with bidirectional search over full discovery on
/// both ends; `on_entry` fires once per finished seed so a caller can drive
/// a progress bar.
pub fn exact_distances(
    color: Token,
    seeds: &[Signature],
    mut on_entry: impl FnMut(),
) -> Result<HashMap<Signature, u32>> {
    let target = Rc::new(State::partial_target(color));
    let mut table = HashMap::new();
    for seed in seeds {
        let start = Rc::new(State::from_positions(seed, color)?);
        let mut search = Bidirectional::new(
            start,
            target.clone(),
            engine::discover_full,
            engine::discover_full,
        );
        match search.search()? {
            Some(path) => {
                table.insert(seed.clone(), (path.len() - 1) as u32);
            }
            None => bail!(
                "signature {:?} cannot reach the {} partial goal",
                seed,
                color.name()
            ),
        }
        on_entry();
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_of_solved_grid_is_the_home_row() {
        let s = State::solved();
        assert_eq!(signature(&s, Token::Red), vec![1, 2, 3, 4]);
        assert_eq!(signature(&s, Token::Green), vec![5, 6, 7, 8]);
        assert_eq!(signature(&s, Token::Yellow), vec![9, 10, 11, 12]);
        assert_eq!(signature(&s, Token::Blue), vec![13, 14, 15, 16]);
    }

    #[test]
    fn test_table_round_trips_through_the_line_format() {
        let mut table = HashMap::new();
        table.insert(vec![1, 2, 3, 4], 0);
        table.insert(vec![2, 3, 4, 5], 1);
        table.insert(vec![13, 14, 15, 16], 6);
        let text = format_table(&table);
        assert_eq!(parse_table(&text).unwrap(), table);
        assert!(text.contains("2 3 4 5:1\n"));
    }

    #[test]
    fn test_parse_table_rejects_malformed_lines() {
        assert!(parse_table("1 2 3 4").is_err());
        assert!(parse_table("1 2 x 4:3").is_err());
        assert!(parse_table("1 2 3 4:abc").is_err());
    }

    #[test]
    fn test_enumeration_covers_every_choice_of_four_cells() {
        let classes = enumerate_signatures(Token::Red);
        // C(16, 4) placements of four indistinguishable tokens.
        assert_eq!(classes.len(), 1820);
        let (first, depth) = &classes[0];
        assert_eq!(*first, vec![1, 2, 3, 4]);
        assert_eq!(*depth, 0);
        let distinct: HashSet<&Signature> = classes.iter().map(|(sig, _)| sig).collect();
        assert_eq!(distinct.len(), classes.len());
    }

    #[test]
    fn test_exact_distances_to_the_partial_goal() {
        let seeds = vec![vec![1, 2, 3, 4], vec![2, 3, 4, 5]];
        let mut entries = 0;
        let table = exact_distances(Token::Red, &seeds, || entries += 1).unwrap();
        assert_eq!(table[&vec![1, 2, 3, 4]], 0);
        // Cell 5 sits one column rotation away from the home row.
        assert_eq!(table[&vec![2, 3, 4, 5]], 1);
        assert_eq!(entries, 2);
    }

    #[test]
    fn test_exact_distances_match_single_direction_search() {
        use crate::solver::BreadthFirst;

        // Signatures whose shortest solves need the search to look past the
        // first meeting of the two frontiers.
        let seeds = vec![
            vec![1, 3, 5, 6],
            vec![4, 8, 12, 16],
            vec![13, 14, 15, 16],
        ];
        let table = exact_distances(Token::Red, &seeds, || {}).unwrap();
        let target = Rc::new(State::partial_target(Token::Red));
        for seed in &seeds {
            let start = Rc::new(State::from_positions(seed, Token::Red).unwrap());
            let mut bfs = BreadthFirst::new(start, target.clone(), engine::discover_full);
            let path = bfs.search().unwrap().expect("signature space is connected");
            assert_eq!(table[seed], (path.len() - 1) as u32, "seed {:?}", seed);
        }
    }

    #[test]
    fn test_database_persists_through_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = PatternDatabase::new();
        for color in Token::COLORS {
            let mut table = HashMap::new();
            table.insert(signature(&State::solved(), color), 0);
            db.insert_table(color, table);
        }
        db.save_dir(dir.path()).unwrap();
        let loaded = PatternDatabase::load_dir(dir.path()).unwrap();
        for color in Token::COLORS {
            let sig = signature(&State::solved(), color);
            assert_eq!(loaded.lookup(color, &sig), Some(0));
        }
    }

    #[test]
    fn test_load_dir_requires_every_color_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("red.txt"), "1 2 3 4:0\n").unwrap();
        assert!(PatternDatabase::load_dir(dir.path()).is_err());
    }
}
