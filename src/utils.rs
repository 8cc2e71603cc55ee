//! Grid file I/O, benchmark start-state generation and report writing.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use rand::Rng;

use crate::engine::{self, State};

/// Reads a grid file (one line per row, space-separated tokens) into a
/// detached state.
pub fn load_grid(path: &Path) -> Result<Rc<State>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading grid file {}", path.display()))?;
    let state: State = text
        .parse()
        .with_context(|| format!("parsing grid file {}", path.display()))?;
    Ok(Rc::new(state))
}

/// Produces up to `count` distinct detached states, each `depth` random moves
/// away from `base`. Scrambles that collide with an earlier state are
/// redrawn; when a long run of redraws keeps colliding (the reachable variety
/// at `depth` is smaller than `count`, e.g. `depth` 0), generation stops and
/// fewer states are returned.
pub fn scrambled_states(
    base: &Rc<State>,
    depth: u32,
    count: usize,
    rng: &mut impl Rng,
) -> Vec<Rc<State>> {
    const REDRAW_LIMIT: u32 = 64;
    let mut states: Vec<Rc<State>> = Vec::with_capacity(count);
    let mut seen: HashSet<Rc<State>> = HashSet::new();
    let mut redraws = 0;
    while states.len() < count {
        let state = engine::scramble(base, depth, rng);
        if seen.insert(state.clone()) {
            states.push(state);
            redraws = 0;
        } else {
            redraws += 1;
            if redraws >= REDRAW_LIMIT {
                break;
            }
        }
    }
    states
}

/// One algorithm's outcome inside a report block.
pub struct ReportEntry {
    pub algorithm: String,
    pub statistics: String,
    /// Moves in the found path (edge count); `None` marks a not-found run.
    pub path_len: Option<usize>,
}

impl ReportEntry {
    /// Builds an entry from a search outcome. The recorded length is the
    /// move count, the same figure `solve` prints for its solutions.
    pub fn new(algorithm: &str, statistics: String, path: Option<&[Rc<State>]>) -> Self {
        ReportEntry {
            algorithm: algorithm.to_string(),
            statistics,
            path_len: path.map(|p| p.len().saturating_sub(1)),
        }
    }
}

/// Appends one depth block to a plain-text report file:
///
/// ```text
/// Depth: 4
/// breadth-first
/// iterations: ...
/// Path length: 5
/// --------------------------------
/// ```
///
/// The file grows across runs; it is never truncated.
pub fn append_report(path: &Path, depth: u32, entries: &[ReportEntry]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening report file {}", path.display()))?;
    writeln!(file, "Depth: {}", depth)?;
    for entry in entries {
        writeln!(file, "{}", entry.algorithm)?;
        writeln!(file, "{}", entry.statistics)?;
        match entry.path_len {
            Some(len) => writeln!(file, "Path length: {}", len)?,
            None => writeln!(file, "Path not found")?,
        }
        writeln!(file, "--------------------------------")?;
    }
    Ok(())
}
