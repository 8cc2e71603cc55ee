//! The family of search algorithms over puzzle states.
//!
//! Every algorithm implements the same [`Search`] contract: it owns its open
//! (frontier) and closed (visited) collections, runs to completion when
//! `search` is called, and reports per-expansion counters through
//! `statistics`. Exploration never mutates a state; successor generation goes
//! through a pluggable discovery function, and A* additionally takes a
//! pluggable heuristic, so the same algorithm can be run with any estimator.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;

use crate::engine::{self, State};
use crate::heuristics::{Estimate, HeuristicError};

/// An ordered start-to-goal sequence of states.
pub type Path = Vec<Rc<State>>;

/// Common contract shared by every search algorithm.
///
/// `Ok(Some(path))` is success, `Ok(None)` is the normal not-found terminal
/// outcome (an exhausted frontier), and `Err` is reserved for genuine
/// failures such as a pattern-database lookup miss inside a heuristic. A
/// search instance is single-shot: construct, call `search` once, then read
/// `statistics`.
pub trait Search {
    fn search(&mut self) -> Result<Option<Path>, HeuristicError>;
    fn statistics(&self) -> String;
}

/// Counters recorded once per node expansion. Purely observational; never
/// consulted by the algorithms themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchStatistics {
    pub iterations: u64,
    pub open: usize,
    pub max_open: usize,
    pub max_total: usize,
}

impl SearchStatistics {
    fn record(&mut self, open: usize, total: usize) {
        self.iterations += 1;
        self.open = open;
        self.max_open = self.max_open.max(open);
        self.max_total = self.max_total.max(total);
    }
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "iterations: {}", self.iterations)?;
        writeln!(f, "open nodes: {}", self.open)?;
        writeln!(f, "max open nodes: {}", self.max_open)?;
        write!(f, "max open + closed nodes: {}", self.max_total)
    }
}

/// Breadth-first search: FIFO frontier, goal test on dequeue, children
/// deduplicated against both open and closed by value. With unit move costs
/// the first path found is shortest.
pub struct BreadthFirst<D> {
    target: Rc<State>,
    discovery: D,
    open: VecDeque<Rc<State>>,
    open_members: HashSet<Rc<State>>,
    closed: HashSet<Rc<State>>,
    stats: SearchStatistics,
}

impl<D: Fn(&Rc<State>) -> Vec<Rc<State>>> BreadthFirst<D> {
    pub fn new(start: Rc<State>, target: Rc<State>, discovery: D) -> Self {
        let mut open = VecDeque::new();
        let mut open_members = HashSet::new();
        open_members.insert(start.clone());
        open.push_back(start);
        BreadthFirst {
            target,
            discovery,
            open,
            open_members,
            closed: HashSet::new(),
            stats: SearchStatistics::default(),
        }
    }
}

impl<D: Fn(&Rc<State>) -> Vec<Rc<State>>> Search for BreadthFirst<D> {
    fn search(&mut self) -> Result<Option<Path>, HeuristicError> {
        while let Some(node) = self.open.pop_front() {
            self.open_members.remove(&node);
            if *node == *self.target {
                return Ok(Some(engine::path(&node)));
            }
            self.closed.insert(node.clone());
            self.stats
                .record(self.open.len(), self.open.len() + self.closed.len());
            for child in (self.discovery)(&node) {
                if self.open_members.contains(&child) || self.closed.contains(&child) {
                    continue;
                }
                self.open_members.insert(child.clone());
                self.open.push_back(child);
            }
        }
        Ok(None)
    }

    fn statistics(&self) -> String {
        self.stats.to_string()
    }
}

/// Depth-first search: the same control flow as [`BreadthFirst`] with a LIFO
/// frontier. Kept as a deliberately naive baseline; it guarantees neither a
/// shortest path nor a practical running time on deep state spaces.
pub struct DepthFirst<D> {
    target: Rc<State>,
    discovery: D,
    open: Vec<Rc<State>>,
    open_members: HashSet<Rc<State>>,
    closed: HashSet<Rc<State>>,
    stats: SearchStatistics,
}

impl<D: Fn(&Rc<State>) -> Vec<Rc<State>>> DepthFirst<D> {
    pub fn new(start: Rc<State>, target: Rc<State>, discovery: D) -> Self {
        let mut open_members = HashSet::new();
        open_members.insert(start.clone());
        DepthFirst {
            target,
            discovery,
            open: vec![start],
            open_members,
            closed: HashSet::new(),
            stats: SearchStatistics::default(),
        }
    }
}

impl<D: Fn(&Rc<State>) -> Vec<Rc<State>>> Search for DepthFirst<D> {
    fn search(&mut self) -> Result<Option<Path>, HeuristicError> {
        while let Some(node) = self.open.pop() {
            self.open_members.remove(&node);
            if *node == *self.target {
                return Ok(Some(engine::path(&node)));
            }
            self.closed.insert(node.clone());
            self.stats
                .record(self.open.len(), self.open.len() + self.closed.len());
            for child in (self.discovery)(&node) {
                if self.open_members.contains(&child) || self.closed.contains(&child) {
                    continue;
                }
                self.open_members.insert(child.clone());
                self.open.push(child);
            }
        }
        Ok(None)
    }

    fn statistics(&self) -> String {
        self.stats.to_string()
    }
}

/// Iterative-deepening depth-limited search.
///
/// Runs depth-first iterations with a growing depth ceiling, restarting from
/// a fresh frontier and visited map each round. The visited map is keyed by
/// state and stores the shallowest depth the state was reached at, so a state
/// rediscovered on a shorter path is re-expanded; that preserves the
/// shortest-path guarantee in the limit. An iteration that exhausts its
/// frontier without cutting off any node proves the whole reachable space was
/// covered, so the search terminates with not-found instead of deepening
/// forever.
pub struct DepthLimited<D> {
    start: Rc<State>,
    target: Rc<State>,
    discovery: D,
    stats: SearchStatistics,
}

impl<D: Fn(&Rc<State>) -> Vec<Rc<State>>> DepthLimited<D> {
    pub fn new(start: Rc<State>, target: Rc<State>, discovery: D) -> Self {
        DepthLimited {
            start,
            target,
            discovery,
            stats: SearchStatistics::default(),
        }
    }
}

impl<D: Fn(&Rc<State>) -> Vec<Rc<State>>> Search for DepthLimited<D> {
    fn search(&mut self) -> Result<Option<Path>, HeuristicError> {
        let mut max_depth = 1usize;
        loop {
            let mut open: Vec<(Rc<State>, usize)> = vec![(self.start.clone(), 0)];
            let mut closed: HashMap<Rc<State>, usize> = HashMap::new();
            let mut cut_off = false;

            while let Some((node, depth)) = open.pop() {
                if *node == *self.target {
                    return Ok(Some(engine::path(&node)));
                }
                if closed.get(&node).is_some_and(|&seen| seen <= depth) {
                    continue;
                }
                closed.insert(node.clone(), depth);
                self.stats.record(open.len(), open.len() + closed.len());
                if depth >= max_depth {
                    cut_off = true;
                    continue;
                }
                for child in (self.discovery)(&node) {
                    if closed.get(&child).is_some_and(|&seen| seen <= depth + 1) {
                        continue;
                    }
                    open.push((child, depth + 1));
                }
            }

            if !cut_off {
                return Ok(None);
            }
            max_depth += 1;
        }
    }

    fn statistics(&self) -> String {
        self.stats.to_string()
    }
}

struct Frontier {
    open: VecDeque<Rc<State>>,
    /// Every state this side has ever generated, keyed by value; `get`
    /// retrieves the stored representative whose parent chain reaches this
    /// side's root at the state's breadth-first distance.
    seen: HashSet<Rc<State>>,
    root_depth: usize,
    stats: SearchStatistics,
}

impl Frontier {
    fn new(root: Rc<State>) -> Self {
        let root_depth = root.depth();
        let mut open = VecDeque::new();
        let mut seen = HashSet::new();
        seen.insert(root.clone());
        open.push_back(root);
        Frontier {
            open,
            seen,
            root_depth,
            stats: SearchStatistics::default(),
        }
    }

    /// Open plus closed; every enqueued state stays in `seen` after expansion.
    fn total(&self) -> usize {
        self.seen.len()
    }

    /// Depth of the next node to expand, relative to this side's root, or
    /// `None` once the side is exhausted. Nondecreasing under FIFO order.
    fn next_depth(&self) -> Option<usize> {
        self.open.front().map(|node| node.depth() - self.root_depth)
    }

    fn depth_of(&self, node: &Rc<State>) -> usize {
        node.depth() - self.root_depth
    }
}

/// Bidirectional breadth-first search.
///
/// Two independent frontiers expand toward each other: forward from the start
/// via the forward discovery function, backward from the target via the
/// reverse one. Each round expands exactly one node from whichever side holds
/// fewer total (open + closed) nodes, ties going to the forward side; that
/// balancing bounds the explored volume by the smaller of the two searches.
/// Every generated neighbor is checked against the opposite side's seen set;
/// a match is a candidate meeting whose two halves splice into one path
/// (backward half reversed, its duplicate meeting node dropped). With mixed
/// depths in play the first meeting found need not lie on a shortest path,
/// so the search keeps the best meeting seen and runs on until the two
/// frontier depths prove no shorter meeting can still appear.
pub struct Bidirectional<D, R> {
    start: Rc<State>,
    target: Rc<State>,
    discovery: D,
    reverse_discovery: R,
    forward: Frontier,
    backward: Frontier,
    common: SearchStatistics,
}

impl<D, R> Bidirectional<D, R>
where
    D: Fn(&Rc<State>) -> Vec<Rc<State>>,
    R: Fn(&Rc<State>) -> Vec<Rc<State>>,
{
    pub fn new(start: Rc<State>, target: Rc<State>, discovery: D, reverse_discovery: R) -> Self {
        let forward = Frontier::new(start.clone());
        let backward = Frontier::new(target.clone());
        Bidirectional {
            start,
            target,
            discovery,
            reverse_discovery,
            forward,
            backward,
            common: SearchStatistics::default(),
        }
    }
}

/// Joins a forward partial path with a backward one at their shared meeting
/// state. `forward_end` chains back to the start, `backward_end` to the
/// target; the two ends are value-equal.
fn splice(forward_end: &Rc<State>, backward_end: &Rc<State>) -> Path {
    let mut joined = engine::path(forward_end);
    let mut back_half = engine::path(backward_end);
    back_half.reverse();
    joined.extend(back_half.into_iter().skip(1));
    joined
}

impl<D, R> Search for Bidirectional<D, R>
where
    D: Fn(&Rc<State>) -> Vec<Rc<State>>,
    R: Fn(&Rc<State>) -> Vec<Rc<State>>,
{
    fn search(&mut self) -> Result<Option<Path>, HeuristicError> {
        if *self.start == *self.target {
            return Ok(Some(vec![self.start.clone()]));
        }
        // Best meeting so far: forward end, backward end, spliced edge count.
        let mut best: Option<(Rc<State>, Rc<State>, usize)> = None;
        loop {
            match (self.forward.next_depth(), self.backward.next_depth()) {
                (Some(forward_depth), Some(backward_depth)) => {
                    // Per-side breadth-first order means every state within
                    // the current expansion depths is already seen, so once
                    // their sum reaches the best meeting's edge count no
                    // shorter meeting can still appear.
                    if let Some((_, _, edges)) = &best {
                        if forward_depth + backward_depth >= *edges {
                            break;
                        }
                    }
                }
                // An exhausted side has generated its whole reachable set, so
                // every possible meeting is already recorded.
                _ => break,
            }
            self.common.record(
                self.forward.open.len() + self.backward.open.len(),
                self.forward.total() + self.backward.total(),
            );

            if self.forward.total() <= self.backward.total() {
                let Some(node) = self.forward.open.pop_front() else {
                    break;
                };
                self.forward
                    .stats
                    .record(self.forward.open.len(), self.forward.total());
                for child in (self.discovery)(&node) {
                    if let Some(meet) = self.backward.seen.get(&child).cloned() {
                        let edges =
                            self.forward.depth_of(&child) + self.backward.depth_of(&meet);
                        if best.as_ref().map_or(true, |&(_, _, b)| edges < b) {
                            best = Some((child.clone(), meet, edges));
                        }
                    }
                    if self.forward.seen.insert(child.clone()) {
                        self.forward.open.push_back(child);
                    }
                }
            } else {
                let Some(node) = self.backward.open.pop_front() else {
                    break;
                };
                self.backward
                    .stats
                    .record(self.backward.open.len(), self.backward.total());
                for child in (self.reverse_discovery)(&node) {
                    if let Some(meet) = self.forward.seen.get(&child).cloned() {
                        let edges =
                            self.forward.depth_of(&meet) + self.backward.depth_of(&child);
                        if best.as_ref().map_or(true, |&(_, _, b)| edges < b) {
                            best = Some((meet, child.clone(), edges));
                        }
                    }
                    if self.backward.seen.insert(child.clone()) {
                        self.backward.open.push_back(child);
                    }
                }
            }
        }
        Ok(best.map(|(forward_end, backward_end, _)| splice(&forward_end, &backward_end)))
    }

    fn statistics(&self) -> String {
        format!(
            "forward:\n{}\nbackward:\n{}\ncombined:\n{}",
            self.forward.stats, self.backward.stats, self.common
        )
    }
}

/// A* search with a pluggable heuristic.
///
/// The open list is kept sorted ascending by `priority = g + h`, where `g` is
/// the successor's edge count from the start (`path length - 1`) and `h` the
/// supplied estimate toward the target. A successor already open with a worse
/// priority is replaced in place; one already closed with a worse priority is
/// reopened; duplicates with an equal-or-better recorded priority are
/// skipped. A heuristic failure (pattern-database lookup miss) aborts the
/// run.
pub struct AStar<D, H> {
    start: Rc<State>,
    target: Rc<State>,
    discovery: D,
    heuristic: H,
    open: Vec<(Rc<State>, u32)>,
    closed: HashMap<Rc<State>, u32>,
    stats: SearchStatistics,
}

impl<D, H> AStar<D, H>
where
    D: Fn(&Rc<State>) -> Vec<Rc<State>>,
    H: Fn(&State, &State) -> Estimate,
{
    pub fn new(start: Rc<State>, target: Rc<State>, discovery: D, heuristic: H) -> Self {
        AStar {
            start,
            target,
            discovery,
            heuristic,
            open: Vec::new(),
            closed: HashMap::new(),
            stats: SearchStatistics::default(),
        }
    }
}

impl<D, H> Search for AStar<D, H>
where
    D: Fn(&Rc<State>) -> Vec<Rc<State>>,
    H: Fn(&State, &State) -> Estimate,
{
    fn search(&mut self) -> Result<Option<Path>, HeuristicError> {
        let seed = (self.heuristic)(&self.start, &self.target)?;
        self.open.push((self.start.clone(), seed));

        while !self.open.is_empty() {
            let (node, priority) = self.open.remove(0);
            if *node == *self.target {
                return Ok(Some(engine::path(&node)));
            }
            let child_cost = node.depth() as u32 + 1;
            self.closed.insert(node.clone(), priority);
            self.stats
                .record(self.open.len(), self.open.len() + self.closed.len());

            for child in (self.discovery)(&node) {
                let estimate = (self.heuristic)(&child, &self.target)?;
                let child_priority = child_cost + estimate;

                if let Some(slot) = self.open.iter_mut().find(|(open, _)| **open == *child) {
                    if child_priority < slot.1 {
                        *slot = (child, child_priority);
                    }
                    continue;
                }
                match self.closed.get(&child).copied() {
                    Some(old) if child_priority < old => {
                        self.closed.remove(&child);
                        self.open.push((child, child_priority));
                    }
                    Some(_) => {}
                    None => self.open.push((child, child_priority)),
                }
            }
            self.open.sort_by_key(|&(_, priority)| priority);
        }
        Ok(None)
    }

    fn statistics(&self) -> String {
        self.stats.to_string()
    }
}
