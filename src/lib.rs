//! # Loopover Solver Library
//!
//! Core engine and search algorithms for a 4x4 rotation puzzle: a grid of
//! colored tokens where a move cyclically rotates one whole row or column,
//! solved by bringing each color to its home row.
//!
//! The library is used by three binaries:
//! - `solve`: loads a grid file and runs one chosen search algorithm.
//! - `build_db`: offline construction of the pattern database backing the
//!   exact-lookup heuristic.
//! - `benchmark`: scrambles at increasing depths and compares the whole
//!   algorithm family, appending plain-text report blocks.
//!
//! ## Modules
//! - `engine`: the immutable `State` grid, rotation moves, successor
//!   discovery, path reconstruction and scrambling.
//! - `heuristics`: remaining-distance estimators sharing one `h(state,
//!   target)` contract, including the pattern-database lookup.
//! - `solver`: the `Search` contract plus breadth-first, depth-first,
//!   iterative-deepening, bidirectional and A* implementations.
//! - `pattern`: positional signatures, database construction and the on-disk
//!   table format.
//! - `utils`: grid file I/O, benchmark scramble generation and report
//!   writing.

pub mod engine;
pub mod heuristics;
pub mod pattern;
pub mod solver;
pub mod utils;
