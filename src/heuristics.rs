//! Estimators of remaining move count toward a target state.
//!
//! Every estimator follows the same `h(state, target)` contract and returns
//! an [`Estimate`], so any of them can be handed to the A* search as a plain
//! function value. The first three are pure arithmetic over the two grids;
//! [`pattern_database`] closes over a precomputed table and is the only one
//! that can fail.

use std::error::Error;
use std::fmt;

use crate::engine::{State, Token};
use crate::pattern::{self, PatternDatabase, Signature};

/// Failure raised while evaluating a heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeuristicError {
    /// The pattern database holds no entry for this positional signature.
    /// Either the database is incomplete or the queried state is unreachable;
    /// silently substituting zero would corrupt A*'s cost ordering, so the
    /// miss is surfaced instead.
    LookupMiss { color: Token, signature: Signature },
}

impl fmt::Display for HeuristicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeuristicError::LookupMiss { color, signature } => {
                write!(
                    f,
                    "no {} entry for positional signature {:?} in the pattern database",
                    color.name(),
                    signature
                )
            }
        }
    }
}

impl Error for HeuristicError {}

/// The result of one heuristic evaluation.
pub type Estimate = Result<u32, HeuristicError>;

/// Counts cells whose token differs from the target's token at the same
/// position, then divides by the grid size and floors. A single rotation
/// relocates at most `size` tokens, which is what the division buys back as
/// admissibility. Wildcard cells on either side match anything.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use loopover_solver::engine::{apply_move, Rotation, State};
/// use loopover_solver::heuristics::mismatch_count;
///
/// let solved = Rc::new(State::solved());
/// let shifted = apply_move(&solved, 2, Rotation::ColUp).unwrap();
/// assert_eq!(mismatch_count(&shifted, &solved), Ok(1));
/// ```
pub fn mismatch_count(state: &State, target: &State) -> Estimate {
    let differing = state
        .cells()
        .iter()
        .zip(target.cells())
        .filter(|(a, b)| **a != Token::Wildcard && **b != Token::Wildcard && *a != *b)
        .count();
    Ok((differing / state.size()) as u32)
}

/// Sums, over every non-wildcard target cell, the Manhattan distance to the
/// closest cell of the current state holding the same token, then divides by
/// the grid size and floors. More informative than [`mismatch_count`] and
/// quadratically more expensive.
pub fn positional_distance(state: &State, target: &State) -> Estimate {
    let size = state.size();
    let mut total = 0usize;
    for row in 0..size {
        for col in 0..size {
            let wanted = target.token_at(row, col);
            if wanted == Token::Wildcard {
                continue;
            }
            let nearest = (0..size)
                .flat_map(|r| (0..size).map(move |c| (r, c)))
                .filter(|&(r, c)| state.token_at(r, c) == wanted)
                .map(|(r, c)| row.abs_diff(r) + col.abs_diff(c))
                .min()
                .unwrap_or(0);
            total += nearest;
        }
    }
    Ok((total / size) as u32)
}

/// Counts whole rows plus whole columns that differ anywhere from the
/// target's. The coarsest of the estimators; a line that is off by one cell
/// weighs the same as a fully shuffled one.
pub fn line_mismatch(state: &State, target: &State) -> Estimate {
    let size = state.size();
    let cell_differs = |r: usize, c: usize| {
        let a = state.token_at(r, c);
        let b = target.token_at(r, c);
        a != Token::Wildcard && b != Token::Wildcard && a != b
    };
    let mut differing = 0u32;
    for row in 0..size {
        if (0..size).any(|col| cell_differs(row, col)) {
            differing += 1;
        }
    }
    for col in 0..size {
        if (0..size).any(|row| cell_differs(row, col)) {
            differing += 1;
        }
    }
    Ok(differing)
}

/// Builds an estimator backed by a precomputed [`PatternDatabase`].
///
/// For each color the current positional signature is looked up, giving the
/// exact move count needed to bring that color home in isolation; the
/// estimate is the maximum across colors. Each color's cost is a valid lower
/// bound on the full solve on its own, and the maximum is the tightest of
/// them; summing would overestimate because one rotation moves several colors
/// at once. The target argument is ignored, the database already encodes it.
///
/// Returns `Err(LookupMiss)` when any color's signature is absent.
pub fn pattern_database(
    db: &PatternDatabase,
) -> impl Fn(&State, &State) -> Estimate + '_ {
    move |state: &State, _target: &State| {
        let mut best = 0u32;
        for color in Token::COLORS {
            let signature = pattern::signature(state, color);
            match db.lookup(color, &signature) {
                Some(distance) => best = best.max(distance),
                None => return Err(HeuristicError::LookupMiss { color, signature }),
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{apply_move, Rotation};
    use std::rc::Rc;

    fn solved() -> Rc<State> {
        Rc::new(State::solved())
    }

    fn one_column_up() -> Rc<State> {
        apply_move(&solved(), 2, Rotation::ColUp).unwrap()
    }

    #[test]
    fn test_all_estimators_report_zero_on_the_target_itself() {
        let s = solved();
        assert_eq!(mismatch_count(&s, &s), Ok(0));
        assert_eq!(positional_distance(&s, &s), Ok(0));
        assert_eq!(line_mismatch(&s, &s), Ok(0));
    }

    #[test]
    fn test_mismatch_count_divides_differing_cells_by_size() {
        // A single column rotation displaces four cells.
        assert_eq!(mismatch_count(&one_column_up(), &solved()), Ok(1));
    }

    #[test]
    fn test_mismatch_count_accumulates_across_columns() {
        let s = apply_move(&one_column_up(), 1, Rotation::ColUp).unwrap();
        assert_eq!(mismatch_count(&s, &solved()), Ok(2));
    }

    #[test]
    fn test_mismatch_count_rounds_down() {
        // Five displaced cells floor to one after the division by four.
        let s = State::from_rows(&["G R R R", "R G G G", "G Y Y Y", "Y B B R"]).unwrap();
        assert_eq!(mismatch_count(&s, &solved()), Ok(1));
    }

    #[test]
    fn test_positional_distance_sums_nearest_cells() {
        // Each of the four displaced target cells has a matching token one
        // step away, so the normalized sum is 4/4.
        assert_eq!(positional_distance(&one_column_up(), &solved()), Ok(1));
    }

    #[test]
    fn test_line_mismatch_counts_rows_and_columns() {
        // A column rotation disturbs all four rows and exactly one column.
        assert_eq!(line_mismatch(&one_column_up(), &solved()), Ok(5));
    }

    #[test]
    fn test_wildcard_cells_match_anything() {
        let partial = State::partial_target(Token::Red);
        let s = solved();
        assert_eq!(mismatch_count(&s, &partial), Ok(0));
        assert_eq!(line_mismatch(&s, &partial), Ok(0));
        assert_eq!(positional_distance(&s, &partial), Ok(0));
    }

    #[test]
    fn test_pattern_database_takes_maximum_over_colors() {
        let s = solved();
        let mut db = PatternDatabase::new();
        for color in Token::COLORS {
            let sig = pattern::signature(&s, color);
            let distance = match color {
                Token::Yellow => 7,
                _ => 2,
            };
            db.insert_table(color, [(sig, distance)].into_iter().collect());
        }
        let h = pattern_database(&db);
        assert_eq!(h(&s, &s), Ok(7));
    }

    #[test]
    fn test_pattern_database_surfaces_missing_signatures() {
        let s = solved();
        let db = PatternDatabase::new();
        let h = pattern_database(&db);
        assert!(matches!(
            h(&s, &s),
            Err(HeuristicError::LookupMiss { color: Token::Red, .. })
        ));
    }
}
