use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use loopover_solver::engine::{discover_forward, discover_reverse, State};
use loopover_solver::heuristics::{self, Estimate};
use loopover_solver::pattern::PatternDatabase;
use loopover_solver::solver::{
    AStar, Bidirectional, BreadthFirst, DepthFirst, DepthLimited, Search,
};
use loopover_solver::utils;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Algorithm {
    Bfs,
    Dfs,
    Iddfs,
    Bidirectional,
    Astar,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Heuristic {
    Mismatch,
    Positional,
    Lines,
    Database,
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Search algorithm to run
    #[clap(short, long, value_enum, default_value_t = Algorithm::Bfs)]
    algorithm: Algorithm,

    /// Heuristic used by A*
    #[clap(long, value_enum, default_value_t = Heuristic::Mismatch)]
    heuristic: Heuristic,

    /// Pattern database directory (required for --heuristic database)
    #[clap(long)]
    db_dir: Option<PathBuf>,

    /// Path to the grid file (4 lines of 4 space-separated tokens)
    grid_file: PathBuf,
}

fn pick_heuristic(args: &Args) -> Result<Box<dyn Fn(&State, &State) -> Estimate>> {
    Ok(match args.heuristic {
        Heuristic::Mismatch => Box::new(heuristics::mismatch_count),
        Heuristic::Positional => Box::new(heuristics::positional_distance),
        Heuristic::Lines => Box::new(heuristics::line_mismatch),
        Heuristic::Database => {
            let Some(dir) = &args.db_dir else {
                bail!("--db-dir is required with the database heuristic");
            };
            let db = PatternDatabase::load_dir(dir)?;
            Box::new(move |state: &State, target: &State| {
                heuristics::pattern_database(&db)(state, target)
            })
        }
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    let start = utils::load_grid(&args.grid_file)?;
    let target = Rc::new(State::solved());
    println!("Loaded grid from {}\n", args.grid_file.display());
    println!("Start state:\n{}\n", start);

    let mut search: Box<dyn Search> = match args.algorithm {
        Algorithm::Bfs => Box::new(BreadthFirst::new(
            start.clone(),
            target.clone(),
            discover_forward,
        )),
        Algorithm::Dfs => Box::new(DepthFirst::new(
            start.clone(),
            target.clone(),
            discover_forward,
        )),
        Algorithm::Iddfs => Box::new(DepthLimited::new(
            start.clone(),
            target.clone(),
            discover_forward,
        )),
        Algorithm::Bidirectional => Box::new(Bidirectional::new(
            start.clone(),
            target.clone(),
            discover_forward,
            discover_reverse,
        )),
        Algorithm::Astar => Box::new(AStar::new(
            start.clone(),
            target.clone(),
            discover_forward,
            pick_heuristic(&args)?,
        )),
    };

    match search.search()? {
        Some(path) => {
            println!("Solution found, {} moves:\n", path.len() - 1);
            for (step, state) in path.iter().enumerate() {
                println!("Step {}:\n{}\n", step, state);
            }
        }
        None => println!("No solution found.\n"),
    }
    println!("Statistics:\n{}", search.statistics());
    Ok(())
}
