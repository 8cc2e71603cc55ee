use anyhow::Result;
use clap::Parser;
use loopover_solver::engine::{discover_forward, discover_reverse, State};
use loopover_solver::heuristics;
use loopover_solver::solver::{AStar, Bidirectional, BreadthFirst, DepthLimited, Search};
use loopover_solver::utils::{self, ReportEntry};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Report file to append to
    #[clap(short, long, default_value = "report.txt")]
    report: PathBuf,

    /// Scrambled states per depth
    #[clap(short, long, default_value_t = 10)]
    count: usize,

    /// RNG seed for the scramble generator
    #[clap(short, long, default_value_t = 42)]
    seed: u64,
}

// Plain depth-first is left out: it wanders far too deep on this branching
// factor to finish in reasonable time.
const DEPTHS: [u32; 5] = [2, 4, 6, 8, 10];

fn run(mut search: Box<dyn Search>, name: &str) -> Result<ReportEntry> {
    let path = search.search()?;
    Ok(ReportEntry::new(name, search.statistics(), path.as_deref()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let base = Rc::new(State::solved());
    let target = Rc::new(State::solved());

    for depth in DEPTHS {
        println!("Depth {}", depth);
        let starts = utils::scrambled_states(&base, depth, args.count, &mut rng);
        for (index, start) in starts.iter().enumerate() {
            println!("  state {}/{}", index + 1, starts.len());
            let entries = vec![
                run(
                    Box::new(BreadthFirst::new(
                        start.clone(),
                        target.clone(),
                        discover_forward,
                    )),
                    "breadth-first",
                )?,
                run(
                    Box::new(DepthLimited::new(
                        start.clone(),
                        target.clone(),
                        discover_forward,
                    )),
                    "iterative-deepening",
                )?,
                run(
                    Box::new(Bidirectional::new(
                        start.clone(),
                        target.clone(),
                        discover_forward,
                        discover_reverse,
                    )),
                    "bidirectional",
                )?,
                run(
                    Box::new(AStar::new(
                        start.clone(),
                        target.clone(),
                        discover_forward,
                        heuristics::mismatch_count,
                    )),
                    "a-star (mismatch)",
                )?,
                run(
                    Box::new(AStar::new(
                        start.clone(),
                        target.clone(),
                        discover_forward,
                        heuristics::positional_distance,
                    )),
                    "a-star (positional)",
                )?,
                run(
                    Box::new(AStar::new(
                        start.clone(),
                        target.clone(),
                        discover_forward,
                        heuristics::line_mismatch,
                    )),
                    "a-star (lines)",
                )?,
            ];
            utils::append_report(&args.report, depth, &entries)?;
        }
    }
    println!("Report appended to {}", args.report.display());
    Ok(())
}
