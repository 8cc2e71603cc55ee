use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use loopover_solver::engine::Token;
use loopover_solver::pattern::{self, PatternDatabase, Signature};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Output directory for the per-color tables
    #[clap(short, long, default_value = "db")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let mut db = PatternDatabase::new();
    for color in Token::COLORS {
        println!("Enumerating {} positional classes...", color.name());
        let classes = pattern::enumerate_signatures(color);
        println!("{} reachable classes", classes.len());

        // First-discovery depths from the solved grid, kept alongside the
        // exact tables for inspection.
        let enumeration: HashMap<Signature, u32> = classes.iter().cloned().collect();
        let enumeration_path = args.out_dir.join(format!("{}_enumeration.txt", color.name()));
        fs::write(&enumeration_path, pattern::format_table(&enumeration))
            .with_context(|| format!("writing {}", enumeration_path.display()))?;

        let seeds: Vec<Signature> = classes.into_iter().map(|(sig, _)| sig).collect();
        let bar = ProgressBar::new(seeds.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{prefix:>8} [{bar:40}] {pos}/{len} ({eta})")?
                .progress_chars("=> "),
        );
        bar.set_prefix(color.name());
        let table = pattern::exact_distances(color, &seeds, || bar.inc(1))?;
        bar.finish();
        db.insert_table(color, table);
    }

    db.save_dir(&args.out_dir)?;
    println!("Pattern database written to {}", args.out_dir.display());
    Ok(())
}
