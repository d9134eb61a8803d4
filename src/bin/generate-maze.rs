//! CLI for maze generation

use clap::Parser;
use maze_runner::{maze_generator::MazeGenerator, MazeConfig};

/// Print a random perfect maze
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze side length, odd and at least 5
    #[arg(long, default_value_t = MazeConfig::DEFAULT_SIZE)]
    size: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
}

/// Generate a maze, print output
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut gen = MazeGenerator::new(args.seed);
    let layout = gen.generate(args.size)?;
    println!("{}", layout.render());
    Ok(())
}
