//! CLI for building and solving a maze in the simulated world

use clap::Parser;
use maze_runner::{runner::MazeRunner, sim::SimWorld, MazeConfig};

/// Build a perfect maze and walk a bot out of it
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze side length, odd and at least 5
    #[arg(short, long, default_value_t = MazeConfig::DEFAULT_SIZE)]
    size: usize,

    /// Wall height in blocks
    #[arg(long, default_value_t = MazeConfig::DEFAULT_WALL_HEIGHT)]
    wall_height: i32,

    /// World ticks to wait between exploration steps
    #[arg(long, default_value_t = 10)]
    settle_ticks: u32,

    /// Give up after this many mazes, 0 for never
    #[arg(long, default_value_t = 0)]
    max_attempts: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Name of the bot in the world
    #[arg(long, default_value = "maze_bot")]
    username: String,

    /// Display the walk on the terminal
    #[arg(short, long)]
    playback: bool,

    /// Playback frame length in milliseconds
    #[arg(short, long, default_value_t = 150)]
    frame_length: u64,
}

/// Build and solve a maze, print output
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = MazeConfig {
        size: args.size,
        wall_height: args.wall_height,
        settle_ticks: args.settle_ticks,
        max_attempts: args.max_attempts,
        seed: args.seed,
        ..MazeConfig::default()
    };
    config.validate()?;

    let mut world = SimWorld::new(&args.username);
    let report = MazeRunner::new(config).run(&mut world)?;

    if args.playback {
        world.playback((args.size / 2) as i32, args.frame_length);
    }
    report.print_report();
    Ok(())
}
