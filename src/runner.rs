//! Build mazes and solve them until the exit is found

use log::{debug, info, warn};

use crate::builder::MazeBuilder;
use crate::explorer::{session_ended, MazeExplorer, Outcome};
use crate::maze_generator::MazeLayout;
use crate::session::Session;
use crate::world::World;
use crate::{MazeConfig, Position};

/// One session of building and exploring mazes
pub struct MazeRunner {
    config: MazeConfig,
    session: Session,
    builder: MazeBuilder,
    explorer: MazeExplorer,
}

/// Result of a [MazeRunner::run]
#[derive(Debug)]
pub struct RunReport {
    pub outcome: Outcome,
    /// Mazes built, including the one the run ended in
    pub generations: usize,
    /// Cells moved in the last maze
    pub steps: usize,
    /// Path from the start to where the run ended, in the last maze
    pub path: Vec<Position>,
    /// The last maze built
    pub layout: Option<MazeLayout>,
}

impl MazeRunner {
    pub fn new(config: MazeConfig) -> Self {
        Self {
            builder: MazeBuilder::new(&config),
            explorer: MazeExplorer::new(config.settle_ticks),
            session: Session::new(),
            config,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Build a maze, explore it, and rebuild whenever exploration is
    /// exhausted
    ///
    /// Stops on the exit, when the session ends, or after
    /// [MazeConfig::max_attempts] mazes if that is non-zero.
    pub fn run<W: World>(&mut self, world: &mut W) -> anyhow::Result<RunReport> {
        self.config.validate()?;
        let mut generations = 0;
        let mut layout = None;

        let outcome = loop {
            if session_ended(&self.session, world) {
                break Outcome::Cancelled;
            }
            let built = match self.builder.build(&self.session, world) {
                Ok(built) => built,
                Err(_) if session_ended(&self.session, world) => break Outcome::Cancelled,
                Err(err) => return Err(err),
            };
            match built {
                Some(built) => {
                    generations += 1;
                    layout = Some(built);
                }
                None => {
                    debug!("Session busy with another generation, run stopped");
                    break Outcome::Cancelled;
                }
            }

            match self.explorer.explore(&self.session, world)? {
                Outcome::ExitFound => {
                    info!("Found the maze exit in {} steps", self.explorer.steps());
                    if let Err(err) = world.chat("Found the maze exit!") {
                        if !session_ended(&self.session, world) {
                            return Err(err);
                        }
                    }
                    break Outcome::ExitFound;
                }
                Outcome::Exhausted => {
                    if self.config.max_attempts != 0 && generations >= self.config.max_attempts {
                        warn!("No solution found in {generations} mazes, giving up");
                        break Outcome::Exhausted;
                    }
                    warn!("No solution found or bot is stuck, regenerating");
                    if let Err(err) =
                        world.chat("No solution found or bot is stuck. Regenerating...")
                    {
                        if session_ended(&self.session, world) {
                            break Outcome::Cancelled;
                        }
                        return Err(err);
                    }
                }
                Outcome::Cancelled => break Outcome::Cancelled,
            }
        };

        Ok(RunReport {
            outcome,
            generations,
            steps: self.explorer.steps(),
            path: self.explorer.path().to_vec(),
            layout,
        })
    }
}

impl RunReport {
    /// Print report
    pub fn print_report(&self) {
        match self.outcome {
            Outcome::ExitFound => println!(
                "Found the exit in maze #{} after {} steps, {} cells from the start.",
                self.generations,
                self.steps,
                self.path.len().saturating_sub(1)
            ),
            Outcome::Exhausted => println!(
                "Gave up after {} mazes without reaching an exit.",
                self.generations
            ),
            Outcome::Cancelled => println!(
                "Session ended during maze #{} after {} steps.",
                self.generations, self.steps
            ),
        }
    }
}
