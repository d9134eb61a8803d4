//! Find the exit with local sensing, a visited set and a backtrack stack
//!
//! The explorer probes forward, then right, then left, and never looks
//! behind. This relies on the maze being a tree: when a cell is entered
//! from its parent, the parent is the only visited neighbour, so every
//! unexplored branch lies ahead, right or left. After a backtrack step the
//! explorer faces away from the cell it just left, which is likewise the
//! only neighbour it can skip. Mazes with cycles are not supported; a cell
//! reachable only by turning around would be missed.

use std::collections::HashSet;

use anyhow::Context;
use log::{debug, info, warn};

use crate::session::Session;
use crate::world::{Turn, World};
use crate::{is_exit_block, is_pathable, Block, Heading, Position};

/// How an exploration run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The exit marker was sensed ahead or underfoot
    ExitFound,
    /// Back on the start cell with nothing left to try
    Exhausted,
    /// The session ended before either of the above
    Cancelled,
}

/// What the character senses before a decision
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Observation {
    pub ahead: Option<Block>,
    pub underfoot: Option<Block>,
}

/// Decision of one explorer step, to be carried out by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Walk onto the adjacent cell ahead
    Advance(Position),
    Turn(Turn),
    /// Walk back one cell, then face `facing`
    Retreat {
        to: Position,
        facing: Option<Heading>,
    },
    Finish(Outcome),
}

/// Where the explorer is within one decision cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Test for the exit, then probe straight ahead
    CheckExit,
    /// Turned right, probe ahead
    Right,
    /// Turned to the original left, probe ahead
    Left,
    Done(Outcome),
}

pub struct MazeExplorer {
    visited: HashSet<Position>,
    /// Occupied cells in visit order; the last one is the current cell
    path: Vec<Position>,
    phase: Phase,
    steps: usize,
    settle_ticks: u32,
}

impl MazeExplorer {
    pub fn new(settle_ticks: u32) -> Self {
        Self {
            visited: HashSet::new(),
            path: Vec::new(),
            phase: Phase::CheckExit,
            steps: 0,
            settle_ticks,
        }
    }

    /// Forget everything and start over from `start`
    pub fn reset(&mut self, start: Position) {
        self.visited.clear();
        self.visited.insert(start);
        self.path.clear();
        self.path.push(start);
        self.phase = Phase::CheckExit;
        self.steps = 0;
    }

    pub fn visited(&self) -> &HashSet<Position> {
        &self.visited
    }

    pub fn path(&self) -> &[Position] {
        &self.path
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Cells moved so far, forward and backward
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Decide the next action from what is sensed now
    ///
    /// Cells are recorded as visited when an [Action::Advance] is returned;
    /// the host must carry it out before observing again.
    pub fn step(&mut self, observation: &Observation) -> Action {
        let ahead = observation.ahead.as_ref();
        match self.phase {
            Phase::CheckExit => {
                if is_exit_block(ahead) || is_exit_block(observation.underfoot.as_ref()) {
                    return self.finish(Outcome::ExitFound);
                }
                self.advance(ahead).unwrap_or_else(|| {
                    self.phase = Phase::Right;
                    Action::Turn(Turn::Right)
                })
            }
            Phase::Right => self.advance(ahead).unwrap_or_else(|| {
                self.phase = Phase::Left;
                Action::Turn(Turn::Around)
            }),
            Phase::Left => self.advance(ahead).unwrap_or_else(|| self.backtrack()),
            Phase::Done(outcome) => Action::Finish(outcome),
        }
    }

    fn advance(&mut self, ahead: Option<&Block>) -> Option<Action> {
        let block = ahead.filter(|&b| is_pathable(Some(b)))?;
        if !self.visited.insert(block.position) {
            return None;
        }
        self.path.push(block.position);
        self.phase = Phase::CheckExit;
        self.steps += 1;
        debug!("Advance to {}", block.position);
        Some(Action::Advance(block.position))
    }

    fn backtrack(&mut self) -> Action {
        let &[.., to, from] = self.path.as_slice() else {
            warn!(
                "Exploration exhausted after {} cells; the maze should have been solvable",
                self.visited.len()
            );
            return self.finish(Outcome::Exhausted);
        };
        self.path.pop();
        self.phase = Phase::CheckExit;
        self.steps += 1;
        debug!("Backtrack from {from} to {to}");
        Action::Retreat {
            to,
            facing: Heading::between(from, to),
        }
    }

    fn finish(&mut self, outcome: Outcome) -> Action {
        self.phase = Phase::Done(outcome);
        Action::Finish(outcome)
    }

    /// Walk the character until the exit is found, the maze is exhausted or
    /// the session ends
    pub fn explore<W: World>(
        &mut self,
        session: &Session,
        world: &mut W,
    ) -> anyhow::Result<Outcome> {
        let start = world.position().floored();
        self.reset(start);
        if session_ended(session, world) {
            info!("Session ended before exploration started");
            return Ok(Outcome::Cancelled);
        }
        info!("Starting maze exploration from {start}");
        if let Err(err) = world.chat("Starting maze exploration!") {
            if session_ended(session, world) {
                return Ok(Outcome::Cancelled);
            }
            return Err(err);
        }

        loop {
            if session_ended(session, world) {
                info!("Session ended, exploration stopped after {} steps", self.steps);
                return Ok(Outcome::Cancelled);
            }
            let observation = Observation {
                ahead: world.block_ahead(),
                underfoot: world.block_underfoot(),
            };
            let action = self.step(&observation);
            if let Action::Finish(outcome) = action {
                return Ok(outcome);
            }
            if let Err(err) = Self::apply(action, world) {
                if session_ended(session, world) {
                    info!("Session ended during {action:?}");
                    return Ok(Outcome::Cancelled);
                }
                return Err(err);
            }
            if self.phase == Phase::CheckExit {
                world.wait_ticks(self.settle_ticks)?;
            }
        }
    }

    fn apply<W: World>(action: Action, world: &mut W) -> anyhow::Result<()> {
        match action {
            Action::Advance(target) => world
                .move_to(target)
                .with_context(|| format!("Failed to move to {target}")),
            Action::Turn(turn) => world.turn(turn),
            Action::Retreat { to, facing } => {
                world.chat("Backtracking...")?;
                world
                    .move_to(to)
                    .with_context(|| format!("Failed to backtrack to {to}"))?;
                match facing {
                    Some(heading) => world.face(heading),
                    None => Ok(()),
                }
            }
            Action::Finish(_) => Ok(()),
        }
    }
}

/// Whether nothing may act on the world anymore
pub(crate) fn session_ended<W: World>(session: &Session, world: &W) -> bool {
    session.is_closed() || !world.is_connected()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze_generator::{Grid, MazeGenerator, Point};
    use crate::sim::SimWorld;

    fn corridor_world(
        emojis: &str,
        start: (usize, usize),
        exit: Option<(usize, usize)>,
    ) -> SimWorld {
        let grid = Grid::parse_emojis(emojis.trim()).unwrap();
        SimWorld::from_grid("maze_bot", &grid, start, exit)
    }

    fn cell(world: &SimWorld, x: usize, z: usize) -> Position {
        Position::new(x as i32, world.feet().y, z as i32)
    }

    #[test]
    fn exit_straight_ahead() {
        let emojis = "
🟫🟫🟫🟫🟫
🟫🏃🟩❎🟫
🟫🟫🟫🟫🟫
🟫🟫🟫🟫🟫
🟫🟫🟫🟫🟫";
        let mut world = corridor_world(emojis, (1, 1), Some((3, 1))).with_heading(Heading::East);
        let session = Session::new();
        let mut explorer = MazeExplorer::new(0);

        let outcome = explorer.explore(&session, &mut world).unwrap();
        assert_eq!(outcome, Outcome::ExitFound);
        assert_eq!(explorer.path(), &[cell(&world, 1, 1), cell(&world, 2, 1)]);
        assert_eq!(world.chat_log(), &["Starting maze exploration!".to_string()]);
    }

    #[test]
    fn turn_right_then_left_when_blocked() {
        let mut explorer = MazeExplorer::new(0);
        explorer.reset(Position::new(0, 64, 0));
        let stone = |x, z| {
            Some(Block {
                name: "stone".to_string(),
                position: Position::new(x, 64, z),
            })
        };
        let wall = |x, z| Observation {
            ahead: stone(x, z),
            underfoot: None,
        };

        assert_eq!(explorer.step(&wall(0, -1)), Action::Turn(Turn::Right));
        assert_eq!(explorer.step(&wall(1, 0)), Action::Turn(Turn::Around));
        let open_left = Observation {
            ahead: Some(Block {
                name: "air".to_string(),
                position: Position::new(-1, 64, 0),
            }),
            underfoot: None,
        };
        assert_eq!(
            explorer.step(&open_left),
            Action::Advance(Position::new(-1, 64, 0))
        );
        assert_eq!(explorer.phase(), Phase::CheckExit);
        assert_eq!(explorer.visited().len(), 2);
    }

    #[test]
    fn visited_cells_are_not_entered_again() {
        let mut explorer = MazeExplorer::new(0);
        let start = Position::new(0, 64, 0);
        explorer.reset(start);
        let back_at_start = Observation {
            ahead: Some(Block {
                name: "air".to_string(),
                position: start,
            }),
            underfoot: None,
        };
        assert_eq!(explorer.step(&back_at_start), Action::Turn(Turn::Right));
    }

    #[test]
    fn nothing_to_sense_is_nothing_to_enter() {
        let mut explorer = MazeExplorer::new(0);
        explorer.reset(Position::new(0, 64, 0));
        let gap = Observation::default();
        assert_eq!(explorer.step(&gap), Action::Turn(Turn::Right));
        assert_eq!(explorer.step(&gap), Action::Turn(Turn::Around));
        assert_eq!(explorer.step(&gap), Action::Finish(Outcome::Exhausted));
        assert_eq!(explorer.step(&gap), Action::Finish(Outcome::Exhausted));
    }

    #[test]
    fn sensing_gap_exhausts_instead_of_failing() {
        let emojis = "
🟫🟫🟫🟫🟫
🟫🏃🟩❎🟫
🟫🟫🟫🟫🟫
🟫🟫🟫🟫🟫
🟫🟫🟫🟫🟫";
        let mut world = corridor_world(emojis, (1, 1), Some((3, 1)))
            .with_heading(Heading::East)
            .with_view_distance(0);
        let outcome = MazeExplorer::new(0)
            .explore(&Session::new(), &mut world)
            .unwrap();
        assert_eq!(outcome, Outcome::Exhausted);
    }

    #[test]
    fn dead_end_branch_is_backtracked() {
        // Facing east from (1, 1): straight on into the dead end at (3, 1),
        // back, then left (south) towards the exit, stepping onto the plate.
        let emojis = "
🟫🟫🟫🟫🟫🟫🟫
🟫🏃🟩🟩🟫🟫🟫
🟫🟫🟩🟫🟫🟫🟫
🟫🟫🟩🟩🟩🟫🟫
🟫🟫🟫🟫❎🟫🟫
🟫🟫🟫🟫🟫🟫🟫
🟫🟫🟫🟫🟫🟫🟫";
        let mut world = corridor_world(emojis, (1, 1), Some((4, 4))).with_heading(Heading::East);
        let session = Session::new();
        let mut explorer = MazeExplorer::new(0);

        let outcome = explorer.explore(&session, &mut world).unwrap();
        assert_eq!(outcome, Outcome::ExitFound);
        assert!(world.chat_log().contains(&"Backtracking...".to_string()));
        assert!(explorer.visited().contains(&cell(&world, 3, 1)));
        assert!(!explorer.path().contains(&cell(&world, 3, 1)));
        assert_eq!(
            explorer.path(),
            &[
                cell(&world, 1, 1),
                cell(&world, 2, 1),
                cell(&world, 2, 2),
                cell(&world, 2, 3),
                cell(&world, 3, 3),
                cell(&world, 4, 3),
                cell(&world, 4, 4),
            ]
        );
    }

    #[test]
    fn start_facing_a_wall_with_the_way_behind_is_exhausted() {
        let emojis = "
🟫🟫🟫🟫🟫
🟫🏃🟩❎🟫
🟫🟫🟫🟫🟫
🟫🟫🟫🟫🟫
🟫🟫🟫🟫🟫";
        let mut world = corridor_world(emojis, (1, 1), Some((3, 1))).with_heading(Heading::West);
        let mut explorer = MazeExplorer::new(0);
        let outcome = explorer.explore(&Session::new(), &mut world).unwrap();
        assert_eq!(outcome, Outcome::Exhausted);
        assert_eq!(explorer.path().len(), 1);
        assert_eq!(world.trail().len(), 1);
    }

    #[test]
    fn closed_session_stops_before_moving() {
        let layout = MazeGenerator::new(Some(4)).generate(11).unwrap();
        let mut world = SimWorld::from_grid(
            "maze_bot",
            &layout.grid,
            (layout.start.x, layout.start.z),
            Some((layout.exit.x, layout.exit.z)),
        );
        let session = Session::new();
        session.close();
        let outcome = MazeExplorer::new(10).explore(&session, &mut world).unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(world.trail().len(), 1);
    }

    #[test]
    fn disconnected_before_start_is_cancelled() {
        let layout = MazeGenerator::new(Some(4)).generate(11).unwrap();
        let mut world = SimWorld::from_grid(
            "maze_bot",
            &layout.grid,
            (layout.start.x, layout.start.z),
            Some((layout.exit.x, layout.exit.z)),
        );
        world.disconnect();
        let outcome = MazeExplorer::new(10)
            .explore(&Session::new(), &mut world)
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(world.chat_log().is_empty());
        assert_eq!(world.ticks(), 0);
    }

    #[test]
    fn disconnect_stops_the_loop() {
        let layout = MazeGenerator::new(Some(4)).generate(21).unwrap();
        let mut world = SimWorld::from_grid(
            "maze_bot",
            &layout.grid,
            (1, 1),
            Some((layout.exit.x, layout.exit.z)),
        )
        .with_heading(Heading::South)
        .disconnect_at(30);
        let mut explorer = MazeExplorer::new(10);
        let outcome = explorer.explore(&Session::new(), &mut world).unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(explorer.steps() <= 3);
    }

    /// Drive the step machine by hand so every advance can be inspected
    fn run_checked(grid: &Grid, start: Point, heading: Heading, exit: Point) -> (Outcome, usize) {
        let mut world = SimWorld::from_grid(
            "maze_bot",
            grid,
            (start.x, start.z),
            Some((exit.x, exit.z)),
        )
        .with_heading(heading);
        let mut explorer = MazeExplorer::new(0);
        explorer.reset(world.feet());
        let mut actions = 0;
        loop {
            actions += 1;
            assert!(actions < 10 * grid.size() * grid.size(), "explorer loops");
            let observation = Observation {
                ahead: world.block_ahead(),
                underfoot: world.block_underfoot(),
            };
            let action = explorer.step(&observation);
            if let Action::Advance(target) = action {
                // Entering a tree cell, only the parent may already be visited
                let parent = world.feet();
                let here = Point {
                    x: target.x as usize,
                    z: target.z as usize,
                };
                for n in grid.open_neighbours(here) {
                    let pos = Position::new(n.x as i32, target.y, n.z as i32);
                    assert!(
                        pos == parent || !explorer.visited().contains(&pos),
                        "{pos} visited before its subtree was entered"
                    );
                }
            }
            match action {
                Action::Finish(outcome) => return (outcome, explorer.steps()),
                action => MazeExplorer::apply(action, &mut world).unwrap(),
            }
        }
    }

    #[test]
    fn generated_mazes_terminate_from_every_start() {
        for seed in 0..5 {
            let layout = MazeGenerator::new(Some(seed)).generate(11).unwrap();
            let open = layout.grid.open_cells();
            for &start in &open {
                for heading in Heading::ALL {
                    let (outcome, steps) = run_checked(&layout.grid, start, heading, layout.exit);
                    assert_ne!(outcome, Outcome::Cancelled);
                    // Every cell is entered at most once and left backwards at most once
                    assert!(steps <= 2 * open.len());
                }
            }
        }
    }

    #[test]
    fn exit_found_when_nothing_lies_behind_the_start() {
        for seed in 0..5 {
            let layout = MazeGenerator::new(Some(seed)).generate(15).unwrap();
            for start in layout.grid.open_cells() {
                let neighbours = layout.grid.open_neighbours(start);
                for heading in Heading::ALL {
                    let (bx, bz) = heading.opposite().offset();
                    let behind = Point {
                        x: (start.x as i32 + bx) as usize,
                        z: (start.z as i32 + bz) as usize,
                    };
                    if neighbours.contains(&behind) {
                        continue;
                    }
                    let (outcome, _) = run_checked(&layout.grid, start, heading, layout.exit);
                    assert_eq!(outcome, Outcome::ExitFound, "seed {seed} start {start:?}");
                }
            }
        }
    }
}
