//! Build a perfect maze in a voxel world and walk a character out of it
//!
//! The [maze_generator] carves a random spanning tree on an odd-sized grid,
//! the [builder] turns it into world edit commands and the [explorer] finds
//! the exit using only what is directly ahead, left and right of the
//! character, plus a memory of visited cells and a backtrack stack.
//!
//! # Examples
//! ```
//! use maze_runner::{runner::MazeRunner, sim::SimWorld, MazeConfig, Outcome};
//!
//! let config = MazeConfig {
//!     size: 11,
//!     settle_ticks: 0,
//!     seed: Some(5),
//!     ..MazeConfig::default()
//! };
//! let mut world = SimWorld::new("maze_bot");
//! let report = MazeRunner::new(config).run(&mut world).unwrap();
//! assert_eq!(report.outcome, Outcome::ExitFound);
//! report.print_report();
//! ```

use std::fmt;

pub mod builder;
pub mod config;
pub mod explorer;
pub mod maze_generator;
pub mod runner;
pub mod session;
pub mod sim;
pub mod world;

pub use config::{ConfigError, MazeConfig};
pub use explorer::{MazeExplorer, Outcome};
pub use maze_generator::{MazeGenerator, MazeLayout};

/// Continuous world coordinate
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Block cell in the world, the floor of a [Vec3] on each axis
///
/// Used directly as the key of the explorer's visited set.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Horizontal facing of the character, clockwise from north
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Heading {
    /// Towards -z
    North,
    /// Towards +x
    East,
    /// Towards +z
    South,
    /// Towards -x
    West,
}

/// Sensed block
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Block {
    pub name: String,
    pub position: Position,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn floored(&self) -> Position {
        Position {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
            z: self.z.floor() as i32,
        }
    }
}

impl Position {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Neighbouring cell in the direction of `heading`
    pub fn step(&self, heading: Heading) -> Self {
        let (dx, dz) = heading.offset();
        self.offset(dx, 0, dz)
    }

    /// Middle of the block's footprint, at its bottom face
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y),
            f64::from(self.z) + 0.5,
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Canonical `"x,y,z"` key of a continuous position
///
/// # Examples
/// ```
/// use maze_runner::{pos_key, Vec3};
///
/// assert_eq!(pos_key(Vec3::new(1.9, 64.1, -3.2)), "1,64,-4");
/// ```
pub fn pos_key(pos: Vec3) -> String {
    pos.floored().to_string()
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    /// Unit step `(dx, dz)`
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Heading::North => (0, -1),
            Heading::East => (1, 0),
            Heading::South => (0, 1),
            Heading::West => (-1, 0),
        }
    }

    /// 90 degrees clockwise
    pub fn right(&self) -> Self {
        match self {
            Heading::North => Heading::East,
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
        }
    }

    /// 90 degrees counter-clockwise
    pub fn left(&self) -> Self {
        self.right().right().right()
    }

    pub fn opposite(&self) -> Self {
        self.right().right()
    }

    /// Direction of the single horizontal step from `from` to `to`, if any
    pub fn between(from: Position, to: Position) -> Option<Self> {
        let delta = (to.x - from.x, to.z - from.z);
        Self::ALL.into_iter().find(|h| h.offset() == delta)
    }

    /// Game yaw in radians, looking along `(-sin(yaw), -cos(yaw))`
    ///
    /// For [world::World] implementations whose transport steers by yaw.
    pub fn yaw(&self) -> f64 {
        use std::f64::consts::{FRAC_PI_2, PI};
        match self {
            Heading::North => 0.0,
            Heading::West => FRAC_PI_2,
            Heading::South => PI,
            Heading::East => -FRAC_PI_2,
        }
    }

    /// Closest heading to a game yaw, as reported by a yaw-based transport
    pub fn from_yaw(yaw: f64) -> Self {
        let (dx, dz) = (-yaw.sin(), -yaw.cos());
        if dx.abs() > dz.abs() {
            if dx > 0.0 {
                Heading::East
            } else {
                Heading::West
            }
        } else if dz > 0.0 {
            Heading::South
        } else {
            Heading::North
        }
    }
}

const PRESSURE_PLATE: &str = "pressure_plate";

/// Whether the character may step into the block: air, or the exit marker
pub fn is_pathable(block: Option<&Block>) -> bool {
    block.is_some_and(|b| b.name == "air" || b.name.contains(PRESSURE_PLATE))
}

/// Whether the block is an exit marker; any pressure plate variant counts
pub fn is_exit_block(block: Option<&Block>) -> bool {
    block.is_some_and(|b| b.name.contains(PRESSURE_PLATE))
}
