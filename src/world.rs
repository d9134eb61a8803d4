//! Interface to the voxel world the character lives in
//!
//! The game connection itself is not part of this crate; it implements
//! [World]. [crate::sim::SimWorld] is an in-process implementation.

use std::fmt;

use crate::{Block, Heading, Position, Vec3};

/// Coordinate relative to the character, rendered `~` or `~n`
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Rel(pub i32);

/// Block position relative to the character
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct RelPos {
    pub x: Rel,
    pub y: Rel,
    pub z: Rel,
}

/// One-shot world edit, issued as a chat command
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum EditCommand {
    /// Fill the box between two corners (inclusive) with `block`
    Fill {
        from: RelPos,
        to: RelPos,
        block: String,
    },
    SetBlock {
        at: RelPos,
        block: String,
    },
    /// Move the player named `target`
    Teleport {
        target: String,
        to: RelPos,
    },
}

/// Reorientation of the character
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Turn {
    /// 90 degrees clockwise
    Right,
    /// 180 degrees counter-clockwise
    Around,
}

/// Capabilities the maze logic needs from the world
///
/// Sensing is immediate against the locally known world. Movement, turning
/// and waiting return once the world has applied them. Edits are
/// fire-and-forget: `Ok` means issued, not applied.
pub trait World {
    fn username(&self) -> &str;

    /// `false` once the session with the world has ended
    fn is_connected(&self) -> bool;

    fn position(&self) -> Vec3;

    fn heading(&self) -> Heading;

    /// Block directly in front of the character at feet level
    fn block_ahead(&self) -> Option<Block>;

    /// Block the character stands on
    fn block_underfoot(&self) -> Option<Block>;

    /// Walk onto an adjacent cell
    fn move_to(&mut self, target: Position) -> anyhow::Result<()>;

    fn face(&mut self, heading: Heading) -> anyhow::Result<()>;

    fn turn(&mut self, turn: Turn) -> anyhow::Result<()> {
        let heading = turn.apply(self.heading());
        self.face(heading)
    }

    fn edit(&mut self, command: EditCommand) -> anyhow::Result<()>;

    fn chat(&mut self, message: &str) -> anyhow::Result<()>;

    fn wait_ticks(&mut self, ticks: u32) -> anyhow::Result<()>;
}

impl RelPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self {
            x: Rel(x),
            y: Rel(y),
            z: Rel(z),
        }
    }

    /// Absolute position, relative to `origin`
    pub fn resolve(&self, origin: Position) -> Position {
        origin.offset(self.x.0, self.y.0, self.z.0)
    }
}

impl Turn {
    /// Heading after the turn
    pub fn apply(&self, heading: Heading) -> Heading {
        match self {
            Turn::Right => heading.right(),
            Turn::Around => heading.opposite(),
        }
    }

    /// Yaw change in radians, in the game's sense
    ///
    /// For [World] implementations that turn by adding to the yaw.
    pub fn yaw_delta(&self) -> f64 {
        use std::f64::consts::{FRAC_PI_2, PI};
        match self {
            Turn::Right => -FRAC_PI_2,
            Turn::Around => PI,
        }
    }
}

impl fmt::Display for Rel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "~"),
            n => write!(f, "~{n}"),
        }
    }
}

impl fmt::Display for RelPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

impl fmt::Display for EditCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditCommand::Fill { from, to, block } => write!(f, "/fill {from} {to} {block}"),
            EditCommand::SetBlock { at, block } => write!(f, "/setblock {at} {block}"),
            EditCommand::Teleport { target, to } => write!(f, "/tp {target} {to}"),
        }
    }
}
