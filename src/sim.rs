//! In-process voxel world
//!
//! Applies the same edit commands a game server would receive, resolves `~`
//! against the player's current feet cell, and lets the explorer sense and
//! walk through the result. Cells never written read as air; cells farther
//! than the view distance read as unknown.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use anyhow::bail;
use itertools::Itertools;
use log::debug;

use crate::maze_generator::Grid;
use crate::world::{EditCommand, World};
use crate::{is_pathable, Block, Heading, Position, Vec3};

pub struct SimWorld {
    username: String,
    blocks: HashMap<Position, String>,
    feet: Position,
    heading: Heading,
    view_distance: i32,
    connected: bool,
    /// Tick at which the connection drops by itself
    disconnect_at: Option<u64>,
    ticks: u64,
    commands: Vec<String>,
    chat: Vec<String>,
    /// Cells walked since the last teleport, starting with the landing cell
    trail: Vec<Position>,
    /// Feet cell when the last fill was issued
    build_origin: Option<Position>,
}

impl SimWorld {
    const AIR: &'static str = "air";
    pub const SPAWN: Position = Position { x: 0, y: 64, z: 0 };

    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            blocks: HashMap::new(),
            feet: Self::SPAWN,
            heading: Heading::North,
            view_distance: 64,
            connected: true,
            disconnect_at: None,
            ticks: 0,
            commands: Vec::new(),
            chat: Vec::new(),
            trail: vec![Self::SPAWN],
            build_origin: None,
        }
    }

    /// Lay out a grid directly, the way the builder's commands would, with
    /// the player on `start` and a pressure plate on `exit`
    pub fn from_grid(
        username: &str,
        grid: &Grid,
        start: (usize, usize),
        exit: Option<(usize, usize)>,
    ) -> Self {
        let mut world = Self::new(username);
        let n = grid.size();
        for (x, z) in (0..n).cartesian_product(0..n) {
            let pos = Position::new(x as i32, Self::SPAWN.y, z as i32);
            world.set(pos.offset(0, -1, 0), "grass_block");
            if !grid.is_open(x, z) {
                world.set(pos, "stone");
            }
        }
        if let Some((x, z)) = exit {
            world.set(
                Position::new(x as i32, Self::SPAWN.y, z as i32),
                "stone_pressure_plate",
            );
        }
        world.feet = Position::new(start.0 as i32, Self::SPAWN.y, start.1 as i32);
        world.trail = vec![world.feet];
        world.build_origin = Some(Position::new(
            (n / 2) as i32,
            Self::SPAWN.y,
            (n / 2) as i32,
        ));
        world
    }

    pub fn with_view_distance(mut self, view_distance: i32) -> Self {
        self.view_distance = view_distance;
        self
    }

    pub fn with_heading(mut self, heading: Heading) -> Self {
        self.heading = heading;
        self
    }

    /// Drop the connection once the world has waited `ticks` ticks in total
    pub fn disconnect_at(mut self, ticks: u64) -> Self {
        self.disconnect_at = Some(ticks);
        self
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    pub fn feet(&self) -> Position {
        self.feet
    }

    /// Block name at `pos`, `None` when out of view
    pub fn block_name(&self, pos: Position) -> Option<&str> {
        let far = (pos.x - self.feet.x).abs().max((pos.z - self.feet.z).abs());
        if far > self.view_distance {
            return None;
        }
        Some(self.blocks.get(&pos).map_or(Self::AIR, String::as_str))
    }

    /// Chat text of every edit issued so far
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn chat_log(&self) -> &[String] {
        &self.chat
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn trail(&self) -> &[Position] {
        &self.trail
    }

    pub fn build_origin(&self) -> Option<Position> {
        self.build_origin
    }

    fn set(&mut self, pos: Position, name: &str) {
        if name == Self::AIR {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, name.to_string());
        }
    }

    fn sense(&self, pos: Position) -> Option<Block> {
        self.block_name(pos).map(|name| Block {
            name: name.to_string(),
            position: pos,
        })
    }

    /// Text picture of the `2 * half + 1` square around `center` at feet
    /// level, with the player drawn on `hero`
    pub fn render_around(&self, center: Position, half: i32, hero: Option<Position>) -> String {
        (-half..=half)
            .map(|dz| {
                (-half..=half)
                    .map(|dx| {
                        let pos = center.offset(dx, 0, dz);
                        if Some(pos) == hero {
                            return Grid::S_HERO;
                        }
                        match self.blocks.get(&pos).map(String::as_str) {
                            None => Grid::S_VALID,
                            Some(name) if name.contains("pressure_plate") => Grid::S_GOAL,
                            Some(_) => Grid::S_WALL,
                        }
                    })
                    .join("")
            })
            .join("\n")
    }

    /// Replay the walk since the last teleport on the terminal
    ///
    /// ## Arguments
    /// - `half`: Half the side length of the drawn area.
    /// - `step_ms`: Time step for each frame, milliseconds.
    pub fn playback(&self, half: i32, step_ms: u64) {
        let Some(center) = self.build_origin else {
            return;
        };
        for pos in &self.trail {
            print!("\x1B[2J\x1B[1;1H");
            println!("{}", self.render_around(center, half, Some(*pos)));
            thread::sleep(Duration::from_millis(step_ms));
        }
    }
}

impl World for SimWorld {
    fn username(&self) -> &str {
        &self.username
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn position(&self) -> Vec3 {
        self.feet.center()
    }

    fn heading(&self) -> Heading {
        self.heading
    }

    fn block_ahead(&self) -> Option<Block> {
        self.sense(self.feet.step(self.heading))
    }

    /// A pressure plate in the feet cell is what the player stands on
    fn block_underfoot(&self) -> Option<Block> {
        match self.sense(self.feet) {
            Some(block) if block.name.contains("pressure_plate") => Some(block),
            _ => self.sense(self.feet.offset(0, -1, 0)),
        }
    }

    fn move_to(&mut self, target: Position) -> anyhow::Result<()> {
        if !self.connected {
            bail!("Not connected");
        }
        if target.y != self.feet.y || Heading::between(self.feet, target).is_none() {
            bail!("{} is not adjacent to {}", target, self.feet);
        }
        let block = self.sense(target);
        if !is_pathable(block.as_ref()) {
            bail!("{} is blocked by {:?}", target, block.map(|b| b.name));
        }
        self.feet = target;
        self.trail.push(target);
        Ok(())
    }

    fn face(&mut self, heading: Heading) -> anyhow::Result<()> {
        if !self.connected {
            bail!("Not connected");
        }
        self.heading = heading;
        Ok(())
    }

    fn edit(&mut self, command: EditCommand) -> anyhow::Result<()> {
        if !self.connected {
            bail!("Not connected");
        }
        self.commands.push(command.to_string());
        let origin = self.feet;
        match command {
            EditCommand::Fill { from, to, block } => {
                self.build_origin = Some(origin);
                let (a, b) = (from.resolve(origin), to.resolve(origin));
                for x in a.x.min(b.x)..=a.x.max(b.x) {
                    for y in a.y.min(b.y)..=a.y.max(b.y) {
                        for z in a.z.min(b.z)..=a.z.max(b.z) {
                            self.set(Position::new(x, y, z), &block);
                        }
                    }
                }
            }
            EditCommand::SetBlock { at, block } => self.set(at.resolve(origin), &block),
            EditCommand::Teleport { target, to } => {
                if target == self.username {
                    self.feet = to.resolve(origin);
                    self.trail = vec![self.feet];
                } else {
                    debug!("No player named {target}, teleport ignored");
                }
            }
        }
        Ok(())
    }

    fn chat(&mut self, message: &str) -> anyhow::Result<()> {
        if !self.connected {
            bail!("Not connected");
        }
        self.chat.push(message.to_string());
        Ok(())
    }

    fn wait_ticks(&mut self, ticks: u32) -> anyhow::Result<()> {
        self.ticks += u64::from(ticks);
        if self.disconnect_at.is_some_and(|at| self.ticks >= at) {
            self.connected = false;
        }
        Ok(())
    }
}
