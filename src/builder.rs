//! Materialize a generated maze in the world

use anyhow::Context;
use log::{debug, info};

use crate::maze_generator::{MazeGenerator, MazeLayout, Point};
use crate::session::Session;
use crate::world::{EditCommand, RelPos, World};
use crate::MazeConfig;

/// Generates mazes and issues the world edits that build them around the
/// character
pub struct MazeBuilder {
    generator: MazeGenerator,
    size: usize,
    wall_height: i32,
    edit_pause_ticks: u32,
}

impl MazeBuilder {
    const FLOOR: &'static str = "grass_block";
    const WALL: &'static str = "stone";
    const OPEN: &'static str = "air";
    const EXIT: &'static str = "stone_pressure_plate";

    pub fn new(config: &MazeConfig) -> Self {
        Self {
            generator: MazeGenerator::new(config.seed),
            size: config.size,
            wall_height: config.wall_height,
            edit_pause_ticks: config.edit_pause_ticks,
        }
    }

    /// Build a fresh maze centred on the character and move it to a random
    /// open cell
    ///
    /// Returns `Ok(None)` without touching the world when another
    /// generation holds the session, or the session is closed.
    pub fn build<W: World>(
        &mut self,
        session: &Session,
        world: &mut W,
    ) -> anyhow::Result<Option<MazeLayout>> {
        let Some(_guard) = session.try_begin_generation() else {
            debug!("Maze generation already in progress, request dropped");
            return Ok(None);
        };

        let layout = self.generator.generate(self.size)?;
        info!("Generating new maze...");

        let half = (self.size / 2) as i32;
        let top = self.wall_height - 1;

        // Clear the old area and lay the floor
        self.issue(
            world,
            EditCommand::Fill {
                from: RelPos::new(-half, -1, -half),
                to: RelPos::new(half, -1, half),
                block: Self::FLOOR.to_string(),
            },
        )?;
        world.wait_ticks(self.edit_pause_ticks)?;
        self.issue(
            world,
            EditCommand::Fill {
                from: RelPos::new(-half, 0, -half),
                to: RelPos::new(half, top, half),
                block: Self::WALL.to_string(),
            },
        )?;
        world.wait_ticks(self.edit_pause_ticks)?;

        for Point { x, z } in layout.grid.open_cells() {
            let (rx, rz) = (x as i32 - half, z as i32 - half);
            self.issue(
                world,
                EditCommand::Fill {
                    from: RelPos::new(rx, 0, rz),
                    to: RelPos::new(rx, top, rz),
                    block: Self::OPEN.to_string(),
                },
            )?;
        }

        self.issue(
            world,
            EditCommand::SetBlock {
                at: RelPos::new(layout.exit.x as i32 - half, 0, layout.exit.z as i32 - half),
                block: Self::EXIT.to_string(),
            },
        )?;

        let target = world.username().to_string();
        self.issue(
            world,
            EditCommand::Teleport {
                target,
                to: RelPos::new(
                    layout.start.x as i32 - half,
                    0,
                    layout.start.z as i32 - half,
                ),
            },
        )?;

        info!(
            "Maze ready! {}x{} cells, start at ({}, {}), exit at ({}, {})",
            self.size, self.size, layout.start.x, layout.start.z, layout.exit.x, layout.exit.z
        );
        Ok(Some(layout))
    }

    fn issue<W: World>(&self, world: &mut W, command: EditCommand) -> anyhow::Result<()> {
        let text = command.to_string();
        world
            .edit(command)
            .with_context(|| format!("Failed to issue `{text}`"))
    }
}
