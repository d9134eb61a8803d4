//! Maze generation

use anyhow::{anyhow, bail};
use itertools::Itertools;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::config::{check_size, ConfigError};

/// Cell on the maze grid
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub struct Point {
    pub x: usize,
    pub z: usize,
}

/// Square open/wall matrix of a perfect maze
///
/// `cells[x][z]` is `true` when the cell is open. Rooms sit on odd/odd
/// coordinates, passages between two rooms on odd/even or even/odd ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<bool>>,
}

/// A generated maze with its designated exit and physical start cell
#[derive(Clone, Debug)]
pub struct MazeLayout {
    pub grid: Grid,
    pub exit: Point,
    pub start: Point,
}

/// Maze generator
pub struct MazeGenerator {
    random: StdRng,
}

impl Grid {
    pub const S_WALL: char = '🟫';
    pub const S_VALID: char = '🟩';
    pub const S_GOAL: char = '❎';
    pub const S_HERO: char = '🏃';

    fn closed(size: usize) -> Self {
        Self {
            size,
            cells: (0..size).map(|_| vec![false; size]).collect(),
        }
    }

    /// Parse a square grid picture, one row per `z`
    ///
    /// Walls are [Self::S_WALL]; open, goal and hero glyphs are all open.
    ///
    /// # Examples
    /// ```
    /// use maze_runner::maze_generator::Grid;
    ///
    /// let grid = Grid::parse_emojis("
    /// 🟫🟫🟫🟫🟫
    /// 🟫🏃🟩❎🟫
    /// 🟫🟫🟫🟫🟫
    /// 🟫🟫🟫🟫🟫
    /// 🟫🟫🟫🟫🟫".trim()).unwrap();
    /// assert!(grid.is_open(3, 1));
    /// assert!(!grid.is_open(1, 2));
    /// ```
    pub fn parse_emojis(emojis: &str) -> anyhow::Result<Self> {
        let rows: Vec<Vec<char>> = emojis
            .split('\n')
            .map(|row| row.trim().chars().collect())
            .collect();
        let size = rows.len();
        let mut grid = Self::closed(size);
        for (z, row) in rows.iter().enumerate() {
            if row.len() != size {
                bail!("Row {} has {} cells, expected {}", z, row.len(), size);
            }
            for (x, c) in row.iter().enumerate() {
                match *c {
                    Self::S_WALL => (),
                    Self::S_VALID | Self::S_GOAL | Self::S_HERO => grid.open(x, z),
                    val => {
                        return Err(anyhow!(format!(
                            "Unexpected character `{}` at x={}, z={}",
                            val, x, z
                        )))
                    }
                }
            }
        }
        Ok(grid)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether `(x, z)` is walkable; anything outside the grid is wall
    pub fn is_open(&self, x: usize, z: usize) -> bool {
        self.cells
            .get(x)
            .and_then(|column| column.get(z))
            .copied()
            .unwrap_or(false)
    }

    fn open(&mut self, x: usize, z: usize) {
        self.cells[x][z] = true;
    }

    /// All open cells, x-major
    pub fn open_cells(&self) -> Vec<Point> {
        (0..self.size)
            .cartesian_product(0..self.size)
            .filter(|&(x, z)| self.cells[x][z])
            .map(|(x, z)| Point { x, z })
            .collect()
    }

    /// Open 4-neighbours of an open cell
    pub fn open_neighbours(&self, point: Point) -> Vec<Point> {
        let Point { x, z } = point;
        [
            (x.checked_add(1), Some(z)),
            (x.checked_sub(1), Some(z)),
            (Some(x), z.checked_add(1)),
            (Some(x), z.checked_sub(1)),
        ]
        .into_iter()
        .filter_map(|(nx, nz)| Some(Point { x: nx?, z: nz? }))
        .filter(|p| self.is_open(p.x, p.z))
        .collect()
    }

    /// Text picture of the grid, one row per `z`
    ///
    /// `marks` overlay single cells with their own glyph.
    pub fn render(&self, marks: &[(Point, char)]) -> String {
        (0..self.size)
            .map(|z| {
                (0..self.size)
                    .map(|x| {
                        marks
                            .iter()
                            .rev()
                            .find(|(p, _)| *p == Point { x, z })
                            .map(|(_, c)| *c)
                            .unwrap_or(if self.cells[x][z] {
                                Self::S_VALID
                            } else {
                                Self::S_WALL
                            })
                    })
                    .join("")
            })
            .join("\n")
    }
}

impl MazeLayout {
    /// Grid picture with the start and exit marked
    pub fn render(&self) -> String {
        self.grid
            .render(&[(self.exit, Grid::S_GOAL), (self.start, Grid::S_HERO)])
    }
}

impl MazeGenerator {
    const DIRECTIONS: [(isize, isize); 4] = [(2, 0), (-2, 0), (0, 2), (0, -2)];

    pub fn new(seed: Option<u64>) -> Self {
        Self {
            random: if let Some(state) = seed {
                StdRng::seed_from_u64(state)
            } else {
                StdRng::from_entropy()
            },
        }
    }

    /// Generate a perfect maze of `size` x `size` cells
    ///
    /// The exit is the room at `(size - 2, size - 2)`; the start is a
    /// uniformly random open cell. Both are reachable from each other since
    /// the open cells form a single tree.
    ///
    /// # Examples
    /// ```
    /// use maze_runner::maze_generator::MazeGenerator;
    ///
    /// let layout = MazeGenerator::new(Some(7)).generate(11).unwrap();
    /// assert!(layout.grid.is_open(1, 1));
    /// assert!(layout.grid.is_open(9, 9));
    /// ```
    pub fn generate(&mut self, size: usize) -> Result<MazeLayout, ConfigError> {
        let grid = self.build_grid(size)?;
        let exit = Point {
            x: size - 2,
            z: size - 2,
        };
        let open_cells = grid.open_cells();
        let start = open_cells
            .choose(&mut self.random)
            .copied()
            .unwrap_or(Point { x: 1, z: 1 });
        Ok(MazeLayout { grid, exit, start })
    }

    /// Carve a spanning tree over the rooms with an iterative backtracker
    ///
    /// From the room on top of the stack, pick a random still-closed room two
    /// cells away, open it together with the passage in between and push it.
    /// Rooms without closed neighbours are popped.
    pub fn build_grid(&mut self, size: usize) -> Result<Grid, ConfigError> {
        check_size(size)?;
        let mut grid = Grid::closed(size);
        grid.open(1, 1);
        let mut stack = vec![Point { x: 1, z: 1 }];

        while let Some(&current) = stack.last() {
            let candidates = Self::DIRECTIONS
                .iter()
                .filter_map(|&(dx, dz)| {
                    let nx = current.x.checked_add_signed(dx)?;
                    let nz = current.z.checked_add_signed(dz)?;
                    let inside = nx > 0 && nz > 0 && nx < size - 1 && nz < size - 1;
                    (inside && !grid.is_open(nx, nz)).then_some((dx, dz))
                })
                .collect::<Vec<_>>();

            match candidates.choose(&mut self.random) {
                None => {
                    stack.pop();
                }
                Some(&(dx, dz)) => {
                    let wall_x = current.x.wrapping_add_signed(dx / 2);
                    let wall_z = current.z.wrapping_add_signed(dz / 2);
                    let next = Point {
                        x: current.x.wrapping_add_signed(dx),
                        z: current.z.wrapping_add_signed(dz),
                    };
                    grid.open(wall_x, wall_z);
                    grid.open(next.x, next.z);
                    stack.push(next);
                }
            }
        }

        Ok(grid)
    }
}
