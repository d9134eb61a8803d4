//! Run configuration

use thiserror::Error;

/// Configuration errors; fatal, raised before any world edit is issued
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("maze size must be an odd number of at least {min}, got {size}")]
    InvalidSize { size: usize, min: usize },

    #[error("wall height must be at least 1, got {0}")]
    InvalidWallHeight(i32),
}

/// Parameters of one maze session
///
/// Read once at startup and passed in; never re-read while running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeConfig {
    /// Side length of the square grid, odd and at least [Self::MIN_SIZE]
    pub size: usize,
    /// Height of the maze walls in blocks
    pub wall_height: i32,
    /// World ticks to wait after every exploration decision
    pub settle_ticks: u32,
    /// World ticks to wait after each large fill command
    pub edit_pause_ticks: u32,
    /// Maximum number of mazes to build per run, `0` for no limit
    pub max_attempts: usize,
    /// Random seed for maze generation, entropy when `None`
    pub seed: Option<u64>,
}

impl MazeConfig {
    pub const MIN_SIZE: usize = 5;
    pub const DEFAULT_SIZE: usize = 21;
    pub const DEFAULT_WALL_HEIGHT: i32 = 3;

    /// Validated configuration with default pacing
    ///
    /// # Examples
    /// ```
    /// use maze_runner::MazeConfig;
    ///
    /// assert!(MazeConfig::new(21, 3).is_ok());
    /// assert!(MazeConfig::new(20, 3).is_err());
    /// ```
    pub fn new(size: usize, wall_height: i32) -> Result<Self, ConfigError> {
        let config = Self {
            size,
            wall_height,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_size(self.size)?;
        if self.wall_height < 1 {
            return Err(ConfigError::InvalidWallHeight(self.wall_height));
        }
        Ok(())
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            size: Self::DEFAULT_SIZE,
            wall_height: Self::DEFAULT_WALL_HEIGHT,
            settle_ticks: 10,
            edit_pause_ticks: 2,
            max_attempts: 0,
            seed: None,
        }
    }
}

/// Grid sizes must be odd so that rooms sit on odd coordinates inside the border
pub(crate) fn check_size(size: usize) -> Result<(), ConfigError> {
    if size < MazeConfig::MIN_SIZE || size % 2 == 0 {
        return Err(ConfigError::InvalidSize {
            size,
            min: MazeConfig::MIN_SIZE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MazeConfig::default();
        assert_eq!(config.size, 21);
        assert_eq!(config.wall_height, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reject_even_and_small_sizes() {
        for size in [0, 1, 3, 4, 6, 20] {
            assert_eq!(
                MazeConfig::new(size, 3),
                Err(ConfigError::InvalidSize { size, min: 5 })
            );
        }
        assert!(MazeConfig::new(5, 3).is_ok());
    }

    #[test]
    fn reject_flat_walls() {
        assert_eq!(
            MazeConfig::new(7, 0),
            Err(ConfigError::InvalidWallHeight(0))
        );
    }
}
