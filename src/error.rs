use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures surfaced by the game engine and its ports.
#[derive(Debug, Error)]
pub enum GameError {
    /// The snake fills the interior so no cell is left for food.
    #[error("no free cell for food: {interior_cells} interior cells, snake length {snake_len}")]
    FoodStarvation {
        interior_cells: usize,
        snake_len: usize,
    },

    /// A render or input port failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Problems with session parameters, raised before the terminal is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("game surface {width}x{height} leaves no interior (minimum is 3x3)")]
    GridTooSmall { width: u16, height: u16 },

    #[error("snake origin ({x}, {y}) lies outside the playable interior")]
    OriginOutsideInterior { x: i32, y: i32 },

    #[error("initial speed {0} is outside 1..=10")]
    SpeedOutOfRange(u8),
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, GameError};

    #[test]
    fn config_errors_display_their_own_message() {
        let error = GameError::from(ConfigError::GridTooSmall {
            width: 2,
            height: 22,
        });

        assert_eq!(
            error.to_string(),
            "game surface 2x22 leaves no interior (minimum is 3x3)"
        );
    }

    #[test]
    fn starvation_names_both_counts() {
        let error = GameError::FoodStarvation {
            interior_cells: 1,
            snake_len: 1,
        };

        assert_eq!(
            error.to_string(),
            "no free cell for food: 1 interior cells, snake length 1"
        );
    }
}
