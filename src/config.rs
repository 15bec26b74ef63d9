use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::input::ReversalPolicy;
use crate::snake::Position;
use crate::speed::{MAX_SPEED, MIN_SPEED};

const APP_DIR_NAME: &str = "terminal-snake";
const CONFIG_FILE_NAME: &str = "config.json";

/// Cell dimensions of a drawing surface.
///
/// The game surface includes a one-cell border on every side; use
/// [`GridSize::interior`] for the playable area.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Returns the playable area left after removing the one-cell border.
    #[must_use]
    pub fn interior(self) -> Self {
        Self {
            width: self.width.saturating_sub(2),
            height: self.height.saturating_sub(2),
        }
    }
}

/// Game surface width, border included.
pub const DEFAULT_SURFACE_WIDTH: u16 = 60;

/// Game surface height, border included.
pub const DEFAULT_SURFACE_HEIGHT: u16 = 22;

/// Number of visible lines in the log panel.
pub const DEFAULT_LOG_LINES: u16 = 5;

pub const GLYPH_SNAKE_HEAD: char = '#';
pub const GLYPH_FOOD: char = '@';
pub const GLYPH_EMPTY: char = ' ';

pub const GAME_OVER_MESSAGE: &str = "Game over!";

/// Construction-time parameters for one game session.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub width: u16,
    pub height: u16,
    pub log_lines: u16,
    pub initial_speed: u8,
    pub origin: Position,
    pub reversal: ReversalPolicy,
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SURFACE_WIDTH,
            height: DEFAULT_SURFACE_HEIGHT,
            log_lines: DEFAULT_LOG_LINES,
            initial_speed: MIN_SPEED,
            origin: Position { x: 0, y: 0 },
            reversal: ReversalPolicy::Allow,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Returns the game surface dimensions, border included.
    #[must_use]
    pub fn surface(&self) -> GridSize {
        GridSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Checks the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let interior = self.surface().interior();
        if interior.width == 0 || interior.height == 0 {
            return Err(ConfigError::GridTooSmall {
                width: self.width,
                height: self.height,
            });
        }

        if !self.origin.is_within_bounds(interior) {
            return Err(ConfigError::OriginOutsideInterior {
                x: self.origin.x,
                y: self.origin.y,
            });
        }

        if !(MIN_SPEED..=MAX_SPEED).contains(&self.initial_speed) {
            return Err(ConfigError::SpeedOutOfRange(self.initial_speed));
        }

        Ok(())
    }
}

/// Returns the platform-correct config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    let mut base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(CONFIG_FILE_NAME);
    base
}

/// Returns the default log file location.
#[must_use]
pub fn default_log_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push("terminal-snake.log");
    base
}

/// Loads session parameters from `path`.
///
/// A missing file yields the defaults; a file that exists but cannot be
/// read or parsed is an error so the caller can report it before the
/// terminal enters raw mode.
pub fn load_session_config(path: &Path) -> Result<SessionConfig, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SessionConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{GridSize, SessionConfig, load_session_config};
    use crate::error::ConfigError;
    use crate::input::ReversalPolicy;
    use crate::snake::Position;

    #[test]
    fn interior_strips_one_cell_border() {
        let surface = GridSize {
            width: 12,
            height: 12,
        };

        assert_eq!(
            surface.interior(),
            GridSize {
                width: 10,
                height: 10
            }
        );
        assert_eq!(surface.interior().total_cells(), 100);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let path = unique_test_path("missing");
        let loaded = load_session_config(&path).expect("missing file should yield defaults");
        assert_eq!(loaded, SessionConfig::default());
    }

    #[test]
    fn partial_config_file_keeps_other_defaults() {
        let path = unique_test_path("partial");
        write_test_file(&path, r#"{ "width": 30, "reversal": "reject" }"#);

        let loaded = load_session_config(&path).expect("partial config should parse");
        assert_eq!(loaded.width, 30);
        assert_eq!(loaded.reversal, ReversalPolicy::Reject);
        assert_eq!(loaded.height, SessionConfig::default().height);

        cleanup_test_path(&path);
    }

    #[test]
    fn malformed_config_file_returns_parse_error() {
        let path = unique_test_path("malformed");
        write_test_file(&path, "not-json");

        assert!(matches!(
            load_session_config(&path),
            Err(ConfigError::Parse { .. })
        ));

        cleanup_test_path(&path);
    }

    #[test]
    fn validation_rejects_degenerate_surfaces() {
        let config = SessionConfig {
            width: 2,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridTooSmall { .. })
        ));
    }

    #[test]
    fn validation_rejects_origin_outside_interior() {
        let config = SessionConfig {
            width: 12,
            height: 12,
            origin: Position { x: 10, y: 0 },
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OriginOutsideInterior { x: 10, y: 0 })
        ));
    }

    #[test]
    fn validation_rejects_speed_out_of_range() {
        let config = SessionConfig {
            initial_speed: 11,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SpeedOutOfRange(11))
        ));
        assert!(SessionConfig::default().validate().is_ok());
    }

    fn write_test_file(path: &PathBuf, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("test parent directory should be creatable");
        }
        fs::write(path, contents).expect("test file write should succeed");
    }

    fn unique_test_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();

        std::env::temp_dir()
            .join("snake-config-tests")
            .join(format!("{label}-{nanos}.json"))
    }

    fn cleanup_test_path(path: &PathBuf) {
        let _ = fs::remove_file(path);
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir(parent);
        }
    }
}
