use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::input::Direction;
use crate::snake::Position;

/// Default edge length of one grid cell, in field units.
pub const DEFAULT_CELL_SIZE: u32 = 20;

/// Default interval between discrete simulation steps.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Default field width in cells.
pub const DEFAULT_FIELD_WIDTH_CELLS: u16 = 40;

/// Default field height in cells.
pub const DEFAULT_FIELD_HEIGHT_CELLS: u16 = 30;

/// Number of food items kept on the field.
pub const DEFAULT_FOOD_COUNT: usize = 4;

/// Candidate cells drawn before spawn placement accepts a collision.
pub const MAX_SPAWN_ATTEMPTS: u32 = 10;

/// Starting cell of the snake head, as `(column, row)`.
pub const START_CELL: (u16, u16) = (5, 5);

/// Starting travel direction of the snake.
pub const START_DIRECTION: Direction = Direction::Down;

/// Immutable grid geometry and timing shared by every simulation component.
///
/// Entity coordinates are expressed in field units: multiples of
/// `cell_size` inside `[0, width * cell_size) x [0, height * cell_size)`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cell_size: u32,
    pub tick_interval_ms: u64,
    pub field_width_cells: u16,
    pub field_height_cells: u16,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            field_width_cells: DEFAULT_FIELD_WIDTH_CELLS,
            field_height_cells: DEFAULT_FIELD_HEIGHT_CELLS,
        }
    }
}

impl GridConfig {
    /// Builds a validated configuration.
    pub fn new(
        cell_size: u32,
        tick_interval_ms: u64,
        field_width_cells: u16,
        field_height_cells: u16,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            cell_size,
            tick_interval_ms,
            field_width_cells,
            field_height_cells,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Rejects zero-sized cells, fields, or tick intervals, and fields whose
    /// extent would not fit in `i32` coordinates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::invalid("cell_size", "must be positive"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::invalid("tick_interval_ms", "must be positive"));
        }
        if self.field_width_cells == 0 {
            return Err(ConfigError::invalid("field_width_cells", "must be positive"));
        }
        if self.field_height_cells == 0 {
            return Err(ConfigError::invalid("field_height_cells", "must be positive"));
        }

        let longest_side = self.field_width_cells.max(self.field_height_cells);
        let widest = u64::from(self.cell_size) * u64::from(longest_side);
        if widest > i32::MAX as u64 {
            return Err(ConfigError::invalid("cell_size", "makes the field too large"));
        }

        Ok(())
    }

    /// Field width in units.
    #[must_use]
    pub fn field_width(&self) -> i32 {
        self.cell_size as i32 * i32::from(self.field_width_cells)
    }

    /// Field height in units.
    #[must_use]
    pub fn field_height(&self) -> i32 {
        self.cell_size as i32 * i32::from(self.field_height_cells)
    }

    /// Returns the total number of cells in the field.
    #[must_use]
    pub fn total_cells(&self) -> usize {
        usize::from(self.field_width_cells) * usize::from(self.field_height_cells)
    }

    /// Returns true when `position` lies inside the field.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.field_width()
            && position.y < self.field_height()
    }

    /// Converts a `(column, row)` cell index into field units.
    #[must_use]
    pub fn cell_position(&self, column: u16, row: u16) -> Position {
        Position {
            x: self.cell_size as i32 * i32::from(column),
            y: self.cell_size as i32 * i32::from(row),
        }
    }

    /// Converts a position back into a `(column, row)` cell index, if it is
    /// inside the field.
    #[must_use]
    pub fn cell_index(&self, position: Position) -> Option<(u16, u16)> {
        if !self.contains(position) {
            return None;
        }
        let size = self.cell_size as i32;
        let column = u16::try_from(position.x / size).ok()?;
        let row = u16::try_from(position.y / size).ok()?;
        Some((column, row))
    }

    /// Head position for a new snake: [`START_CELL`] pulled inside the field
    /// when the field is too small to hold it.
    #[must_use]
    pub fn start_position(&self) -> Position {
        let column = START_CELL.0.min(self.field_width_cells.saturating_sub(1));
        let row = START_CELL.1.min(self.field_height_cells.saturating_sub(1));
        self.cell_position(column, row)
    }

    /// Returns true when both coordinates are multiples of `cell_size`.
    #[must_use]
    pub fn is_aligned(&self, position: Position) -> bool {
        let size = self.cell_size as i32;
        position.x % size == 0 && position.y % size == 0
    }
}

#[cfg(test)]
mod tests {
    use super::GridConfig;
    use crate::error::ConfigError;
    use crate::snake::Position;

    #[test]
    fn default_matches_eight_hundred_by_six_hundred_field() {
        let config = GridConfig::default();

        assert_eq!(config.field_width(), 800);
        assert_eq!(config.field_height(), 600);
        assert_eq!(config.total_cells(), 1200);
    }

    #[test]
    fn zero_values_are_rejected() {
        assert!(matches!(
            GridConfig::new(0, 100, 40, 30),
            Err(ConfigError::InvalidConfiguration {
                field: "cell_size",
                ..
            })
        ));
        assert!(GridConfig::new(20, 0, 40, 30).is_err());
        assert!(GridConfig::new(20, 100, 0, 30).is_err());
        assert!(GridConfig::new(20, 100, 40, 0).is_err());
        assert!(GridConfig::new(20, 100, 40, 30).is_ok());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = GridConfig::from_json_str(r#"{ "tick_interval_ms": 150 }"#)
            .expect("partial config should parse");

        assert_eq!(config.tick_interval_ms, 150);
        assert_eq!(config.cell_size, 20);
        assert_eq!(config.field_width_cells, 40);
    }

    #[test]
    fn json_with_zero_cell_size_fails_validation() {
        let result = GridConfig::from_json_str(r#"{ "cell_size": 0 }"#);
        assert!(matches!(result, Err(ConfigError::InvalidConfiguration { .. })));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            GridConfig::from_json_str("not-json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn bounds_are_half_open() {
        let config = GridConfig::default();

        assert!(config.contains(Position { x: 0, y: 0 }));
        assert!(config.contains(Position { x: 780, y: 580 }));
        assert!(!config.contains(Position { x: 800, y: 0 }));
        assert!(!config.contains(Position { x: 0, y: 600 }));
        assert!(!config.contains(Position { x: -20, y: 100 }));
    }

    #[test]
    fn start_position_is_clamped_into_small_fields() {
        let default = GridConfig::default();
        assert_eq!(default.start_position(), Position { x: 100, y: 100 });

        let small = GridConfig::new(20, 100, 4, 4).expect("valid config");
        assert_eq!(small.start_position(), Position { x: 60, y: 60 });
        assert!(small.contains(small.start_position()));

        let strip = GridConfig::new(20, 100, 1, 10).expect("valid config");
        assert_eq!(strip.start_position(), Position { x: 0, y: 100 });
    }

    #[test]
    fn cell_index_round_trips_through_position() {
        let config = GridConfig::default();
        let position = config.cell_position(5, 7);

        assert_eq!(position, Position { x: 100, y: 140 });
        assert_eq!(config.cell_index(position), Some((5, 7)));
        assert!(config.is_aligned(position));
        assert!(!config.is_aligned(Position { x: 101, y: 140 }));
    }
}
