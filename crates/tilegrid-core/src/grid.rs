// ABOUTME: Grid bounds and fill policy types.
// ABOUTME: Fixed at construction; describe capacity and traversal preferences.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Grid bounds must be at least 1x1, got {rows}x{columns}")]
    InvalidBounds { rows: usize, columns: usize },
    #[error("Grid of {rows}x{columns} holds more tiles than a usize can count")]
    CapacityOverflow { rows: usize, columns: usize },
}

/// Maximum rows and columns of a tile grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBounds", into = "RawBounds")]
pub struct GridBounds {
    maximum_rows: usize,
    maximum_columns: usize,
}

#[derive(Clone, Serialize, Deserialize)]
struct RawBounds {
    maximum_rows: usize,
    maximum_columns: usize,
}

impl TryFrom<RawBounds> for GridBounds {
    type Error = LayoutError;

    fn try_from(raw: RawBounds) -> Result<Self, Self::Error> {
        GridBounds::new(raw.maximum_rows, raw.maximum_columns)
    }
}

impl From<GridBounds> for RawBounds {
    fn from(bounds: GridBounds) -> Self {
        Self {
            maximum_rows: bounds.maximum_rows,
            maximum_columns: bounds.maximum_columns,
        }
    }
}

impl GridBounds {
    pub fn new(maximum_rows: usize, maximum_columns: usize) -> Result<Self, LayoutError> {
        if maximum_rows == 0 || maximum_columns == 0 {
            return Err(LayoutError::InvalidBounds {
                rows: maximum_rows,
                columns: maximum_columns,
            });
        }
        if maximum_rows.checked_mul(maximum_columns).is_none() {
            return Err(LayoutError::CapacityOverflow {
                rows: maximum_rows,
                columns: maximum_columns,
            });
        }
        Ok(Self {
            maximum_rows,
            maximum_columns,
        })
    }

    pub fn maximum_rows(&self) -> usize {
        self.maximum_rows
    }

    pub fn maximum_columns(&self) -> usize {
        self.maximum_columns
    }

    /// Number of tiles the grid can hold
    pub fn capacity(&self) -> usize {
        self.maximum_rows * self.maximum_columns
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self {
            maximum_rows: 2,
            maximum_columns: 2,
        }
    }
}

/// Edge tiles are packed against within a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Right,
    /// Left for left-to-right text, right for right-to-left text
    #[default]
    Auto,
}

impl Alignment {
    /// Resolve `Auto` against the host's text direction
    pub fn resolve(self, direction: TextDirection) -> Alignment {
        match (self, direction) {
            (Alignment::Auto, TextDirection::LeftToRight) => Alignment::Left,
            (Alignment::Auto, TextDirection::RightToLeft) => Alignment::Right,
            (fixed, _) => fixed,
        }
    }
}

/// Axis along which consecutive tiles are placed.
///
/// Horizontal fills rows first, so a partial last row stretches across the
/// width. Vertical fills columns first, so a partial last column stretches
/// down the height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FillDirection {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FillPolicy {
    pub alignment: Alignment,
    pub fill_direction: FillDirection,
}

impl FillPolicy {
    pub fn new(alignment: Alignment, fill_direction: FillDirection) -> Self {
        Self {
            alignment,
            fill_direction,
        }
    }
}
