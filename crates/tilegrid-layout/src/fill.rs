// ABOUTME: The four tile traversal orders and the grid arithmetic behind them.
// ABOUTME: Pure functions from (index, occupancy) to cells, neighbours, and size multipliers.

use serde::Serialize;
use tilegrid_core::{Alignment, FillDirection, FillPolicy, GridBounds, TextDirection};

/// How many tiles a grid currently holds, and the row/column counts that follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    pub bounds: GridBounds,
    pub count: usize,
}

impl Occupancy {
    pub fn new(bounds: GridBounds, count: usize) -> Self {
        Self { bounds, count }
    }

    fn columns_max(&self) -> usize {
        self.bounds.maximum_columns()
    }

    fn rows_max(&self) -> usize {
        self.bounds.maximum_rows()
    }

    /// Rows holding at least one tile when filling horizontally
    pub fn filled_rows(&self) -> usize {
        self.count.div_ceil(self.columns_max())
    }

    /// Columns holding at least one tile when filling vertically
    pub fn filled_columns(&self) -> usize {
        self.count.div_ceil(self.rows_max())
    }

    /// Tiles in logical row `row` when filling horizontally
    pub fn tiles_in_row(&self, row: usize) -> usize {
        let start = row * self.columns_max();
        self.count.saturating_sub(start).min(self.columns_max())
    }

    /// Tiles in logical column `column` when filling vertically
    pub fn tiles_in_column(&self, column: usize) -> usize {
        let start = column * self.rows_max();
        self.count.saturating_sub(start).min(self.rows_max())
    }
}

/// Visual position of a tile; column 0 is the leftmost column on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Cell {
    pub row: usize,
    pub column: usize,
}

/// Container edges a tile's box touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Edges {
    pub top: bool,
    pub left: bool,
    pub bottom: bool,
    pub right: bool,
}

/// Traversal order mapping a linear tile index onto the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillOrder {
    /// Rows first, each row filled left to right
    LeftThenDown,
    /// Rows first, each row filled right to left
    RightThenDown,
    /// Columns first, columns laid out left to right
    DownThenRight,
    /// Columns first, columns laid out right to left
    DownThenLeft,
}

impl FillOrder {
    pub fn resolve(policy: FillPolicy, text_direction: TextDirection) -> FillOrder {
        match (
            policy.alignment.resolve(text_direction),
            policy.fill_direction,
        ) {
            (Alignment::Right, FillDirection::Horizontal) => FillOrder::RightThenDown,
            (Alignment::Right, FillDirection::Vertical) => FillOrder::DownThenLeft,
            (_, FillDirection::Horizontal) => FillOrder::LeftThenDown,
            (_, FillDirection::Vertical) => FillOrder::DownThenRight,
        }
    }

    pub fn fill_direction(self) -> FillDirection {
        match self {
            FillOrder::LeftThenDown | FillOrder::RightThenDown => FillDirection::Horizontal,
            FillOrder::DownThenRight | FillOrder::DownThenLeft => FillDirection::Vertical,
        }
    }

    pub fn alignment(self) -> Alignment {
        match self {
            FillOrder::LeftThenDown | FillOrder::DownThenRight => Alignment::Left,
            FillOrder::RightThenDown | FillOrder::DownThenLeft => Alignment::Right,
        }
    }

    /// Logical (row, slot) for horizontal fill, (row, column) for vertical fill
    fn logical(self, index: usize, occupancy: &Occupancy) -> (usize, usize) {
        match self.fill_direction() {
            FillDirection::Horizontal => (
                index / occupancy.columns_max(),
                index % occupancy.columns_max(),
            ),
            FillDirection::Vertical => (index % occupancy.rows_max(), index / occupancy.rows_max()),
        }
    }

    pub fn cell(self, index: usize, occupancy: &Occupancy) -> Cell {
        let (row, slot) = self.logical(index, occupancy);
        let column = match self {
            FillOrder::LeftThenDown | FillOrder::DownThenRight => slot,
            FillOrder::RightThenDown => occupancy.tiles_in_row(row) - 1 - slot,
            FillOrder::DownThenLeft => occupancy.filled_columns() - 1 - slot,
        };
        Cell { row, column }
    }

    /// Index of the tile whose bottom edge this tile's top edge sits on
    pub fn top_neighbor(self, index: usize, occupancy: &Occupancy) -> Option<usize> {
        let (row, _) = self.logical(index, occupancy);
        if row == 0 {
            return None;
        }
        match self.fill_direction() {
            // Previous rows are always full, so the same slot exists there
            FillDirection::Horizontal => Some(index - occupancy.columns_max()),
            FillDirection::Vertical => Some(index - 1),
        }
    }

    /// Index of the tile whose right edge this tile's left edge sits on
    pub fn left_neighbor(self, index: usize, occupancy: &Occupancy) -> Option<usize> {
        let (row, slot) = self.logical(index, occupancy);
        match self {
            FillOrder::LeftThenDown => (slot > 0).then(|| index - 1),
            FillOrder::RightThenDown => {
                (slot + 1 < occupancy.tiles_in_row(row)).then(|| index + 1)
            }
            FillOrder::DownThenRight => (slot > 0).then(|| index - occupancy.rows_max()),
            FillOrder::DownThenLeft => {
                if slot + 1 >= occupancy.filled_columns() {
                    return None;
                }
                let same_row = index + occupancy.rows_max();
                if same_row < occupancy.count {
                    Some(same_row)
                } else {
                    // Partial column to the left has no tile in this row
                    Some((slot + 1) * occupancy.rows_max())
                }
            }
        }
    }

    /// (width, height) multipliers relative to the container
    pub fn multipliers(self, index: usize, occupancy: &Occupancy) -> (f32, f32) {
        let (row, slot) = self.logical(index, occupancy);
        match self.fill_direction() {
            FillDirection::Horizontal => (
                1.0 / occupancy.tiles_in_row(row) as f32,
                1.0 / occupancy.filled_rows() as f32,
            ),
            FillDirection::Vertical => (
                1.0 / occupancy.filled_columns() as f32,
                1.0 / occupancy.tiles_in_column(slot) as f32,
            ),
        }
    }

    pub fn edges(self, index: usize, occupancy: &Occupancy) -> Edges {
        let (row, slot) = self.logical(index, occupancy);
        let cell = self.cell(index, occupancy);
        let (last_row, last_column) = match self.fill_direction() {
            FillDirection::Horizontal => (
                occupancy.filled_rows() - 1,
                occupancy.tiles_in_row(row) - 1,
            ),
            FillDirection::Vertical => (
                occupancy.tiles_in_column(slot) - 1,
                occupancy.filled_columns() - 1,
            ),
        };
        Edges {
            top: cell.row == 0,
            left: cell.column == 0,
            bottom: cell.row == last_row,
            right: cell.column == last_column,
        }
    }

    /// Tile indices grouped by visual row, each row ordered left to right
    pub fn rows(self, occupancy: &Occupancy) -> Vec<Vec<usize>> {
        let mut rows: Vec<Vec<(usize, usize)>> = Vec::new();
        for index in 0..occupancy.count {
            let cell = self.cell(index, occupancy);
            if rows.len() <= cell.row {
                rows.resize_with(cell.row + 1, Vec::new);
            }
            rows[cell.row].push((cell.column, index));
        }
        rows.into_iter()
            .map(|mut row| {
                row.sort_unstable();
                row.into_iter().map(|(_, index)| index).collect()
            })
            .collect()
    }
}
