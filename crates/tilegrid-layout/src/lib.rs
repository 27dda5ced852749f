// ABOUTME: Tile layout engine for bounded grids.
// ABOUTME: Maps tiles to grid cells and derives size/position relations for a constraint solver.

mod engine;
mod fill;
mod relation;
mod solver;

pub use engine::{EntryEdge, Layout, LayoutEngine, Placement};
pub use fill::{Cell, Edges, FillOrder, Occupancy};
pub use relation::{
    Anchor, Attribute, PositionRelation, Priority, Relation, SizeDelta, SizeRelation,
};
pub use solver::{ConstraintSolver, Rect, RelationSet, Size, SolveError};
