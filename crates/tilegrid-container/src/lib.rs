// ABOUTME: Tile container driving the layout engine on behalf of a host view.
// ABOUTME: Owns the tile sequence and turns mutations into layout passes.

mod container;
mod host;

pub use container::{ContainerError, TileContainer};
pub use host::{LayoutHost, MemoryHost, Pass, TransitionId};
