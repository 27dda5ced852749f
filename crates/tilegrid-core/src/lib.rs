// ABOUTME: Shared types and configuration for tilegrid.
// ABOUTME: Defines grid bounds, fill policy, tile handles, and config file handling.

pub mod animation;
pub mod config;
pub mod grid;

pub use animation::{Easing, Transition};
pub use config::{AnimationSettings, ConfigError, LayoutConfig};
pub use grid::{Alignment, FillDirection, FillPolicy, GridBounds, LayoutError, TextDirection};

slotmap::new_key_type! {
    /// Generation-tagged handle for a tile handed to a container.
    pub struct TileId;
}
