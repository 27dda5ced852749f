// ABOUTME: Preview entry point.
// ABOUTME: Fills a container from a layout config and prints the resulting grid as JSON.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use tilegrid_container::{MemoryHost, TileContainer};
use tilegrid_core::LayoutConfig;
use tilegrid_layout::{FillOrder, Placement, Rect, Size};

const PREVIEW_WIDTH: f32 = 1200.0;
const PREVIEW_HEIGHT: f32 = 800.0;

#[derive(Serialize)]
struct TileReport<'a> {
    name: &'a str,
    placement: Placement,
    rect: Rect,
}

#[derive(Serialize)]
struct Report<'a> {
    fill_order: FillOrder,
    rows: Vec<Vec<&'a str>>,
    tiles: Vec<TileReport<'a>>,
}

fn load_config(path: Option<PathBuf>) -> Result<LayoutConfig> {
    match path {
        Some(path) => LayoutConfig::load(&path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => Ok(LayoutConfig::load_or_default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let config = load_config(args.next().map(PathBuf::from))?;
    let count = match args.next() {
        Some(arg) => arg.parse::<usize>().context("Tile count must be a number")?,
        None => config.grid.capacity(),
    };

    let mut container = TileContainer::from_config(&config, MemoryHost::new());
    for n in 1..=count {
        if container.add_tile(format!("T{}", n), false).is_none() {
            tracing::warn!("Grid holds {} tiles, skipping the rest", container.capacity());
            break;
        }
    }

    let rects = container
        .host()
        .resolve(Size::new(PREVIEW_WIDTH, PREVIEW_HEIGHT))?;
    let layout = container.layout();
    let name = |id| container.get(id).map(String::as_str).unwrap_or("?");

    let report = Report {
        fill_order: layout.fill_order(),
        rows: layout
            .rows()
            .into_iter()
            .map(|row| row.into_iter().map(name).collect())
            .collect(),
        tiles: layout
            .placements()
            .iter()
            .filter_map(|placement| {
                Some(TileReport {
                    name: name(placement.tile),
                    placement: *placement,
                    rect: *rects.get(&placement.tile)?,
                })
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
