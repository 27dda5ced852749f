// ABOUTME: Layout engine deriving per-tile size and position relations.
// ABOUTME: Owns the installed relation, placement, and size adjustment tables.

use serde::Serialize;
use slotmap::SecondaryMap;
use std::collections::HashSet;
use tilegrid_core::{FillPolicy, GridBounds, TextDirection, TileId};

use crate::{
    Anchor, Attribute, Cell, ConstraintSolver, Edges, FillOrder, Occupancy, PositionRelation,
    Relation, SizeDelta, SizeRelation,
};

/// Geometry derived for one tile in one layout pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub tile: TileId,
    /// Position in the tile sequence
    pub index: usize,
    pub cell: Cell,
    pub size: SizeRelation,
    pub position: PositionRelation,
    pub edges: Edges,
}

impl Placement {
    pub fn relations(&self) -> [Relation; 4] {
        let [width, height] = self.size.relations(self.tile);
        let [top, left] = self.position.relations(self.tile);
        [width, height, top, left]
    }

    /// Side an inserted tile should slide in from
    pub fn entry_edge(&self) -> EntryEdge {
        let edges = self.edges;
        let on_side = edges.left || edges.right;
        let on_end = edges.top || edges.bottom;
        if on_side && on_end {
            EntryEdge::Top
        } else if edges.left {
            EntryEdge::Left
        } else if edges.right {
            EntryEdge::Right
        } else {
            EntryEdge::Top
        }
    }

    fn retarget(self, old: TileId, new: TileId) -> Placement {
        Placement {
            tile: if self.tile == old { new } else { self.tile },
            position: PositionRelation {
                top: self.position.top.retarget(old, new),
                left: self.position.left.retarget(old, new),
            },
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryEdge {
    Top,
    Left,
    Right,
}

impl EntryEdge {
    /// Relations holding `tile` just outside the container, sized like `target`
    pub fn relations(self, tile: TileId, target: &Placement) -> [Relation; 4] {
        let [width, height] = target.size.relations(tile);
        let (top, left) = match self {
            EntryEdge::Top => (
                Relation::pinned(tile, Attribute::Bottom, Anchor::Container, Attribute::Top),
                target.position.left_relation(tile),
            ),
            EntryEdge::Left => (
                target.position.top_relation(tile),
                Relation::pinned(tile, Attribute::Right, Anchor::Container, Attribute::Left),
            ),
            EntryEdge::Right => (
                target.position.top_relation(tile),
                Relation::pinned(tile, Attribute::Left, Anchor::Container, Attribute::Right),
            ),
        };
        [width, height, top, left]
    }
}

/// Result of partitioning a tile sequence onto the grid
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    order: FillOrder,
    occupancy: Occupancy,
    placements: Vec<Placement>,
}

impl Layout {
    pub fn fill_order(&self) -> FillOrder {
        self.order
    }

    pub fn occupancy(&self) -> Occupancy {
        self.occupancy
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn placement(&self, tile: TileId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.tile == tile)
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Tiles grouped by visual row, left to right
    pub fn rows(&self) -> Vec<Vec<TileId>> {
        self.order
            .rows(&self.occupancy)
            .into_iter()
            .map(|row| row.into_iter().map(|i| self.placements[i].tile).collect())
            .collect()
    }
}

#[derive(Debug)]
pub struct LayoutEngine {
    bounds: GridBounds,
    policy: FillPolicy,
    adjustments: SecondaryMap<TileId, SizeDelta>,
    installed: SecondaryMap<TileId, Vec<Relation>>,
    placements: SecondaryMap<TileId, Placement>,
}

impl LayoutEngine {
    pub fn new(bounds: GridBounds, policy: FillPolicy) -> Self {
        Self {
            bounds,
            policy,
            adjustments: SecondaryMap::new(),
            installed: SecondaryMap::new(),
            placements: SecondaryMap::new(),
        }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn policy(&self) -> FillPolicy {
        self.policy
    }

    pub fn fill_order(&self, text_direction: TextDirection) -> FillOrder {
        FillOrder::resolve(self.policy, text_direction)
    }

    /// Derive placements for `tiles` without touching any solver
    pub fn compute(&self, tiles: &[TileId], text_direction: TextDirection) -> Layout {
        let capacity = self.bounds.capacity();
        let tiles = if tiles.len() > capacity {
            tracing::warn!(
                "Laying out {} of {} tiles, grid holds {}",
                capacity,
                tiles.len(),
                capacity
            );
            &tiles[..capacity]
        } else {
            tiles
        };

        let order = self.fill_order(text_direction);
        let occupancy = Occupancy::new(self.bounds, tiles.len());
        let anchor = |neighbor: Option<usize>| {
            neighbor.map_or(Anchor::Container, |n| Anchor::Tile(tiles[n]))
        };

        let placements = tiles
            .iter()
            .enumerate()
            .map(|(index, &tile)| {
                let (width_fraction, height_fraction) = order.multipliers(index, &occupancy);
                Placement {
                    tile,
                    index,
                    cell: order.cell(index, &occupancy),
                    size: SizeRelation {
                        width_fraction,
                        height_fraction,
                        adjustment: self.adjustment(tile),
                    },
                    position: PositionRelation {
                        top: anchor(order.top_neighbor(index, &occupancy)),
                        left: anchor(order.left_neighbor(index, &occupancy)),
                    },
                    edges: order.edges(index, &occupancy),
                }
            })
            .collect();

        Layout {
            order,
            occupancy,
            placements,
        }
    }

    /// Retract every installed relation, then install the relations of every placement.
    ///
    /// Nothing is installed until the whole previous pass is retracted, so old
    /// and new anchors never coexist in the solver.
    pub fn apply<S: ConstraintSolver + ?Sized>(&mut self, layout: &Layout, solver: &mut S) {
        let installed: Vec<TileId> = self.installed.keys().collect();
        for tile in installed {
            self.retract_tile(tile, solver);
        }
        let live: HashSet<TileId> = layout.placements.iter().map(|p| p.tile).collect();
        self.placements.retain(|tile, _| live.contains(&tile));

        for placement in &layout.placements {
            self.install(placement.tile, placement.relations().to_vec(), solver);
            self.placements.insert(placement.tile, *placement);
        }
        tracing::debug!(
            "Applied {:?} layout: {} tiles in {} rows",
            layout.order,
            layout.len(),
            layout.rows().len()
        );
    }

    pub fn relayout<S: ConstraintSolver + ?Sized>(
        &mut self,
        tiles: &[TileId],
        text_direction: TextDirection,
        solver: &mut S,
    ) -> Layout {
        let layout = self.compute(tiles, text_direction);
        self.apply(&layout, solver);
        layout
    }

    /// Add to the tile's manual size change; takes effect on the next relayout
    pub fn adjust(&mut self, tile: TileId, delta: SizeDelta) {
        match self.adjustments.get_mut(tile) {
            Some(existing) => *existing += delta,
            None => {
                self.adjustments.insert(tile, delta);
            }
        }
    }

    pub fn adjustment(&self, tile: TileId) -> SizeDelta {
        self.adjustments.get(tile).copied().unwrap_or(SizeDelta::ZERO)
    }

    pub fn reset_adjustments(&mut self) {
        self.adjustments.clear();
    }

    /// Drop every relation, placement, and adjustment held for `tile`
    pub fn clear<S: ConstraintSolver + ?Sized>(&mut self, tile: TileId, solver: &mut S) {
        self.retract_tile(tile, solver);
        self.placements.remove(tile);
        self.adjustments.remove(tile);
    }

    /// Move `old`'s geometry onto `new` without re-deriving it.
    ///
    /// Relations of other tiles anchored to `old` are rewritten to anchor to
    /// `new`, and `old`'s size adjustment travels with it. Anything `new` held
    /// before is retracted.
    pub fn retarget<S: ConstraintSolver + ?Sized>(
        &mut self,
        old: TileId,
        new: TileId,
        solver: &mut S,
    ) {
        if old == new {
            return;
        }
        self.retract_tile(new, solver);

        let dependents: Vec<TileId> = self
            .installed
            .iter()
            .filter(|(tile, relations)| {
                *tile != old && relations.iter().any(|r| r.related_to == Anchor::Tile(old))
            })
            .map(|(tile, _)| tile)
            .collect();

        if let Some(relations) = self.installed.remove(old) {
            for relation in &relations {
                solver.retract(relation);
            }
            let moved = relations.into_iter().map(|r| r.retarget(old, new)).collect();
            self.install(new, moved, solver);
        }
        for tile in dependents {
            let Some(relations) = self.installed.get(tile) else {
                continue;
            };
            let moved = relations.iter().map(|r| r.retarget(old, new)).collect();
            self.install(tile, moved, solver);
        }

        if let Some(delta) = self.adjustments.remove(old) {
            self.adjustments.insert(new, delta);
        }
        if let Some(placement) = self.placements.remove(old) {
            self.placements.insert(new, placement);
        }
        for placement in self.placements.values_mut() {
            *placement = placement.retarget(old, new);
        }
    }

    /// Hold `tile` just outside the container on the side `target` would enter from
    pub fn install_entry<S: ConstraintSolver + ?Sized>(
        &mut self,
        tile: TileId,
        target: TileId,
        solver: &mut S,
    ) -> Option<EntryEdge> {
        let placement = *self.placements.get(target)?;
        let edge = placement.entry_edge();
        self.install(tile, edge.relations(tile, &placement).to_vec(), solver);
        Some(edge)
    }

    /// Relations currently installed for `tile`
    pub fn installed(&self, tile: TileId) -> &[Relation] {
        self.installed.get(tile).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Placement from the last pass that included `tile`
    pub fn placement(&self, tile: TileId) -> Option<&Placement> {
        self.placements.get(tile)
    }

    fn install<S: ConstraintSolver + ?Sized>(
        &mut self,
        tile: TileId,
        relations: Vec<Relation>,
        solver: &mut S,
    ) {
        self.retract_tile(tile, solver);
        for relation in &relations {
            solver.install(*relation);
        }
        self.installed.insert(tile, relations);
    }

    fn retract_tile<S: ConstraintSolver + ?Sized>(&mut self, tile: TileId, solver: &mut S) {
        if let Some(relations) = self.installed.remove(tile) {
            for relation in &relations {
                solver.retract(relation);
            }
        }
    }
}
