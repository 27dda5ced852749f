// ABOUTME: Constraint solver boundary and an in-memory reference solver.
// ABOUTME: RelationSet records installed relations and resolves them into rectangles.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tilegrid_core::TileId;

use crate::{Anchor, Attribute, Relation};

/// Receives relations from the layout engine
pub trait ConstraintSolver {
    fn install(&mut self, relation: Relation);
    fn retract(&mut self, relation: &Relation);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Unit size; resolved rects are then container fractions
    pub fn unit() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Resolved tile box in container coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn approx_eq(&self, other: &Rect) -> bool {
        const EPSILON: f32 = 0.001;
        (self.x - other.x).abs() < EPSILON
            && (self.y - other.y).abs() < EPSILON
            && (self.width - other.width).abs() < EPSILON
            && (self.height - other.height).abs() < EPSILON
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error("Tile {tile:?} has no relation for {attribute:?}")]
    Underconstrained { tile: TileId, attribute: Attribute },

    #[error("Relations through tile {0:?} form a cycle")]
    Cycle(TileId),
}

/// Installed relations in installation order
#[derive(Debug, Clone, Default)]
pub struct RelationSet {
    relations: Vec<Relation>,
}

impl ConstraintSolver for RelationSet {
    fn install(&mut self, relation: Relation) {
        self.relations.push(relation);
    }

    fn retract(&mut self, relation: &Relation) {
        if let Some(pos) = self.relations.iter().position(|r| r == relation) {
            self.relations.remove(pos);
        }
    }
}

impl RelationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter()
    }

    /// Relations whose subject is `tile`
    pub fn for_tile(&self, tile: TileId) -> impl Iterator<Item = &Relation> {
        self.relations.iter().filter(move |r| r.subject == tile)
    }

    /// Tiles that are the subject of at least one relation, in first-seen order
    pub fn subjects(&self) -> Vec<TileId> {
        let mut seen = HashSet::new();
        self.relations
            .iter()
            .map(|r| r.subject)
            .filter(|tile| seen.insert(*tile))
            .collect()
    }

    /// Resolve every subject's box inside a container of the given size
    pub fn resolve(&self, container: Size) -> Result<HashMap<TileId, Rect>, SolveError> {
        let mut resolver = Resolver {
            relations: &self.relations,
            container,
            done: HashMap::new(),
            visiting: HashSet::new(),
        };
        for tile in self.subjects() {
            resolver.rect(tile)?;
        }
        Ok(resolver.done)
    }
}

struct Resolver<'a> {
    relations: &'a [Relation],
    container: Size,
    done: HashMap<TileId, Rect>,
    visiting: HashSet<TileId>,
}

impl Resolver<'_> {
    /// Strongest relation constraining one of `attributes`; the latest wins ties
    fn relation(&self, tile: TileId, attributes: &[Attribute]) -> Option<&Relation> {
        self.relations
            .iter()
            .filter(|r| r.subject == tile && attributes.contains(&r.attribute))
            .max_by_key(|r| r.priority)
    }

    fn rect(&mut self, tile: TileId) -> Result<Rect, SolveError> {
        if let Some(rect) = self.done.get(&tile) {
            return Ok(*rect);
        }
        if !self.visiting.insert(tile) {
            return Err(SolveError::Cycle(tile));
        }

        let width = self.dimension(tile, Attribute::Width)?;
        let height = self.dimension(tile, Attribute::Height)?;
        let y = self.offset(tile, [Attribute::Top, Attribute::Bottom], height)?;
        let x = self.offset(tile, [Attribute::Left, Attribute::Right], width)?;

        let rect = Rect {
            x,
            y,
            width,
            height,
        };
        self.visiting.remove(&tile);
        self.done.insert(tile, rect);
        Ok(rect)
    }

    fn dimension(&mut self, tile: TileId, attribute: Attribute) -> Result<f32, SolveError> {
        let relation = *self
            .relation(tile, &[attribute])
            .ok_or(SolveError::Underconstrained { tile, attribute })?;
        self.evaluate(&relation)
    }

    /// Leading coordinate along one axis, from either its leading or trailing edge
    fn offset(
        &mut self,
        tile: TileId,
        edges: [Attribute; 2],
        extent: f32,
    ) -> Result<f32, SolveError> {
        let relation = *self
            .relation(tile, &edges)
            .ok_or(SolveError::Underconstrained {
                tile,
                attribute: edges[0],
            })?;
        let value = self.evaluate(&relation)?;
        Ok(if relation.attribute == edges[0] {
            value
        } else {
            value - extent
        })
    }

    fn evaluate(&mut self, relation: &Relation) -> Result<f32, SolveError> {
        let base = match relation.related_to {
            Anchor::Container => match relation.related_attribute {
                Attribute::Width | Attribute::Right => self.container.width,
                Attribute::Height | Attribute::Bottom => self.container.height,
                Attribute::Top | Attribute::Left => 0.0,
            },
            Anchor::Tile(other) => {
                let rect = self.rect(other)?;
                match relation.related_attribute {
                    Attribute::Width => rect.width,
                    Attribute::Height => rect.height,
                    Attribute::Top => rect.y,
                    Attribute::Left => rect.x,
                    Attribute::Bottom => rect.y + rect.height,
                    Attribute::Right => rect.x + rect.width,
                }
            }
        };
        Ok(base * relation.multiplier + relation.constant)
    }
}
