// ABOUTME: Relation types exchanged with the external constraint solver.
// ABOUTME: Size relations are proportional to the container; position relations anchor to edges.

use serde::Serialize;
use tilegrid_core::TileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Width,
    Height,
    Top,
    Left,
    Bottom,
    Right,
}

/// What a relation's subject is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Container,
    Tile(TileId),
}

impl Anchor {
    /// Substitute `new` wherever this anchor points at `old`
    pub fn retarget(self, old: TileId, new: TileId) -> Anchor {
        match self {
            Anchor::Tile(tile) if tile == old => Anchor::Tile(new),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Priority(pub u16);

impl Priority {
    pub const REQUIRED: Priority = Priority(1000);
    /// Breakable under conflict, so a solver never fails on size relations
    pub const HIGH: Priority = Priority(999);
}

/// `subject.attribute = related_to.related_attribute * multiplier + constant`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Relation {
    pub subject: TileId,
    pub attribute: Attribute,
    pub related_to: Anchor,
    pub related_attribute: Attribute,
    pub multiplier: f32,
    pub constant: f32,
    pub priority: Priority,
}

impl Relation {
    /// Size relative to the same dimension of the container
    pub fn proportional(
        subject: TileId,
        attribute: Attribute,
        multiplier: f32,
        constant: f32,
    ) -> Self {
        Self {
            subject,
            attribute,
            related_to: Anchor::Container,
            related_attribute: attribute,
            multiplier,
            constant,
            priority: Priority::HIGH,
        }
    }

    /// Edge pinned to another edge with no offset
    pub fn pinned(
        subject: TileId,
        attribute: Attribute,
        related_to: Anchor,
        related_attribute: Attribute,
    ) -> Self {
        Self {
            subject,
            attribute,
            related_to,
            related_attribute,
            multiplier: 1.0,
            constant: 0.0,
            priority: Priority::REQUIRED,
        }
    }

    pub fn mentions(&self, tile: TileId) -> bool {
        self.subject == tile || self.related_to == Anchor::Tile(tile)
    }

    pub fn retarget(self, old: TileId, new: TileId) -> Relation {
        Relation {
            subject: if self.subject == old { new } else { self.subject },
            related_to: self.related_to.retarget(old, new),
            ..self
        }
    }
}

/// Accumulated manual size change of a tile
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SizeDelta {
    pub width: f32,
    pub height: f32,
}

impl SizeDelta {
    pub const ZERO: SizeDelta = SizeDelta {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl std::ops::AddAssign for SizeDelta {
    fn add_assign(&mut self, other: SizeDelta) {
        self.width += other.width;
        self.height += other.height;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeRelation {
    pub width_fraction: f32,
    pub height_fraction: f32,
    pub adjustment: SizeDelta,
}

impl SizeRelation {
    pub fn relations(&self, subject: TileId) -> [Relation; 2] {
        [
            Relation::proportional(
                subject,
                Attribute::Width,
                self.width_fraction,
                self.adjustment.width,
            ),
            Relation::proportional(
                subject,
                Attribute::Height,
                self.height_fraction,
                self.adjustment.height,
            ),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionRelation {
    pub top: Anchor,
    pub left: Anchor,
}

impl PositionRelation {
    pub fn top_relation(&self, subject: TileId) -> Relation {
        match self.top {
            Anchor::Container => {
                Relation::pinned(subject, Attribute::Top, Anchor::Container, Attribute::Top)
            }
            tile => Relation::pinned(subject, Attribute::Top, tile, Attribute::Bottom),
        }
    }

    pub fn left_relation(&self, subject: TileId) -> Relation {
        match self.left {
            Anchor::Container => {
                Relation::pinned(subject, Attribute::Left, Anchor::Container, Attribute::Left)
            }
            tile => Relation::pinned(subject, Attribute::Left, tile, Attribute::Right),
        }
    }

    pub fn relations(&self, subject: TileId) -> [Relation; 2] {
        [self.top_relation(subject), self.left_relation(subject)]
    }
}
