// ABOUTME: Boundary between the container and the host view it lays out.
// ABOUTME: The host owns the solver, reports text direction, and runs layout passes.

use std::collections::HashMap;
use tilegrid_core::{TextDirection, TileId, Transition};
use tilegrid_layout::{ConstraintSolver, Rect, Relation, RelationSet, Size, SolveError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(pub u64);

/// Request to resolve the installed relations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Immediate,
    /// Interpolate to the new geometry, then report back through
    /// `TileContainer::finish_transition` exactly once
    Animated {
        id: TransitionId,
        transition: Transition,
    },
}

pub trait LayoutHost: ConstraintSolver {
    fn text_direction(&self) -> TextDirection {
        TextDirection::LeftToRight
    }

    fn run_pass(&mut self, pass: Pass);
}

/// Host that keeps relations in memory and records the passes it was asked to run
#[derive(Debug, Default)]
pub struct MemoryHost {
    pub relations: RelationSet,
    pub text_direction: TextDirection,
    pub passes: Vec<Pass>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_direction(text_direction: TextDirection) -> Self {
        Self {
            text_direction,
            ..Self::default()
        }
    }

    pub fn resolve(&self, container: Size) -> Result<HashMap<TileId, Rect>, SolveError> {
        self.relations.resolve(container)
    }

    /// Id of the most recent animated pass
    pub fn last_transition(&self) -> Option<TransitionId> {
        self.passes.iter().rev().find_map(|pass| match pass {
            Pass::Animated { id, .. } => Some(*id),
            Pass::Immediate => None,
        })
    }
}

impl ConstraintSolver for MemoryHost {
    fn install(&mut self, relation: Relation) {
        self.relations.install(relation);
    }

    fn retract(&mut self, relation: &Relation) {
        self.relations.retract(relation);
    }
}

impl LayoutHost for MemoryHost {
    fn text_direction(&self) -> TextDirection {
        self.text_direction
    }

    fn run_pass(&mut self, pass: Pass) {
        self.passes.push(pass);
    }
}
