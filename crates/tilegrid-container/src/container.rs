// ABOUTME: Ordered tile sequence with insert, remove, replace, swap, and adjust operations.
// ABOUTME: Every mutation is handed to the layout engine and followed by a host pass.

use slotmap::SlotMap;
use tilegrid_core::{FillPolicy, GridBounds, LayoutConfig, TileId, Transition};
use tilegrid_layout::{Layout, LayoutEngine, SizeDelta};

use crate::{LayoutHost, Pass, TransitionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContainerError {
    #[error("Tile index {index} out of range for {len} tiles")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug)]
enum Slot<T> {
    /// Reserves a grid slot while an animated insertion makes room
    Placeholder,
    Tile(T),
}

#[derive(Debug, Clone, Copy)]
struct PendingInsert {
    transition: TransitionId,
    placeholder: TileId,
    tile: TileId,
}

/// Tiles laid out on a bounded grid inside a host view
#[derive(Debug)]
pub struct TileContainer<T, H: LayoutHost> {
    slots: SlotMap<TileId, Slot<T>>,
    order: Vec<TileId>,
    engine: LayoutEngine,
    host: H,
    transition: Transition,
    next_transition: u64,
    pending: Vec<PendingInsert>,
    needs_layout: bool,
}

impl<T, H: LayoutHost> TileContainer<T, H> {
    pub fn new(bounds: GridBounds, policy: FillPolicy, host: H) -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
            engine: LayoutEngine::new(bounds, policy),
            host,
            transition: Transition::default(),
            next_transition: 1,
            pending: Vec::new(),
            needs_layout: false,
        }
    }

    pub fn from_config(config: &LayoutConfig, host: H) -> Self {
        tracing::info!(
            "Tile container {}x{} with {:?}",
            config.grid.maximum_rows(),
            config.grid.maximum_columns(),
            config.policy
        );
        Self::new(config.grid, config.policy, host).with_transition(config.animation.transition())
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.engine.bounds().capacity()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Tile ids in layout order, placeholders included
    pub fn tiles(&self) -> &[TileId] {
        &self.order
    }

    pub fn get(&self, id: TileId) -> Option<&T> {
        match self.slots.get(id)? {
            Slot::Tile(tile) => Some(tile),
            Slot::Placeholder => None,
        }
    }

    pub fn get_mut(&mut self, id: TileId) -> Option<&mut T> {
        match self.slots.get_mut(id)? {
            Slot::Tile(tile) => Some(tile),
            Slot::Placeholder => None,
        }
    }

    pub fn is_placeholder(&self, id: TileId) -> bool {
        matches!(self.slots.get(id), Some(Slot::Placeholder))
    }

    pub fn index_of(&self, id: TileId) -> Option<usize> {
        self.order.iter().position(|&tile| tile == id)
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Current partitioning of the sequence, derived without installing anything
    pub fn layout(&self) -> Layout {
        self.engine.compute(&self.order, self.host.text_direction())
    }

    pub fn add_tile(&mut self, tile: T, animated: bool) -> Option<TileId> {
        let at = self.len();
        self.insert_tile(tile, at, animated)
    }

    /// Insert `tile` at `at`; ignored when the grid is full or `at` is past the end
    pub fn insert_tile(&mut self, tile: T, at: usize, animated: bool) -> Option<TileId> {
        if self.is_full() {
            tracing::debug!("Grid full ({} tiles), insert ignored", self.capacity());
            return None;
        }
        if at > self.len() {
            tracing::debug!("Insert index {} past {} tiles, ignored", at, self.len());
            return None;
        }

        let id = self.slots.insert(Slot::Tile(tile));
        if !animated {
            self.order.insert(at, id);
            self.layout_pass(false);
            return Some(id);
        }

        // The real tile stays out of the sequence until the room is made
        let placeholder = self.slots.insert(Slot::Placeholder);
        self.order.insert(at, placeholder);
        if let Some(transition) = self.layout_pass(true) {
            self.pending.push(PendingInsert {
                transition,
                placeholder,
                tile: id,
            });
        }
        Some(id)
    }

    /// Remove the tile at `at`; removing a placeholder cancels its insertion
    pub fn remove_tile(&mut self, at: usize, animated: bool) -> Option<T> {
        if at >= self.len() {
            tracing::debug!("Remove index {} out of {} tiles, ignored", at, self.len());
            return None;
        }

        let id = self.order.remove(at);
        self.engine.clear(id, &mut self.host);
        let removed = match self.slots.remove(id) {
            Some(Slot::Tile(tile)) => Some(tile),
            Some(Slot::Placeholder) => self.cancel_insert(id),
            None => None,
        };
        self.layout_pass(animated);
        removed
    }

    /// Put `new` where `old` is, moving `old`'s relations onto it as they are.
    ///
    /// Returns the new tile's id and the detached old tile.
    pub fn replace_tile(&mut self, old: TileId, new: T, animated: bool) -> Option<(TileId, T)> {
        let Some(index) = self.index_of(old) else {
            tracing::debug!("Tile {:?} not in container, replace ignored", old);
            return None;
        };
        if self.is_placeholder(old) {
            return None;
        }

        let id = self.slots.insert(Slot::Tile(new));
        self.order[index] = id;
        self.engine.retarget(old, id, &mut self.host);
        self.engine.clear(old, &mut self.host);
        self.run_pass(animated);

        match self.slots.remove(old) {
            Some(Slot::Tile(previous)) => Some((id, previous)),
            _ => None,
        }
    }

    /// Exchange two tiles; clears every tile's size adjustment
    pub fn swap(&mut self, a: usize, b: usize, animated: bool) -> Result<(), ContainerError> {
        let len = self.len();
        for index in [a, b] {
            if index >= len {
                return Err(ContainerError::IndexOutOfRange { index, len });
            }
        }

        self.order.swap(a, b);
        self.engine.reset_adjustments();
        self.layout_pass(animated);
        Ok(())
    }

    /// Grow or shrink a tile on top of its proportional size; deltas accumulate
    pub fn adjust_tile(&mut self, tile: TileId, width_delta: f32, height_delta: f32) {
        if self.index_of(tile).is_none() {
            tracing::debug!("Tile {:?} not in container, adjust ignored", tile);
            return;
        }
        self.engine.adjust(tile, SizeDelta::new(width_delta, height_delta));
        self.layout_pass(false);
    }

    /// Mark the layout stale, e.g. after the host view was resized
    pub fn set_needs_layout(&mut self) {
        self.needs_layout = true;
    }

    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Relayout if marked stale; the host calls this at its own pass boundary
    pub fn commit_layout(&mut self) -> bool {
        if !self.needs_layout {
            return false;
        }
        self.layout_pass(false);
        true
    }

    pub fn relayout(&mut self) {
        self.layout_pass(false);
    }

    /// Called by the host once an animated pass has finished interpolating
    pub fn finish_transition(&mut self, id: TransitionId) {
        let Some(pos) = self.pending.iter().position(|p| p.transition == id) else {
            return;
        };
        let pending = self.pending.remove(pos);
        let Some(index) = self.index_of(pending.placeholder) else {
            tracing::warn!(
                "Placeholder for {:?} left the layout, dropping insertion",
                pending.tile
            );
            self.slots.remove(pending.placeholder);
            self.slots.remove(pending.tile);
            return;
        };

        let edge = self
            .engine
            .install_entry(pending.tile, pending.placeholder, &mut self.host);
        self.host.run_pass(Pass::Immediate);

        self.order[index] = pending.tile;
        self.engine.retarget(pending.placeholder, pending.tile, &mut self.host);
        self.slots.remove(pending.placeholder);
        self.run_pass(true);
        tracing::debug!("Tile {:?} entered from {:?}", pending.tile, edge);
    }

    /// Number of animated insertions waiting for their transition to finish
    pub fn pending_insertions(&self) -> usize {
        self.pending.len()
    }

    fn cancel_insert(&mut self, placeholder: TileId) -> Option<T> {
        let pos = self.pending.iter().position(|p| p.placeholder == placeholder)?;
        let pending = self.pending.remove(pos);
        match self.slots.remove(pending.tile)? {
            Slot::Tile(tile) => Some(tile),
            Slot::Placeholder => None,
        }
    }

    fn layout_pass(&mut self, animated: bool) -> Option<TransitionId> {
        let text_direction = self.host.text_direction();
        self.engine.relayout(&self.order, text_direction, &mut self.host);
        self.needs_layout = false;
        self.run_pass(animated)
    }

    fn run_pass(&mut self, animated: bool) -> Option<TransitionId> {
        if !animated {
            self.host.run_pass(Pass::Immediate);
            return None;
        }
        let id = TransitionId(self.next_transition);
        self.next_transition += 1;
        self.host.run_pass(Pass::Animated {
            id,
            transition: self.transition,
        });
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryHost;
    use std::collections::HashMap;
    use tilegrid_core::{Alignment, FillDirection, TextDirection};
    use tilegrid_layout::{Anchor, ConstraintSolver, Rect, Relation, RelationSet, Size};

    fn container(
        rows: usize,
        columns: usize,
        direction: FillDirection,
    ) -> TileContainer<&'static str, MemoryHost> {
        TileContainer::new(
            GridBounds::new(rows, columns).unwrap(),
            FillPolicy::new(Alignment::Left, direction),
            MemoryHost::new(),
        )
    }

    fn rects(container: &TileContainer<&'static str, MemoryHost>) -> HashMap<TileId, Rect> {
        container.host().resolve(Size::unit()).unwrap()
    }

    /// Resolves the relation set on every pass so intermediate states can be checked
    #[derive(Default)]
    struct SnapshotHost {
        relations: RelationSet,
        snapshots: Vec<(Pass, HashMap<TileId, Rect>)>,
    }

    impl ConstraintSolver for SnapshotHost {
        fn install(&mut self, relation: Relation) {
            self.relations.install(relation);
        }

        fn retract(&mut self, relation: &Relation) {
            self.relations.retract(relation);
        }
    }

    impl LayoutHost for SnapshotHost {
        fn run_pass(&mut self, pass: Pass) {
            let rects = self.relations.resolve(Size::unit()).unwrap();
            self.snapshots.push((pass, rects));
        }
    }

    #[test]
    fn add_fills_rows() {
        let mut c = container(2, 2, FillDirection::Horizontal);
        let t1 = c.add_tile("one", false).unwrap();
        let t2 = c.add_tile("two", false).unwrap();
        let t3 = c.add_tile("three", false).unwrap();

        assert_eq!(c.layout().rows(), vec![vec![t1, t2], vec![t3]]);
        let rects = rects(&c);
        assert!(rects[&t3].approx_eq(&Rect { x: 0.0, y: 0.5, width: 1.0, height: 0.5 }));
        assert_eq!(c.host().passes.last(), Some(&Pass::Immediate));
    }

    #[test]
    fn insert_beyond_capacity_is_ignored() {
        let mut c = container(1, 2, FillDirection::Horizontal);
        c.add_tile("a", false);
        c.add_tile("b", false);
        let passes = c.host().passes.len();

        assert_eq!(c.add_tile("c", false), None);
        assert_eq!(c.add_tile("c", true), None);
        assert_eq!(c.len(), 2);
        assert_eq!(c.host().passes.len(), passes);
    }

    #[test]
    fn insert_past_end_is_ignored() {
        let mut c = container(2, 2, FillDirection::Horizontal);
        c.add_tile("a", false);
        assert_eq!(c.insert_tile("b", 2, false), None);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn insert_at_front_shifts_tiles() {
        let mut c = container(2, 2, FillDirection::Horizontal);
        let a = c.add_tile("a", false).unwrap();
        let b = c.insert_tile("b", 0, false).unwrap();
        assert_eq!(c.tiles(), &[b, a]);
        let rects = rects(&c);
        assert!(rects[&b].approx_eq(&Rect { x: 0.0, y: 0.0, width: 0.5, height: 1.0 }));
        assert!(rects[&a].approx_eq(&Rect { x: 0.5, y: 0.0, width: 0.5, height: 1.0 }));
    }

    #[test]
    fn remove_out_of_range_is_ignored() {
        let mut c = container(2, 2, FillDirection::Horizontal);
        c.add_tile("a", false);
        assert_eq!(c.remove_tile(1, false), None);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn remove_clears_geometry() {
        let mut c = container(2, 2, FillDirection::Horizontal);
        let a = c.add_tile("a", false).unwrap();
        let b = c.add_tile("b", false).unwrap();
        c.adjust_tile(b, 4.0, 4.0);

        assert_eq!(c.remove_tile(1, true), Some("b"));
        assert_eq!(c.tiles(), &[a]);
        assert_eq!(c.engine().adjustment(b), SizeDelta::ZERO);
        assert!(c.engine().installed(b).is_empty());
        assert!(c.host().relations.for_tile(b).next().is_none());
        assert!(matches!(c.host().passes.last(), Some(Pass::Animated { .. })));
        assert!(rects(&c)[&a].approx_eq(&Rect { x: 0.0, y: 0.0, width: 1.0, height: 1.0 }));
    }

    #[test]
    fn replace_keeps_the_same_box() {
        let mut c = container(2, 2, FillDirection::Horizontal);
        let a = c.add_tile("a", false).unwrap();
        let b = c.add_tile("b", false).unwrap();
        let d = c.add_tile("d", false).unwrap();
        c.adjust_tile(b, 10.0, 0.0);
        let before = c.host().resolve(Size::new(100.0, 100.0)).unwrap();

        let (e, old) = c.replace_tile(b, "e", false).unwrap();
        assert_eq!(old, "b");
        assert_eq!(c.tiles(), &[a, e, d]);
        assert_eq!(c.get(e), Some(&"e"));
        assert_eq!(c.get(b), None);

        let after = c.host().resolve(Size::new(100.0, 100.0)).unwrap();
        assert!(after[&e].approx_eq(&before[&b]));
        assert!(after[&d].approx_eq(&before[&d]));
        assert_eq!(c.engine().adjustment(e), SizeDelta::new(10.0, 0.0));
        assert_eq!(c.host().relations.len(), 12);
    }

    #[test]
    fn replace_unknown_tile_is_ignored() {
        let mut c = container(2, 2, FillDirection::Horizontal);
        let a = c.add_tile("a", false).unwrap();
        c.remove_tile(0, false);
        assert!(c.replace_tile(a, "b", false).is_none());
        assert!(c.is_empty());
    }

    #[test]
    fn replace_retargets_neighbours() {
        let mut c = container(2, 2, FillDirection::Horizontal);
        let a = c.add_tile("a", false).unwrap();
        let b = c.add_tile("b", false).unwrap();
        let (e, _) = c.replace_tile(a, "e", true).unwrap();

        assert_eq!(c.engine().placement(b).unwrap().position.left, Anchor::Tile(e));
        assert!(matches!(c.host().passes.last(), Some(Pass::Animated { .. })));
    }

    #[test]
    fn swap_twice_restores_order_and_clears_adjustments() {
        let mut c = container(2, 2, FillDirection::Horizontal);
        let a = c.add_tile("a", false).unwrap();
        let b = c.add_tile("b", false).unwrap();
        let d = c.add_tile("d", false).unwrap();

        c.adjust_tile(a, 5.0, 5.0);
        c.swap(0, 2, false).unwrap();
        assert_eq!(c.tiles(), &[d, b, a]);
        assert_eq!(c.engine().adjustment(a), SizeDelta::ZERO);

        c.adjust_tile(d, 1.0, 1.0);
        c.swap(0, 2, false).unwrap();
        assert_eq!(c.tiles(), &[a, b, d]);
        assert_eq!(c.engine().adjustment(d), SizeDelta::ZERO);
    }

    #[test]
    fn swap_out_of_range_is_an_error() {
        let mut c = container(2, 2, FillDirection::Horizontal);
        let a = c.add_tile("a", false).unwrap();
        c.adjust_tile(a, 2.0, 0.0);

        assert_eq!(
            c.swap(0, 3, false),
            Err(ContainerError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert_eq!(c.tiles(), &[a]);
        assert_eq!(c.engine().adjustment(a), SizeDelta::new(2.0, 0.0));
    }

    #[test]
    fn adjustments_accumulate() {
        let mut c = container(1, 1, FillDirection::Horizontal);
        let a = c.add_tile("a", false).unwrap();
        c.adjust_tile(a, 10.0, 0.0);
        c.adjust_tile(a, 5.0, 3.0);

        assert_eq!(c.engine().adjustment(a), SizeDelta::new(15.0, 3.0));
        let rects = c.host().resolve(Size::new(100.0, 50.0)).unwrap();
        assert!(rects[&a].approx_eq(&Rect { x: 0.0, y: 0.0, width: 115.0, height: 53.0 }));
        assert_eq!(c.host().passes.last(), Some(&Pass::Immediate));
    }

    #[test]
    fn vertical_fill_stretches_last_column() {
        let mut c = container(2, 2, FillDirection::Vertical);
        let t1 = c.add_tile("one", false).unwrap();
        c.add_tile("two", false);
        let t3 = c.add_tile("three", false).unwrap();

        let placement = c.engine().placement(t3).unwrap();
        assert_eq!(placement.position.top, Anchor::Container);
        assert_eq!(placement.position.left, Anchor::Tile(t1));
        assert!(rects(&c)[&t3].approx_eq(&Rect { x: 0.5, y: 0.0, width: 0.5, height: 1.0 }));
    }

    #[test]
    fn animated_insert_uses_placeholder_until_finished() {
        let mut c = container(2, 2, FillDirection::Horizontal);
        let a = c.add_tile("a", false).unwrap();
        let b = c.add_tile("b", true).unwrap();

        assert_eq!(c.len(), 2);
        let placeholder = c.tiles()[1];
        assert!(c.is_placeholder(placeholder));
        assert_eq!(c.get(b), Some(&"b"));
        assert_eq!(c.pending_insertions(), 1);

        let transition = c.host().last_transition().unwrap();
        let before = rects(&c);
        c.finish_transition(transition);

        assert_eq!(c.tiles(), &[a, b]);
        assert!(!c.is_placeholder(b));
        assert_eq!(c.pending_insertions(), 0);
        assert!(c.engine().installed(placeholder).is_empty());
        let after = rects(&c);
        assert!(after[&b].approx_eq(&before[&placeholder]));
        assert!(!after.contains_key(&placeholder));
    }

    #[test]
    fn animated_insert_enters_from_touched_edge() {
        let mut c = TileContainer::new(
            GridBounds::new(3, 2).unwrap(),
            FillPolicy::new(Alignment::Left, FillDirection::Horizontal),
            SnapshotHost::default(),
        );
        for name in ["a", "b", "c", "d"] {
            c.add_tile(name, false);
        }
        // Slot 3 becomes the right end of the middle row once a fifth tile arrives
        let e = c.insert_tile("e", 3, true).unwrap();
        let Some((Pass::Animated { id, .. }, _)) = c.host().snapshots.last().cloned() else {
            panic!("expected an animated pass");
        };
        c.finish_transition(id);

        let snapshots = &c.host().snapshots;
        let (entry_pass, entry) = &snapshots[snapshots.len() - 2];
        assert_eq!(*entry_pass, Pass::Immediate);
        assert!((entry[&e].x - 1.0).abs() < 0.001);

        let (final_pass, settled) = &snapshots[snapshots.len() - 1];
        assert!(matches!(final_pass, Pass::Animated { .. }));
        let third = 1.0 / 3.0;
        assert!(settled[&e].approx_eq(&Rect { x: 0.5, y: third, width: 0.5, height: third }));
    }

    #[test]
    fn removing_placeholder_cancels_insert() {
        let mut c = container(2, 2, FillDirection::Horizontal);
        c.add_tile("a", false);
        let b = c.add_tile("b", true).unwrap();
        let transition = c.host().last_transition().unwrap();

        assert_eq!(c.remove_tile(1, false), Some("b"));
        assert_eq!(c.get(b), None);
        assert_eq!(c.pending_insertions(), 0);

        c.finish_transition(transition);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn commit_layout_only_when_dirty() {
        let mut c = container(2, 2, FillDirection::Horizontal);
        c.add_tile("a", false);
        let passes = c.host().passes.len();

        assert!(!c.commit_layout());
        c.set_needs_layout();
        assert!(c.needs_layout());
        assert!(c.commit_layout());
        assert!(!c.needs_layout());
        assert_eq!(c.host().passes.len(), passes + 1);
    }

    #[test]
    fn right_to_left_host_mirrors_auto_alignment() {
        let mut c = TileContainer::new(
            GridBounds::new(1, 2).unwrap(),
            FillPolicy::new(Alignment::Auto, FillDirection::Horizontal),
            MemoryHost::with_text_direction(TextDirection::RightToLeft),
        );
        let a = c.add_tile("a", false).unwrap();
        let b = c.add_tile("b", false).unwrap();
        assert_eq!(c.layout().rows(), vec![vec![b, a]]);
    }

    #[test]
    fn from_config_uses_animation_settings() {
        let config = LayoutConfig::from_toml("[animation]\nduration_ms = 100\n").unwrap();
        let mut c: TileContainer<&str, MemoryHost> =
            TileContainer::from_config(&config, MemoryHost::new());
        c.add_tile("a", true);
        let Some(Pass::Animated { transition, .. }) = c.host().passes.last().copied() else {
            panic!("expected an animated pass");
        };
        assert_eq!(transition.duration, std::time::Duration::from_millis(100));
    }
}
