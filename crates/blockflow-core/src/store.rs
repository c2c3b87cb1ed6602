//! Canvas state store: the single authority for all canvas state.
//!
//! Every durable mutation flows through [`CanvasState::apply`] as a
//! named [`Action`]. The reducer is total: invalid inputs (unknown
//! block id, colliding rename, degenerate resize) degrade to no-ops
//! instead of panicking, so the UI stays responsive.

use crate::block::{Block, MIN_HEIGHT, MIN_WIDTH};
use crate::grid;
use crate::naming::next_name;
use kurbo::{Point, Rect, Vec2};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Transient marquee rectangle, alive only during a background drag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SelectionBox {
    /// Anchor point captured on drag start.
    pub start: Point,
    /// Current pointer position.
    pub current: Point,
}

impl SelectionBox {
    /// Axis-aligned bounding box between anchor and current point.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.start.x.min(self.current.x),
            self.start.y.min(self.current.y),
            self.start.x.max(self.current.x),
            self.start.y.max(self.current.y),
        )
    }
}

/// Context menu state.
///
/// A `None` target with a multi-member selection means a group-level
/// menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextMenu {
    /// Canvas position of the menu.
    pub position: Point,
    /// Block the menu was opened on, if any.
    pub target: Option<String>,
}

/// A discrete, named state mutation.
#[derive(Debug, Clone)]
pub enum Action {
    /// Add a block; geometry is snapped and a colliding id is
    /// re-derived through the naming allocator.
    AddBlock(Block),
    /// Position or resize change from a gesture. Classified as a
    /// resize when width or height differs from the current rect.
    MoveOrResize {
        id: String,
        rect: Rect,
        group_drag: bool,
    },
    /// Toggle one id's selection membership (modifier click).
    ToggleSelect(String),
    /// Replace the selection with a single id (plain click).
    SelectOnly(String),
    /// Replace the whole selection.
    SelectSet(Vec<String>),
    ClearSelection,
    /// Begin a marquee at the anchor point; clears prior selection.
    MarqueeStart(Point),
    /// Recompute the marquee box and replace the selection with
    /// exactly the blocks overlapping it.
    MarqueeUpdate(Point),
    /// Deactivate the marquee without altering the final selection.
    MarqueeEnd,
    /// Duplicate one block, offset by a canvas-space delta.
    DuplicateSingle { id: String, delta: Vec2 },
    /// Duplicate the whole selection; offsets are taken relative to
    /// the anchor block's pre-duplication position.
    DuplicateGroup { anchor: String, delta: Vec2 },
    /// Rename a block. No-op on blank, unchanged or colliding names.
    Rename { old: String, new: String },
    Delete(String),
    DeleteSelected,
    /// Raise a block to the top of the z-order (drag started).
    BringToFront(String),
    SetGhosts(Vec<String>),
    ClearGhosts,
    OpenContextMenu { position: Point, target: Option<String> },
    CloseContextMenu,
    SetConfigReady(bool),
}

/// The canvas state: block list, selection, and transient gesture
/// bookkeeping. Blocks are kept in document order, which doubles as
/// z-order (back to front).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasState {
    /// Unique document identifier.
    pub document_id: Uuid,
    /// All blocks, back to front.
    pub blocks: Vec<Block>,
    /// Selected block ids.
    pub selection: HashSet<String>,
    /// Active marquee, if a background drag is in progress.
    pub selection_box: Option<SelectionBox>,
    /// Open context menu, if any.
    pub context_menu: Option<ContextMenu>,
    /// Blocks rendered at reduced opacity as duplicate previews.
    pub ghosts: HashSet<String>,
    /// Whether the block-type configuration has loaded.
    pub config_ready: bool,
    /// Grid cell size used for all snapping.
    pub grid_size: f64,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasState {
    /// Create an empty canvas.
    pub fn new() -> Self {
        Self {
            document_id: Uuid::new_v4(),
            blocks: Vec::new(),
            selection: HashSet::new(),
            selection_box: None,
            context_menu: None,
            ghosts: HashSet::new(),
            config_ready: false,
            grid_size: grid::GRID_SIZE,
        }
    }

    /// Look up a block by id.
    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    fn block_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    /// Topmost block containing the given canvas point.
    pub fn block_at(&self, point: Point) -> Option<&Block> {
        self.blocks.iter().rev().find(|b| b.hit_test(point))
    }

    /// Check selection membership.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Check ghost membership.
    pub fn is_ghost(&self, id: &str) -> bool {
        self.ghosts.contains(id)
    }

    /// All block ids currently in use.
    pub fn existing_names(&self) -> HashSet<String> {
        self.blocks.iter().map(|b| b.id.clone()).collect()
    }

    /// Apply an action atomically. Returns `true` if the state
    /// changed, so callers can skip redundant re-renders.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::AddBlock(block) => self.add_block(block),
            Action::MoveOrResize {
                id,
                rect,
                group_drag,
            } => self.move_or_resize(&id, rect, group_drag),
            Action::ToggleSelect(id) => self.toggle_select(&id),
            Action::SelectOnly(id) => self.select_only(&id),
            Action::SelectSet(ids) => {
                let next: HashSet<String> = ids
                    .into_iter()
                    .filter(|id| self.block(id).is_some())
                    .collect();
                if next == self.selection {
                    return false;
                }
                self.selection = next;
                true
            }
            Action::ClearSelection => {
                if self.selection.is_empty() {
                    return false;
                }
                self.selection.clear();
                true
            }
            Action::MarqueeStart(anchor) => {
                self.selection.clear();
                self.selection_box = Some(SelectionBox {
                    start: anchor,
                    current: anchor,
                });
                true
            }
            Action::MarqueeUpdate(current) => self.marquee_update(current),
            Action::MarqueeEnd => {
                if self.selection_box.is_none() {
                    return false;
                }
                self.selection_box = None;
                true
            }
            Action::DuplicateSingle { id, delta } => self.duplicate_single(&id, delta),
            Action::DuplicateGroup { anchor, delta } => self.duplicate_group(&anchor, delta),
            Action::Rename { old, new } => self.rename(&old, &new),
            Action::Delete(id) => self.delete(&id),
            Action::DeleteSelected => {
                let ids: Vec<String> = self.selection.iter().cloned().collect();
                let mut changed = false;
                for id in ids {
                    changed |= self.delete(&id);
                }
                changed
            }
            Action::BringToFront(id) => {
                let Some(pos) = self.blocks.iter().position(|b| b.id == id) else {
                    return false;
                };
                if pos == self.blocks.len() - 1 {
                    return false;
                }
                let block = self.blocks.remove(pos);
                self.blocks.push(block);
                true
            }
            Action::SetGhosts(ids) => {
                let next: HashSet<String> = ids
                    .into_iter()
                    .filter(|id| self.block(id).is_some())
                    .collect();
                if next == self.ghosts {
                    return false;
                }
                self.ghosts = next;
                true
            }
            Action::ClearGhosts => {
                if self.ghosts.is_empty() {
                    return false;
                }
                self.ghosts.clear();
                true
            }
            Action::OpenContextMenu { position, target } => {
                self.context_menu = Some(ContextMenu { position, target });
                true
            }
            Action::CloseContextMenu => {
                if self.context_menu.is_none() {
                    return false;
                }
                self.context_menu = None;
                true
            }
            Action::SetConfigReady(ready) => {
                if self.config_ready == ready {
                    return false;
                }
                self.config_ready = ready;
                true
            }
        }
    }

    fn add_block(&mut self, mut block: Block) -> bool {
        let existing = self.existing_names();
        if existing.contains(&block.id) {
            block.id = next_name(&block.id, &existing);
        }
        block.set_rect(self.snap_clamped(block.as_rect()));
        debug!("add block '{}' ({})", block.id, block.block_type);
        self.blocks.push(block);
        true
    }

    /// Snap a rect to the grid with the minimum size enforced. If
    /// snapping would round an extent below the minimum, it bumps up
    /// one cell instead.
    fn snap_clamped(&self, rect: Rect) -> Rect {
        let cell = self.grid_size;
        let x = grid::snap(rect.x0, cell);
        let y = grid::snap(rect.y0, cell);
        let mut w = grid::snap(rect.width().max(MIN_WIDTH), cell);
        if w < MIN_WIDTH {
            w += cell;
        }
        let mut h = grid::snap(rect.height().max(MIN_HEIGHT), cell);
        if h < MIN_HEIGHT {
            h += cell;
        }
        Rect::new(x, y, x + w, y + h)
    }

    fn move_or_resize(&mut self, id: &str, rect: Rect, group_drag: bool) -> bool {
        let Some(current) = self.block(id).map(|b| b.as_rect()) else {
            warn!("move/resize on unknown block '{id}'");
            return false;
        };

        let is_resize = (rect.width() - current.width()).abs() > 1e-9
            || (rect.height() - current.height()).abs() > 1e-9;

        if is_resize {
            // Resize only touches the grabbed block, even inside a
            // multi-selection.
            let snapped = self.snap_clamped(rect);
            if rects_equal(snapped, current) {
                return false;
            }
            if let Some(block) = self.block_mut(id) {
                block.set_rect(snapped);
            }
            return true;
        }

        // Pure translation: snap the delta so aligned blocks stay
        // aligned, and short-circuit when nothing would move.
        let cell = self.grid_size;
        let delta = Vec2::new(
            grid::snap(rect.x0 - current.x0, cell),
            grid::snap(rect.y0 - current.y0, cell),
        );
        if delta.x.abs() < 1e-9 && delta.y.abs() < 1e-9 {
            return false;
        }

        if group_drag && self.selection.len() > 1 && self.selection.contains(id) {
            // One atomic commit for the whole group; dimensions are
            // untouched.
            let ids: Vec<String> = self.selection.iter().cloned().collect();
            for member in ids {
                if let Some(block) = self.block_mut(&member) {
                    block.position += delta;
                }
            }
        } else if let Some(block) = self.block_mut(id) {
            block.position += delta;
        }
        true
    }

    fn toggle_select(&mut self, id: &str) -> bool {
        if self.block(id).is_none() {
            return false;
        }
        if !self.selection.remove(id) {
            self.selection.insert(id.to_string());
        }
        true
    }

    fn select_only(&mut self, id: &str) -> bool {
        if self.block(id).is_none() {
            return false;
        }
        if self.selection.len() == 1 && self.selection.contains(id) {
            return false;
        }
        self.selection.clear();
        self.selection.insert(id.to_string());
        true
    }

    fn marquee_update(&mut self, current: Point) -> bool {
        let Some(mut sel_box) = self.selection_box else {
            return false;
        };
        sel_box.current = current;
        self.selection_box = Some(sel_box);

        let rect = sel_box.to_rect();
        self.selection = self
            .blocks
            .iter()
            .filter(|b| b.overlaps(rect))
            .map(|b| b.id.clone())
            .collect();
        true
    }

    fn duplicate_single(&mut self, id: &str, delta: Vec2) -> bool {
        let Some(original) = self.block(id).cloned() else {
            warn!("duplicate of unknown block '{id}'");
            return false;
        };
        let existing = self.existing_names();
        // Name derives from the original's current id, not its type.
        let new_id = next_name(&original.id, &existing);

        let mut copy = original;
        copy.id = new_id.clone();
        copy.position = grid::snap_point(copy.position + delta, self.grid_size);
        debug!("duplicate '{id}' -> '{new_id}'");
        self.blocks.push(copy);

        self.selection = HashSet::from([new_id.clone()]);
        self.ghosts = HashSet::from([new_id]);
        true
    }

    fn duplicate_group(&mut self, anchor: &str, delta: Vec2) -> bool {
        if !self.selection.contains(anchor) {
            warn!("group duplicate anchored on unselected block '{anchor}'");
            return false;
        }
        let Some(anchor_pos) = self.block(anchor).map(|b| b.position) else {
            return false;
        };

        // Snapshot the selection in z-order before any mutation; all
        // offsets are relative to the anchor's pre-duplication
        // position.
        let originals: Vec<Block> = self
            .blocks
            .iter()
            .filter(|b| self.selection.contains(&b.id))
            .cloned()
            .collect();

        let mut used = self.existing_names();
        let mut fresh: Vec<Block> = Vec::with_capacity(originals.len());
        for original in originals {
            let new_id = next_name(&original.id, &used);
            used.insert(new_id.clone());

            let offset = original.position - anchor_pos;
            let mut copy = original;
            copy.id = new_id;
            copy.position =
                grid::snap_point(anchor_pos + delta + offset, self.grid_size);
            fresh.push(copy);
        }

        let new_ids: HashSet<String> = fresh.iter().map(|b| b.id.clone()).collect();
        debug!("group duplicate of {} blocks", fresh.len());
        self.blocks.extend(fresh);
        self.selection = new_ids.clone();
        self.ghosts = new_ids;
        true
    }

    fn rename(&mut self, old: &str, new: &str) -> bool {
        let new = new.trim();
        if new.is_empty() || new == old {
            return false;
        }
        if self.blocks.iter().any(|b| b.id == new) {
            warn!("rename '{old}' -> '{new}' rejected: id in use");
            return false;
        }
        let Some(block) = self.block_mut(old) else {
            return false;
        };
        block.id = new.to_string();
        // Membership follows the block under its new id.
        if self.selection.remove(old) {
            self.selection.insert(new.to_string());
        }
        if self.ghosts.remove(old) {
            self.ghosts.insert(new.to_string());
        }
        true
    }

    fn delete(&mut self, id: &str) -> bool {
        let Some(pos) = self.blocks.iter().position(|b| b.id == id) else {
            return false;
        };
        self.blocks.remove(pos);
        self.selection.remove(id);
        self.ghosts.remove(id);
        if let Some(menu) = &self.context_menu {
            if menu.target.as_deref() == Some(id) {
                self.context_menu = None;
            }
        }
        true
    }
}

fn rects_equal(a: Rect, b: Rect) -> bool {
    (a.x0 - b.x0).abs() < 1e-9
        && (a.y0 - b.y0).abs() < 1e-9
        && (a.x1 - b.x1).abs() < 1e-9
        && (a.y1 - b.y1).abs() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{ParamValue, Parameter};

    fn block(id: &str, x: f64, y: f64, w: f64, h: f64) -> Block {
        Block::new(id, "gain", Point::new(x, y), w, h)
    }

    fn canvas_with(blocks: Vec<Block>) -> CanvasState {
        let mut state = CanvasState::new();
        for b in blocks {
            state.apply(Action::AddBlock(b));
        }
        state
    }

    #[test]
    fn test_drag_snaps_final_position() {
        // Create A at (0,0,100,100), drag by (23,7), grid 5 -> (25,5).
        let mut state = canvas_with(vec![block("a", 0.0, 0.0, 100.0, 100.0)]);
        let changed = state.apply(Action::MoveOrResize {
            id: "a".into(),
            rect: Rect::new(23.0, 7.0, 123.0, 107.0),
            group_drag: false,
        });
        assert!(changed);
        let a = state.block("a").unwrap();
        assert_eq!(a.position, Point::new(25.0, 5.0));
        assert_eq!(a.width, 100.0);
        assert_eq!(a.height, 100.0);
    }

    #[test]
    fn test_translation_short_circuits_below_threshold() {
        let mut state = canvas_with(vec![block("a", 0.0, 0.0, 100.0, 100.0)]);
        let changed = state.apply(Action::MoveOrResize {
            id: "a".into(),
            rect: Rect::new(1.0, 1.0, 101.0, 101.0), // snaps to zero delta
            group_drag: false,
        });
        assert!(!changed);
    }

    #[test]
    fn test_resize_identical_snapped_rect_short_circuits() {
        let mut state = canvas_with(vec![block("a", 0.0, 0.0, 100.0, 100.0)]);
        let changed = state.apply(Action::MoveOrResize {
            id: "a".into(),
            rect: Rect::new(0.0, 0.0, 101.0, 99.0), // snaps back to current
            group_drag: false,
        });
        assert!(!changed);
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let mut state = canvas_with(vec![block("a", 0.0, 0.0, 100.0, 100.0)]);
        state.apply(Action::MoveOrResize {
            id: "a".into(),
            rect: Rect::new(0.0, 0.0, 3.0, 3.0),
            group_drag: false,
        });
        let a = state.block("a").unwrap();
        assert!(a.width >= MIN_WIDTH);
        assert!(a.height >= MIN_HEIGHT);
    }

    #[test]
    fn test_resize_never_moves_group() {
        let mut state = canvas_with(vec![
            block("a", 0.0, 0.0, 100.0, 100.0),
            block("b", 200.0, 0.0, 100.0, 100.0),
        ]);
        state.apply(Action::SelectSet(vec!["a".into(), "b".into()]));
        state.apply(Action::MoveOrResize {
            id: "a".into(),
            rect: Rect::new(0.0, 0.0, 150.0, 150.0),
            group_drag: true,
        });
        let b = state.block("b").unwrap();
        assert_eq!(b.position, Point::new(200.0, 0.0));
        let a = state.block("a").unwrap();
        assert_eq!(a.width, 150.0);
    }

    #[test]
    fn test_group_drag_moves_all_selected_atomically() {
        // Select A and B, drag A by (10,10): both move, B's size intact.
        let mut state = canvas_with(vec![
            block("a", 0.0, 0.0, 100.0, 100.0),
            block("b", 200.0, 50.0, 60.0, 40.0),
            block("c", 400.0, 0.0, 100.0, 100.0),
        ]);
        state.apply(Action::SelectSet(vec!["a".into(), "b".into()]));
        state.apply(Action::MoveOrResize {
            id: "a".into(),
            rect: Rect::new(10.0, 10.0, 110.0, 110.0),
            group_drag: true,
        });
        assert_eq!(state.block("a").unwrap().position, Point::new(10.0, 10.0));
        let b = state.block("b").unwrap();
        assert_eq!(b.position, Point::new(210.0, 60.0));
        assert_eq!(b.width, 60.0);
        assert_eq!(b.height, 40.0);
        // Non-selected blocks are unchanged.
        assert_eq!(state.block("c").unwrap().position, Point::new(400.0, 0.0));
    }

    #[test]
    fn test_single_drag_ignores_group_flag_without_selection() {
        let mut state = canvas_with(vec![
            block("a", 0.0, 0.0, 100.0, 100.0),
            block("b", 200.0, 0.0, 100.0, 100.0),
        ]);
        state.apply(Action::MoveOrResize {
            id: "a".into(),
            rect: Rect::new(10.0, 0.0, 110.0, 100.0),
            group_drag: true,
        });
        assert_eq!(state.block("b").unwrap().position, Point::new(200.0, 0.0));
    }

    #[test]
    fn test_toggle_and_clear_selection() {
        let mut state = canvas_with(vec![block("a", 0.0, 0.0, 100.0, 100.0)]);
        state.apply(Action::ToggleSelect("a".into()));
        assert!(state.is_selected("a"));
        state.apply(Action::ToggleSelect("a".into()));
        assert!(!state.is_selected("a"));
        state.apply(Action::SelectOnly("a".into()));
        assert!(state.is_selected("a"));
        state.apply(Action::ClearSelection);
        assert!(state.selection.is_empty());
    }

    #[test]
    fn test_marquee_partial_overlap_selects() {
        let mut state = canvas_with(vec![block("a", 10.0, 10.0, 40.0, 40.0)]);
        state.apply(Action::MarqueeStart(Point::new(0.0, 0.0)));
        state.apply(Action::MarqueeUpdate(Point::new(15.0, 15.0)));
        assert!(state.is_selected("a"));

        state.apply(Action::MarqueeUpdate(Point::new(5.0, 5.0)));
        assert!(!state.is_selected("a"));
        state.apply(Action::MarqueeEnd);
        assert!(state.selection_box.is_none());
    }

    #[test]
    fn test_marquee_disjoint_box_selects_nothing() {
        let mut state = canvas_with(vec![block("a", 10.0, 10.0, 40.0, 40.0)]);
        state.apply(Action::MarqueeStart(Point::new(100.0, 100.0)));
        state.apply(Action::MarqueeUpdate(Point::new(110.0, 110.0)));
        assert!(state.selection.is_empty());
    }

    #[test]
    fn test_marquee_end_keeps_final_selection() {
        let mut state = canvas_with(vec![block("a", 10.0, 10.0, 40.0, 40.0)]);
        state.apply(Action::MarqueeStart(Point::new(0.0, 0.0)));
        state.apply(Action::MarqueeUpdate(Point::new(60.0, 60.0)));
        state.apply(Action::MarqueeEnd);
        assert!(state.is_selected("a"));
    }

    #[test]
    fn test_duplicate_single_names_and_geometry() {
        let mut state = canvas_with(vec![block("gain", 0.0, 0.0, 100.0, 100.0)]);
        state.apply(Action::DuplicateSingle {
            id: "gain".into(),
            delta: Vec2::new(23.0, 7.0),
        });
        let copy = state.block("gain1").expect("gain1 created");
        assert_eq!(copy.block_type, "gain");
        assert_eq!(copy.position, Point::new(25.0, 5.0));
        assert!(state.is_selected("gain1"));
        assert!(state.is_ghost("gain1"));
        assert!(!state.is_selected("gain"));
    }

    #[test]
    fn test_duplicate_name_reuse_after_delete() {
        let mut state = canvas_with(vec![block("gain", 0.0, 0.0, 100.0, 100.0)]);
        state.apply(Action::DuplicateSingle {
            id: "gain".into(),
            delta: Vec2::new(50.0, 0.0),
        });
        state.apply(Action::DuplicateSingle {
            id: "gain".into(),
            delta: Vec2::new(100.0, 0.0),
        });
        assert!(state.block("gain2").is_some());
        state.apply(Action::Delete("gain1".into()));
        state.apply(Action::DuplicateSingle {
            id: "gain".into(),
            delta: Vec2::new(150.0, 0.0),
        });
        assert!(state.block("gain1").is_some(), "freed suffix is reused");
    }

    #[test]
    fn test_duplicate_deep_copies_parameters() {
        let original = block("gain", 0.0, 0.0, 100.0, 100.0)
            .with_parameters(vec![Parameter::new("k", ParamValue::Num(2.0))]);
        let mut state = canvas_with(vec![original]);
        state.apply(Action::DuplicateSingle {
            id: "gain".into(),
            delta: Vec2::ZERO,
        });

        // Mutating the copy must not touch the original.
        state
            .blocks
            .iter_mut()
            .find(|b| b.id == "gain1")
            .unwrap()
            .parameters[0]
            .value = ParamValue::Num(9.0);
        assert_eq!(
            state.block("gain").unwrap().parameters[0].value,
            ParamValue::Num(2.0)
        );
    }

    #[test]
    fn test_duplicate_group_offsets_and_names() {
        let mut state = canvas_with(vec![
            block("a", 0.0, 0.0, 40.0, 40.0),
            block("a1", 100.0, 0.0, 40.0, 40.0),
            block("a2", 0.0, 100.0, 40.0, 40.0),
        ]);
        state.apply(Action::SelectSet(vec!["a".into(), "a1".into(), "a2".into()]));
        let changed = state.apply(Action::DuplicateGroup {
            anchor: "a".into(),
            delta: Vec2::new(200.0, 0.0),
        });
        assert!(changed);
        assert_eq!(state.blocks.len(), 6);

        // Three fresh names, none colliding with originals or each other.
        assert_eq!(state.selection.len(), 3);
        for id in ["a", "a1", "a2"] {
            assert!(!state.is_selected(id));
        }
        assert_eq!(state.ghosts, state.selection);

        // Relative offsets preserved from the anchor.
        let a3 = state.block("a3").expect("a3 allocated");
        assert_eq!(a3.position, Point::new(200.0, 0.0));
        let a4 = state.block("a4").expect("a4 allocated");
        assert_eq!(a4.position, Point::new(300.0, 0.0));
        let a5 = state.block("a5").expect("a5 allocated");
        assert_eq!(a5.position, Point::new(200.0, 100.0));
    }

    #[test]
    fn test_duplicate_group_requires_selected_anchor() {
        let mut state = canvas_with(vec![
            block("a", 0.0, 0.0, 40.0, 40.0),
            block("b", 100.0, 0.0, 40.0, 40.0),
        ]);
        state.apply(Action::SelectSet(vec!["b".into()]));
        let changed = state.apply(Action::DuplicateGroup {
            anchor: "a".into(),
            delta: Vec2::new(50.0, 0.0),
        });
        assert!(!changed);
        assert_eq!(state.blocks.len(), 2);
    }

    #[test]
    fn test_rename_happy_path_rewrites_selection() {
        let mut state = canvas_with(vec![block("a", 0.0, 0.0, 100.0, 100.0)]);
        state.apply(Action::SelectOnly("a".into()));
        let changed = state.apply(Action::Rename {
            old: "a".into(),
            new: "integrator".into(),
        });
        assert!(changed);
        assert!(state.block("integrator").is_some());
        assert!(state.is_selected("integrator"));
        assert!(!state.is_selected("a"));
    }

    #[test]
    fn test_rename_collision_rejected() {
        let mut state = canvas_with(vec![
            block("a", 0.0, 0.0, 100.0, 100.0),
            block("b", 200.0, 0.0, 100.0, 100.0),
        ]);
        state.apply(Action::SelectOnly("a".into()));
        let changed = state.apply(Action::Rename {
            old: "a".into(),
            new: "b".into(),
        });
        assert!(!changed);
        assert!(state.block("a").is_some());
        assert!(state.is_selected("a"));
    }

    #[test]
    fn test_rename_blank_or_unchanged_rejected() {
        let mut state = canvas_with(vec![block("a", 0.0, 0.0, 100.0, 100.0)]);
        assert!(!state.apply(Action::Rename {
            old: "a".into(),
            new: "  ".into(),
        }));
        assert!(!state.apply(Action::Rename {
            old: "a".into(),
            new: "a".into(),
        }));
    }

    #[test]
    fn test_delete_clears_memberships() {
        let mut state = canvas_with(vec![block("a", 0.0, 0.0, 100.0, 100.0)]);
        state.apply(Action::SelectOnly("a".into()));
        state.apply(Action::SetGhosts(vec!["a".into()]));
        state.apply(Action::OpenContextMenu {
            position: Point::new(10.0, 10.0),
            target: Some("a".into()),
        });
        state.apply(Action::Delete("a".into()));
        assert!(state.blocks.is_empty());
        assert!(state.selection.is_empty());
        assert!(state.ghosts.is_empty());
        assert!(state.context_menu.is_none());
    }

    #[test]
    fn test_delete_selected() {
        let mut state = canvas_with(vec![
            block("a", 0.0, 0.0, 100.0, 100.0),
            block("b", 200.0, 0.0, 100.0, 100.0),
            block("c", 400.0, 0.0, 100.0, 100.0),
        ]);
        state.apply(Action::SelectSet(vec!["a".into(), "c".into()]));
        state.apply(Action::DeleteSelected);
        assert_eq!(state.blocks.len(), 1);
        assert!(state.block("b").is_some());
    }

    #[test]
    fn test_add_block_resolves_id_collision() {
        let mut state = canvas_with(vec![block("gain", 0.0, 0.0, 100.0, 100.0)]);
        state.apply(Action::AddBlock(block("gain", 200.0, 0.0, 100.0, 100.0)));
        assert!(state.block("gain1").is_some());
    }

    #[test]
    fn test_bring_to_front() {
        let mut state = canvas_with(vec![
            block("a", 0.0, 0.0, 100.0, 100.0),
            block("b", 50.0, 50.0, 100.0, 100.0),
        ]);
        // Both cover (60,60); b is on top initially.
        assert_eq!(state.block_at(Point::new(60.0, 60.0)).unwrap().id, "b");
        state.apply(Action::BringToFront("a".into()));
        assert_eq!(state.block_at(Point::new(60.0, 60.0)).unwrap().id, "a");
        // Already at front short-circuits.
        assert!(!state.apply(Action::BringToFront("a".into())));
    }

    #[test]
    fn test_unknown_ids_are_no_ops() {
        let mut state = canvas_with(vec![block("a", 0.0, 0.0, 100.0, 100.0)]);
        assert!(!state.apply(Action::MoveOrResize {
            id: "ghost".into(),
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            group_drag: false,
        }));
        assert!(!state.apply(Action::ToggleSelect("ghost".into())));
        assert!(!state.apply(Action::Delete("ghost".into())));
        assert!(!state.apply(Action::DuplicateSingle {
            id: "ghost".into(),
            delta: Vec2::ZERO,
        }));
    }

    #[test]
    fn test_committed_positions_stay_aligned() {
        let mut state = canvas_with(vec![block("a", 0.0, 0.0, 100.0, 100.0)]);
        for (dx, dy) in [(23.0, 7.0), (-12.0, 41.0), (3.0, -3.0)] {
            let r = state.block("a").unwrap().as_rect();
            state.apply(Action::MoveOrResize {
                id: "a".into(),
                rect: Rect::new(r.x0 + dx, r.y0 + dy, r.x1 + dx, r.y1 + dy),
                group_drag: false,
            });
            assert!(state.block("a").unwrap().is_grid_aligned(state.grid_size));
        }
    }
}
