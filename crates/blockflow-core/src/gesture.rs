//! Gesture controllers: classify pointer input into selection, drag,
//! resize, duplicate and rename interactions, and drive the state
//! store.
//!
//! One explicit state machine replaces implicit render-driven effects:
//! `Idle -> PendingClick -> {Dragging | Resizing | RightDragDuplicating}
//! -> Idle`, plus a deadline-armed click state that disambiguates a
//! single click from the first half of a double-click. All handlers
//! take the current time in milliseconds, so both timer branches are
//! reachable deterministically in tests.
//!
//! Controllers are the only place transient visual bookkeeping (ghost
//! previews) lives; every durable change goes through
//! [`CanvasState::apply`].

use crate::block::Block;
use crate::input::{Modifiers, MouseButton, PointerEvent};
use crate::store::{Action, CanvasState};
use kurbo::{Point, Rect, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};

/// Tunable gesture behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Minimum pointer travel (canvas units) before a press becomes a
    /// drag or duplicate gesture.
    pub drag_threshold: f64,
    /// Window for double-click detection and for committing an armed
    /// single click, in milliseconds.
    pub double_click_ms: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 3.0,
            double_click_ms: 250.0,
        }
    }
}

/// Corner grabbed by a resize gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Side-channel notifications for the host. Durable model changes
/// never travel this way; these are the interactions the store does
/// not own (opening editors, z-order hints already dispatched).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureEvent {
    /// A drag passed the movement threshold; the pending click was
    /// suppressed and the block raised.
    DragStarted(String),
    /// Double-click on a block body: open its parameter editor.
    OpenParameters(String),
    /// Double-click on a block label: begin inline rename.
    BeginRename(String),
}

/// A lightweight visual clone shown during a right-drag duplicate.
/// Pure presentation: the model is untouched until the gesture
/// commits.
#[derive(Debug, Clone)]
pub struct GhostPreview {
    /// Block the preview mirrors.
    pub source_id: String,
    /// Current preview rectangle.
    pub rect: Rect,
}

/// Where on the block the press landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    Body,
    Label,
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    /// Press received, not yet moved past the threshold.
    PendingClick {
        id: String,
        button: MouseButton,
        modifiers: Modifiers,
        target: PressTarget,
        start: Point,
        block_start: Rect,
        group: bool,
        /// Second press of a double-click.
        second_click: bool,
    },
    Dragging {
        id: String,
        start: Point,
        block_start: Rect,
        group: bool,
    },
    Resizing {
        id: String,
        corner: Corner,
        start: Point,
        block_start: Rect,
    },
    RightDragDuplicating {
        id: String,
        start: Point,
        group: bool,
        /// Threshold crossed; previews exist and up commits.
        active: bool,
    },
    /// Marquee drag on the background.
    Marquee,
    /// Click released below the threshold; its selection commit waits
    /// until the deadline so a double-click can still preempt it.
    ClickArmed {
        id: String,
        modifiers: Modifiers,
        target: PressTarget,
        deadline: f64,
    },
}

/// Pointer gesture controller for the whole canvas.
#[derive(Debug)]
pub struct GestureController {
    pub config: GestureConfig,
    state: State,
    ghost_previews: Vec<GhostPreview>,
    /// Ghost flags in the store are cleared one tick after a
    /// duplicate commits, so the real blocks render before the
    /// preview styling disappears.
    ghosts_pending_clear: bool,
    last_position: Point,
    min_width: f64,
    min_height: f64,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureController {
    /// Create a controller with the given configuration.
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: State::Idle,
            ghost_previews: Vec::new(),
            ghosts_pending_clear: false,
            last_position: Point::ZERO,
            min_width: crate::block::MIN_WIDTH,
            min_height: crate::block::MIN_HEIGHT,
        }
    }

    /// Whether a gesture holds the pointer captured.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, State::Idle | State::ClickArmed { .. })
    }

    /// Current duplicate previews, for the renderer.
    pub fn ghost_previews(&self) -> &[GhostPreview] {
        &self.ghost_previews
    }

    /// Press on a block body or label.
    pub fn block_down(
        &mut self,
        state: &mut CanvasState,
        id: &str,
        target: PressTarget,
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
        now: f64,
    ) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        let Some(block_start) = state.block(id).map(Block::as_rect) else {
            return events;
        };
        self.last_position = position;

        // An armed click on another block resolves immediately; the
        // same block within the window makes this press the second
        // half of a double-click, preempting the single click.
        let mut second_click = false;
        if let State::ClickArmed { id: armed, deadline, .. } = &self.state {
            second_click = armed.as_str() == id && now <= *deadline && button == MouseButton::Left;
        }
        if second_click {
            self.state = State::Idle;
            self.ghost_previews.clear();
        } else {
            events.extend(self.settle(state, now));
        }

        let group = state.is_selected(id) && state.selection.len() > 1;
        state.apply(Action::CloseContextMenu);
        self.state = State::PendingClick {
            id: id.to_string(),
            button,
            modifiers,
            target,
            start: position,
            block_start,
            group,
            second_click,
        };
        events
    }

    /// Press on one of a block's corner resize handles. Resizing
    /// starts immediately; there is no click interpretation on a
    /// handle.
    pub fn handle_down(
        &mut self,
        state: &mut CanvasState,
        id: &str,
        corner: Corner,
        position: Point,
        now: f64,
    ) {
        let Some(block_start) = state.block(id).map(Block::as_rect) else {
            return;
        };
        let _ = self.settle(state, now);
        self.last_position = position;
        debug!("resize start on '{id}' at {corner:?}");
        self.state = State::Resizing {
            id: id.to_string(),
            corner,
            start: position,
            block_start,
        };
    }

    /// Press on the canvas background. A plain press starts the
    /// marquee (clearing the selection); a modifier press keeps the
    /// current selection and stays idle.
    pub fn background_down(
        &mut self,
        state: &mut CanvasState,
        position: Point,
        modifiers: Modifiers,
        now: f64,
    ) -> Vec<GestureEvent> {
        let events = self.settle(state, now);
        self.last_position = position;
        state.apply(Action::CloseContextMenu);
        if modifiers.multi_select() {
            return events;
        }
        state.apply(Action::MarqueeStart(position));
        self.state = State::Marquee;
        events
    }

    /// Route a raw pointer event that needs no hit testing. Down
    /// events carry a press target and go through [`Self::block_down`],
    /// [`Self::handle_down`] or [`Self::background_down`] instead;
    /// they are ignored here.
    pub fn pointer_event(
        &mut self,
        state: &mut CanvasState,
        event: &PointerEvent,
        now: f64,
    ) -> Vec<GestureEvent> {
        match event {
            PointerEvent::Move { position } => self.pointer_move(state, *position, now),
            PointerEvent::Up { position, .. } => self.pointer_up(state, *position, now),
            PointerEvent::Leave => self.pointer_leave(state, now),
            PointerEvent::Down { .. } => Vec::new(),
        }
    }

    /// Pointer movement while a gesture may be in progress.
    pub fn pointer_move(
        &mut self,
        state: &mut CanvasState,
        position: Point,
        _now: f64,
    ) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        self.last_position = position;

        match &mut self.state {
            State::Idle | State::ClickArmed { .. } => {}
            State::PendingClick {
                id,
                button,
                start,
                block_start,
                group,
                ..
            } => {
                let delta = position - *start;
                if delta.hypot() <= self.config.drag_threshold {
                    return events;
                }
                let id = id.clone();
                match button {
                    MouseButton::Left => {
                        let (start, block_start, group) = (*start, *block_start, *group);
                        debug!("drag start on '{id}'");
                        self.state = State::Dragging {
                            id: id.clone(),
                            start,
                            block_start,
                            group,
                        };
                        state.apply(Action::BringToFront(id.clone()));
                        events.push(GestureEvent::DragStarted(id.clone()));
                        state.apply(Action::MoveOrResize {
                            id,
                            rect: block_start + delta,
                            group_drag: group,
                        });
                    }
                    MouseButton::Right => {
                        let (start, group) = (*start, *group);
                        self.state = State::RightDragDuplicating {
                            id: id.clone(),
                            start,
                            group,
                            active: true,
                        };
                        self.rebuild_ghost_previews(state, &id, group, delta);
                    }
                    MouseButton::Middle => {
                        self.state = State::Idle;
                    }
                }
            }
            State::Dragging {
                id,
                start,
                block_start,
                group,
            } => {
                let delta = position - *start;
                let action = Action::MoveOrResize {
                    id: id.clone(),
                    rect: *block_start + delta,
                    group_drag: *group,
                };
                state.apply(action);
            }
            State::Resizing {
                id,
                corner,
                start,
                block_start,
            } => {
                let rect = resize_rect(
                    *block_start,
                    *corner,
                    position - *start,
                    self.min_width,
                    self.min_height,
                );
                let action = Action::MoveOrResize {
                    id: id.clone(),
                    rect,
                    group_drag: false,
                };
                state.apply(action);
            }
            State::RightDragDuplicating {
                id, start, group, ..
            } => {
                let (id, group, delta) = (id.clone(), *group, position - *start);
                self.rebuild_ghost_previews(state, &id, group, delta);
            }
            State::Marquee => {
                state.apply(Action::MarqueeUpdate(position));
            }
        }
        events
    }

    /// Pointer release.
    pub fn pointer_up(
        &mut self,
        state: &mut CanvasState,
        position: Point,
        now: f64,
    ) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        self.last_position = position;

        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => {}
            // An unrelated release must not discard an armed click.
            armed @ State::ClickArmed { .. } => {
                self.state = armed;
            }
            State::PendingClick {
                id,
                button,
                modifiers,
                target,
                second_click,
                ..
            } => match button {
                MouseButton::Left => {
                    if second_click {
                        events.push(match target {
                            PressTarget::Body => GestureEvent::OpenParameters(id),
                            PressTarget::Label => GestureEvent::BeginRename(id),
                        });
                    } else {
                        self.state = State::ClickArmed {
                            id,
                            modifiers,
                            target,
                            deadline: now + self.config.double_click_ms,
                        };
                    }
                }
                MouseButton::Right => {
                    // Stationary right-click opens the context menu;
                    // a multi-selection gets the group menu.
                    let target = if state.is_selected(&id) && state.selection.len() > 1 {
                        None
                    } else {
                        Some(id)
                    };
                    state.apply(Action::OpenContextMenu { position, target });
                }
                MouseButton::Middle => {}
            },
            State::Dragging {
                id,
                start,
                block_start,
                group,
            } => {
                state.apply(Action::MoveOrResize {
                    id,
                    rect: block_start + (position - start),
                    group_drag: group,
                });
            }
            State::Resizing {
                id,
                corner,
                start,
                block_start,
            } => {
                let rect = resize_rect(
                    block_start,
                    corner,
                    position - start,
                    self.min_width,
                    self.min_height,
                );
                state.apply(Action::MoveOrResize {
                    id,
                    rect,
                    group_drag: false,
                });
            }
            State::RightDragDuplicating {
                id,
                start,
                group,
                active,
            } => {
                self.ghost_previews.clear();
                if active {
                    let delta = position - start;
                    let committed = if group && state.selection.len() > 1 {
                        state.apply(Action::DuplicateGroup { anchor: id, delta })
                    } else {
                        state.apply(Action::DuplicateSingle { id, delta })
                    };
                    // Ghost flags on the committed blocks survive one
                    // tick so the duplicates render before the preview
                    // styling drops.
                    self.ghosts_pending_clear = committed;
                } else {
                    let target = if state.is_selected(&id) && state.selection.len() > 1 {
                        None
                    } else {
                        Some(id)
                    };
                    state.apply(Action::OpenContextMenu { position, target });
                }
            }
            State::Marquee => {
                state.apply(Action::MarqueeEnd);
            }
        }
        events
    }

    /// The pointer left the document: an implicit up at the last seen
    /// position.
    pub fn pointer_leave(&mut self, state: &mut CanvasState, now: f64) -> Vec<GestureEvent> {
        if self.is_active() {
            self.pointer_up(state, self.last_position, now)
        } else {
            Vec::new()
        }
    }

    /// Advance timer-driven transitions: commits an armed click past
    /// its deadline and performs the deferred ghost clear.
    pub fn tick(&mut self, state: &mut CanvasState, now: f64) -> Vec<GestureEvent> {
        if self.ghosts_pending_clear {
            self.ghosts_pending_clear = false;
            state.apply(Action::ClearGhosts);
        }
        if let State::ClickArmed {
            id,
            modifiers,
            deadline,
            ..
        } = &self.state
        {
            if now >= *deadline {
                let (id, modifiers) = (id.clone(), *modifiers);
                self.state = State::Idle;
                commit_click(state, &id, modifiers);
            }
        }
        Vec::new()
    }

    /// Resolve any click still armed (used before starting an
    /// unrelated gesture).
    fn settle(&mut self, state: &mut CanvasState, _now: f64) -> Vec<GestureEvent> {
        if let State::ClickArmed { id, modifiers, .. } = &self.state {
            let (id, modifiers) = (id.clone(), *modifiers);
            commit_click(state, &id, modifiers);
        }
        self.state = State::Idle;
        self.ghost_previews.clear();
        Vec::new()
    }

    fn rebuild_ghost_previews(
        &mut self,
        state: &CanvasState,
        id: &str,
        group: bool,
        delta: Vec2,
    ) {
        self.ghost_previews.clear();
        if group && state.selection.len() > 1 {
            for block in &state.blocks {
                if state.is_selected(&block.id) {
                    self.ghost_previews.push(GhostPreview {
                        source_id: block.id.clone(),
                        rect: block.as_rect() + delta,
                    });
                }
            }
        } else if let Some(block) = state.block(id) {
            self.ghost_previews.push(GhostPreview {
                source_id: block.id.clone(),
                rect: block.as_rect() + delta,
            });
        }
    }
}

/// Commit a resolved stationary click as a selection change.
fn commit_click(state: &mut CanvasState, id: &str, modifiers: Modifiers) {
    if modifiers.multi_select() {
        state.apply(Action::ToggleSelect(id.to_string()));
    } else {
        state.apply(Action::SelectOnly(id.to_string()));
    }
}

/// Compute the candidate rect for a corner resize. The opposite
/// corner stays fixed; width and height are clamped to the minimums
/// with the origin compensated so the fixed corner truly does not
/// move when the rect shrinks from that side.
fn resize_rect(start: Rect, corner: Corner, delta: Vec2, min_w: f64, min_h: f64) -> Rect {
    let (mut x0, mut y0, mut x1, mut y1) = (start.x0, start.y0, start.x1, start.y1);
    match corner {
        Corner::TopLeft => {
            x0 += delta.x;
            y0 += delta.y;
        }
        Corner::TopRight => {
            x1 += delta.x;
            y0 += delta.y;
        }
        Corner::BottomLeft => {
            x0 += delta.x;
            y1 += delta.y;
        }
        Corner::BottomRight => {
            x1 += delta.x;
            y1 += delta.y;
        }
    }

    // Clamp against the fixed edge.
    match corner {
        Corner::TopLeft | Corner::BottomLeft => {
            if x1 - x0 < min_w {
                x0 = x1 - min_w;
            }
        }
        Corner::TopRight | Corner::BottomRight => {
            if x1 - x0 < min_w {
                x1 = x0 + min_w;
            }
        }
    }
    match corner {
        Corner::TopLeft | Corner::TopRight => {
            if y1 - y0 < min_h {
                y0 = y1 - min_h;
            }
        }
        Corner::BottomLeft | Corner::BottomRight => {
            if y1 - y0 < min_h {
                y1 = y0 + min_h;
            }
        }
    }

    Rect::new(x0, y0, x1, y1)
}

/// Inline rename editor for a block label.
///
/// Seeded with the current id; input is filtered to a safe character
/// set before the rename action — which stays the final authority on
/// uniqueness — ever sees it.
#[derive(Debug, Clone)]
pub struct RenameEditor {
    block_id: String,
    buffer: String,
}

impl RenameEditor {
    /// Begin editing a block's label.
    pub fn begin(block: &Block) -> Self {
        Self {
            block_id: block.id.clone(),
            buffer: block.id.clone(),
        }
    }

    /// Current editor text.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Id of the block being renamed.
    pub fn block_id(&self) -> &str {
        &self.block_id
    }

    /// Append a character if it belongs to the safe label set.
    pub fn input(&mut self, c: char) {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ' ' {
            self.buffer.push(c);
        }
    }

    /// Remove the last character.
    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    /// Replace the whole buffer (e.g. from a text field), filtered.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.clear();
        for c in text.chars() {
            self.input(c);
        }
    }

    /// Whether the buffer differs from the original id (blur commits
    /// only if changed).
    pub fn is_dirty(&self) -> bool {
        self.buffer != self.block_id
    }

    /// Commit through the rename action. Returns whether the rename
    /// was applied; a rejected rename leaves the state untouched.
    pub fn commit(self, state: &mut CanvasState) -> bool {
        state.apply(Action::Rename {
            old: self.block_id,
            new: self.buffer,
        })
    }
}
