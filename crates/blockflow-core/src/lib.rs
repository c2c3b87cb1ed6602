//! BlockFlow Core Library
//!
//! Platform-agnostic interaction and state engine for the BlockFlow
//! block-diagram canvas.

pub mod block;
pub mod bridge;
pub mod config;
pub mod gesture;
pub mod grid;
pub mod input;
pub mod naming;
pub mod store;
pub mod viewport;

pub use block::{Block, ParamValue, Parameter, MIN_HEIGHT, MIN_WIDTH};
pub use bridge::{BridgeError, InstanceBridge, NullBridge};
pub use config::{BlockDef, BlockLibrary, BlockStyle, ConfigError};
pub use gesture::{
    Corner, GestureConfig, GestureController, GestureEvent, GhostPreview, PressTarget,
    RenameEditor,
};
pub use grid::{snap, snap_point, snap_rect, GRID_SIZE};
pub use input::{Modifiers, MouseButton, PointerEvent};
pub use naming::next_name;
pub use store::{Action, CanvasState, ContextMenu, SelectionBox};
pub use viewport::Viewport;
