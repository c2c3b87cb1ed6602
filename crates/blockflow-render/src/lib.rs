//! BlockFlow Render Library
//!
//! SVG presentation of a BlockFlow canvas: blocks, ports, signals,
//! grid and selection overlays.

pub mod block;
pub mod port;
pub mod scene;
pub mod signal;
pub mod svg;

pub use block::{render_block, BlockVisual, GHOST_OPACITY, SELECTION_COLOR};
pub use port::{port_anchors, PortAnchor, PortKind, PORT_RADIUS};
pub use scene::{render_scene, GridStyle, SceneContext};
pub use signal::{route, Signal};
pub use svg::SvgWriter;
