//! Port markers: small anchors on the block edges where signals
//! attach. Inputs sit on the left edge, outputs on the right; the
//! anchor geometry itself comes from the block model.

use crate::svg::{fmt_num, SvgWriter};
use blockflow_core::{Block, BlockDef};
use kurbo::Point;

/// Port marker radius in canvas units.
pub const PORT_RADIUS: f64 = 3.0;

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Input,
    Output,
}

/// Resolved anchor of one port on one block.
#[derive(Debug, Clone, Copy)]
pub struct PortAnchor {
    pub kind: PortKind,
    pub index: usize,
    pub position: Point,
}

/// Compute all port anchors of a block under its type definition.
pub fn port_anchors(block: &Block, def: &BlockDef) -> Vec<PortAnchor> {
    let mut anchors = Vec::with_capacity(def.inputs + def.outputs);
    for (index, position) in block.input_anchors(def.inputs).into_iter().enumerate() {
        anchors.push(PortAnchor {
            kind: PortKind::Input,
            index,
            position,
        });
    }
    for (index, position) in block.output_anchors(def.outputs).into_iter().enumerate() {
        anchors.push(PortAnchor {
            kind: PortKind::Output,
            index,
            position,
        });
    }
    anchors
}

/// Anchor of a specific input port, if the index is in range.
pub fn input_anchor(block: &Block, def: &BlockDef, index: usize) -> Option<Point> {
    block.input_anchors(def.inputs).get(index).copied()
}

/// Anchor of a specific output port, if the index is in range.
pub fn output_anchor(block: &Block, def: &BlockDef, index: usize) -> Option<Point> {
    block.output_anchors(def.outputs).get(index).copied()
}

/// Draw a block's port markers.
pub fn render_ports(w: &mut SvgWriter, block: &Block, def: &BlockDef) {
    for anchor in port_anchors(block, def) {
        let fill = match anchor.kind {
            PortKind::Input => "#ffffff",
            PortKind::Output => "#333333",
        };
        w.element(
            "circle",
            &[
                ("cx", fmt_num(anchor.position.x)),
                ("cy", fmt_num(anchor.position.y)),
                ("r", fmt_num(PORT_RADIUS)),
                ("fill", fill.into()),
                ("stroke", "#333333".into()),
            ],
        );
    }
}
