//! Block mask renderer: the rectangle, its label, and the selection
//! and ghost treatments.

use crate::svg::{fmt_num, SvgWriter};
use blockflow_core::{Block, BlockStyle};
use kurbo::Rect;

/// Stroke color for the selected outline.
pub const SELECTION_COLOR: &str = "#3b82f6";
/// Opacity applied to ghost blocks and duplicate previews.
pub const GHOST_OPACITY: f64 = 0.4;
/// Side length of a corner resize handle.
pub const HANDLE_SIZE: f64 = 8.0;

/// Visual treatment of one block for a frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockVisual {
    pub selected: bool,
    pub ghost: bool,
}

/// Draw a block: body, label, and the selection outline plus corner
/// handles when selected.
pub fn render_block(w: &mut SvgWriter, block: &Block, style: &BlockStyle, visual: BlockVisual) {
    let rect = block.as_rect();
    let mut group_attrs = vec![("data-block", block.id.clone())];
    if visual.ghost {
        group_attrs.push(("opacity", fmt_num(GHOST_OPACITY)));
    }
    w.open("g", &group_attrs);

    w.element(
        "rect",
        &[
            ("x", fmt_num(rect.x0)),
            ("y", fmt_num(rect.y0)),
            ("width", fmt_num(rect.width())),
            ("height", fmt_num(rect.height())),
            ("fill", style.fill.clone()),
            ("stroke", style.stroke.clone()),
        ],
    );

    // Label: the id, centered below the body.
    w.text_element(
        "text",
        &[
            ("x", fmt_num(rect.x0 + rect.width() / 2.0)),
            ("y", fmt_num(rect.y1 + 14.0)),
            ("text-anchor", "middle".into()),
            ("font-size", "12".into()),
        ],
        &block.id,
    );

    if visual.selected {
        render_selection(w, rect);
    }
    w.close();
}

/// Draw a ghost preview rectangle (right-drag duplicate feedback).
pub fn render_ghost_preview(w: &mut SvgWriter, rect: Rect, style: &BlockStyle) {
    w.element(
        "rect",
        &[
            ("x", fmt_num(rect.x0)),
            ("y", fmt_num(rect.y0)),
            ("width", fmt_num(rect.width())),
            ("height", fmt_num(rect.height())),
            ("fill", style.fill.clone()),
            ("stroke", style.stroke.clone()),
            ("opacity", fmt_num(GHOST_OPACITY)),
        ],
    );
}

fn render_selection(w: &mut SvgWriter, rect: Rect) {
    w.element(
        "rect",
        &[
            ("x", fmt_num(rect.x0 - 2.0)),
            ("y", fmt_num(rect.y0 - 2.0)),
            ("width", fmt_num(rect.width() + 4.0)),
            ("height", fmt_num(rect.height() + 4.0)),
            ("fill", "none".into()),
            ("stroke", SELECTION_COLOR.into()),
            ("stroke-dasharray", "4 2".into()),
        ],
    );
    for (cx, cy) in [
        (rect.x0, rect.y0),
        (rect.x1, rect.y0),
        (rect.x0, rect.y1),
        (rect.x1, rect.y1),
    ] {
        w.element(
            "rect",
            &[
                ("x", fmt_num(cx - HANDLE_SIZE / 2.0)),
                ("y", fmt_num(cy - HANDLE_SIZE / 2.0)),
                ("width", fmt_num(HANDLE_SIZE)),
                ("height", fmt_num(HANDLE_SIZE)),
                ("fill", "#ffffff".into()),
                ("stroke", SELECTION_COLOR.into()),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn block() -> Block {
        Block::new("gain", "gain", Point::new(10.0, 10.0), 100.0, 60.0)
    }

    #[test]
    fn test_plain_block() {
        let mut w = SvgWriter::new();
        render_block(&mut w, &block(), &BlockStyle::default(), BlockVisual::default());
        let doc = w.finish();
        assert!(doc.contains("data-block=\"gain\""));
        assert!(doc.contains(">gain</text>"));
        assert!(!doc.contains("stroke-dasharray"));
        assert!(!doc.contains("opacity"));
    }

    #[test]
    fn test_selected_block_gets_outline_and_handles() {
        let mut w = SvgWriter::new();
        render_block(
            &mut w,
            &block(),
            &BlockStyle::default(),
            BlockVisual {
                selected: true,
                ghost: false,
            },
        );
        let doc = w.finish();
        assert!(doc.contains("stroke-dasharray"));
        // Body + outline + 4 handles.
        assert_eq!(doc.matches("<rect").count(), 6);
    }

    #[test]
    fn test_ghost_block_is_translucent() {
        let mut w = SvgWriter::new();
        render_block(
            &mut w,
            &block(),
            &BlockStyle::default(),
            BlockVisual {
                selected: false,
                ghost: true,
            },
        );
        assert!(w.finish().contains("opacity=\"0.4\""));
    }
}
