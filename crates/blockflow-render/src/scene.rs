//! Full scene assembly: grid, blocks in z-order, ports, signals,
//! duplicate previews and the marquee overlay, as one SVG document.

use crate::block::{render_block, render_ghost_preview, BlockVisual, SELECTION_COLOR};
use crate::port::render_ports;
use crate::signal::{render_signal, Signal};
use crate::svg::{fmt_num, SvgWriter};
use blockflow_core::{BlockLibrary, CanvasState, GhostPreview, Viewport};
use kurbo::Rect;

/// Grid display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStyle {
    /// No grid (plain background).
    None,
    /// Full grid lines.
    #[default]
    Lines,
}

/// Everything needed to render one frame.
pub struct SceneContext<'a> {
    pub state: &'a CanvasState,
    pub library: &'a BlockLibrary,
    pub viewport: &'a Viewport,
    pub signals: &'a [Signal],
    pub ghost_previews: &'a [GhostPreview],
    pub grid_style: GridStyle,
    pub background_color: &'a str,
}

impl<'a> SceneContext<'a> {
    pub fn new(state: &'a CanvasState, library: &'a BlockLibrary, viewport: &'a Viewport) -> Self {
        Self {
            state,
            library,
            viewport,
            signals: &[],
            ghost_previews: &[],
            grid_style: GridStyle::default(),
            background_color: "#fafafa",
        }
    }

    /// Set the signals to draw.
    pub fn with_signals(mut self, signals: &'a [Signal]) -> Self {
        self.signals = signals;
        self
    }

    /// Set the in-flight duplicate previews.
    pub fn with_ghost_previews(mut self, previews: &'a [GhostPreview]) -> Self {
        self.ghost_previews = previews;
        self
    }

    /// Set the grid style.
    pub fn with_grid(mut self, style: GridStyle) -> Self {
        self.grid_style = style;
        self
    }
}

/// Render the scene to an SVG document string.
pub fn render_scene(ctx: &SceneContext) -> String {
    let view = ctx.viewport.view_box;
    let mut w = SvgWriter::new();
    w.open(
        "svg",
        &[
            ("xmlns", "http://www.w3.org/2000/svg".into()),
            (
                "viewBox",
                format!(
                    "{} {} {} {}",
                    fmt_num(view.x0),
                    fmt_num(view.y0),
                    fmt_num(view.width()),
                    fmt_num(view.height())
                ),
            ),
        ],
    );

    render_defs(&mut w, ctx);
    w.element(
        "rect",
        &[
            ("x", fmt_num(view.x0)),
            ("y", fmt_num(view.y0)),
            ("width", fmt_num(view.width())),
            ("height", fmt_num(view.height())),
            ("fill", ctx.background_color.into()),
        ],
    );
    if ctx.grid_style == GridStyle::Lines {
        w.element(
            "rect",
            &[
                ("x", fmt_num(view.x0)),
                ("y", fmt_num(view.y0)),
                ("width", fmt_num(view.width())),
                ("height", fmt_num(view.height())),
                ("fill", "url(#grid)".into()),
            ],
        );
    }

    // Signals under the blocks.
    for signal in ctx.signals {
        render_signal(&mut w, ctx.state, ctx.library, signal);
    }

    // Blocks back to front; document order is z-order.
    for block in &ctx.state.blocks {
        let def = ctx.library.resolve(&block.block_type);
        let visual = BlockVisual {
            selected: ctx.state.is_selected(&block.id),
            ghost: ctx.state.is_ghost(&block.id),
        };
        render_block(&mut w, block, &def.style, visual);
        render_ports(&mut w, block, &def);
    }

    for preview in ctx.ghost_previews {
        let style = ctx
            .state
            .block(&preview.source_id)
            .map(|b| ctx.library.resolve(&b.block_type).style)
            .unwrap_or_default();
        render_ghost_preview(&mut w, preview.rect, &style);
    }

    if let Some(sel_box) = &ctx.state.selection_box {
        render_marquee(&mut w, sel_box.to_rect());
    }

    w.finish()
}

fn render_defs(w: &mut SvgWriter, ctx: &SceneContext) {
    w.open("defs", &[]);
    if ctx.grid_style == GridStyle::Lines {
        let cell = fmt_num(ctx.state.grid_size);
        w.open(
            "pattern",
            &[
                ("id", "grid".into()),
                ("width", cell.clone()),
                ("height", cell.clone()),
                ("patternUnits", "userSpaceOnUse".into()),
            ],
        );
        w.element(
            "path",
            &[
                ("d", format!("M {cell} 0 L 0 0 0 {cell}")),
                ("fill", "none".into()),
                ("stroke", "#e5e5e5".into()),
                ("stroke-width", "0.5".into()),
            ],
        );
        w.close();
    }
    w.open(
        "marker",
        &[
            ("id", "arrow".into()),
            ("markerWidth", "8".into()),
            ("markerHeight", "8".into()),
            ("refX", "7".into()),
            ("refY", "4".into()),
            ("orient", "auto".into()),
        ],
    );
    w.element(
        "path",
        &[
            ("d", "M 0 0 L 8 4 L 0 8 z".into()),
            ("fill", "#333333".into()),
        ],
    );
    w.close();
    w.close();
}

fn render_marquee(w: &mut SvgWriter, rect: Rect) {
    w.element(
        "rect",
        &[
            ("x", fmt_num(rect.x0)),
            ("y", fmt_num(rect.y0)),
            ("width", fmt_num(rect.width())),
            ("height", fmt_num(rect.height())),
            ("fill", SELECTION_COLOR.into()),
            ("fill-opacity", "0.1".into()),
            ("stroke", SELECTION_COLOR.into()),
            ("stroke-dasharray", "4 2".into()),
        ],
    );
}
