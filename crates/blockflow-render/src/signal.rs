//! Signal renderer: an orthogonal polyline from a source output port
//! to a target input port. Pure consumer of the port geometry; no
//! obstacle-aware routing.

use crate::port::{input_anchor, output_anchor};
use crate::svg::{fmt_num, SvgWriter};
use blockflow_core::{BlockLibrary, CanvasState};
use kurbo::Point;
use log::warn;

/// A connection between two block ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub source_block: String,
    pub source_port: usize,
    pub target_block: String,
    pub target_port: usize,
}

impl Signal {
    pub fn new(source_block: impl Into<String>, target_block: impl Into<String>) -> Self {
        Self {
            source_block: source_block.into(),
            source_port: 0,
            target_block: target_block.into(),
            target_port: 0,
        }
    }
}

/// Waypoints of the orthogonal route between two anchors: out from
/// the source to the horizontal midpoint, vertical jog, in to the
/// target. Collapses to fewer points when already aligned.
pub fn route(start: Point, end: Point) -> Vec<Point> {
    if (start.y - end.y).abs() < 1e-9 {
        return vec![start, end];
    }
    let mid_x = (start.x + end.x) / 2.0;
    vec![
        start,
        Point::new(mid_x, start.y),
        Point::new(mid_x, end.y),
        end,
    ]
}

/// Resolve a signal's endpoints against the canvas and draw it. A
/// signal naming a missing block or port is skipped with a warning.
pub fn render_signal(
    w: &mut SvgWriter,
    state: &CanvasState,
    library: &BlockLibrary,
    signal: &Signal,
) {
    let start = state.block(&signal.source_block).and_then(|b| {
        output_anchor(b, &library.resolve(&b.block_type), signal.source_port)
    });
    let end = state.block(&signal.target_block).and_then(|b| {
        input_anchor(b, &library.resolve(&b.block_type), signal.target_port)
    });
    let (Some(start), Some(end)) = (start, end) else {
        warn!(
            "skipping signal {}:{} -> {}:{}: endpoint not found",
            signal.source_block, signal.source_port, signal.target_block, signal.target_port
        );
        return;
    };

    let points = route(start, end)
        .iter()
        .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
        .collect::<Vec<_>>()
        .join(" ");
    w.element(
        "polyline",
        &[
            ("points", points),
            ("fill", "none".into()),
            ("stroke", "#333333".into()),
            ("marker-end", "url(#arrow)".into()),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockflow_core::{Action, Block};

    fn canvas() -> CanvasState {
        let mut state = CanvasState::new();
        state.apply(Action::AddBlock(Block::new(
            "src",
            "gain",
            Point::new(0.0, 0.0),
            100.0,
            100.0,
        )));
        state.apply(Action::AddBlock(Block::new(
            "dst",
            "gain",
            Point::new(200.0, 100.0),
            100.0,
            100.0,
        )));
        state
    }

    #[test]
    fn test_route_is_orthogonal() {
        let pts = route(Point::new(100.0, 50.0), Point::new(200.0, 150.0));
        assert_eq!(pts.len(), 4);
        for pair in pts.windows(2) {
            let horizontal = (pair[0].y - pair[1].y).abs() < 1e-9;
            let vertical = (pair[0].x - pair[1].x).abs() < 1e-9;
            assert!(horizontal || vertical);
        }
        assert_eq!(pts[0], Point::new(100.0, 50.0));
        assert_eq!(pts[3], Point::new(200.0, 150.0));
    }

    #[test]
    fn test_aligned_route_is_straight() {
        let pts = route(Point::new(0.0, 50.0), Point::new(100.0, 50.0));
        assert_eq!(pts.len(), 2);
    }

    #[test]
    fn test_render_resolves_anchors() {
        let mut w = SvgWriter::new();
        let state = canvas();
        render_signal(
            &mut w,
            &state,
            &BlockLibrary::builtin(),
            &Signal::new("src", "dst"),
        );
        let doc = w.finish();
        assert!(doc.contains("<polyline"));
        // Source output anchor is the first waypoint.
        assert!(doc.contains("points=\"100,50"));
    }

    #[test]
    fn test_missing_endpoint_is_skipped() {
        let mut w = SvgWriter::new();
        let state = canvas();
        render_signal(
            &mut w,
            &state,
            &BlockLibrary::builtin(),
            &Signal::new("src", "nope"),
        );
        assert!(w.finish().is_empty());
    }
}
