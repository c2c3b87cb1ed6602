//! Block model: the per-block record and its geometry helpers.

use crate::grid;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Minimum block width in canvas units.
pub const MIN_WIDTH: f64 = 40.0;
/// Minimum block height in canvas units.
pub const MIN_HEIGHT: f64 = 40.0;

/// A typed parameter value.
///
/// The runtime kind is carried by the enum variant, so a parameter's
/// declared type always matches its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Num(f64),
    Str(String),
}

impl ParamValue {
    /// Human-readable type name, used by the parameter editor.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Str(_) => "string",
            ParamValue::Num(_) => "number",
            ParamValue::Bool(_) => "boolean",
        }
    }
}

/// A named block parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: ParamValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    /// Create a parameter without a description.
    pub fn new(name: impl Into<String>, value: ParamValue) -> Self {
        Self {
            name: name.into(),
            value,
            description: None,
        }
    }
}

/// A block on the canvas.
///
/// The id doubles as the user-visible label and is unique across the
/// canvas at all times; uniqueness is enforced by the state store, not
/// here. `block_type` is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Unique identifier and display label.
    pub id: String,
    /// Category/class name, e.g. "gain" or "constant".
    pub block_type: String,
    /// Top-left corner position.
    pub position: Point,
    /// Width of the block.
    pub width: f64,
    /// Height of the block.
    pub height: f64,
    /// Ordered parameter list.
    pub parameters: Vec<Parameter>,
}

impl Block {
    /// Create a block, snapping its geometry to the grid and clamping
    /// to the minimum size.
    pub fn new(
        id: impl Into<String>,
        block_type: impl Into<String>,
        position: Point,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            position: grid::snap_point(position, grid::GRID_SIZE),
            width: grid::snap(width.max(MIN_WIDTH), grid::GRID_SIZE),
            height: grid::snap(height.max(MIN_HEIGHT), grid::GRID_SIZE),
            parameters: Vec::new(),
        }
    }

    /// Builder-style parameter attachment.
    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Get the block's geometry as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    /// Replace the block's geometry from a rect.
    pub fn set_rect(&mut self, rect: Rect) {
        self.position = Point::new(rect.x0, rect.y0);
        self.width = rect.width();
        self.height = rect.height();
    }

    /// Check if a canvas point falls inside the block.
    pub fn hit_test(&self, point: Point) -> bool {
        self.as_rect().contains(point)
    }

    /// Open-interval overlap test against a rectangle (shared-edge
    /// contact does not count as overlap).
    pub fn overlaps(&self, rect: Rect) -> bool {
        let b = self.as_rect();
        b.x0 < rect.x1 && b.x1 > rect.x0 && b.y0 < rect.y1 && b.y1 > rect.y0
    }

    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Anchor points for input ports along the left edge, snapped to
    /// the grid. Port `i` of `n` sits at `(0, (i + 0.5) * height / n)`
    /// relative to the block origin.
    pub fn input_anchors(&self, count: usize) -> Vec<Point> {
        self.edge_anchors(0.0, count)
    }

    /// Anchor points for output ports along the right edge.
    pub fn output_anchors(&self, count: usize) -> Vec<Point> {
        self.edge_anchors(self.width, count)
    }

    fn edge_anchors(&self, edge_x: f64, count: usize) -> Vec<Point> {
        (0..count)
            .map(|i| {
                let y = (i as f64 + 0.5) * self.height / count.max(1) as f64;
                grid::snap_point(
                    Point::new(self.position.x + edge_x, self.position.y + y),
                    grid::GRID_SIZE,
                )
            })
            .collect()
    }

    /// Whether all four geometry fields sit on the grid.
    pub fn is_grid_aligned(&self, cell: f64) -> bool {
        grid::is_aligned(self.position.x, cell)
            && grid::is_aligned(self.position.y, cell)
            && grid::is_aligned(self.width, cell)
            && grid::is_aligned(self.height, cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_block_snaps_and_clamps() {
        let b = Block::new("gain", "gain", Point::new(23.0, 7.0), 10.0, 103.0);
        assert_eq!(b.position, Point::new(25.0, 5.0));
        assert_eq!(b.width, MIN_WIDTH);
        assert_eq!(b.height, 105.0);
        assert!(b.is_grid_aligned(grid::GRID_SIZE));
    }

    #[test]
    fn test_hit_test() {
        let b = Block::new("gain", "gain", Point::new(0.0, 0.0), 100.0, 100.0);
        assert!(b.hit_test(Point::new(50.0, 50.0)));
        assert!(!b.hit_test(Point::new(150.0, 50.0)));
    }

    #[test]
    fn test_overlap_is_open() {
        let b = Block::new("gain", "gain", Point::new(10.0, 10.0), 40.0, 40.0);
        // Partial overlap counts.
        assert!(b.overlaps(Rect::new(0.0, 0.0, 15.0, 15.0)));
        // Disjoint does not.
        assert!(!b.overlaps(Rect::new(100.0, 100.0, 110.0, 110.0)));
        // Shared edge does not.
        assert!(!b.overlaps(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_port_anchors() {
        let b = Block::new("sum", "sum", Point::new(0.0, 0.0), 100.0, 100.0);
        let inputs = b.input_anchors(2);
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0], Point::new(0.0, 25.0));
        assert_eq!(inputs[1], Point::new(0.0, 75.0));
        let outputs = b.output_anchors(1);
        assert_eq!(outputs[0], Point::new(100.0, 50.0));
    }

    #[test]
    fn test_port_anchors_snap() {
        // 3 ports on a 100-high block land off-grid and get snapped.
        let b = Block::new("mux", "mux", Point::new(0.0, 0.0), 100.0, 100.0);
        for p in b.input_anchors(3) {
            assert!(grid::is_aligned(p.y, grid::GRID_SIZE));
        }
    }

    #[test]
    fn test_param_value_kinds() {
        assert_eq!(ParamValue::Str("x".into()).type_name(), "string");
        assert_eq!(ParamValue::Num(2.0).type_name(), "number");
        assert_eq!(ParamValue::Bool(true).type_name(), "boolean");
    }

    #[test]
    fn test_param_value_untagged_serde() {
        let p = Parameter::new("gain", ParamValue::Num(2.5));
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("2.5"));
        let back: Parameter = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value, ParamValue::Num(2.5));
    }
}
