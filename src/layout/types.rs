use serde::{Deserialize, Serialize};

/// Axis along which layers advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    #[default]
    TopDown,
    LeftRight,
}

impl Direction {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::LeftRight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum LinkStyle {
    /// Cubic curves leaving and entering along the layer axis.
    #[default]
    Curved,
    Straight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict overlap; rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// A dataset node with its final footprint. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Serialize)]
pub struct NodeLayout {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub layer: usize,
    pub order: usize,
}

impl NodeLayout {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> (f32, f32) {
        self.rect().center()
    }
}

/// A dataset edge as a polyline from the parent's exit port through the
/// virtual vertices of the edge to the child's entry port.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeLayout {
    pub from: String,
    pub to: String,
    pub points: Vec<(f32, f32)>,
}

impl EdgeLayout {
    pub fn source(&self) -> Option<(f32, f32)> {
        self.points.first().copied()
    }

    pub fn target(&self) -> Option<(f32, f32)> {
        self.points.last().copied()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub direction: Direction,
    /// Nodes in dataset order.
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub width: f32,
    pub height: f32,
    pub layer_count: usize,
    /// Crossings of the final ordering, counted on the proper layered graph.
    pub crossings: usize,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}
