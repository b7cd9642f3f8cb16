//! Projection of a [`Layout`] and a viewport transform into drawable
//! primitives. Nothing here touches a surface; the renderer and any host
//! UI consume the resulting [`Scene`].

use serde::Serialize;

use crate::config::RenderConfig;
use crate::layout::{Direction, EdgeLayout, Layout, LinkStyle, Rect};
use crate::viewport::{AffineTransform, visible_world_rect};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    pub link_style: LinkStyle,
    pub corner_radius: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

impl From<&RenderConfig> for SceneConfig {
    fn from(render: &RenderConfig) -> Self {
        Self {
            link_style: render.link_style,
            corner_radius: render.corner_radius,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneLink {
    pub from: String,
    pub to: String,
    /// SVG path data in graph space.
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneNode {
    pub id: String,
    pub label: String,
    pub rect: Rect,
    pub corner_radius: f32,
    /// Whether any part of the box falls inside the view.
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub view: Size,
    pub transform: AffineTransform,
    pub matrix: [f32; 6],
    pub visible_world: Option<Rect>,
    pub links: Vec<SceneLink>,
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn visible_nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(|node| node.visible)
    }
}

/// Builds the scene for one frame. Geometry stays in graph space; the
/// transform is carried as a matrix for the drawing layer to apply.
pub fn project(
    layout: &Layout,
    transform: &AffineTransform,
    view: Size,
    config: &SceneConfig,
) -> Scene {
    let visible_world = visible_world_rect(transform, view.width, view.height);

    let links = layout
        .edges
        .iter()
        .map(|edge| SceneLink {
            from: edge.from.clone(),
            to: edge.to.clone(),
            path: link_path(edge, layout.direction, config.link_style),
        })
        .collect();

    let nodes = layout
        .nodes
        .iter()
        .map(|node| {
            let rect = node.rect();
            let visible = visible_world
                .map(|world| world.intersects(&rect))
                .unwrap_or(false);
            SceneNode {
                id: node.id.clone(),
                label: node.label.clone(),
                rect,
                corner_radius: config.corner_radius.min(rect.height / 2.0).max(0.0),
                visible,
            }
        })
        .collect();

    Scene {
        view,
        transform: *transform,
        matrix: transform.to_svg_matrix(),
        visible_world,
        links,
        nodes,
    }
}

pub(crate) fn link_path(edge: &EdgeLayout, direction: Direction, style: LinkStyle) -> String {
    let Some((&first, rest)) = edge.points.split_first() else {
        return String::new();
    };
    let mut d = format!("M {:.2} {:.2}", first.0, first.1);
    let mut prev = first;
    for &point in rest {
        match style {
            LinkStyle::Straight => d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1)),
            LinkStyle::Curved => {
                // Control points sit halfway along the layer axis so the
                // curve leaves and enters each port perpendicular to it.
                let (c1, c2) = if direction.is_horizontal() {
                    let mid = (prev.0 + point.0) / 2.0;
                    ((mid, prev.1), (mid, point.1))
                } else {
                    let mid = (prev.1 + point.1) / 2.0;
                    ((prev.0, mid), (point.0, mid))
                };
                d.push_str(&format!(
                    " C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
                    c1.0, c1.1, c2.0, c2.1, point.0, point.1
                ));
            }
        }
        prev = point;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::graph::Graph;
    use crate::ir::NodeRecord;
    use crate::layout::compute_layout;

    fn chain_layout() -> Layout {
        let graph = Graph::build(&[
            NodeRecord::new("A", &[]),
            NodeRecord::new("B", &["A"]),
            NodeRecord::new("C", &["B"]),
        ])
        .unwrap();
        compute_layout(&graph, &LayoutConfig::default(), |_| (40.0, 20.0))
    }

    #[test]
    fn straight_links_are_polylines() {
        let edge = EdgeLayout {
            from: "a".to_string(),
            to: "b".to_string(),
            points: vec![(0.0, 0.0), (10.0, 20.0), (10.0, 40.0)],
        };
        assert_eq!(
            link_path(&edge, Direction::TopDown, LinkStyle::Straight),
            "M 0.00 0.00 L 10.00 20.00 L 10.00 40.00"
        );
    }

    #[test]
    fn curved_links_bend_along_layer_axis() {
        let edge = EdgeLayout {
            from: "a".to_string(),
            to: "b".to_string(),
            points: vec![(0.0, 0.0), (10.0, 20.0)],
        };
        assert_eq!(
            link_path(&edge, Direction::TopDown, LinkStyle::Curved),
            "M 0.00 0.00 C 0.00 10.00 10.00 10.00 10.00 20.00"
        );
        assert_eq!(
            link_path(&edge, Direction::LeftRight, LinkStyle::Curved),
            "M 0.00 0.00 C 5.00 0.00 5.00 20.00 10.00 20.00"
        );
    }

    #[test]
    fn projects_every_node_and_link() {
        let layout = chain_layout();
        let scene = project(
            &layout,
            &AffineTransform::IDENTITY,
            Size::new(800.0, 600.0),
            &SceneConfig::default(),
        );
        assert_eq!(scene.nodes.len(), 3);
        assert_eq!(scene.links.len(), 2);
        assert!(scene.nodes.iter().all(|node| node.visible));
        assert_eq!(scene.matrix, [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(scene.nodes[0].corner_radius, 10.0);
    }

    #[test]
    fn nodes_outside_the_view_are_not_visible() {
        let layout = chain_layout();
        let transform = AffineTransform {
            translate_x: -5000.0,
            ..AffineTransform::IDENTITY
        };
        let scene = project(
            &layout,
            &transform,
            Size::new(800.0, 600.0),
            &SceneConfig::default(),
        );
        assert_eq!(scene.visible_nodes().count(), 0);
        assert_eq!(scene.nodes.len(), 3);
    }
}
