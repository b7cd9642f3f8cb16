mod ordering;
mod position;
mod ranking;
pub(crate) mod types;
pub use ordering::{crossing_count, minimize_crossings};
pub use position::assign_coordinates;
pub use ranking::{EdgeChain, LayeredGraph, Vertex, assign_layers, longest_path_layers};
pub use types::*;

use crate::config::{LayoutConfig, NodeSizing};
use crate::graph::{Graph, Node};
use crate::text_metrics;
use crate::theme::Theme;

/// Runs the full pipeline: layering, crossing minimization and coordinate
/// assignment with the given node size function.
pub fn compute_layout<F>(graph: &Graph, config: &LayoutConfig, size_fn: F) -> Layout
where
    F: Fn(&Node) -> (f32, f32),
{
    let layered = assign_layers(graph);
    let layered = minimize_crossings(layered, &config.ordering);
    let crossings = crossing_count(&layered);
    let mut layout = assign_coordinates(graph, &layered, config, size_fn);
    layout.crossings = crossings;
    tracing::debug!(
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        layers = layout.layer_count,
        crossings,
        width = layout.width,
        height = layout.height,
        "computed layout"
    );
    layout
}

/// Node size function for a [`NodeSizing`] policy. Label sizing measures the
/// node id in the theme font.
pub fn node_size_fn<'a>(sizing: NodeSizing, theme: &'a Theme) -> impl Fn(&Node) -> (f32, f32) + 'a {
    move |node: &Node| match sizing {
        NodeSizing::Fixed { width, height } => (width, height),
        NodeSizing::Label {
            padding_x,
            padding_y,
        } => {
            let text = node_label(node);
            let width = text_metrics::text_width(&text, theme.font_size, &theme.font_family);
            (width + padding_x * 2.0, theme.font_size + padding_y * 2.0)
        }
    }
}

/// Display text for a node: a string `label` in its payload, otherwise the id.
pub fn node_label(node: &Node) -> String {
    node.data
        .get("label")
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| node.id.clone())
}
