use crate::config::LayoutConfig;
use crate::graph::{Graph, Node};

use super::node_label;
use super::ranking::{LayeredGraph, Vertex};
use super::types::{Direction, EdgeLayout, Layout, NodeLayout};

/// Footprint of a vertex split into the cross axis (within a layer) and the
/// main axis (across layers).
#[derive(Debug, Clone, Copy)]
struct Extent {
    cross: f32,
    main: f32,
}

/// Placed vertex, in cross/main coordinates of its top-left corner.
#[derive(Debug, Clone, Copy, Default)]
struct Placed {
    cross: f32,
    main: f32,
    cross_len: f32,
    main_len: f32,
}

impl Placed {
    fn cross_center(&self) -> f32 {
        self.cross + self.cross_len / 2.0
    }

    fn main_center(&self) -> f32 {
        self.main + self.main_len / 2.0
    }
}

/// Converts layer and order into coordinates.
///
/// Layers stack along the main axis: each band is as deep as its deepest
/// node and bands are separated by `inter_layer_gap`; nodes are centered in
/// their band. Within a layer, nodes are packed left to right with
/// `inter_node_gap`, and every layer is centered on the midpoint of the
/// widest layer. Virtual vertices take `virtual_node_size` on the cross
/// axis and nothing on the main axis.
pub fn assign_coordinates<F>(
    graph: &Graph,
    layered: &LayeredGraph,
    config: &LayoutConfig,
    size_fn: F,
) -> Layout
where
    F: Fn(&Node) -> (f32, f32),
{
    let direction = config.direction;
    let horizontal = direction.is_horizontal();

    let extents: Vec<Extent> = layered
        .vertices
        .iter()
        .map(|vertex| match vertex {
            Vertex::Node(idx) => {
                let (width, height) = size_fn(graph.node(*idx));
                let (width, height) = (width.max(0.0), height.max(0.0));
                if horizontal {
                    Extent {
                        cross: height,
                        main: width,
                    }
                } else {
                    Extent {
                        cross: width,
                        main: height,
                    }
                }
            }
            Vertex::Virtual { .. } => Extent {
                cross: config.virtual_node_size,
                main: 0.0,
            },
        })
        .collect();

    let layer_spans: Vec<f32> = layered
        .layers
        .iter()
        .map(|layer| {
            let sizes: f32 = layer.iter().map(|&v| extents[v].cross).sum();
            let gaps = config.inter_node_gap * layer.len().saturating_sub(1) as f32;
            sizes + gaps
        })
        .collect();
    let widest = layer_spans.iter().copied().fold(0.0f32, f32::max);

    let mut placed = vec![Placed::default(); layered.vertices.len()];
    let mut main_cursor = config.margin;
    for (layer_idx, layer) in layered.layers.iter().enumerate() {
        let band = layer
            .iter()
            .map(|&v| extents[v].main)
            .fold(0.0f32, f32::max);
        let mut cross_cursor = config.margin + (widest - layer_spans[layer_idx]) / 2.0;
        for &vertex in layer {
            let extent = extents[vertex];
            placed[vertex] = Placed {
                cross: cross_cursor,
                main: main_cursor + (band - extent.main) / 2.0,
                cross_len: extent.cross,
                main_len: extent.main,
            };
            cross_cursor += extent.cross + config.inter_node_gap;
        }
        main_cursor += band + config.inter_layer_gap;
    }

    let positions = layered.positions();
    let mut nodes = Vec::with_capacity(graph.len());
    let mut max_cross: f32 = 0.0;
    let mut max_main: f32 = 0.0;
    for (idx, node) in graph.nodes().iter().enumerate() {
        let p = placed[idx];
        max_cross = max_cross.max(p.cross + p.cross_len);
        max_main = max_main.max(p.main + p.main_len);
        let (x, y, width, height) = if horizontal {
            (p.main, p.cross, p.main_len, p.cross_len)
        } else {
            (p.cross, p.main, p.cross_len, p.main_len)
        };
        nodes.push(NodeLayout {
            id: node.id.clone(),
            label: node_label(node),
            x,
            y,
            width,
            height,
            layer: layered.layer_of(idx),
            order: positions[idx],
        });
    }
    for (vertex, p) in placed.iter().enumerate().skip(graph.len()) {
        debug_assert!(layered.is_virtual(vertex));
        max_cross = max_cross.max(p.cross + p.cross_len);
    }

    let edges = layered
        .chains
        .iter()
        .map(|chain| {
            let mut points = Vec::with_capacity(chain.vertices.len());
            let last = chain.vertices.len() - 1;
            for (step, &vertex) in chain.vertices.iter().enumerate() {
                let p = placed[vertex];
                let main = if step == 0 {
                    p.main + p.main_len
                } else if step == last {
                    p.main
                } else {
                    p.main_center()
                };
                points.push(to_xy(direction, p.cross_center(), main));
            }
            EdgeLayout {
                from: graph.node(chain.parent).id.clone(),
                to: graph.node(chain.child).id.clone(),
                points,
            }
        })
        .collect();

    let (width, height) = to_xy(
        direction,
        max_cross + config.margin,
        max_main + config.margin,
    );

    Layout {
        direction,
        nodes,
        edges,
        width,
        height,
        layer_count: layered.layers.len(),
        crossings: 0,
    }
}

fn to_xy(direction: Direction, cross: f32, main: f32) -> (f32, f32) {
    if direction.is_horizontal() {
        (main, cross)
    } else {
        (cross, main)
    }
}
