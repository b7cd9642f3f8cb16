use std::collections::VecDeque;

use crate::graph::Graph;

/// A vertex of the proper layered graph: either a dataset node or one step
/// of an edge that spans several layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertex {
    Node(usize),
    Virtual { parent: usize, child: usize },
}

/// One dataset edge expressed as a chain of vertices, parent first, child
/// last, with one virtual vertex per skipped layer.
#[derive(Debug, Clone)]
pub struct EdgeChain {
    pub parent: usize,
    pub child: usize,
    pub vertices: Vec<usize>,
}

/// Graph with layers assigned and long edges split so that every segment
/// joins adjacent layers. Vertex ids `0..node_count` are the dataset nodes
/// in input order; virtual vertices follow.
#[derive(Debug, Clone)]
pub struct LayeredGraph {
    pub vertices: Vec<Vertex>,
    pub vertex_layer: Vec<usize>,
    /// Vertex ids per layer, left to right.
    pub layers: Vec<Vec<usize>>,
    /// Neighbors one layer up.
    pub up: Vec<Vec<usize>>,
    /// Neighbors one layer down.
    pub down: Vec<Vec<usize>>,
    pub chains: Vec<EdgeChain>,
    node_count: usize,
}

impl LayeredGraph {
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn layer_of(&self, node: usize) -> usize {
        self.vertex_layer[node]
    }

    pub fn is_virtual(&self, vertex: usize) -> bool {
        vertex >= self.node_count
    }

    /// Position of every vertex within its layer.
    pub fn positions(&self) -> Vec<usize> {
        let mut positions = vec![0; self.vertices.len()];
        for layer in &self.layers {
            for (pos, &vertex) in layer.iter().enumerate() {
                positions[vertex] = pos;
            }
        }
        positions
    }

    fn push_vertex(&mut self, vertex: Vertex, layer: usize) -> usize {
        let id = self.vertices.len();
        self.vertices.push(vertex);
        self.vertex_layer.push(layer);
        self.up.push(Vec::new());
        self.down.push(Vec::new());
        self.layers[layer].push(id);
        id
    }

    fn link(&mut self, upper: usize, lower: usize) {
        self.down[upper].push(lower);
        self.up[lower].push(upper);
    }
}

/// Longest-path layer per node: roots sit on layer 0 and every other node
/// one below its deepest parent. Kahn's algorithm guarantees parents are
/// settled before their children.
pub fn longest_path_layers(graph: &Graph) -> Vec<usize> {
    let nodes = graph.nodes();
    let mut indeg: Vec<usize> = nodes.iter().map(|node| node.parents.len()).collect();
    let mut layers = vec![0usize; nodes.len()];
    let mut ready: VecDeque<usize> = graph.roots().collect();

    while let Some(idx) = ready.pop_front() {
        let next_layer = layers[idx] + 1;
        for &child in &nodes[idx].children {
            layers[child] = layers[child].max(next_layer);
            indeg[child] -= 1;
            if indeg[child] == 0 {
                ready.push_back(child);
            }
        }
    }

    layers
}

pub fn assign_layers(graph: &Graph) -> LayeredGraph {
    let node_layers = longest_path_layers(graph);
    let layer_count = node_layers.iter().copied().max().map_or(0, |max| max + 1);

    let mut layered = LayeredGraph {
        vertices: Vec::with_capacity(graph.len()),
        vertex_layer: Vec::with_capacity(graph.len()),
        layers: vec![Vec::new(); layer_count],
        up: Vec::with_capacity(graph.len()),
        down: Vec::with_capacity(graph.len()),
        chains: Vec::with_capacity(graph.edge_count()),
        node_count: graph.len(),
    };

    for (idx, &layer) in node_layers.iter().enumerate() {
        layered.push_vertex(Vertex::Node(idx), layer);
    }

    for (parent, child) in graph.edges() {
        let from = node_layers[parent];
        let to = node_layers[child];
        let mut chain = Vec::with_capacity(to - from + 1);
        chain.push(parent);
        let mut prev = parent;
        for layer in (from + 1)..to {
            let id = layered.push_vertex(Vertex::Virtual { parent, child }, layer);
            layered.link(prev, id);
            chain.push(id);
            prev = id;
        }
        layered.link(prev, child);
        chain.push(child);
        layered.chains.push(EdgeChain {
            parent,
            child,
            vertices: chain,
        });
    }

    tracing::debug!(
        layers = layer_count,
        virtual_vertices = layered.vertices.len() - layered.node_count,
        "assigned layers"
    );

    layered
}
