use crate::graph::Graph;
use crate::layout::Layout;
use crate::viewport::AffineTransform;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub direction: String,
    pub width: f32,
    pub height: f32,
    pub layer_count: usize,
    pub crossings: usize,
    pub transform: AffineTransform,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub parents: Vec<String>,
    pub layer: usize,
    pub order: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    /// Virtual vertices the edge passes through.
    pub bends: usize,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, graph: &Graph, transform: AffineTransform) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                label: node.label.clone(),
                parents: graph
                    .get(&node.id)
                    .map(|n| {
                        n.parents
                            .iter()
                            .map(|&p| graph.node(p).id.clone())
                            .collect()
                    })
                    .unwrap_or_default(),
                layer: node.layer,
                order: node.order,
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.clone(),
                to: edge.to.clone(),
                bends: edge.points.len().saturating_sub(2),
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            direction: format!("{:?}", layout.direction),
            width: layout.width,
            height: layout.height,
            layer_count: layout.layer_count,
            crossings: layout.crossings,
            transform,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &Layout,
    graph: &Graph,
    transform: AffineTransform,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, graph, transform);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
