use crate::config::Config;
use crate::error::SessionError;
use crate::graph::{Graph, Node};
use crate::ir::{NodeRecord, parse_dataset};
use crate::layout::{Layout, compute_layout, node_size_fn};
use crate::scene::{Scene, SceneConfig, Size, project};
use crate::viewport::{AffineTransform, Viewport, ViewportEvent};

/// One dataset laid out once and viewed through a mutable viewport.
#[derive(Debug, Clone)]
pub struct ViewingSession {
    graph: Graph,
    layout: Layout,
    viewport: Viewport,
    scene_config: SceneConfig,
    view: Size,
}

impl ViewingSession {
    pub fn new<F>(records: &[NodeRecord], config: &Config, size_fn: F) -> Result<Self, SessionError>
    where
        F: Fn(&Node) -> (f32, f32),
    {
        config.validate()?;
        let graph = Graph::build(records)?;
        let layout = compute_layout(&graph, &config.layout, size_fn);
        let view = Size::new(config.render.width, config.render.height);
        let viewport = Viewport::new(config.viewport.clone(), view.width, view.height)
            .with_content(layout.bounds());
        tracing::debug!(
            nodes = graph.len(),
            width = view.width,
            height = view.height,
            "session ready"
        );
        Ok(Self {
            graph,
            layout,
            viewport,
            scene_config: SceneConfig::from(&config.render),
            view,
        })
    }

    /// Session sized by the configured [`crate::config::NodeSizing`].
    pub fn with_config(records: &[NodeRecord], config: &Config) -> Result<Self, SessionError> {
        Self::new(records, config, node_size_fn(config.layout.node_sizing, &config.theme))
    }

    /// Parses a JSON or JSON5 dataset and opens a session on it.
    pub fn from_json(input: &str, config: &Config) -> Result<Self, SessionError> {
        let records = parse_dataset(input)?;
        Self::with_config(&records, config)
    }

    pub fn handle(&mut self, event: ViewportEvent) {
        self.viewport.apply(event);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.view = Size::new(width, height);
        self.viewport.resize(width, height);
    }

    pub fn scene(&self) -> Scene {
        project(
            &self.layout,
            &self.viewport.transform(),
            self.view,
            &self.scene_config,
        )
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn transform(&self) -> AffineTransform {
        self.viewport.transform()
    }
}
