#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod scene;
pub mod session;
pub mod text_metrics;
pub mod theme;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use error::{ConfigError, DatasetError, GraphError, SessionError};
pub use graph::{Graph, Node};
pub use ir::{NodeRecord, parse_dataset};
pub use layout::{Layout, compute_layout};
pub use render::render_svg;
pub use scene::{Scene, Size, project};
pub use session::ViewingSession;
pub use viewport::{AffineTransform, Point, Viewport, ViewportEvent};

/// Lays out a JSON/JSON5 dataset and renders it at the configured initial
/// transform.
pub fn render_dataset_svg(input: &str, config: &Config) -> Result<String, SessionError> {
    let session = ViewingSession::from_json(input, config)?;
    Ok(render_svg(&session.scene(), &config.theme))
}
