/// Reasons a dataset cannot be turned into a [`crate::graph::Graph`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("duplicate node id: {id}")]
    DuplicateId { id: String },

    #[error("node {child} references missing parent {parent}")]
    DanglingParent { child: String, parent: String },

    #[error("cycle detected: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("dataset contains no nodes")]
    Empty,
}

/// Configuration rejected before a session starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{axis} scale bounds are inverted: min {min} > max {max}")]
    ScaleBounds { axis: &'static str, min: f32, max: f32 },

    #[error("{axis} scale bound must be finite and positive, got {value}")]
    InvalidScale { axis: &'static str, value: f32 },

    #[error("initialTransform {field} is unusable: {value}")]
    InvalidTransform { field: &'static str, value: f32 },

    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidSpacing { name: &'static str, value: f32 },

    #[error("{name} must be finite and positive, got {value}")]
    InvalidFactor { name: &'static str, value: f32 },

    #[error("crossingExactThreshold {value} exceeds the supported maximum {max}")]
    ExactThreshold { value: usize, max: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("invalid dataset: {message}")]
    Parse { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}
