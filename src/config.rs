use crate::error::ConfigError;
use crate::layout::{Direction, LinkStyle};
use crate::theme::Theme;
use crate::viewport::AffineTransform;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest layer the exact orderer will accept; permutation search beyond
/// this is impractical even with pruning.
pub const MAX_EXACT_THRESHOLD: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderHeuristic {
    /// Mean of neighbor positions.
    #[default]
    Barycenter,
    /// Median of neighbor positions.
    Median,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// Layers with at most this many vertices are ordered exactly.
    pub exact_threshold: usize,
    /// Maximum number of heuristic sweeps (each sweep is one direction).
    pub sweep_limit: usize,
    pub heuristic: OrderHeuristic,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            exact_threshold: 8,
            sweep_limit: 24,
            heuristic: OrderHeuristic::Barycenter,
        }
    }
}

/// How node footprints are derived from nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum NodeSizing {
    Fixed { width: f32, height: f32 },
    /// Measure the node id in the theme font and pad it.
    Label { padding_x: f32, padding_y: f32 },
}

impl Default for NodeSizing {
    fn default() -> Self {
        NodeSizing::Fixed {
            width: 40.0,
            height: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub direction: Direction,
    pub inter_layer_gap: f32,
    pub inter_node_gap: f32,
    pub margin: f32,
    /// Cross-axis extent reserved for a virtual vertex of a long edge.
    pub virtual_node_size: f32,
    pub node_sizing: NodeSizing,
    pub ordering: OrderingConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::TopDown,
            inter_layer_gap: 46.0,
            inter_node_gap: 24.0,
            margin: 10.0,
            virtual_node_size: 5.5,
            node_sizing: NodeSizing::default(),
            ordering: OrderingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub scale_x_min: f32,
    pub scale_x_max: f32,
    pub scale_y_min: f32,
    pub scale_y_max: f32,
    pub initial_transform: AffineTransform,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    pub double_activate_factor: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            scale_x_min: 0.5,
            scale_x_max: 4.0,
            scale_y_min: 0.5,
            scale_y_max: 4.0,
            initial_transform: AffineTransform::IDENTITY,
            zoom_in_factor: 1.2,
            zoom_out_factor: 0.8,
            double_activate_factor: 1.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub link_style: LinkStyle,
    pub corner_radius: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            link_style: LinkStyle::Curved,
            corner_radius: 14.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::dusk(),
            layout: LayoutConfig::default(),
            viewport: ViewportConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Config {
    /// Rejects settings that would make the layout or the viewport
    /// ill-defined. Run before any session is created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let vp = &self.viewport;
        for (axis, min, max) in [
            ("x", vp.scale_x_min, vp.scale_x_max),
            ("y", vp.scale_y_min, vp.scale_y_max),
        ] {
            for value in [min, max] {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigError::InvalidScale { axis, value });
                }
            }
            if min > max {
                return Err(ConfigError::ScaleBounds { axis, min, max });
            }
        }
        let t = &vp.initial_transform;
        for (field, value) in [
            ("scaleX", t.scale_x),
            ("scaleY", t.scale_y),
            ("translateX", t.translate_x),
            ("translateY", t.translate_y),
            ("skewX", t.skew_x),
            ("skewY", t.skew_y),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidTransform { field, value });
            }
        }
        // Zoom multiplies the current scale, so a zero scale can never recover.
        for (field, value) in [("scaleX", t.scale_x), ("scaleY", t.scale_y)] {
            if value == 0.0 {
                return Err(ConfigError::InvalidTransform { field, value });
            }
        }
        let determinant = t.scale_x * t.scale_y - t.skew_x * t.skew_y;
        if determinant.abs() <= f32::EPSILON {
            return Err(ConfigError::InvalidTransform {
                field: "determinant",
                value: determinant,
            });
        }
        for (name, value) in [
            ("zoomInFactor", vp.zoom_in_factor),
            ("zoomOutFactor", vp.zoom_out_factor),
            ("doubleActivateFactor", vp.double_activate_factor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidFactor { name, value });
            }
        }

        let layout = &self.layout;
        for (name, value) in [
            ("interLayerGap", layout.inter_layer_gap),
            ("interNodeGap", layout.inter_node_gap),
            ("margin", layout.margin),
            ("virtualNodeSize", layout.virtual_node_size),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidSpacing { name, value });
            }
        }
        match layout.node_sizing {
            NodeSizing::Fixed { width, height } => {
                for (name, value) in [("nodeWidth", width), ("nodeHeight", height)] {
                    if !value.is_finite() || value < 0.0 {
                        return Err(ConfigError::InvalidSpacing { name, value });
                    }
                }
            }
            NodeSizing::Label {
                padding_x,
                padding_y,
            } => {
                for (name, value) in [("labelPaddingX", padding_x), ("labelPaddingY", padding_y)] {
                    if !value.is_finite() || value < 0.0 {
                        return Err(ConfigError::InvalidSpacing { name, value });
                    }
                }
            }
        }
        if layout.ordering.exact_threshold > MAX_EXACT_THRESHOLD {
            return Err(ConfigError::ExactThreshold {
                value: layout.ordering.exact_threshold,
                max: MAX_EXACT_THRESHOLD,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().parse::<f32>().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransformFile {
    scale_x: Option<f32>,
    scale_y: Option<f32>,
    translate_x: Option<f32>,
    translate_y: Option<f32>,
    skew_x: Option<f32>,
    skew_y: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    node_fill: Option<String>,
    node_stroke: Option<String>,
    label_color: Option<String>,
    link_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    direction: Option<Direction>,
    inter_layer_gap: Option<f32>,
    inter_node_gap: Option<f32>,
    margin: Option<f32>,
    virtual_node_size: Option<f32>,
    node_width: Option<f32>,
    node_height: Option<f32>,
    node_sizing: Option<NodeSizing>,
    crossing_exact_threshold: Option<usize>,
    crossing_sweep_limit: Option<usize>,
    order_heuristic: Option<OrderHeuristic>,
    scale_min: Option<f32>,
    scale_max: Option<f32>,
    scale_x_min: Option<f32>,
    scale_x_max: Option<f32>,
    scale_y_min: Option<f32>,
    scale_y_max: Option<f32>,
    initial_transform: Option<TransformFile>,
    zoom_in_factor: Option<f32>,
    zoom_out_factor: Option<f32>,
    double_activate_factor: Option<f32>,
    link_style: Option<LinkStyle>,
    width: Option<f32>,
    height: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Applies a camelCase JSON config on top of the defaults and validates the
/// result.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "light" | "default" => config.theme = Theme::light(),
            "dusk" | "dark" => config.theme = Theme::dusk(),
            other => tracing::warn!(theme = other, "unknown theme, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size.and_then(|v| v.as_f32()) {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_stroke {
            config.theme.node_stroke = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = vars.link_color {
            config.theme.link_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    let layout = &mut config.layout;
    if let Some(v) = parsed.direction {
        layout.direction = v;
    }
    if let Some(v) = parsed.inter_layer_gap {
        layout.inter_layer_gap = v;
    }
    if let Some(v) = parsed.inter_node_gap {
        layout.inter_node_gap = v;
    }
    if let Some(v) = parsed.margin {
        layout.margin = v;
    }
    if let Some(v) = parsed.virtual_node_size {
        layout.virtual_node_size = v;
    }
    if let Some(v) = parsed.node_sizing {
        layout.node_sizing = v;
    }
    if parsed.node_width.is_some() || parsed.node_height.is_some() {
        let (width, height) = match layout.node_sizing {
            NodeSizing::Fixed { width, height } => (width, height),
            NodeSizing::Label { .. } => (40.0, 20.0),
        };
        layout.node_sizing = NodeSizing::Fixed {
            width: parsed.node_width.unwrap_or(width),
            height: parsed.node_height.unwrap_or(height),
        };
    }
    if let Some(v) = parsed.crossing_exact_threshold {
        layout.ordering.exact_threshold = v;
    }
    if let Some(v) = parsed.crossing_sweep_limit {
        layout.ordering.sweep_limit = v;
    }
    if let Some(v) = parsed.order_heuristic {
        layout.ordering.heuristic = v;
    }

    let viewport = &mut config.viewport;
    if let Some(v) = parsed.scale_min {
        viewport.scale_x_min = v;
        viewport.scale_y_min = v;
    }
    if let Some(v) = parsed.scale_max {
        viewport.scale_x_max = v;
        viewport.scale_y_max = v;
    }
    if let Some(v) = parsed.scale_x_min {
        viewport.scale_x_min = v;
    }
    if let Some(v) = parsed.scale_x_max {
        viewport.scale_x_max = v;
    }
    if let Some(v) = parsed.scale_y_min {
        viewport.scale_y_min = v;
    }
    if let Some(v) = parsed.scale_y_max {
        viewport.scale_y_max = v;
    }
    if let Some(t) = parsed.initial_transform {
        let base = AffineTransform::IDENTITY;
        viewport.initial_transform = AffineTransform {
            scale_x: t.scale_x.unwrap_or(base.scale_x),
            scale_y: t.scale_y.unwrap_or(base.scale_y),
            translate_x: t.translate_x.unwrap_or(base.translate_x),
            translate_y: t.translate_y.unwrap_or(base.translate_y),
            skew_x: t.skew_x.unwrap_or(base.skew_x),
            skew_y: t.skew_y.unwrap_or(base.skew_y),
        };
    }
    if let Some(v) = parsed.zoom_in_factor {
        viewport.zoom_in_factor = v;
    }
    if let Some(v) = parsed.zoom_out_factor {
        viewport.zoom_out_factor = v;
    }
    if let Some(v) = parsed.double_activate_factor {
        viewport.double_activate_factor = v;
    }

    if let Some(v) = parsed.link_style {
        config.render.link_style = v;
    }
    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }

    config.validate()?;
    Ok(config)
}
