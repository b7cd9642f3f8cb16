use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_stroke: String,
    pub label_color: String,
    pub link_color: String,
    pub background: String,
}

impl Theme {
    /// Dark navy palette with cyan nodes.
    pub fn dusk() -> Self {
        Self {
            font_family: "Arial, sans-serif".to_string(),
            font_size: 9.0,
            node_fill: "#272b4d".to_string(),
            node_stroke: "#03c0dc".to_string(),
            label_color: "#26deb0".to_string(),
            link_color: "#374469".to_string(),
            background: "#272b4d".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            node_fill: "#F8FAFF".to_string(),
            node_stroke: "#7A8AA6".to_string(),
            label_color: "#1C2430".to_string(),
            link_color: "#C7D2E5".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dusk()
    }
}
