use dagscope::config::parse_config;
use dagscope::theme::Theme;
use dagscope::{Config, ViewingSession, ViewportEvent, render_svg};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DagRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    /// Full config document, same keys as the CLI config file.
    config: Option<serde_json::Value>,
}

fn build_config(options: DagRenderOptions) -> Result<Config, String> {
    let mut config = match options.config {
        Some(raw) => parse_config(&raw.to_string()).map_err(|error| error.to_string())?,
        None => Config::default(),
    };
    if options.theme.as_deref() == Some("light") {
        config.theme = Theme::light();
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(width) = options.width {
        config.render.width = width;
    }
    if let Some(height) = options.height {
        config.render.height = height;
    }
    Ok(config)
}

fn parse_options(options_json: Option<String>) -> Result<Config, JsValue> {
    let options = match options_json {
        Some(raw_options) => serde_json::from_str::<DagRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?,
        None => DagRenderOptions::default(),
    };
    build_config(options).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn render_dag_svg(data: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let config = parse_options(options_json)?;
    dagscope::render_dataset_svg(data, &config).map_err(|error| JsValue::from_str(&error.to_string()))
}

/// A live view: the host forwards pointer and button events as JSON and
/// redraws from `svg()`.
#[wasm_bindgen]
pub struct DagView {
    session: ViewingSession,
    theme: Theme,
}

#[wasm_bindgen]
impl DagView {
    #[wasm_bindgen(constructor)]
    pub fn new(data: &str, options_json: Option<String>) -> Result<DagView, JsValue> {
        let config = parse_options(options_json)?;
        let session = ViewingSession::from_json(data, &config)
            .map_err(|error| JsValue::from_str(&error.to_string()))?;
        Ok(DagView {
            session,
            theme: config.theme,
        })
    }

    /// Applies an event such as `{"type": "pointerMove", "point": {"x": 1, "y": 2}}`.
    pub fn handle_event(&mut self, event_json: &str) -> Result<(), JsValue> {
        let event: ViewportEvent = serde_json::from_str(event_json)
            .map_err(|error| JsValue::from_str(&error.to_string()))?;
        self.session.handle(event);
        Ok(())
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.session.resize(width, height);
    }

    pub fn svg(&self) -> String {
        render_svg(&self.session.scene(), &self.theme)
    }

    pub fn transform_json(&self) -> String {
        serde_json::to_string(&self.session.transform()).unwrap_or_default()
    }
}
