use crate::config::RenderConfig;
use crate::scene::Scene;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(scene: &Scene, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = scene.view.width.max(1.0);
    let height = scene.view.height.max(1.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));

    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.link_color
    ));
    svg.push_str("</defs>");

    let [a, b, c, d, e, f] = scene.matrix;
    svg.push_str(&format!(
        "<g transform=\"matrix({a} {b} {c} {d} {e} {f})\">"
    ));

    for link in &scene.links {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" marker-end=\"url(#arrow)\"/>",
            link.path, theme.link_color
        ));
    }

    for node in scene.visible_nodes() {
        let rect = node.rect;
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            node.corner_radius,
            node.corner_radius,
            theme.node_fill,
            theme.node_stroke
        ));
        let (cx, cy) = rect.center();
        svg.push_str(&format!(
            "<text x=\"{cx:.2}\" y=\"{cy:.2}\" dy=\"0.33em\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.label_color,
            escape_xml(&node.label)
        ));
    }

    svg.push_str("</g></svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Arial".to_string();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    tracing::debug!(path = %output.display(), width = size.width(), height = size.height(), "wrote png");
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::graph::Graph;
    use crate::ir::NodeRecord;
    use crate::layout::compute_layout;
    use crate::scene::{SceneConfig, Size, project};
    use crate::viewport::AffineTransform;

    fn scene(transform: AffineTransform) -> Scene {
        let graph = Graph::build(&[
            NodeRecord::new("A", &[]),
            NodeRecord::new("B<&>", &["A"]),
        ])
        .unwrap();
        let layout = compute_layout(&graph, &LayoutConfig::default(), |_| (40.0, 20.0));
        project(
            &layout,
            &transform,
            Size::new(400.0, 300.0),
            &SceneConfig::default(),
        )
    }

    #[test]
    fn render_svg_basic() {
        let svg = render_svg(&scene(AffineTransform::IDENTITY), &Theme::dusk());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</g></svg>"));
        assert!(svg.contains("fill=\"#272b4d\""));
        assert!(svg.contains("matrix(1 0 0 1 0 0)"));
        assert_eq!(svg.matches("<rect x=").count(), 2);
        assert_eq!(svg.matches("marker-end=").count(), 1);
        assert!(svg.contains("B&lt;&amp;&gt;"));
    }

    #[test]
    fn transform_is_written_as_matrix() {
        let transform = AffineTransform {
            scale_x: 1.5,
            scale_y: 2.0,
            translate_x: -10.0,
            translate_y: 4.0,
            skew_x: 0.0,
            skew_y: 0.0,
        };
        let svg = render_svg(&scene(transform), &Theme::light());
        assert!(svg.contains("matrix(1.5 0 0 2 -10 4)"));
    }

    #[test]
    fn offscreen_nodes_are_culled() {
        let transform = AffineTransform {
            translate_y: 10_000.0,
            ..AffineTransform::IDENTITY
        };
        let svg = render_svg(&scene(transform), &Theme::dusk());
        assert_eq!(svg.matches("<rect x=").count(), 0);
        assert_eq!(svg.matches("marker-end=").count(), 1);
    }
}
