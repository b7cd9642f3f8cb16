//! Headless pan/zoom state for a rendered graph.
//!
//! [`Viewport`] owns an [`AffineTransform`] from graph space to view space
//! and a small drag state machine. It knows nothing about the surface it is
//! drawn on; hosts translate their pointer, touch and button events into
//! [`ViewportEvent`]s and read the transform back when they render.

use serde::{Deserialize, Serialize};

use crate::config::ViewportConfig;
use crate::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Six-parameter affine map:
/// `x' = scale_x * x + skew_x * y + translate_x`,
/// `y' = skew_y * x + scale_y * y + translate_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffineTransform {
    pub scale_x: f32,
    pub scale_y: f32,
    pub translate_x: f32,
    pub translate_y: f32,
    pub skew_x: f32,
    pub skew_y: f32,
}

impl AffineTransform {
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        skew_x: 0.0,
        skew_y: 0.0,
    };

    pub fn apply_to_point(&self, point: Point) -> Point {
        Point {
            x: self.scale_x * point.x + self.skew_x * point.y + self.translate_x,
            y: self.skew_y * point.x + self.scale_y * point.y + self.translate_y,
        }
    }

    /// Maps a view-space point back into graph space. Returns `None` for a
    /// singular transform.
    pub fn invert_point(&self, point: Point) -> Option<Point> {
        let det = self.scale_x * self.scale_y - self.skew_x * self.skew_y;
        if det.abs() <= f32::EPSILON || !det.is_finite() {
            return None;
        }
        let dx = point.x - self.translate_x;
        let dy = point.y - self.translate_y;
        Some(Point {
            x: (self.scale_y * dx - self.skew_x * dy) / det,
            y: (self.scale_x * dy - self.skew_y * dx) / det,
        })
    }

    /// SVG `matrix(a b c d e f)` argument order.
    pub fn to_svg_matrix(&self) -> [f32; 6] {
        [
            self.scale_x,
            self.skew_y,
            self.skew_x,
            self.scale_y,
            self.translate_x,
            self.translate_y,
        ]
    }

    pub fn approx_eq(&self, other: &Self, tolerance: f32) -> bool {
        [
            (self.scale_x, other.scale_x),
            (self.scale_y, other.scale_y),
            (self.translate_x, other.translate_x),
            (self.translate_y, other.translate_y),
            (self.skew_x, other.skew_x),
            (self.skew_y, other.skew_y),
        ]
        .iter()
        .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging { last: Point },
}

/// Raw inputs a host forwards to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ViewportEvent {
    PointerDown { point: Point },
    PointerMove { point: Point },
    PointerUp,
    PointerLeave,
    DoubleActivate { point: Point },
    ZoomIn,
    ZoomOut,
    Reset,
    Center,
    Clear,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    config: ViewportConfig,
    transform: AffineTransform,
    state: InteractionState,
    view_width: f32,
    view_height: f32,
    content: Rect,
}

impl Viewport {
    /// `view_width`/`view_height` size the drawing surface; zoom buttons and
    /// centering use its midpoint.
    pub fn new(config: ViewportConfig, view_width: f32, view_height: f32) -> Self {
        Self {
            transform: config.initial_transform,
            config,
            state: InteractionState::Idle,
            view_width,
            view_height,
            content: Rect::new(0.0, 0.0, 0.0, 0.0),
        }
    }

    /// Bounding box of the graph in graph space, used by [`Viewport::center`].
    pub fn with_content(mut self, content: Rect) -> Self {
        self.content = content;
        self
    }

    pub fn resize(&mut self, view_width: f32, view_height: f32) {
        self.view_width = view_width;
        self.view_height = view_height;
    }

    pub fn transform(&self) -> AffineTransform {
        self.transform
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::Dragging { .. })
    }

    pub fn view_center(&self) -> Point {
        Point::new(self.view_width / 2.0, self.view_height / 2.0)
    }

    /// Multiplies the scale by `factor` on both axes, clamped per axis, while
    /// keeping `anchor` fixed in view space. Only the realized part of the
    /// factor moves the translation. Non-finite or non-positive factors are
    /// ignored.
    pub fn scale_by(&mut self, factor: f32, anchor: Point) {
        self.scale_by_xy(factor, factor, anchor);
    }

    fn scale_by_xy(&mut self, factor_x: f32, factor_y: f32, anchor: Point) {
        let t = &mut self.transform;
        if let Some((scale, translate)) = scale_axis(
            t.scale_x,
            t.translate_x,
            factor_x,
            anchor.x,
            self.config.scale_x_min,
            self.config.scale_x_max,
        ) {
            t.scale_x = scale;
            t.translate_x = translate;
        }
        if let Some((scale, translate)) = scale_axis(
            t.scale_y,
            t.translate_y,
            factor_y,
            anchor.y,
            self.config.scale_y_min,
            self.config.scale_y_max,
        ) {
            t.scale_y = scale;
            t.translate_y = translate;
        }
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.transform.translate_x += dx;
        self.transform.translate_y += dy;
    }

    pub fn reset(&mut self) {
        self.transform = self.config.initial_transform;
    }

    /// Moves the content's center onto the view center without touching
    /// scale or skew.
    pub fn center(&mut self) {
        let (cx, cy) = self.content.center();
        let t = &mut self.transform;
        let view = Point::new(self.view_width / 2.0, self.view_height / 2.0);
        t.translate_x = view.x - (t.scale_x * cx + t.skew_x * cy);
        t.translate_y = view.y - (t.skew_y * cx + t.scale_y * cy);
    }

    pub fn clear(&mut self) {
        self.transform = AffineTransform::IDENTITY;
    }

    pub fn zoom_in(&mut self) {
        self.scale_by(self.config.zoom_in_factor, self.view_center());
    }

    pub fn zoom_out(&mut self) {
        self.scale_by(self.config.zoom_out_factor, self.view_center());
    }

    pub fn double_activate(&mut self, point: Point) {
        self.scale_by(self.config.double_activate_factor, point);
    }

    pub fn pointer_down(&mut self, point: Point) {
        self.state = InteractionState::Dragging { last: point };
    }

    /// Pans by the delta from the previous pointer position while dragging;
    /// ignored when idle.
    pub fn pointer_move(&mut self, point: Point) {
        if let InteractionState::Dragging { last } = self.state {
            self.pan_by(point.x - last.x, point.y - last.y);
            self.state = InteractionState::Dragging { last: point };
        }
    }

    pub fn pointer_up(&mut self) {
        self.state = InteractionState::Idle;
    }

    pub fn pointer_leave(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Applies one event. Each call leaves a single consistent transform.
    pub fn apply(&mut self, event: ViewportEvent) {
        tracing::trace!(?event, "viewport event");
        match event {
            ViewportEvent::PointerDown { point } => self.pointer_down(point),
            ViewportEvent::PointerMove { point } => self.pointer_move(point),
            ViewportEvent::PointerUp => self.pointer_up(),
            ViewportEvent::PointerLeave => self.pointer_leave(),
            ViewportEvent::DoubleActivate { point } => self.double_activate(point),
            ViewportEvent::ZoomIn => self.zoom_in(),
            ViewportEvent::ZoomOut => self.zoom_out(),
            ViewportEvent::Reset => self.reset(),
            ViewportEvent::Center => self.center(),
            ViewportEvent::Clear => self.clear(),
        }
    }

    /// The part of graph space currently visible, as the bounding box of the
    /// inverse-mapped view corners.
    pub fn visible_world_rect(&self) -> Option<Rect> {
        visible_world_rect(&self.transform, self.view_width, self.view_height)
    }
}

pub fn visible_world_rect(
    transform: &AffineTransform,
    view_width: f32,
    view_height: f32,
) -> Option<Rect> {
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(view_width, 0.0),
        Point::new(0.0, view_height),
        Point::new(view_width, view_height),
    ];
    let mut min = Point::new(f32::MAX, f32::MAX);
    let mut max = Point::new(f32::MIN, f32::MIN);
    for corner in corners {
        let p = transform.invert_point(corner)?;
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
}

/// One axis of an anchored zoom: `(scale', translate')` or `None` when the
/// factor is unusable.
fn scale_axis(
    scale: f32,
    translate: f32,
    factor: f32,
    anchor: f32,
    min: f32,
    max: f32,
) -> Option<(f32, f32)> {
    if !factor.is_finite() || factor <= 0.0 || scale == 0.0 {
        return None;
    }
    let next = (scale * factor).clamp(min, max);
    let realized = next / scale;
    Some((next, anchor - realized * (anchor - translate)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn viewport() -> Viewport {
        Viewport::new(ViewportConfig::default(), 800.0, 600.0)
    }

    #[test]
    fn scale_about_point_keeps_anchor_fixed() {
        let mut vp = viewport();
        let anchor = Point::new(100.0, 100.0);
        let before = vp.transform().apply_to_point(anchor);
        vp.scale_by(1.2, anchor);
        let t = vp.transform();
        assert!((t.scale_x - 1.2).abs() < EPS);
        assert!((t.scale_y - 1.2).abs() < EPS);
        // The graph point under the anchor stays under it.
        let graph_point = t.invert_point(anchor).unwrap();
        assert!((graph_point.x - 100.0).abs() < EPS);
        assert!((graph_point.y - 100.0).abs() < EPS);
        assert_eq!(before, anchor);
        assert!((t.translate_x - (100.0 - 1.2 * 100.0)).abs() < EPS);
    }

    #[test]
    fn inverse_scale_restores_transform() {
        let mut vp = viewport();
        vp.pan_by(13.0, -7.0);
        let before = vp.transform();
        let p = Point::new(250.0, 40.0);
        vp.scale_by(1.5, p);
        vp.scale_by(1.0 / 1.5, p);
        assert!(vp.transform().approx_eq(&before, EPS));
    }

    #[test]
    fn scale_is_clamped_and_translation_follows_realized_factor() {
        let mut vp = viewport();
        let anchor = Point::new(50.0, 50.0);
        vp.scale_by(100.0, anchor);
        let t = vp.transform();
        assert_eq!(t.scale_x, 4.0);
        assert_eq!(t.scale_y, 4.0);
        assert!((t.translate_x - (50.0 - 4.0 * 50.0)).abs() < EPS);

        vp.scale_by(0.0001, anchor);
        assert_eq!(vp.transform().scale_x, 0.5);
        let g = vp.transform().invert_point(anchor).unwrap();
        assert!((g.x - 50.0).abs() < 1e-3);
    }

    #[test]
    fn axes_clamp_independently() {
        let config = ViewportConfig {
            scale_y_max: 2.0,
            ..ViewportConfig::default()
        };
        let mut vp = Viewport::new(config, 800.0, 600.0);
        vp.scale_by(3.0, Point::default());
        assert_eq!(vp.transform().scale_x, 3.0);
        assert_eq!(vp.transform().scale_y, 2.0);
    }

    #[test]
    fn unusable_factors_are_ignored() {
        let mut vp = viewport();
        vp.scale_by(0.0, Point::new(1.0, 1.0));
        vp.scale_by(-2.0, Point::new(1.0, 1.0));
        vp.scale_by(f32::NAN, Point::new(1.0, 1.0));
        assert_eq!(vp.transform(), AffineTransform::IDENTITY);
    }

    #[test]
    fn drag_pans_by_pointer_deltas() {
        let mut vp = viewport();
        vp.pointer_move(Point::new(10.0, 10.0));
        assert_eq!(vp.transform(), AffineTransform::IDENTITY);

        vp.pointer_down(Point::new(10.0, 10.0));
        assert!(vp.is_dragging());
        vp.pointer_move(Point::new(15.0, 12.0));
        vp.pointer_move(Point::new(25.0, 2.0));
        let t = vp.transform();
        assert_eq!((t.translate_x, t.translate_y), (15.0, -8.0));

        vp.pointer_up();
        assert_eq!(vp.state(), InteractionState::Idle);
        vp.pointer_move(Point::new(100.0, 100.0));
        assert_eq!(vp.transform().translate_x, 15.0);
    }

    #[test]
    fn pointer_leave_ends_drag() {
        let mut vp = viewport();
        vp.apply(ViewportEvent::PointerDown {
            point: Point::new(0.0, 0.0),
        });
        vp.apply(ViewportEvent::PointerLeave);
        assert_eq!(vp.state(), InteractionState::Idle);
    }

    #[test]
    fn reset_restores_initial_transform() {
        let initial = AffineTransform {
            scale_x: 1.27,
            scale_y: 1.27,
            translate_x: -211.62,
            translate_y: 162.59,
            skew_x: 0.0,
            skew_y: 0.0,
        };
        let config = ViewportConfig {
            initial_transform: initial,
            ..ViewportConfig::default()
        };
        let mut vp = Viewport::new(config, 800.0, 600.0);
        assert_eq!(vp.transform(), initial);
        vp.zoom_in();
        vp.pan_by(5.0, 5.0);
        vp.clear();
        vp.reset();
        assert_eq!(vp.transform(), initial);
    }

    #[test]
    fn clear_yields_identity() {
        let mut vp = viewport();
        vp.scale_by(2.0, Point::new(3.0, 4.0));
        vp.pan_by(1.0, 1.0);
        vp.apply(ViewportEvent::Clear);
        assert_eq!(vp.transform(), AffineTransform::IDENTITY);
    }

    #[test]
    fn center_aligns_content_center_with_view_center() {
        let mut vp = viewport().with_content(Rect::new(0.0, 0.0, 200.0, 100.0));
        vp.scale_by(2.0, Point::new(37.0, 11.0));
        vp.center();
        let t = vp.transform();
        assert_eq!(t.scale_x, 2.0);
        let mapped = t.apply_to_point(Point::new(100.0, 50.0));
        assert!((mapped.x - 400.0).abs() < EPS);
        assert!((mapped.y - 300.0).abs() < EPS);
    }

    #[test]
    fn zoom_buttons_anchor_on_view_center() {
        let mut vp = viewport();
        let center = vp.view_center();
        let graph_center = vp.transform().invert_point(center).unwrap();
        vp.apply(ViewportEvent::ZoomIn);
        assert!((vp.transform().scale_x - 1.2).abs() < EPS);
        let after = vp.transform().apply_to_point(graph_center);
        assert!((after.x - center.x).abs() < 1e-3);
        vp.apply(ViewportEvent::ZoomOut);
        assert!((vp.transform().scale_x - 0.96).abs() < EPS);
    }

    #[test]
    fn double_activate_zooms_at_point() {
        let mut vp = viewport();
        vp.apply(ViewportEvent::DoubleActivate {
            point: Point::new(10.0, 20.0),
        });
        let t = vp.transform();
        assert!((t.scale_x - 1.1).abs() < EPS);
        let g = t.invert_point(Point::new(10.0, 20.0)).unwrap();
        assert!((g.x - 10.0).abs() < EPS && (g.y - 20.0).abs() < EPS);
    }

    #[test]
    fn skewed_transform_round_trips_points() {
        let t = AffineTransform {
            scale_x: 2.0,
            scale_y: 0.5,
            translate_x: 3.0,
            translate_y: -4.0,
            skew_x: 0.3,
            skew_y: -0.2,
        };
        let p = Point::new(12.0, -7.0);
        let back = t.invert_point(t.apply_to_point(p)).unwrap();
        assert!((back.x - p.x).abs() < 1e-3 && (back.y - p.y).abs() < 1e-3);
        assert_eq!(t.to_svg_matrix(), [2.0, -0.2, 0.3, 0.5, 3.0, -4.0]);
    }

    #[test]
    fn visible_rect_shrinks_when_zoomed() {
        let mut vp = viewport();
        let full = vp.visible_world_rect().unwrap();
        assert_eq!((full.width, full.height), (800.0, 600.0));
        vp.scale_by(2.0, Point::default());
        let zoomed = vp.visible_world_rect().unwrap();
        assert!((zoomed.width - 400.0).abs() < EPS);
    }

    #[test]
    fn events_deserialize_from_json() {
        let event: ViewportEvent =
            serde_json::from_str(r#"{"type": "pointerDown", "point": {"x": 1, "y": 2}}"#).unwrap();
        assert_eq!(
            event,
            ViewportEvent::PointerDown {
                point: Point::new(1.0, 2.0)
            }
        );
        let event: ViewportEvent = serde_json::from_str(r#"{"type": "zoomIn"}"#).unwrap();
        assert_eq!(event, ViewportEvent::ZoomIn);
    }
}
