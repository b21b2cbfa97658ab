//! Camera - perspective projection of 3D walks onto the canvas
//!
//! The view auto-fits to the axis-aligned bounding box of the current
//! point set. Yaw and pitch compose like a trackball: yaw turns about
//! the vertical axis, pitch then tilts the already-yawed frame.

use crate::walk::{Point2, Point3};

/// Denominators at or below this are behind (or at) the camera
pub const NEAR_EPSILON: f64 = 1e-6;

/// Camera distance in bounding radii
const DISTANCE_FACTOR: f64 = 3.0;

/// Share of the shorter canvas side the bounding diagonal should fill
const FILL: f64 = 0.9;

const PITCH_LIMIT: f64 = 1.5;
const ZOOM_RANGE: (f64, f64) = (0.05, 50.0);
const DRAG_SPEED: f64 = 0.01;
const WHEEL_SPEED: f64 = 0.001;

/// A projected point on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    /// Distance behind the view center along the view axis (larger = farther)
    pub depth: f64,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub center: Point3,
    pub radius: f64,
    pub yaw: f64,
    pub pitch: f64,
    /// User zoom on top of the auto-fit
    pub zoom: f64,
    pub base_zoom: f64,
    pub camera_distance: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewState {
    pub fn new(width: f64, height: f64) -> Self {
        let mut view = Self {
            center: [0.0; 3],
            radius: 1.0,
            yaw: 0.0,
            pitch: 0.0,
            zoom: 1.0,
            base_zoom: 1.0,
            camera_distance: DISTANCE_FACTOR,
            width,
            height,
        };
        view.fit_zoom();
        view
    }

    /// Refit center, radius and camera distance to a new point set
    ///
    /// With `reset` the rotation and user zoom go back to defaults,
    /// otherwise they survive so live edits do not snap the view.
    pub fn recompute_bounds(&mut self, points: &[Point3], reset: bool) {
        if let Some((min, max)) = bounding_box(points) {
            self.center = [
                (min[0] + max[0]) * 0.5,
                (min[1] + max[1]) * 0.5,
                (min[2] + max[2]) * 0.5,
            ];
            let diag = ((max[0] - min[0]).powi(2)
                + (max[1] - min[1]).powi(2)
                + (max[2] - min[2]).powi(2))
            .sqrt();
            self.radius = (diag * 0.5).max(f64::EPSILON);
        }

        self.camera_distance = DISTANCE_FACTOR * self.radius;
        self.fit_zoom();

        if reset {
            self.reset_rotation();
        }

        tracing::debug!(
            "View bounds: center={:?} radius={:.3} distance={:.3} base_zoom={:.3}",
            self.center,
            self.radius,
            self.camera_distance,
            self.base_zoom
        );
    }

    pub fn reset_rotation(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.zoom = 1.0;
    }

    /// Canvas resize keeps the fit rule
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.fit_zoom();
    }

    /// Pointer drag in pixels
    pub fn drag(&mut self, dx: f64, dy: f64) {
        self.yaw += dx * DRAG_SPEED;
        self.pitch = (self.pitch + dy * DRAG_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Scroll wheel; positive delta zooms in
    pub fn wheel(&mut self, delta: f64) {
        self.zoom = (self.zoom * (1.0 + delta * WHEEL_SPEED)).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
    }

    // Diagonal 2r at distance 3r should span FILL of the shorter side
    fn fit_zoom(&mut self) {
        let short = self.width.min(self.height).max(1.0);
        self.base_zoom = FILL * short * self.camera_distance / (2.0 * self.radius);
    }

    pub fn project(&self, p: Point3) -> Projected {
        let dx = p[0] - self.center[0];
        let dy = p[1] - self.center[1];
        let dz = p[2] - self.center[2];

        let (sin_y, cos_y) = self.yaw.sin_cos();
        let (sin_p, cos_p) = self.pitch.sin_cos();

        // Yaw mixes x/z
        let x1 = dx * cos_y + dz * sin_y;
        let z1 = -dx * sin_y + dz * cos_y;

        // Pitch mixes y/z of the yawed frame
        let y2 = dy * cos_p - z1 * sin_p;
        let z2 = dy * sin_p + z1 * cos_p;

        let denom = self.camera_distance - z2;
        if denom <= NEAR_EPSILON {
            return Projected { x: 0.0, y: 0.0, depth: -z2, valid: false };
        }

        let scale = self.base_zoom * self.zoom / denom;
        Projected {
            x: self.width * 0.5 + x1 * scale,
            y: self.height * 0.5 - y2 * scale,
            depth: -z2,
            valid: true,
        }
    }
}

/// Axis-aligned bounds, `None` for an empty set
pub fn bounding_box(points: &[Point3]) -> Option<(Point3, Point3)> {
    if points.is_empty() {
        return None;
    }

    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for p in points {
        for i in 0..3 {
            min[i] = min[i].min(p[i]);
            max[i] = max[i].max(p[i]);
        }
    }
    Some((min, max))
}

/// Fit transform for flat walks: same fill rule, Y up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport2D {
    center: Point2,
    scale: f64,
    width: f64,
    height: f64,
}

impl Viewport2D {
    pub fn fit(points: &[Point2], width: f64, height: f64) -> Self {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for p in points {
            for i in 0..2 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        if points.is_empty() {
            min = [0.0; 2];
            max = [0.0; 2];
        }

        let span_x = (max[0] - min[0]).max(f64::EPSILON);
        let span_y = (max[1] - min[1]).max(f64::EPSILON);
        // A flat extent on one axis leaves the other axis in charge
        let scale = FILL * (width / span_x).min(height / span_y);

        Self {
            center: [(min[0] + max[0]) * 0.5, (min[1] + max[1]) * 0.5],
            scale,
            width,
            height,
        }
    }

    pub fn map(&self, p: Point2) -> Point2 {
        [
            self.width * 0.5 + (p[0] - self.center[0]) * self.scale,
            self.height * 0.5 - (p[1] - self.center[1]) * self.scale,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Vec<Point3> {
        vec![[0.0, 0.0, 0.0], [2.0, 2.0, 2.0], [1.0, 0.5, 2.0]]
    }

    #[test]
    fn test_bounds_center_and_radius() {
        let mut view = ViewState::new(800.0, 600.0);
        view.recompute_bounds(&cube(), true);

        assert_eq!(view.center, [1.0, 1.0, 1.0]);
        assert!((view.radius - 3.0f64.sqrt()).abs() < 1e-12);
        assert!((view.camera_distance - 3.0 * view.radius).abs() < 1e-12);
    }

    #[test]
    fn test_center_projects_to_canvas_middle() {
        let mut view = ViewState::new(800.0, 600.0);
        view.recompute_bounds(&cube(), true);
        let p = view.project([1.0, 1.0, 1.0]);

        assert!(p.valid);
        assert!((p.x - 400.0).abs() < 1e-9);
        assert!((p.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_fills_shorter_side() {
        let mut view = ViewState::new(1000.0, 500.0);
        view.recompute_bounds(&[[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]], true);

        // Endpoints at the center depth project to ±0.9 * 500 / 2
        let left = view.project([-1.0, 0.0, 0.0]);
        let right = view.project([1.0, 0.0, 0.0]);
        assert!(((right.x - left.x) - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_behind_camera_invalid() {
        let mut view = ViewState::new(400.0, 400.0);
        view.recompute_bounds(&cube(), true);

        let at_camera = [1.0, 1.0, 1.0 + view.camera_distance];
        assert!(!view.project(at_camera).valid);

        let beyond = [1.0, 1.0, 1.0 + view.camera_distance * 2.0];
        assert!(!view.project(beyond).valid);

        let near = [1.0, 1.0, 1.0 + view.camera_distance * 0.5];
        assert!(view.project(near).valid);
    }

    #[test]
    fn test_depth_grows_away_from_camera() {
        let mut view = ViewState::new(400.0, 400.0);
        view.recompute_bounds(&cube(), true);
        let near = view.project([1.0, 1.0, 2.0]);
        let far = view.project([1.0, 1.0, 0.0]);
        assert!(near.depth < far.depth);
    }

    #[test]
    fn test_rotation_preserved_unless_reset() {
        let mut view = ViewState::new(400.0, 400.0);
        view.drag(50.0, 20.0);
        view.wheel(200.0);
        let (yaw, pitch, zoom) = (view.yaw, view.pitch, view.zoom);

        view.recompute_bounds(&cube(), false);
        assert_eq!((view.yaw, view.pitch, view.zoom), (yaw, pitch, zoom));

        view.recompute_bounds(&cube(), true);
        assert_eq!((view.yaw, view.pitch, view.zoom), (0.0, 0.0, 1.0));
    }

    #[test]
    fn test_pitch_and_zoom_clamped() {
        let mut view = ViewState::new(400.0, 400.0);
        view.drag(0.0, 10_000.0);
        assert_eq!(view.pitch, PITCH_LIMIT);
        view.wheel(-1e9);
        assert_eq!(view.zoom, ZOOM_RANGE.0);
    }

    #[test]
    fn test_viewport_2d_fit() {
        let vp = Viewport2D::fit(&[[0.0, 0.0], [10.0, 5.0]], 200.0, 200.0);
        let a = vp.map([0.0, 0.0]);
        let b = vp.map([10.0, 5.0]);
        assert!(((b[0] - a[0]) - 180.0).abs() < 1e-9);
        // Y grows upward on the curve, downward on the canvas
        assert!(b[1] < a[1]);
    }
}
