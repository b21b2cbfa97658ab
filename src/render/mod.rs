//! Segment Renderer
//!
//! Draws a walk as colored line segments onto any `Surface`:
//! - 2D walks are fitted to the canvas directly
//! - 3D walks go through the camera; segments touching an invalid
//!   (behind-camera) point are skipped, and nearer segments get thicker
//!
//! An optional prefix limit draws only the first segments, which is how
//! the animation reveals the curve.

pub mod color;
pub mod raster;

pub use color::{ColorPolicy, Rgb};
pub use raster::RasterSurface;

use crate::camera::{Projected, ViewState, Viewport2D};
use crate::walk::{Point2, Point3};

/// Thinnest depth-cued stroke
pub const MIN_DEPTH_WIDTH: f64 = 0.3;

/// Anything segments can be drawn onto
pub trait Surface {
    /// Drawable size in pixels
    fn size(&self) -> (f64, f64);
    fn clear(&mut self, color: Rgb);
    fn stroke(&mut self, from: Point2, to: Point2, color: Rgb, width: f64);
}

/// Cosmetic settings that do not affect geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub background: Rgb,
    /// Multiplier on every stroke width
    pub stroke_scale: f64,
}

impl Style {
    pub fn new(dark_mode: bool, stroke_scale: f64) -> Self {
        let background = if dark_mode { Rgb([17, 17, 24]) } else { Rgb::WHITE };
        Self { background, stroke_scale }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new(true, 1.0)
    }
}

/// Line width cue: `max(0.3, 1 - depth / (2 * radius))`
pub fn depth_line_width(avg_depth: f64, radius: f64) -> f64 {
    (1.0 - avg_depth / (2.0 * radius)).max(MIN_DEPTH_WIDTH)
}

fn segment_limit(total: usize, limit: Option<usize>) -> usize {
    limit.map_or(total, |l| l.min(total))
}

/// Draw a flat walk; returns the number of segments drawn
pub fn draw_2d<S: Surface + ?Sized>(
    surface: &mut S,
    points: &[Point2],
    policy: &ColorPolicy,
    style: &Style,
    limit: Option<usize>,
) -> usize {
    surface.clear(style.background);

    let total = points.len().saturating_sub(1);
    let (w, h) = surface.size();
    let viewport = Viewport2D::fit(points, w, h);

    let count = segment_limit(total, limit);
    let mut drawn = 0;
    for i in 0..count {
        let from = viewport.map(points[i]);
        let to = viewport.map(points[i + 1]);
        if !is_finite(from) || !is_finite(to) {
            continue;
        }
        surface.stroke(from, to, policy.color_at(i, total), style.stroke_scale);
        drawn += 1;
    }

    if drawn < count {
        tracing::trace!("Skipped {} non-finite segments", count - drawn);
    }
    drawn
}

fn is_finite(p: Point2) -> bool {
    p[0].is_finite() && p[1].is_finite()
}

/// Draw a spatial walk through the camera; returns the number of segments drawn
pub fn draw_3d<S: Surface + ?Sized>(
    surface: &mut S,
    points: &[Point3],
    view: &ViewState,
    policy: &ColorPolicy,
    style: &Style,
    limit: Option<usize>,
) -> usize {
    surface.clear(style.background);

    let total = points.len().saturating_sub(1);
    let count = segment_limit(total, limit);
    let projected: Vec<Projected> = points[..(count + 1).min(points.len())]
        .iter()
        .map(|&p| view.project(p))
        .collect();

    let mut drawn = 0;
    for (i, pair) in projected.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        if !a.valid || !b.valid {
            continue;
        }
        let width = depth_line_width((a.depth + b.depth) * 0.5, view.radius) * style.stroke_scale;
        surface.stroke([a.x, a.y], [b.x, b.y], policy.color_at(i, total), width);
        drawn += 1;
    }

    if drawn < count {
        tracing::trace!("Skipped {} segments behind the camera", count - drawn);
    }
    drawn
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Surface that remembers every call, for assertions
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordingSurface {
        pub width: f64,
        pub height: f64,
        pub background: Option<Rgb>,
        pub segments: Vec<(Point2, Point2, Rgb, f64)>,
    }

    impl RecordingSurface {
        pub fn new(width: f64, height: f64) -> Self {
            Self { width, height, background: None, segments: Vec::new() }
        }
    }

    impl Surface for RecordingSurface {
        fn size(&self) -> (f64, f64) {
            (self.width, self.height)
        }

        fn clear(&mut self, color: Rgb) {
            self.background = Some(color);
            self.segments.clear();
        }

        fn stroke(&mut self, from: Point2, to: Point2, color: Rgb, width: f64) {
            self.segments.push((from, to, color, width));
        }
    }
}
