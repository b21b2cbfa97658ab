//! Raster surface backed by an RGBA image, used for PNG export

use image::{Rgba, RgbaImage};
use std::path::Path;

use super::{Rgb, Surface};
use crate::walk::Point2;

pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    #[cfg(test)]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        self.image.save(path)?;
        tracing::debug!("Saved {}x{} frame to {}", self.image.width(), self.image.height(), path.display());
        Ok(())
    }

    fn put(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.image.width() && (y as u32) < self.image.height() {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Square-ish dab of the given radius around a pixel
    fn dab(&mut self, x: i32, y: i32, radius: i32, color: Rgba<u8>) {
        if radius == 0 {
            self.put(x, y, color);
            return;
        }
        let r2 = radius * radius;
        for oy in -radius..=radius {
            for ox in -radius..=radius {
                if ox * ox + oy * oy <= r2 {
                    self.put(x + ox, y + oy, color);
                }
            }
        }
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> (f64, f64) {
        (self.image.width() as f64, self.image.height() as f64)
    }

    fn clear(&mut self, color: Rgb) {
        let fill = Rgba([color.r(), color.g(), color.b(), 255]);
        for px in self.image.pixels_mut() {
            *px = fill;
        }
    }

    /// Bresenham line stamped with a dab per step
    fn stroke(&mut self, from: Point2, to: Point2, color: Rgb, width: f64) {
        if !(from[0].is_finite() && from[1].is_finite() && to[0].is_finite() && to[1].is_finite()) {
            return;
        }

        let color = Rgba([color.r(), color.g(), color.b(), 255]);
        let radius = ((width - 1.0) * 0.5).round().max(0.0) as i32;

        let margin = radius as f64 + 1.0;
        let (w, h) = self.size();
        let Some((from, to)) = clip_segment(from, to, [-margin, -margin], [w + margin, h + margin]) else {
            return;
        };

        let (mut x0, mut y0) = (from[0].round() as i32, from[1].round() as i32);
        let (x1, y1) = (to[0].round() as i32, to[1].round() as i32);
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.dab(x0, y0, radius, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

/// Liang-Barsky clip against an axis-aligned box
fn clip_segment(from: Point2, to: Point2, min: Point2, max: Point2) -> Option<(Point2, Point2)> {
    let d = [to[0] - from[0], to[1] - from[1]];
    let (mut t0, mut t1) = (0.0f64, 1.0f64);

    for axis in 0..2 {
        for (p, q) in [(-d[axis], from[axis] - min[axis]), (d[axis], max[axis] - from[axis])] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
    }

    Some((
        [from[0] + t0 * d[0], from[1] + t0 * d[1]],
        [from[0] + t1 * d[0], from[1] + t1 * d[1]],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_and_stroke() {
        let mut surface = RasterSurface::new(10, 10);
        surface.clear(Rgb::WHITE);
        surface.stroke([0.0, 5.0], [9.0, 5.0], Rgb([255, 0, 0]), 1.0);

        for x in 0..10 {
            assert_eq!(surface.image().get_pixel(x, 5), &Rgba([255, 0, 0, 255]));
        }
        assert_eq!(surface.image().get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_thick_stroke_covers_neighbors() {
        let mut surface = RasterSurface::new(10, 10);
        surface.clear(Rgb::BLACK);
        surface.stroke([2.0, 5.0], [7.0, 5.0], Rgb::WHITE, 3.0);
        assert_eq!(surface.image().get_pixel(4, 4), &Rgba([255, 255, 255, 255]));
        assert_eq!(surface.image().get_pixel(4, 6), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_offscreen_is_clipped() {
        let mut surface = RasterSurface::new(4, 4);
        surface.clear(Rgb::BLACK);
        surface.stroke([-20.0, -20.0], [-10.0, 30.0], Rgb::WHITE, 1.0);
        surface.stroke([f64::NAN, 0.0], [1.0, 1.0], Rgb::WHITE, 1.0);
        assert!(surface.image().pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn test_far_endpoints_are_clipped_not_walked() {
        let mut surface = RasterSurface::new(8, 8);
        surface.clear(Rgb::BLACK);
        surface.stroke([-1e12, 4.0], [1e12, 4.0], Rgb::WHITE, 1.0);
        for x in 0..8 {
            assert_eq!(surface.image().get_pixel(x, 4), &Rgba([255, 255, 255, 255]));
        }
    }

    #[test]
    fn test_clip_segment() {
        let clipped = clip_segment([-10.0, 0.0], [10.0, 0.0], [0.0, -1.0], [5.0, 1.0]).unwrap();
        assert_eq!(clipped, ([0.0, 0.0], [5.0, 0.0]));
        assert!(clip_segment([-10.0, 5.0], [10.0, 5.0], [0.0, -1.0], [5.0, 1.0]).is_none());
    }
}
