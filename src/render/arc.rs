//! Screen geometry for arcs and their labels.
//!
//! Converts an [`ArcLayout`] (radians / ring units) into pixel space around
//! the chart centre. Angles run clockwise from 12 o'clock; the y axis points
//! down, matching egui and SVG.

use std::f64::consts::PI;

use crate::render::partition::ArcLayout;

/// A padded annular sector in pixels, relative to the chart centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcShape {
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub pad_angle: f64,
    pub pad_radius: f64,
}

impl ArcShape {
    /// Pixel sector for `layout` with rings `ring_radius` wide.
    ///
    /// The outer edge is pulled in by one pixel so neighbouring rings do not
    /// touch; adjacent arcs are separated by a pad of at most `max_pad_angle`.
    pub fn from_layout(layout: &ArcLayout, ring_radius: f64, max_pad_angle: f64) -> Self {
        let inner = layout.y0 * ring_radius;
        Self {
            start_angle: layout.x0,
            end_angle: layout.x1,
            inner_radius: inner,
            outer_radius: inner.max(layout.y1 * ring_radius - 1.0),
            pad_angle: ((layout.x1 - layout.x0) / 2.0).min(max_pad_angle).max(0.0),
            pad_radius: ring_radius * 1.5,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end_angle <= self.start_angle || self.outer_radius <= self.inner_radius
    }

    /// Angular range actually covered at `radius` once the pad is removed.
    ///
    /// The pad is a constant linear gap (`pad_radius * pad_angle`), so it
    /// eats more angle near the centre. Ranges too narrow for the pad
    /// collapse to their midpoint.
    pub fn padded_range(&self, radius: f64) -> (f64, f64) {
        let (a0, a1) = (self.start_angle, self.end_angle);
        if self.pad_angle <= 0.0 || radius <= 0.0 {
            return (a0, a1);
        }
        let p = (self.pad_radius / radius * (self.pad_angle / 2.0).sin())
            .clamp(-1.0, 1.0)
            .asin();
        if a1 - a0 > 2.0 * p {
            (a0 + p, a1 - p)
        } else {
            let mid = (a0 + a1) * 0.5;
            (mid, mid)
        }
    }

    /// Inner/outer point pairs sweeping the sector, for building a triangle strip.
    ///
    /// `max_step` bounds the angle between consecutive pairs.
    pub fn strip(&self, max_step: f64) -> Vec<([f32; 2], [f32; 2])> {
        if self.is_empty() {
            return Vec::new();
        }
        let (i0, i1) = self.padded_range(self.inner_radius);
        let (o0, o1) = self.padded_range(self.outer_radius);
        let sweep = (o1 - o0).max(i1 - i0);
        let steps = ((sweep / max_step.max(1e-3)).ceil() as usize).max(1);

        (0..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                (
                    polar(self.inner_radius, i0 + (i1 - i0) * t),
                    polar(self.outer_radius, o0 + (o1 - o0) * t),
                )
            })
            .collect()
    }

    /// Closed outline: outer edge clockwise, then inner edge back.
    pub fn outline(&self, max_step: f64) -> Vec<[f32; 2]> {
        let strip = self.strip(max_step);
        let mut points: Vec<[f32; 2]> = strip.iter().map(|(_, outer)| *outer).collect();
        points.extend(strip.iter().rev().map(|(inner, _)| *inner));
        points
    }
}

/// Pixel offset of the polar point (`radius`, `angle` clockwise from 12 o'clock).
pub fn polar(radius: f64, angle: f64) -> [f32; 2] {
    [(radius * angle.sin()) as f32, (-radius * angle.cos()) as f32]
}

/// Inverse of [`polar`]: angle in `[0, 2π)` and distance for an offset from the centre.
pub fn to_polar(dx: f64, dy: f64) -> (f64, f64) {
    let angle = dx.atan2(-dy).rem_euclid(2.0 * PI);
    (angle, dx.hypot(dy))
}

/// Where and how an arc's label is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    /// Rotation of the radial baseline, degrees clockwise from 3 o'clock.
    pub rotation_deg: f64,
    /// Distance from the centre in pixels.
    pub radius: f64,
    /// Text on the left half is turned 180° to stay upright.
    pub flipped: bool,
}

impl LabelPlacement {
    pub fn from_layout(layout: &ArcLayout, ring_radius: f64) -> Self {
        let mid_deg = layout.mid_angle().to_degrees();
        Self {
            rotation_deg: mid_deg - 90.0,
            radius: layout.mid_radius() * ring_radius,
            flipped: mid_deg >= 180.0,
        }
    }

    /// Label anchor relative to the centre.
    pub fn position(&self) -> [f32; 2] {
        polar(self.radius, (self.rotation_deg + 90.0).to_radians())
    }

    /// Text rotation in radians, clockwise.
    pub fn text_angle(&self) -> f32 {
        let deg = if self.flipped {
            self.rotation_deg + 180.0
        } else {
            self.rotation_deg
        };
        deg.to_radians() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_radii_and_pad() {
        let shape = ArcShape::from_layout(&ArcLayout::new(0.0, 1.0, 1.0, 2.0), 100.0, 0.005);
        assert_eq!(shape.inner_radius, 100.0);
        assert_eq!(shape.outer_radius, 199.0);
        assert_eq!(shape.pad_angle, 0.005);
        assert_eq!(shape.pad_radius, 150.0);

        let thin = ArcShape::from_layout(&ArcLayout::new(0.0, 0.004, 1.0, 2.0), 100.0, 0.005);
        assert!((thin.pad_angle - 0.002).abs() < EPS);
    }

    #[test]
    fn test_collapsed_band_is_empty() {
        let shape = ArcShape::from_layout(&ArcLayout::new(0.0, 1.0, 0.0, 0.0), 100.0, 0.005);
        assert_eq!(shape.outer_radius, shape.inner_radius);
        assert!(shape.is_empty());
        assert!(shape.strip(0.1).is_empty());
    }

    #[test]
    fn test_padding_shrinks_range() {
        let shape = ArcShape::from_layout(&ArcLayout::new(0.0, 1.0, 1.0, 2.0), 100.0, 0.005);
        let (a0, a1) = shape.padded_range(shape.inner_radius);
        assert!(a0 > 0.0 && a1 < 1.0);
        let (b0, _) = shape.padded_range(shape.outer_radius);
        assert!(b0 < a0);
    }

    #[test]
    fn test_strip_endpoints() {
        let shape = ArcShape::from_layout(&ArcLayout::new(0.0, PI, 1.0, 2.0), 100.0, 0.0);
        let strip = shape.strip(0.1);
        assert!(strip.len() > 10);
        let (inner, outer) = strip[0];
        assert!((inner[0]).abs() < 1e-4 && (inner[1] + 100.0).abs() < 1e-4);
        assert!((outer[1] + 199.0).abs() < 1e-4);
        let (_, last_outer) = strip[strip.len() - 1];
        assert!((last_outer[1] - 199.0).abs() < 1e-3);
    }

    #[test]
    fn test_polar_round_trip() {
        let [x, y] = polar(50.0, 1.0);
        let (angle, radius) = to_polar(x as f64, y as f64);
        assert!((angle - 1.0).abs() < 1e-5);
        assert!((radius - 50.0).abs() < 1e-4);
        let (left, _) = to_polar(-1.0, 0.0);
        assert!((left - 1.5 * PI).abs() < EPS);
    }

    #[test]
    fn test_label_flip() {
        let right = LabelPlacement::from_layout(&ArcLayout::new(0.0, 1.0, 1.0, 2.0), 100.0);
        assert!(!right.flipped);
        assert_eq!(right.radius, 150.0);
        let left = LabelPlacement::from_layout(&ArcLayout::new(4.0, 5.0, 1.0, 2.0), 100.0);
        assert!(left.flipped);
    }
}
