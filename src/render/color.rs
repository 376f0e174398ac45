//! Branch colours.
//!
//! Each top-level branch of the chart gets one hue from a cyclical rainbow
//! and every descendant inherits it. The rainbow is the cubehelix sweep
//! commonly used for categorical sunbursts; because it wraps around
//! (t = 0 and t = 1 are the same colour) it is sampled at `n + 1` points
//! for `n` branches so the first and last branch differ.

use std::f64::consts::PI;

use crate::hierarchy::{Hierarchy, NodeId};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255, a: 255 };
    /// Arc outline: half-transparent black.
    pub const STROKE: Self = Self { r: 0, g: 0, b: 0, a: 128 };

    /// Same colour with alpha scaled by `opacity` (clamped to `[0, 1]`).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let o = opacity.clamp(0.0, 1.0);
        Self {
            a: (self.a as f32 * o).round() as u8,
            ..self
        }
    }
}

/// Cyclical rainbow at `t` (wraps every 1.0).
pub fn rainbow(t: f64) -> Rgba {
    let t = t - t.floor();
    let ts = (t - 0.5).abs();
    cubehelix(360.0 * t - 100.0, 1.5 - 1.5 * ts, 0.8 - 0.9 * ts)
}

/// Cubehelix (hue degrees, saturation, lightness) → sRGB.
fn cubehelix(h: f64, s: f64, l: f64) -> Rgba {
    const A: f64 = -0.14861;
    const B: f64 = 1.78277;
    const C: f64 = -0.29227;
    const D: f64 = -0.90649;
    const E: f64 = 1.97294;

    let h = (h + 120.0) * PI / 180.0;
    let amp = s * l * (1.0 - l);
    let (sin_h, cos_h) = h.sin_cos();
    let channel = |v: f64| (255.0 * v).round().clamp(0.0, 255.0) as u8;
    Rgba {
        r: channel(l + amp * (A * cos_h + B * sin_h)),
        g: channel(l + amp * (C * cos_h + D * sin_h)),
        b: channel(l + amp * (E * cos_h)),
        a: 255,
    }
}

/// `n` evenly spaced samples of `rainbow` over `[0, 1]`.
pub fn quantize(n: usize) -> Vec<Rgba> {
    match n {
        0 => Vec::new(),
        1 => vec![rainbow(0.0)],
        _ => (0..n).map(|i| rainbow(i as f64 / (n - 1) as f64)).collect(),
    }
}

/// Colour lookup per node, keyed by top-level branch.
#[derive(Debug, Clone)]
pub struct BranchPalette {
    /// Indexed by node index; `None` for the root.
    colors: Vec<Option<Rgba>>,
}

impl BranchPalette {
    pub fn new(tree: &Hierarchy) -> Self {
        let branches = tree.children(tree.root());
        let swatches = quantize(branches.len() + 1);
        let colors = tree
            .ids()
            .map(|id| {
                let branch = tree.branch_of(id)?;
                let slot = branches.iter().position(|b| *b == branch)?;
                swatches.get(slot).copied()
            })
            .collect();
        Self { colors }
    }

    pub fn color(&self, id: NodeId) -> Rgba {
        self.colors
            .get(id.index())
            .copied()
            .flatten()
            .unwrap_or(Rgba::WHITE)
    }
}
