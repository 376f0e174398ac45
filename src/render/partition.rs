//! Radial partition layout.
//!
//! Every node gets an angular span `[x0, x1]` and a radial band `[y0, y1]`.
//! The root owns the full circle and the innermost band; each child takes a
//! slice of its parent's span proportional to its value and sits one band
//! further out. Bands are measured in ring units: `y0 == depth`,
//! `y1 == depth + 1`.

use std::f64::consts::TAU;

use crate::hierarchy::{Hierarchy, NodeId};

/// Angular/radial extent of one node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ArcLayout {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl ArcLayout {
    pub const fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self { x0, x1, y0, y1 }
    }

    /// Angular span in radians.
    pub fn angle(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn mid_angle(&self) -> f64 {
        (self.x0 + self.x1) * 0.5
    }

    pub fn mid_radius(&self) -> f64 {
        (self.y0 + self.y1) * 0.5
    }

    /// Angular × radial span, the size measure used for label culling.
    pub fn area(&self) -> f64 {
        (self.y1 - self.y0) * (self.x1 - self.x0)
    }

    /// Whether the polar point (`angle` radians, `radius` ring units) falls inside.
    pub fn contains(&self, angle: f64, radius: f64) -> bool {
        angle >= self.x0 && angle < self.x1 && radius >= self.y0 && radius < self.y1
    }

    /// Re-express this extent with `focus` as the new centre.
    ///
    /// The focus span is stretched to the full circle (anything outside it
    /// collapses to zero width at 0 or 2π) and every band moves inward by
    /// `focus_depth` rings, clamped at the centre.
    pub fn zoomed_to(&self, focus: &ArcLayout, focus_depth: usize) -> ArcLayout {
        let span = focus.x1 - focus.x0;
        let depth = focus_depth as f64;
        let rescale = |x: f64| ((x - focus.x0) / span).clamp(0.0, 1.0) * TAU;
        ArcLayout {
            x0: rescale(self.x0),
            x1: rescale(self.x1),
            y0: (self.y0 - depth).max(0.0),
            y1: (self.y1 - depth).max(0.0),
        }
    }
}

/// Lay out `tree` over the full circle.
///
/// The result is indexed by [`NodeId::index`]. Nodes with a non-positive
/// value get zero width; children of such a node sit at its start angle.
pub fn partition(tree: &Hierarchy) -> Vec<ArcLayout> {
    let mut layout = vec![ArcLayout::default(); tree.len()];
    let root = tree.root();
    layout[root.index()] = ArcLayout::new(0.0, TAU, 0.0, 1.0);
    dice(tree, root, &mut layout);
    layout
}

fn dice(tree: &Hierarchy, parent: NodeId, layout: &mut [ArcLayout]) {
    let node = tree.node(parent);
    let bounds = layout[parent.index()];
    // Negative measures occupy no angle, so siblings share the parent's
    // span in proportion to their non-negative values.
    let weight: f64 = node
        .children
        .iter()
        .map(|&c| tree.node(c).value.max(0.0))
        .sum();
    let scale = if weight > 0.0 {
        bounds.angle() / weight
    } else {
        0.0
    };

    let y0 = (node.depth + 1) as f64;
    let mut x = bounds.x0;
    for &child in &node.children {
        let width = tree.node(child).value.max(0.0) * scale;
        layout[child.index()] = ArcLayout::new(x, x + width, y0, y0 + 1.0);
        x += width;
        dice(tree, child, layout);
    }
}
