//! Stateless egui helpers for painting the chart.
//!
//! Converts the library's framework-free shapes ([`ArcShape`], [`Rgba`],
//! [`LabelPlacement`]) into egui meshes and text shapes, plus small text
//! utilities used by the panels.

use eframe::egui;
use egui::epaint::{Mesh, TextShape};

use sunburst::render::{ArcShape, LabelPlacement, Rgba};

/// Largest angle between two strip vertices along an arc.
const ARC_STEP: f64 = 0.04;

// ─── Colour ───────────────────────────────────────────────────────────────────

pub fn to_color32(c: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

// ─── Arcs ─────────────────────────────────────────────────────────────────────

/// Filled annular sector as a triangle strip around `center`.
pub fn arc_mesh(center: egui::Pos2, shape: &ArcShape, fill: egui::Color32) -> Mesh {
    let mut mesh = Mesh::default();
    let strip = shape.strip(ARC_STEP);
    for (inner, outer) in &strip {
        mesh.colored_vertex(center + egui::vec2(inner[0], inner[1]), fill);
        mesh.colored_vertex(center + egui::vec2(outer[0], outer[1]), fill);
    }
    for i in 0..strip.len().saturating_sub(1) as u32 {
        let base = i * 2;
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base + 1, base + 3, base + 2);
    }
    mesh
}

/// Closed outline of a sector.
pub fn arc_outline(center: egui::Pos2, shape: &ArcShape, stroke: egui::Stroke) -> egui::Shape {
    let points: Vec<egui::Pos2> = shape
        .outline(ARC_STEP)
        .into_iter()
        .map(|[x, y]| center + egui::vec2(x, y))
        .collect();
    egui::Shape::closed_line(points, stroke)
}

// ─── Text ─────────────────────────────────────────────────────────────────────

/// Draw `text` centred on a label anchor, rotated along the arc's radius.
pub fn paint_arc_label(
    painter: &egui::Painter,
    center: egui::Pos2,
    placement: &LabelPlacement,
    text: &str,
    font: egui::FontId,
    color: egui::Color32,
) {
    let [x, y] = placement.position();
    let anchor = center + egui::vec2(x, y);
    let angle = placement.text_angle();

    let galley = painter.layout_no_wrap(text.to_string(), font, color);
    let half = galley.size() / 2.0;
    // TextShape rotates around its top-left corner; shift so the rotation
    // pivots on the galley centre instead.
    let (sin, cos) = angle.sin_cos();
    let offset = egui::vec2(half.x * cos - half.y * sin, half.x * sin + half.y * cos);

    let mut shape = TextShape::new(anchor - offset, galley, color);
    shape.angle = angle;
    painter.add(shape);
}

/// Truncate `s` to `max_chars`, appending "..." when shortened.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let t: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", t)
    }
}

/// Rough label budget for an arc: characters that fit along its band.
pub fn label_budget(ring_radius: f32, font_size: f32) -> usize {
    ((ring_radius - 4.0) / (font_size * 0.55)).max(3.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use sunburst::render::ArcLayout;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a much longer label", 8), "a muc...");
    }

    #[test]
    fn test_arc_mesh_triangles() {
        let shape = ArcShape::from_layout(&ArcLayout::new(0.0, 1.0, 1.0, 2.0), 100.0, 0.0);
        let mesh = arc_mesh(egui::pos2(0.0, 0.0), &shape, egui::Color32::RED);
        let pairs = mesh.vertices.len() / 2;
        assert_eq!(mesh.indices.len(), (pairs - 1) * 6);
    }

    #[test]
    fn test_empty_arc_has_no_mesh() {
        let shape = ArcShape::from_layout(&ArcLayout::new(1.0, 1.0, 1.0, 2.0), 100.0, 0.0);
        assert!(arc_mesh(egui::pos2(0.0, 0.0), &shape, egui::Color32::RED).is_empty());
    }

    #[test]
    fn test_label_budget() {
        assert_eq!(label_budget(100.0, 10.0), 17);
        assert_eq!(label_budget(1.0, 10.0), 3);
    }
}
