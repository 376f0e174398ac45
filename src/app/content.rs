//! Content-area rendering for `SunburstApp`.
//!
//! - `draw_content`: top-level dispatcher (spinner, error, chart)
//! - `draw_chart`: arcs, labels and hub, plus hover/click handling

use std::time::Duration;

use eframe::egui;

use sunburst::config::ring_radius_for;
use sunburst::render::arc::to_polar;
use sunburst::render::{ArcShape, LabelPlacement, Rgba};
use sunburst::view::HitTarget;

use super::SunburstApp;
use crate::ui::{arc_mesh, arc_outline, label_budget, paint_arc_label, to_color32, truncate_str};

const LABEL_FONT_SIZE: f32 = 11.0;
const CENTER_FONT_SIZE: f32 = 13.0;
/// Upper bound on one animation step so a stalled frame does not skip the transition.
const MAX_FRAME_STEP: f32 = 0.1;

impl SunburstApp {
    /// Top-level content dispatcher.
    pub fn draw_content(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        if self.loading {
            ui.centered_and_justified(|ui| {
                ui.spinner();
            });
            return;
        }

        if let Some(err) = &self.error {
            ui.colored_label(egui::Color32::from_rgb(220, 60, 60), format!("Error: {}", err));
            if self.view.is_none() {
                return;
            }
        }

        if self.view.is_none() {
            ui.centered_and_justified(|ui| {
                ui.label("No data loaded");
            });
            return;
        }

        self.draw_chart(ui, ctx);
    }

    // ── Chart ────────────────────────────────────────────────────────────────

    pub fn draw_chart(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let text_color = ui.visuals().text_color();
        let hub_hover_fill = ui.visuals().widgets.hovered.bg_fill.gamma_multiply(0.5);

        let Some(view) = self.view.as_mut() else {
            return;
        };

        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click());
        let center = response.rect.center();
        let side = response.rect.width().min(response.rect.height());
        let ring = ring_radius_for(side, view.config().max_visible_layers);
        view.set_ring_radius(ring);

        if view.is_transitioning() {
            let dt = ctx.input(|i| i.stable_dt).clamp(0.0, MAX_FRAME_STEP);
            if view.advance(Duration::from_secs_f32(dt)) {
                ctx.request_repaint();
            }
        }

        let pointer_hit = response.hover_pos().and_then(|pos| {
            let (angle, dist) = to_polar((pos.x - center.x) as f64, (pos.y - center.y) as f64);
            view.hit_test(angle, dist / ring as f64)
        });

        if response.clicked() {
            if let Some(target) = pointer_hit {
                if view.click(target).is_some() {
                    ctx.request_repaint();
                }
            }
        }

        self.hovered = match pointer_hit {
            Some(HitTarget::Arc(id)) => Some(id),
            _ => None,
        };
        let clickable = match pointer_hit {
            Some(HitTarget::Arc(id)) => !view.tree().node(id).is_leaf(),
            Some(HitTarget::Hub) => view.focus() != view.tree().root(),
            None => false,
        };
        if clickable {
            ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        // Arcs, innermost ring first
        let ring_px = ring as f64;
        let max_pad = view.config().max_pad_angle;
        let stroke_color = to_color32(Rgba::STROKE);
        let font = egui::FontId::proportional(LABEL_FONT_SIZE);
        let budget = label_budget(ring, LABEL_FONT_SIZE);

        for item in view.render_items() {
            let shape = ArcShape::from_layout(&item.layout, ring_px, max_pad);
            if shape.is_empty() {
                continue;
            }
            let base = self
                .palette
                .as_ref()
                .map_or(Rgba::WHITE, |p| p.color(item.id));
            let fill = to_color32(base.with_opacity(item.visual.fill_opacity));
            painter.add(egui::Shape::mesh(arc_mesh(center, &shape, fill)));

            if item.visual.stroke_width > 0.0 {
                let stroke = egui::Stroke::new(item.visual.stroke_width, stroke_color);
                painter.add(arc_outline(center, &shape, stroke));
            }

            if item.visual.label_opacity > 0.0 {
                let placement = LabelPlacement::from_layout(&item.layout, ring_px);
                let text = truncate_str(&view.tree().label(item.id), budget);
                paint_arc_label(
                    &painter,
                    center,
                    &placement,
                    &text,
                    font.clone(),
                    text_color.gamma_multiply(item.visual.label_opacity),
                );
            }
        }

        // Hub
        if pointer_hit == Some(HitTarget::Hub) && clickable {
            painter.circle_filled(center, ring, hub_hover_fill);
        }
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            view.center_label(),
            egui::FontId::proportional(CENTER_FONT_SIZE),
            text_color,
        );

        if let Some(id) = self.hovered {
            response.on_hover_text_at_pointer(view.title(id));
        }
    }
}
