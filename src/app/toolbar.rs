//! Toolbar rendering for `SunburstApp`.
//!
//! Draws the breadcrumb bar (each crumb focuses its node), the filter and
//! dark-mode toggles, and the side panel of per-field filter checkboxes.

use eframe::egui;

use super::SunburstApp;

impl SunburstApp {
    /// Render the top toolbar strip.
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);

            ui.toggle_value(&mut self.show_filters, "Filters");

            let dark_label = if self.dark_mode { "\u{263E}" } else { "\u{2600}" };
            if ui.button(dark_label).clicked() {
                self.dark_mode = !self.dark_mode;
            }
            ui.separator();

            let Some(view) = self.view.as_mut() else {
                if self.loading {
                    ui.label("Loading...");
                }
                return;
            };

            let path = view.tree().path(view.focus());
            let crumbs = view.breadcrumbs().to_vec();
            let mut clicked = None;
            for (i, (id, crumb)) in path.iter().zip(&crumbs).enumerate() {
                if i > 0 {
                    ui.label("/");
                }
                let is_focus = i + 1 == crumbs.len();
                if ui.selectable_label(is_focus, crumb).clicked() && !is_focus {
                    clicked = Some(*id);
                }
            }
            if let Some(id) = clicked {
                view.focus_on(id);
            }
        });
    }

    /// Render one collapsible checkbox list per filterable field.
    pub fn draw_filter_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Filters");
        ui.separator();

        let mut changed = false;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for (field, values) in self.filter_options.iter() {
                egui::CollapsingHeader::new(field)
                    .default_open(false)
                    .show(ui, |ui| {
                        for value in values {
                            let mut visible = self.row_filter.is_visible(field, value);
                            if ui.checkbox(&mut visible, value.to_string()).changed() {
                                self.row_filter.set_visible(field, value, visible);
                                changed = true;
                            }
                        }
                    });
            }
        });

        if self.row_filter.is_active() {
            ui.separator();
            if ui.button("Show all").clicked() {
                self.row_filter.clear();
                changed = true;
            }
        }

        if changed {
            self.rebuild_view();
        }
    }
}
