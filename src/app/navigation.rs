//! Data lifecycle methods for `SunburstApp`.
//!
//! Covers the asynchronous load (`start_load`, `check_load`) and rebuilding
//! the hierarchy and view whenever the data or the row filter changes.

use std::sync::mpsc::TryRecvError;

use eframe::egui;

use sunburst::data::filter::extract_filter_options_excluding;
use sunburst::data::loader::spawn_load;
use sunburst::render::BranchPalette;
use sunburst::view::ViewState;

use super::{build_tree, resolve_fields, SunburstApp};

impl SunburstApp {
    /// Start loading `data_path` on a background thread.
    pub fn start_load(&mut self, ctx: &egui::Context) {
        if self.loading {
            return;
        }
        let Some(path) = self.data_path.clone() else {
            self.error = Some("No data file given. Pass DATA_FILE on the command line.".into());
            return;
        };
        self.loading = true;
        self.error = None;

        let ctx = ctx.clone();
        self.load_rx = Some(spawn_load(path, move || ctx.request_repaint()));
    }

    /// Poll the load channel and build the chart once rows arrive.
    pub fn check_load(&mut self) {
        let Some(rx) = &self.load_rx else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Loader thread exited without a result");
                self.error = Some("Loading stopped before any data arrived.".into());
                self.loading = false;
                self.load_rx = None;
                return;
            }
        };
        match result {
            Ok(table) => {
                self.fields = resolve_fields(
                    self.explicit_fields.as_deref(),
                    &table,
                    &self.config.measure_field,
                );
                self.filter_options =
                    extract_filter_options_excluding(&table.rows, &self.config.measure_field);
                self.row_filter.clear();
                self.table = Some(table);
                self.rebuild_view();
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.table = None;
                self.view = None;
            }
        }
        self.loading = false;
        self.load_rx = None;
    }

    /// Regroup the filtered rows and reset the view to the root.
    pub fn rebuild_view(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let built = build_tree(table, &self.fields, &self.row_filter, &self.config)
            .and_then(|tree| ViewState::new(tree, self.config.clone()));
        match built {
            Ok(view) => {
                log::info!(
                    "Chart rebuilt: {} nodes over {}",
                    view.tree().len(),
                    self.fields.join(" > ")
                );
                self.palette = Some(BranchPalette::new(view.tree()));
                self.view = Some(view);
                self.hovered = None;
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.view = None;
                self.palette = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_dead_loader_stops_loading() {
        let (tx, rx) = mpsc::channel();
        drop(tx);
        let mut app = SunburstApp {
            loading: true,
            load_rx: Some(rx),
            ..Default::default()
        };
        app.check_load();
        assert!(!app.loading);
        assert!(app.load_rx.is_none());
        assert!(app.error.is_some());
    }

    #[test]
    fn test_pending_loader_keeps_waiting() {
        let (_tx, rx) = mpsc::channel();
        let mut app = SunburstApp {
            loading: true,
            load_rx: Some(rx),
            ..Default::default()
        };
        app.check_load();
        assert!(app.loading);
        assert!(app.error.is_none());
    }

    #[test]
    fn test_loaded_table_builds_view() {
        let (tx, rx) = mpsc::channel();
        let table = sunburst::data::loader::parse_delimited("Region,City,Total\nA,X,10\nB,Z,7\n");
        tx.send(table).unwrap();
        let mut app = SunburstApp {
            loading: true,
            load_rx: Some(rx),
            ..Default::default()
        };
        app.check_load();
        assert!(!app.loading);
        assert_eq!(app.fields, vec!["Region", "City"]);
        let view = app.view.as_ref().unwrap();
        assert_eq!(view.breadcrumbs(), &["ROOT (17)".to_string()]);
    }
}
