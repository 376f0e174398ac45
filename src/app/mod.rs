//! `SunburstApp`: the top-level egui application state.
//!
//! This module declares the command line, the `SunburstApp` struct and the
//! headless entry point. All egui methods are split across the sibling
//! sub-modules:
//!
//! - `navigation`: background loading, filtering, hierarchy rebuilds
//! - `toolbar`: breadcrumb bar and filter panel
//! - `content`: the chart itself (arcs, labels, hub, clicks)

pub mod content;
pub mod navigation;
pub mod toolbar;

use std::path::PathBuf;
use std::sync::mpsc;

use clap::Parser;
use eframe::egui;

use sunburst::config::SunburstConfig;
use sunburst::data::filter::{extract_filter_options_excluding, FilterOptions, RowFilter};
use sunburst::data::loader::load_rows;
use sunburst::data::Table;
use sunburst::hierarchy::{Hierarchy, HierarchyBuilder, NodeId};
use sunburst::render::BranchPalette;
use sunburst::view::ViewState;
use sunburst::{Result, SunburstError};

// ─── Command line ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Parser)]
#[command(
    name = "sunburst",
    about = "Zoomable sunburst chart for delimited or JSON tabular data."
)]
pub struct AppConfig {
    /// Data file to chart (.json array of objects, anything else comma-separated).
    #[arg(value_name = "DATA_FILE")]
    pub data_path: Option<PathBuf>,

    /// Grouping fields, outermost first. Defaults to every non-measure column.
    #[arg(long, value_delimiter = ',', value_name = "FIELD,...")]
    pub fields: Option<Vec<String>>,

    /// Label of the root node.
    #[arg(long, value_name = "LABEL")]
    pub root: Option<String>,

    /// Numeric field summed into node values.
    #[arg(long, value_name = "FIELD")]
    pub measure: Option<String>,

    /// Number of rings drawn around the hub.
    #[arg(long, value_name = "N")]
    pub layers: Option<u32>,

    /// JSON chart configuration; explicit flags override it.
    #[arg(long, value_name = "CONFIG_JSON")]
    pub config: Option<PathBuf>,

    /// Print the hierarchy summary to stdout instead of opening a window.
    #[arg(long)]
    pub headless: bool,
}

impl AppConfig {
    /// Chart configuration from `--config` with the explicit flags applied.
    pub fn chart_config(&self) -> Result<SunburstConfig> {
        let mut config = match &self.config {
            Some(path) => SunburstConfig::from_json_file(path)?,
            None => SunburstConfig::default(),
        };
        if let Some(layers) = self.layers {
            config = config.with_max_visible_layers(layers);
        }
        if let Some(measure) = &self.measure {
            config = config.with_measure_field(measure.clone());
        }
        if let Some(root) = &self.root {
            config = config.with_root_label(root.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

/// Grouping fields for `table`: the explicit list, or every non-measure column.
pub fn resolve_fields(explicit: Option<&[String]>, table: &Table, measure: &str) -> Vec<String> {
    match explicit {
        Some(fields) if !fields.is_empty() => fields.to_vec(),
        _ => table.grouping_columns(measure),
    }
}

/// Build the tree for the rows `filter` lets through.
pub fn build_tree(
    table: &Table,
    fields: &[String],
    filter: &RowFilter,
    config: &SunburstConfig,
) -> Result<Hierarchy> {
    let rows = filter.apply(&table.rows);
    HierarchyBuilder::new(fields)
        .with_measure_field(config.measure_field.clone())
        .with_root_label(config.root_label.clone())
        .build(&rows)
}

// ─── Entry points ────────────────────────────────────────────────────────────

pub fn run(args: &AppConfig) -> Result<()> {
    let config = args.chart_config()?;
    if args.headless {
        return run_headless(args, &config);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 860.0])
            .with_title("Sunburst"),
        ..Default::default()
    };
    let app_args = args.clone();
    eframe::run_native(
        "Sunburst",
        options,
        Box::new(move |cc| {
            let mut app = SunburstApp::new(&app_args, config);
            app.start_load(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| SunburstError::InvalidInput(format!("failed to start the viewer: {e}")))
}

fn run_headless(args: &AppConfig, config: &SunburstConfig) -> Result<()> {
    let path = args.data_path.as_ref().ok_or_else(|| {
        SunburstError::InvalidInput("headless mode requires a DATA_FILE argument".into())
    })?;
    let table = load_rows(path)?;
    let fields = resolve_fields(args.fields.as_deref(), &table, &config.measure_field);
    let tree = build_tree(&table, &fields, &RowFilter::new(), config)?;
    let view = ViewState::new(tree, config.clone())?;

    println!("rows:    {}", table.rows.len());
    println!("fields:  {}", fields.join(" > "));
    println!("nodes:   {}", view.tree().len());
    println!("height:  {}", view.tree().height());
    println!();

    let options = extract_filter_options_excluding(&table.rows, &config.measure_field);
    println!("filter options:");
    for (field, values) in options.iter() {
        let shown: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        println!("  {field}: {}", shown.join(", "));
    }
    println!();

    println!("hierarchy:");
    print_subtree(view.tree(), view.tree().root(), 0);
    println!();
    println!("breadcrumb: {}", view.breadcrumbs().join(" / "));
    Ok(())
}

fn print_subtree(tree: &Hierarchy, id: NodeId, indent: usize) {
    println!("  {:indent$}{}", "", tree.label(id), indent = indent * 2);
    for &child in tree.children(id) {
        print_subtree(tree, child, indent + 1);
    }
}

// ─── Application state ───────────────────────────────────────────────────────

pub struct SunburstApp {
    pub data_path: Option<PathBuf>,
    /// Grouping fields from the command line, if any.
    pub explicit_fields: Option<Vec<String>>,
    pub fields: Vec<String>,
    pub config: SunburstConfig,
    pub table: Option<Table>,
    pub filter_options: FilterOptions,
    pub row_filter: RowFilter,
    pub view: Option<ViewState>,
    pub palette: Option<BranchPalette>,
    pub hovered: Option<NodeId>,
    pub error: Option<String>,
    pub loading: bool,
    pub load_rx: Option<mpsc::Receiver<Result<Table>>>,
    pub show_filters: bool,
    pub dark_mode: bool,
}

impl SunburstApp {
    pub fn new(args: &AppConfig, config: SunburstConfig) -> Self {
        Self {
            data_path: args.data_path.clone(),
            explicit_fields: args.fields.clone(),
            config,
            ..Default::default()
        }
    }
}

impl Default for SunburstApp {
    fn default() -> Self {
        Self {
            data_path: None,
            explicit_fields: None,
            fields: Vec::new(),
            config: SunburstConfig::default(),
            table: None,
            filter_options: FilterOptions::default(),
            row_filter: RowFilter::new(),
            view: None,
            palette: None,
            hovered: None,
            error: None,
            loading: false,
            load_rx: None,
            show_filters: true,
            dark_mode: false,
        }
    }
}

impl eframe::App for SunburstApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load();

        if self.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        if self.show_filters && !self.filter_options.is_empty() {
            egui::SidePanel::left("filters")
                .default_width(200.0)
                .show(ctx, |ui| {
                    self.draw_filter_panel(ui);
                });
        }

        let ctx_clone = ctx.clone();
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_content(ui, &ctx_clone);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sunburst::data::loader::parse_delimited;

    #[test]
    fn test_flags_override_config() {
        let args = AppConfig::parse_from([
            "sunburst",
            "data.csv",
            "--fields",
            "Region,City",
            "--layers",
            "2",
            "--root",
            "All",
        ]);
        assert_eq!(args.fields.as_deref(), Some(&["Region".to_string(), "City".to_string()][..]));
        let config = args.chart_config().unwrap();
        assert_eq!(config.max_visible_layers, 2);
        assert_eq!(config.root_label, "All");
        assert_eq!(config.measure_field, "Total");
    }

    #[test]
    fn test_resolve_fields_defaults_to_columns() {
        let table = parse_delimited("Region,Total,City\nA,1,X\n").unwrap();
        assert_eq!(resolve_fields(None, &table, "Total"), vec!["Region", "City"]);
        let explicit = vec!["City".to_string()];
        assert_eq!(resolve_fields(Some(&explicit), &table, "Total"), vec!["City"]);
    }

    #[test]
    fn test_build_tree_respects_filter() {
        let table = parse_delimited("Region,City,Total\nA,X,10\nA,Y,5\nB,Z,7\n").unwrap();
        let fields = vec!["Region".to_string(), "City".to_string()];
        let mut filter = RowFilter::new();
        filter.hide("Region", "B".into());
        let tree = build_tree(&table, &fields, &filter, &SunburstConfig::default()).unwrap();
        assert_eq!(tree.node(tree.root()).value, 15.0);
        assert!(tree.find_path(&["B"]).is_none());
    }
}
