//! Zoomable sunburst chart.
//!
//! Flat rows are grouped into a value-weighted tree ([`hierarchy`]), laid
//! out as concentric rings ([`render::partition`]) and driven by a drill-down
//! controller ([`view`]) that animates between focus nodes. The egui front
//! end in the binary only paints what [`view::ViewState`] reports.

pub mod config;
pub mod data;
pub mod error;
pub mod hierarchy;
pub mod render;
pub mod view;

pub use config::SunburstConfig;
pub use data::filter::{extract_filter_options, FilterOptions, RowFilter};
pub use data::{FieldValue, Row, Table};
pub use error::{Result, SunburstError};
pub use hierarchy::{build_hierarchy, GroupKey, Hierarchy, HierarchyBuilder, NodeId};
pub use view::{initialize_view, HitTarget, Transition, ViewState};
