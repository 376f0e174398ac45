//! Geometry and animation primitives for the sunburst.
//!
//! Everything here is framework-free; the egui front end in `app` turns
//! these shapes into meshes.

pub mod animator;
pub mod arc;
pub mod color;
pub mod partition;

pub use arc::{ArcShape, LabelPlacement};
pub use color::{BranchPalette, Rgba};
pub use partition::{partition, ArcLayout};
