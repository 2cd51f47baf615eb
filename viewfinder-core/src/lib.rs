//! Terrain candidate extraction, line-of-sight visibility, and road-proximity
//! scoring for the scenic-viewpoint finder.
//!
//! The engine is a pure, single-threaded computation: it consumes an
//! already-reprojected [`TerrainGrid`](terrain::TerrainGrid) and road network and
//! produces a ranked [`Vec<pipeline::ViewpointResult>`]. Raster/vector I/O,
//! dataset acquisition, and result rendering live outside this crate.

pub mod candidates;
pub mod pipeline;
pub mod roads;
pub mod scoring;
pub mod terrain;
pub mod visibility;

pub use pipeline::{run_pipeline, ViewpointResult};
