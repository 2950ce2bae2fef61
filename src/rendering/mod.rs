pub mod common;
pub mod gpu;
pub mod importer;
pub mod loader;
pub mod model;
pub mod scene_graph;
