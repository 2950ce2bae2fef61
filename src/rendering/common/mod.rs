/// basic types (e.g. vertices, indexed meshes) to abstract away from both the asset format and the GPU.
pub mod types;
