/// This module handles converting the types from umbra-files into an intermediate representation,
/// that can then be uploaded through the GPU collaborator. The importers never touch the GPU
/// themselves, so they stay testable without a context and can run on any loader thread.
pub mod gltf_importer;
pub mod obj_importer;
