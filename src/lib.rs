//! Loads glTF and WaveFront OBJ scenes through the parsers of `umbra-files`, turns them into GPU
//! resources behind the [`rendering::gpu::GpuDevice`] collaborator and draws them, resolving glTF
//! node hierarchies through [`rendering::scene_graph::SceneGraph`].
pub mod io;
pub mod rendering;
pub mod settings;
pub mod util;
