/// Contrasting to the importers, that convert already parsed files into our rendering IR,
/// Loaders are a lot more high level. They read the files, call the parsers, pipe the results into
/// importers and upload what comes out through the GPU context.
use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;

use crate::io::common::loader::RawAssetLoader;
use crate::rendering::gpu::context::GpuContext;
use crate::rendering::loader::gltf_loader::GltfLoader;
use crate::rendering::loader::obj_loader::ObjLoader;
use crate::rendering::model::Model;
use crate::util::thread_pool::ThreadPool;

pub mod gltf_loader;
pub mod obj_loader;
pub mod texture_loader;

/// Picks the loader by file extension.
pub fn load_model(
    pool: &ThreadPool,
    loader: &Arc<dyn RawAssetLoader>,
    context: &GpuContext,
    path: &Path,
) -> Result<Model, anyhow::Error> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("gltf") => GltfLoader::load(pool, loader, context, path),
        Some("obj") => ObjLoader::load(loader.as_ref(), context, path),
        _ => Err(anyhow!("Unsupported model format {}", path.display())),
    }
}
