use std::path::{Path, PathBuf};

/// Hands out the raw bytes of an asset. Implementations are shared between the loader threads.
pub trait RawAssetLoader: Send + Sync {
    /// Reads the whole file. In case of a caching implementation, this may need to clone the whole buffer!
    fn load_raw_owned(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Replaces the last segment of `path` with `file_name`, the way assets reference their neighbours
/// (MTL libraries, glTF buffers, textures).
pub fn sibling_path(path: &Path, file_name: &str) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}
