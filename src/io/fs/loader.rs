use std::fs;
use std::path::{Path, PathBuf};

use log::trace;

use crate::io::common::loader::RawAssetLoader;

/// Loads assets from a directory on disk. Relative paths are resolved against `root`, absolute ones
/// are taken as they are.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl RawAssetLoader for FsLoader {
    fn load_raw_owned(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        let resolved = self.resolve(path);
        trace!("Reading {}", resolved.display());
        fs::read(resolved)
    }
}
