use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use log::trace;

use crate::io::common::loader::RawAssetLoader;

/// Serves assets that were handed over as bytes, e.g. generated fixtures.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    files: DashMap<PathBuf, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), data.into());
    }

    pub fn with_file(self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }
}

impl RawAssetLoader for MemoryLoader {
    fn load_raw_owned(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        trace!("Looking up {}", path.display());
        self.files
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| std::io::Error::new(ErrorKind::NotFound, format!("{} is not known", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;
    use std::path::Path;

    use crate::io::common::loader::RawAssetLoader;
    use crate::io::memory::MemoryLoader;

    #[test]
    fn missing_files_are_not_found() -> Result<(), anyhow::Error> {
        let loader = MemoryLoader::new().with_file("a/b.bin", vec![1u8, 2, 3]);
        assert_eq!(loader.load_raw_owned(Path::new("a/b.bin"))?, vec![1, 2, 3]);

        let error = loader.load_raw_owned(Path::new("a/c.bin")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        Ok(())
    }
}
