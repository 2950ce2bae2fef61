use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{error, warn};
use umbra_files::bmp::reader::BmpReader;

use crate::io::common::loader::RawAssetLoader;
use crate::rendering::gpu::TextureHandle;
use crate::rendering::gpu::context::GpuContext;

pub struct TextureLoader {}

impl TextureLoader {
    /// Decodes and uploads one texture. Failures degrade to "no texture", they never fail the model.
    pub fn load(loader: &dyn RawAssetLoader, context: &GpuContext, path: &Path) -> Option<TextureHandle> {
        let is_bmp = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("bmp"));
        if !is_bmp {
            warn!("Unsupported texture format {}", path.display());
            return None;
        }

        let data = match loader.load_raw_owned(path) {
            Ok(data) => data,
            Err(err) => {
                warn!("Could not load texture {}: {}", path.display(), err);
                return None;
            }
        };

        let image = match BmpReader::parse(&data) {
            Ok(image) => image,
            Err(err) => {
                error!("Parsing of the BMP {} failed: {}", path.display(), err);
                return None;
            }
        };

        Some(context.with_device(|device| device.create_texture(image.width, image.height, &image.pixels)))
    }

    /// Loads every present path on its own thread and joins them before returning. The result lines
    /// up with `paths`.
    pub fn load_all(
        loader: &dyn RawAssetLoader,
        context: &GpuContext,
        paths: &[Option<PathBuf>],
    ) -> Vec<Option<TextureHandle>> {
        profiling::scope!("TextureLoader::load_all");
        std::thread::scope(|scope| {
            let handles = paths
                .iter()
                .map(|path| {
                    path.as_deref()
                        .map(|path| scope.spawn(move || Self::load(loader, context, path)))
                })
                .collect_vec();

            handles
                .into_iter()
                .map(|handle| {
                    handle.and_then(|handle| {
                        handle.join().unwrap_or_else(|_| {
                            error!("A texture loading thread panicked");
                            None
                        })
                    })
                })
                .collect_vec()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::io::memory::MemoryLoader;
    use crate::rendering::gpu::context::GpuContext;
    use crate::rendering::gpu::headless::HeadlessDevice;
    use crate::rendering::loader::texture_loader::TextureLoader;

    /// 2x1, 24 bit, bottom-up.
    fn bmp() -> Vec<u8> {
        let mut data = vec![0u8; 54];
        data[0..2].copy_from_slice(b"BM");
        data[10..14].copy_from_slice(&54u32.to_le_bytes());
        data[14..18].copy_from_slice(&40u32.to_le_bytes());
        data[18..22].copy_from_slice(&2i32.to_le_bytes());
        data[22..26].copy_from_slice(&1i32.to_le_bytes());
        data[26..28].copy_from_slice(&1u16.to_le_bytes());
        data[28..30].copy_from_slice(&24u16.to_le_bytes());
        data.extend_from_slice(&[0, 0, 255, 0, 255, 0, 0, 0]);
        data
    }

    #[test_log::test]
    fn failures_degrade_to_no_texture() {
        let device = Arc::new(HeadlessDevice::new());
        let context = GpuContext::new(device.clone());
        let loader = MemoryLoader::new()
            .with_file("good.bmp", bmp())
            .with_file("broken.bmp", b"PK".to_vec())
            .with_file("photo.png", vec![0u8; 8]);

        let paths = [
            Some(PathBuf::from("good.bmp")),
            Some(PathBuf::from("broken.bmp")),
            Some(PathBuf::from("photo.png")),
            Some(PathBuf::from("missing.bmp")),
            None,
        ];
        let textures = TextureLoader::load_all(&loader, &context, &paths);

        assert_eq!(textures.len(), 5);
        let good = textures[0].expect("the BMP decodes");
        assert_eq!(device.texture_size(good), Some((2, 1)));
        assert!(textures[1..].iter().all(Option::is_none));
        assert_eq!(device.stats().textures, 1);
        assert_eq!(device.stats().context_violations, 0);
    }
}
