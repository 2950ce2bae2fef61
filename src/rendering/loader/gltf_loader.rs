use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use itertools::Itertools;
use log::{debug, trace, warn};
use umbra_files::gltf::reader::{GltfSections, Section, SectionData};
use umbra_files::gltf::types::{Buffer, GltfAsset};
use umbra_files::json::JsonDocument;

use crate::io::common::loader::{RawAssetLoader, sibling_path};
use crate::rendering::gpu::{BufferHandle, TextureHandle};
use crate::rendering::gpu::context::GpuContext;
use crate::rendering::importer::gltf_importer::{GltfImport, GltfImporter, PrimitiveLayout};
use crate::rendering::loader::texture_loader::TextureLoader;
use crate::rendering::model::{Materials, Mesh, Model};
use crate::rendering::scene_graph::SceneGraph;
use crate::util::thread_pool::ThreadPool;

type SectionResult = (Section, Result<SectionData, anyhow::Error>);

pub struct GltfLoader {}

impl GltfLoader {
    pub fn load(
        pool: &ThreadPool,
        loader: &Arc<dyn RawAssetLoader>,
        context: &GpuContext,
        path: &Path,
    ) -> Result<Model, anyhow::Error> {
        profiling::scope!("GltfLoader::load");
        let asset = Self::load_asset(pool, loader, path)?;
        let import = GltfImporter::import(&asset);

        let image_paths = asset
            .images
            .iter()
            .map(|image| image.uri.as_deref().map(|uri| sibling_path(path, uri)))
            .collect_vec();
        let images = TextureLoader::load_all(loader.as_ref(), context, &image_paths);

        let buffers = context.with_device(|device| {
            asset
                .buffers
                .iter()
                .map(|buffer| device.create_buffer(&buffer.data))
                .collect_vec()
        });

        let meshes = Self::create_meshes(context, &import, &buffers, &images);
        debug!(
            "{}: {} meshes, {} nodes, {} buffers, {} images",
            path.display(),
            meshes.len(),
            import.nodes.len(),
            buffers.len(),
            images.iter().flatten().count()
        );

        let scene_graph = SceneGraph::new(import.nodes);
        let textures = images.into_iter().flatten().collect_vec();
        Ok(Model::new(context.clone(), meshes, buffers, textures).with_scene_graph(scene_graph))
    }

    /// Reads and decodes the document, one pool task per section, then validates every cross
    /// reference. Buffer files are read by the task decoding the buffers.
    pub fn load_asset(
        pool: &ThreadPool,
        loader: &Arc<dyn RawAssetLoader>,
        path: &Path,
    ) -> Result<GltfAsset, anyhow::Error> {
        let data = loader
            .load_raw_owned(path)
            .with_context(|| format!("Reading {}", path.display()))?;
        let document = Arc::new(JsonDocument::from_bytes(data).with_context(|| format!("Parsing {}", path.display()))?);

        let sections = GltfSections::collect(document.root())?;
        let mut asset = GltfAsset {
            version: sections.version()?,
            default_scene: sections.default_scene()?,
            ..Default::default()
        };

        let (sender, receiver) = crossbeam::channel::unbounded::<SectionResult>();
        for section in Section::ALL {
            let document = document.clone();
            let loader = loader.clone();
            let sender = sender.clone();
            let path = path.to_path_buf();
            pool.submit(move || {
                let result = Self::decode_section(&document, loader.as_ref(), &path, section);
                // the receiver only goes away when the load already failed
                let _ = sender.send((section, result));
            });
        }
        drop(sender);
        pool.wait();

        let mut decoded = 0;
        for (section, result) in receiver.try_iter() {
            result
                .with_context(|| format!("Decoding {} of {}", section.key(), path.display()))?
                .store(&mut asset);
            decoded += 1;
        }

        if decoded != Section::ALL.len() {
            return Err(anyhow!(
                "Only {} of {} sections of {} were decoded",
                decoded,
                Section::ALL.len(),
                path.display()
            ));
        }

        asset
            .validate()
            .with_context(|| format!("Validating {}", path.display()))?;
        Ok(asset)
    }

    fn decode_section(
        document: &JsonDocument,
        loader: &dyn RawAssetLoader,
        path: &Path,
        section: Section,
    ) -> Result<SectionData, anyhow::Error> {
        trace!("Decoding {} on {:?}", section.key(), std::thread::current().name());
        let data = GltfSections::collect(document.root())?.decode(section)?;
        match data {
            SectionData::Buffers(mut buffers) => {
                for buffer in buffers.iter_mut() {
                    Self::load_buffer(loader, path, buffer)?;
                }
                Ok(SectionData::Buffers(buffers))
            }
            data => Ok(data),
        }
    }

    fn load_buffer(loader: &dyn RawAssetLoader, path: &Path, buffer: &mut Buffer) -> Result<(), anyhow::Error> {
        let Some(uri) = &buffer.uri else {
            return Ok(());
        };

        if uri.starts_with("data:") {
            warn!("Embedded buffers are not supported, treating {} bytes as empty", buffer.byte_length);
            return Ok(());
        }

        let buffer_path = sibling_path(path, uri);
        buffer.data = loader
            .load_raw_owned(&buffer_path)
            .with_context(|| format!("Reading buffer {}", buffer_path.display()))?;
        Ok(())
    }

    fn create_meshes(
        context: &GpuContext,
        import: &GltfImport,
        buffers: &[BufferHandle],
        images: &[Option<TextureHandle>],
    ) -> Vec<Vec<Mesh>> {
        let image = |index: Option<usize>| index.and_then(|index| images.get(index).copied().flatten());

        import
            .meshes
            .iter()
            .map(|primitives| {
                primitives
                    .iter()
                    .map(|layout| {
                        let materials = layout
                            .material
                            .and_then(|material| import.materials.get(material))
                            .map(|material| Materials {
                                diffuse: image(material.diffuse),
                                normal: image(material.normal),
                            })
                            .unwrap_or_default();
                        Self::create_mesh(context, layout, buffers, materials)
                    })
                    .collect_vec()
            })
            .collect_vec()
    }

    /// Binds the attributes straight to the shared buffers, nothing is copied.
    fn create_mesh(
        context: &GpuContext,
        layout: &PrimitiveLayout,
        buffers: &[BufferHandle],
        materials: Materials,
    ) -> Mesh {
        context.with_device(|device| {
            let vertex_array = device.create_vertex_array();
            let vertex_buffers = layout
                .attributes
                .iter()
                .map(|binding| {
                    let buffer = buffers[binding.buffer];
                    device.set_vertex_attribute(vertex_array, buffer, &binding.attribute);
                    buffer
                })
                .unique()
                .collect_vec();

            let index_buffer = layout.indices.map(|indices| {
                let buffer = buffers[indices.buffer];
                device.set_index_buffer(vertex_array, buffer);
                buffer
            });

            Mesh {
                vertex_array,
                vertex_buffers,
                index_buffer,
                topology: layout.topology,
                count: layout.draw_count,
                index_type: layout.indices.map(|indices| indices.index_type),
                index_offset: layout.indices.map_or(0, |indices| indices.offset),
                vertex_count: layout.vertex_count,
                materials,
                bounds: layout.bounds,
            }
        })
    }
}
