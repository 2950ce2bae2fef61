use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use itertools::Itertools;
use log::{debug, warn};
use umbra_files::common::hash::fnv1a_str;
use umbra_files::obj::mtl::MtlReader;
use umbra_files::obj::reader::ObjReader;
use umbra_files::obj::types::MtlFile;

use crate::io::common::loader::{RawAssetLoader, sibling_path};
use crate::rendering::common::types::{Bounds, IndexedMesh, Vertex};
use crate::rendering::gpu::context::GpuContext;
use crate::rendering::gpu::{BufferHandle, IndexType, TextureHandle, Topology};
use crate::rendering::importer::obj_importer::ObjImporter;
use crate::rendering::loader::texture_loader::TextureLoader;
use crate::rendering::model::{Materials, Mesh, Model};

pub struct ObjLoader {}

impl ObjLoader {
    pub fn load(loader: &dyn RawAssetLoader, context: &GpuContext, path: &Path) -> Result<Model, anyhow::Error> {
        profiling::scope!("ObjLoader::load");
        let data = loader
            .load_raw_owned(path)
            .with_context(|| format!("Reading {}", path.display()))?;
        let file = ObjReader::parse(&data).with_context(|| format!("Parsing {}", path.display()))?;
        debug!(
            "{}: {} positions, {} objects, {} triangles",
            path.display(),
            file.positions.len(),
            file.objects.len(),
            file.triangle_count()
        );

        let (materials, textures) = match &file.material_library {
            Some(library) => Self::load_materials(loader, context, path, library),
            None => (HashMap::new(), Vec::new()),
        };

        let objects = ObjImporter::import(&file);
        let mut buffers = Vec::new();
        let meshes = objects
            .iter()
            .map(|object| {
                object
                    .groups
                    .iter()
                    .map(|group| {
                        let materials = group
                            .material
                            .as_deref()
                            .and_then(|name| materials.get(&fnv1a_str(name)).copied())
                            .unwrap_or_default();
                        let (mesh, vertex_buffer, index_buffer) = Self::upload(context, &group.mesh, materials);
                        buffers.extend([vertex_buffer, index_buffer]);
                        mesh
                    })
                    .collect_vec()
            })
            .collect_vec();

        Ok(Model::new(context.clone(), meshes, buffers, textures))
    }

    /// Parses the MTL library next to `path` and loads the textures of every material in parallel.
    /// Materials are keyed by the hash of their name. A broken library only costs the textures.
    fn load_materials(
        loader: &dyn RawAssetLoader,
        context: &GpuContext,
        path: &Path,
        library: &str,
    ) -> (HashMap<u64, Materials>, Vec<TextureHandle>) {
        let library_path = sibling_path(path, library);
        let mtl = match loader
            .load_raw_owned(&library_path)
            .map_err(anyhow::Error::from)
            .and_then(|data| MtlReader::parse(&data).map_err(anyhow::Error::from))
        {
            Ok(mtl) => mtl,
            Err(err) => {
                warn!("Could not load material library {}: {}", library_path.display(), err);
                MtlFile::default()
            }
        };

        let paths = mtl
            .materials
            .iter()
            .flat_map(|material| [&material.diffuse_map, &material.normal_map])
            .map(|map| map.as_deref().map(|file_name| sibling_path(&library_path, file_name)))
            .collect_vec();
        let loaded = TextureLoader::load_all(loader, context, &paths);

        let materials = mtl
            .materials
            .iter()
            .zip(loaded.chunks_exact(2))
            .map(|(material, textures)| {
                (
                    fnv1a_str(&material.name),
                    Materials {
                        diffuse: textures[0],
                        normal: textures[1],
                    },
                )
            })
            .collect::<HashMap<_, _>>();

        (materials, loaded.into_iter().flatten().collect_vec())
    }

    fn upload(context: &GpuContext, mesh: &IndexedMesh, materials: Materials) -> (Mesh, BufferHandle, BufferHandle) {
        let vertex_bytes = mesh.vertex_bytes();
        let index_bytes = mesh.index_bytes();

        context.with_device(|device| {
            let vertex_array = device.create_vertex_array();
            let vertex_buffer = device.create_buffer(&vertex_bytes);
            for attribute in Vertex::attributes() {
                device.set_vertex_attribute(vertex_array, vertex_buffer, &attribute);
            }

            let index_buffer = device.create_buffer(&index_bytes);
            device.set_index_buffer(vertex_array, index_buffer);

            let mesh = Mesh {
                vertex_array,
                vertex_buffers: vec![vertex_buffer],
                index_buffer: Some(index_buffer),
                topology: Topology::Triangles,
                count: mesh.indices.len(),
                index_type: Some(IndexType::U32),
                index_offset: 0,
                vertex_count: mesh.vertices.len(),
                materials,
                bounds: Bounds::from_points(mesh.vertices.iter().map(|vertex| vertex.position)),
            };
            (mesh, vertex_buffer, index_buffer)
        })
    }
}
