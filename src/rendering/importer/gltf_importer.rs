use glam::{Mat4, Quat, Vec3, Vec4};
use itertools::Itertools;
use log::warn;
use umbra_files::gltf::types::{
    Accessor, AccessorType, ComponentType, GltfAsset, Node, Primitive, PrimitiveMode,
};

use crate::rendering::common::types::Bounds;
use crate::rendering::gpu::{ComponentFormat, IndexType, Topology, VertexAttribute, locations};
use crate::rendering::scene_graph::SceneNode;

/// A vertex attribute reading from the glTF buffer `buffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    pub buffer: usize,
    pub attribute: VertexAttribute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBinding {
    pub buffer: usize,
    pub index_type: IndexType,
    /// Byte offset of the first index inside the buffer.
    pub offset: usize,
}

/// How one primitive is drawn straight out of the uploaded glTF buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveLayout {
    pub attributes: Vec<AttributeBinding>,
    pub indices: Option<IndexBinding>,
    pub vertex_count: usize,
    /// Indices for indexed primitives, vertices otherwise.
    pub draw_count: usize,
    pub topology: Topology,
    pub material: Option<usize>,
    /// `None` unless the positions are `VEC3` floats.
    pub bounds: Option<Bounds>,
}

/// Images backing the textures of one material, `None` where the material has no such texture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialImages {
    pub diffuse: Option<usize>,
    pub normal: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct GltfImport {
    /// Outer index is the glTF mesh index.
    pub meshes: Vec<Vec<PrimitiveLayout>>,
    pub materials: Vec<MaterialImages>,
    pub nodes: Vec<SceneNode>,
}

pub struct GltfImporter {}

impl GltfImporter {
    /// Expects a validated asset, so every reference is in bounds. Primitives reading past the
    /// loaded buffer bytes or indexing past their vertices are skipped.
    pub fn import(asset: &GltfAsset) -> GltfImport {
        GltfImport {
            meshes: asset
                .meshes
                .iter()
                .map(|mesh| {
                    mesh.primitives
                        .iter()
                        .filter_map(|primitive| Self::create_layout(asset, primitive))
                        .collect_vec()
                })
                .collect_vec(),
            materials: asset
                .materials
                .iter()
                .map(|material| MaterialImages {
                    diffuse: material
                        .pbr_metallic_roughness
                        .base_color_texture
                        .and_then(|info| asset.textures[info.index].source),
                    normal: material
                        .normal_texture
                        .and_then(|info| asset.textures[info.index].source),
                })
                .collect_vec(),
            nodes: asset.nodes.iter().map(Self::create_scene_node).collect_vec(),
        }
    }

    pub fn create_scene_node(node: &Node) -> SceneNode {
        let translation = Mat4::from_translation(Vec3::from_array(node.translation));
        // a degenerate rotation would spread NaN into every descendant
        let rotation = Vec4::from_array(node.rotation)
            .try_normalize()
            .map_or(Quat::IDENTITY, Quat::from_vec4);
        let rotation = Mat4::from_quat(rotation);
        let scale = Mat4::from_scale(Vec3::from_array(node.scale));
        let matrix = Mat4::from_cols_array(&node.matrix);

        SceneNode {
            children: node.children.clone(),
            mesh: node.mesh,
            local: translation * rotation * scale * matrix,
        }
    }

    pub fn topology(mode: PrimitiveMode) -> Topology {
        match mode {
            PrimitiveMode::Points => Topology::Points,
            PrimitiveMode::Lines => Topology::Lines,
            PrimitiveMode::LineLoop => Topology::LineLoop,
            PrimitiveMode::LineStrip => Topology::LineStrip,
            PrimitiveMode::Triangles => Topology::Triangles,
            PrimitiveMode::TriangleStrip => Topology::TriangleStrip,
            PrimitiveMode::TriangleFan => Topology::TriangleFan,
        }
    }

    fn format(component_type: ComponentType) -> ComponentFormat {
        match component_type {
            ComponentType::Byte => ComponentFormat::I8,
            ComponentType::UnsignedByte => ComponentFormat::U8,
            ComponentType::Short => ComponentFormat::I16,
            ComponentType::UnsignedShort => ComponentFormat::U16,
            ComponentType::UnsignedInt => ComponentFormat::U32,
            ComponentType::Float => ComponentFormat::F32,
        }
    }

    /// `None` if the accessor has no buffer view to read from.
    fn bind_attribute(asset: &GltfAsset, accessor: &Accessor, location: u32) -> Option<AttributeBinding> {
        let view = &asset.buffer_views[accessor.buffer_view?];
        Some(AttributeBinding {
            buffer: view.buffer,
            attribute: VertexAttribute {
                location,
                components: accessor.ty.component_count() as u32,
                format: Self::format(accessor.component_type),
                normalized: accessor.normalized,
                stride: view.byte_stride.unwrap_or(accessor.element_size()),
                offset: view.byte_offset + accessor.byte_offset,
            },
        })
    }

    fn bind_indices(asset: &GltfAsset, accessor: &Accessor) -> Option<IndexBinding> {
        let index_type = match (accessor.ty, accessor.component_type) {
            (AccessorType::Scalar, ComponentType::UnsignedByte) => IndexType::U8,
            (AccessorType::Scalar, ComponentType::UnsignedShort) => IndexType::U16,
            (AccessorType::Scalar, ComponentType::UnsignedInt) => IndexType::U32,
            _ => return None,
        };
        let view = &asset.buffer_views[accessor.buffer_view?];
        Some(IndexBinding {
            buffer: view.buffer,
            index_type,
            offset: view.byte_offset + accessor.byte_offset,
        })
    }

    /// The indices must name existing vertices, the GPU reads whatever lies past them otherwise.
    fn indices_in_range(asset: &GltfAsset, accessor: usize, vertex_count: usize) -> bool {
        match asset.read_indices(accessor) {
            Ok(indices) => match indices.iter().find(|&&index| index as usize >= vertex_count) {
                Some(index) => {
                    warn!("Skipping a primitive with index {} past its {} vertices", index, vertex_count);
                    false
                }
                None => true,
            },
            Err(err) => {
                warn!("Skipping a primitive with unreadable indices: {}", err);
                false
            }
        }
    }

    fn create_layout(asset: &GltfAsset, primitive: &Primitive) -> Option<PrimitiveLayout> {
        let Some(position_index) = primitive.attributes.position else {
            warn!("Skipping a primitive without POSITION");
            return None;
        };
        let position = &asset.accessors[position_index];

        let used = [
            (Some(position_index), locations::POSITION),
            (primitive.attributes.texcoord_0, locations::TEXCOORD),
            (primitive.attributes.normal, locations::NORMAL),
            (primitive.attributes.tangent, locations::TANGENT),
        ];
        for accessor in used.iter().filter_map(|(accessor, _)| *accessor).chain(primitive.indices) {
            if let Err(err) = asset.ensure_loaded(accessor) {
                warn!("Skipping a primitive reading past its loaded buffer data: {}", err);
                return None;
            }
        }

        let attributes = used
            .into_iter()
            .filter_map(|(accessor, location)| Self::bind_attribute(asset, &asset.accessors[accessor?], location))
            .collect_vec();

        if attributes.first().is_none_or(|binding| binding.attribute.location != locations::POSITION) {
            warn!("Skipping a primitive whose positions have no buffer view");
            return None;
        }

        let (indices, draw_count) = match primitive.indices {
            Some(index) => {
                let accessor = &asset.accessors[index];
                let Some(binding) = Self::bind_indices(asset, accessor) else {
                    warn!("Skipping a primitive with an unusable index accessor");
                    return None;
                };
                if !Self::indices_in_range(asset, index, position.count) {
                    return None;
                }
                (Some(binding), accessor.count)
            }
            None => (None, position.count),
        };

        let bounds = asset
            .read_vec3_f32(position_index)
            .ok()
            .and_then(|positions| Bounds::from_points(positions.into_iter().map(Vec3::from_array)));

        Some(PrimitiveLayout {
            attributes,
            indices,
            vertex_count: position.count,
            draw_count,
            topology: Self::topology(primitive.mode),
            material: primitive.material,
            bounds,
        })
    }
}
