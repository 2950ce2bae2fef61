use crate::ParserError;
use crate::gltf::types::{GltfAsset, TextureInfo};

fn check(kind: &'static str, index: usize, len: usize) -> Result<(), ParserError> {
    if index >= len {
        return Err(ParserError::DanglingReference { kind, index, len });
    }
    Ok(())
}

fn check_optional(kind: &'static str, index: Option<usize>, len: usize) -> Result<(), ParserError> {
    index.map_or(Ok(()), |index| check(kind, index, len))
}

impl GltfAsset {
    /// Makes sure every cross reference resolves and every accessor and buffer view stays inside the
    /// memory it reads from. Buffer data is only checked when it has been loaded.
    pub fn validate(&self) -> Result<(), ParserError> {
        check_optional("scene", self.default_scene, self.scenes.len())?;
        for scene in &self.scenes {
            for &node in &scene.nodes {
                check("node", node, self.nodes.len())?;
            }
        }

        for node in &self.nodes {
            for &child in &node.children {
                check("node", child, self.nodes.len())?;
            }
            check_optional("mesh", node.mesh, self.meshes.len())?;
        }

        for mesh in &self.meshes {
            for primitive in &mesh.primitives {
                let attributes = &primitive.attributes;
                for accessor in [
                    attributes.position,
                    attributes.normal,
                    attributes.tangent,
                    attributes.texcoord_0,
                    attributes.texcoord_1,
                    attributes.color_0,
                    primitive.indices,
                ] {
                    check_optional("accessor", accessor, self.accessors.len())?;
                }
                check_optional("material", primitive.material, self.materials.len())?;
            }
        }

        for material in &self.materials {
            let infos = [
                material.pbr_metallic_roughness.base_color_texture,
                material.normal_texture,
            ];
            for info in infos.iter().flatten() {
                let TextureInfo { index, .. } = info;
                check("texture", *index, self.textures.len())?;
            }
        }

        for texture in &self.textures {
            check_optional("image", texture.source, self.images.len())?;
        }

        for buffer in &self.buffers {
            if !buffer.data.is_empty() && buffer.data.len() < buffer.byte_length {
                return Err(ParserError::FormatError {
                    reason: "Buffer file is shorter than its byteLength",
                });
            }
        }

        for (index, view) in self.buffer_views.iter().enumerate() {
            check("buffer", view.buffer, self.buffers.len())?;
            let buffer = &self.buffers[view.buffer];
            let end = view.byte_offset.checked_add(view.byte_length);
            if end.is_none_or(|end| end > buffer.byte_length) {
                return Err(ParserError::BufferViewOutOfBounds { buffer_view: index });
            }
        }

        for (index, accessor) in self.accessors.iter().enumerate() {
            let Some(view_index) = accessor.buffer_view else {
                continue;
            };
            check("bufferView", view_index, self.buffer_views.len())?;
            let view = &self.buffer_views[view_index];
            if accessor.count == 0 {
                continue;
            }

            let element_size = accessor.element_size();
            let stride = view.byte_stride.unwrap_or(element_size);
            let end = stride
                .checked_mul(accessor.count - 1)
                .and_then(|span| span.checked_add(accessor.byte_offset))
                .and_then(|span| span.checked_add(element_size));
            if end.is_none_or(|end| end > view.byte_length) {
                return Err(ParserError::AccessorOutOfBounds { accessor: index });
            }
        }

        Ok(())
    }
}
