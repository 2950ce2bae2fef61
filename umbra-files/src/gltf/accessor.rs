use crate::ParserError;
use crate::common::reader::Parseable;
use crate::gltf::types::{Accessor, AccessorType, ComponentType, GltfAsset};

/// The bytes an accessor reads from, already narrowed to its buffer view and offset.
struct AccessorData<'a> {
    bytes: &'a [u8],
    stride: usize,
}

impl GltfAsset {
    fn accessor(&self, accessor: usize) -> Result<&Accessor, ParserError> {
        self.accessors.get(accessor).ok_or(ParserError::DanglingReference {
            kind: "accessor",
            index: accessor,
            len: self.accessors.len(),
        })
    }

    /// `None` for accessors without a buffer view, which read as zeros.
    fn accessor_data(&self, index: usize) -> Result<Option<AccessorData<'_>>, ParserError> {
        let accessor = self.accessor(index)?;
        let Some(view_index) = accessor.buffer_view else {
            return Ok(None);
        };

        let view = self.buffer_views.get(view_index).ok_or(ParserError::DanglingReference {
            kind: "bufferView",
            index: view_index,
            len: self.buffer_views.len(),
        })?;
        let buffer = self.buffers.get(view.buffer).ok_or(ParserError::DanglingReference {
            kind: "buffer",
            index: view.buffer,
            len: self.buffers.len(),
        })?;

        let view_bytes = view
            .byte_offset
            .checked_add(view.byte_length)
            .and_then(|end| buffer.data.get(view.byte_offset..end))
            .ok_or(ParserError::BufferViewOutOfBounds { buffer_view: view_index })?;
        let bytes = view_bytes
            .get(accessor.byte_offset..)
            .ok_or(ParserError::AccessorOutOfBounds { accessor: index })?;

        Ok(Some(AccessorData {
            bytes,
            stride: view.byte_stride.unwrap_or(accessor.element_size()),
        }))
    }

    fn read_elements<T: Parseable<T> + Copy + Default>(
        &self,
        index: usize,
        ty: AccessorType,
        component_type: ComponentType,
    ) -> Result<Vec<T>, ParserError> {
        let accessor = self.accessor(index)?;
        if accessor.ty != ty || accessor.component_type != component_type {
            return Err(ParserError::FormatError {
                reason: "Accessor has a different layout than requested",
            });
        }

        let Some(data) = self.accessor_data(index)? else {
            return Ok(vec![T::default(); accessor.count]);
        };

        let element_size = accessor.element_size();
        (0..accessor.count)
            .map(|i| {
                let start = i * data.stride;
                let mut element = data
                    .bytes
                    .get(start..start + element_size)
                    .ok_or(ParserError::AccessorOutOfBounds { accessor: index })?;
                T::parse(&mut element)
            })
            .collect()
    }

    /// Fails unless every element of the accessor lies inside the loaded buffer bytes. Accessors
    /// without a buffer view always pass.
    pub fn ensure_loaded(&self, index: usize) -> Result<(), ParserError> {
        let accessor = self.accessor(index)?;
        let Some(data) = self.accessor_data(index)? else {
            return Ok(());
        };
        if accessor.count == 0 {
            return Ok(());
        }

        let end = data
            .stride
            .checked_mul(accessor.count - 1)
            .and_then(|span| span.checked_add(accessor.element_size()));
        if end.is_none_or(|end| end > data.bytes.len()) {
            return Err(ParserError::AccessorOutOfBounds { accessor: index });
        }
        Ok(())
    }

    pub fn read_vec3_f32(&self, accessor: usize) -> Result<Vec<[f32; 3]>, ParserError> {
        self.read_elements(accessor, AccessorType::Vec3, ComponentType::Float)
    }

    /// Index data widened to `u32`, whatever unsigned component type it is stored as.
    pub fn read_indices(&self, accessor: usize) -> Result<Vec<u32>, ParserError> {
        let component_type = self.accessor(accessor)?.component_type;
        match component_type {
            ComponentType::UnsignedByte => Ok(self
                .read_elements::<u8>(accessor, AccessorType::Scalar, component_type)?
                .into_iter()
                .map(u32::from)
                .collect()),
            ComponentType::UnsignedShort => Ok(self
                .read_elements::<u16>(accessor, AccessorType::Scalar, component_type)?
                .into_iter()
                .map(u32::from)
                .collect()),
            ComponentType::UnsignedInt => self.read_elements::<u32>(accessor, AccessorType::Scalar, component_type),
            _ => Err(ParserError::FormatError {
                reason: "Index accessors have to use an unsigned component type",
            }),
        }
    }
}
