use std::fmt::{Debug, Formatter};

use glam::{Vec2, Vec3};

use crate::rendering::gpu::{ComponentFormat, VertexAttribute, locations};

/// Axis aligned box in mesh space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// `None` for an empty set of points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        points.into_iter().fold(None, |bounds: Option<Bounds>, point| {
            Some(match bounds {
                Some(bounds) => Bounds {
                    min: bounds.min.min(point),
                    max: bounds.max.max(point),
                },
                None => Bounds { min: point, max: point },
            })
        })
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Interleaved vertex of the OBJ path.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub texcoord: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub bitangent: Vec3,
}

impl Vertex {
    pub const FLOATS: usize = 14;
    pub const STRIDE: usize = Self::FLOATS * size_of::<f32>();

    pub fn attributes() -> [VertexAttribute; 5] {
        let attribute = |location, components: u32, offset_floats: usize| VertexAttribute {
            location,
            components,
            format: ComponentFormat::F32,
            normalized: false,
            stride: Self::STRIDE,
            offset: offset_floats * size_of::<f32>(),
        };

        [
            attribute(locations::POSITION, 3, 0),
            attribute(locations::TEXCOORD, 2, 3),
            attribute(locations::NORMAL, 3, 5),
            attribute(locations::TANGENT, 3, 8),
            attribute(locations::BITANGENT, 3, 11),
        ]
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        let floats: [f32; Self::FLOATS] = [
            self.position.x,
            self.position.y,
            self.position.z,
            self.texcoord.x,
            self.texcoord.y,
            self.normal.x,
            self.normal.y,
            self.normal.z,
            self.tangent.x,
            self.tangent.y,
            self.tangent.z,
            self.bitangent.x,
            self.bitangent.y,
            self.bitangent.z,
        ];
        for value in floats {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

#[derive(Clone, Default)]
pub struct IndexedMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Debug for IndexedMesh {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ vertices: [{}], ", self.vertices.len())?;
        write!(f, "indices: [{}] }}", self.indices.len())
    }
}

impl IndexedMesh {
    pub fn vertex_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.vertices.len() * Vertex::STRIDE);
        for vertex in &self.vertices {
            vertex.write_to(&mut bytes);
        }
        bytes
    }

    pub fn index_bytes(&self) -> Vec<u8> {
        self.indices.iter().flat_map(|index| index.to_le_bytes()).collect()
    }
}

/// The triangles of one `usemtl` group, ready for upload.
#[derive(Debug, Clone)]
pub struct MeshGroup {
    pub material: Option<String>,
    pub mesh: IndexedMesh,
}

#[derive(Debug, Clone)]
pub struct ImportedObject {
    pub name: String,
    pub groups: Vec<MeshGroup>,
}
