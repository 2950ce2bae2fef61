use std::collections::HashMap;

use glam::{Vec2, Vec3};
use itertools::Itertools;
use umbra_files::obj::types::{FaceCorner, ObjFile, ObjGroup};

use crate::rendering::common::types::{ImportedObject, IndexedMesh, MeshGroup, Vertex};

/// Below this UV area a triangle does not span a usable tangent frame.
const DEGENERATE_UV_EPSILON: f32 = 1e-12;

fn cantor(a: u128, b: u128) -> u128 {
    (a + b) * (a + b + 1) / 2 + b
}

/// Unique key of a face corner. Absent texcoords or normals map to 0, present ones to index + 1.
pub fn corner_key(corner: &FaceCorner) -> u128 {
    let texcoord = corner.texcoord.map_or(0, |index| index as u128 + 1);
    let normal = corner.normal.map_or(0, |index| index as u128 + 1);
    cantor(cantor(corner.position as u128, texcoord), normal)
}

pub struct ObjImporter {}

impl ObjImporter {
    pub fn import(file: &ObjFile) -> Vec<ImportedObject> {
        file.objects
            .iter()
            .map(|object| ImportedObject {
                name: object.name.clone(),
                groups: object
                    .groups
                    .iter()
                    .map(|group| MeshGroup {
                        material: group.material.clone(),
                        mesh: Self::create_mesh(file, group),
                    })
                    .collect_vec(),
            })
            .collect_vec()
    }

    /// Deduplicates the corners of one group into an indexed mesh and derives tangent frames.
    pub fn create_mesh(file: &ObjFile, group: &ObjGroup) -> IndexedMesh {
        let mut mesh = IndexedMesh::default();
        let mut known = HashMap::<u128, u32>::with_capacity(group.triangles.len() * 3);
        let mut tangents = Vec::<Vec3>::new();
        let mut bitangents = Vec::<Vec3>::new();

        for triangle in &group.triangles {
            let positions = triangle.map(|corner| Vec3::from_array(file.positions[corner.position as usize]));
            let face_normal = (positions[1] - positions[0])
                .cross(positions[2] - positions[0])
                .normalize_or_zero();

            let mut emitted = [0u32; 3];
            for (slot, corner) in triangle.iter().enumerate() {
                let index = *known.entry(corner_key(corner)).or_insert_with(|| {
                    mesh.vertices.push(Vertex {
                        position: positions[slot],
                        texcoord: corner
                            .texcoord
                            .map_or(Vec2::ZERO, |index| Vec2::from_array(file.texcoords[index as usize])),
                        normal: corner
                            .normal
                            .map_or(face_normal, |index| Vec3::from_array(file.normals[index as usize])),
                        ..Default::default()
                    });
                    tangents.push(Vec3::ZERO);
                    bitangents.push(Vec3::ZERO);
                    (mesh.vertices.len() - 1) as u32
                });
                emitted[slot] = index;
            }
            mesh.indices.extend_from_slice(&emitted);

            let [a, b, c] = emitted.map(|index| mesh.vertices[index as usize]);
            if let Some((tangent, bitangent)) = Self::triangle_tangents(&a, &b, &c) {
                for index in emitted {
                    tangents[index as usize] += tangent;
                    bitangents[index as usize] += bitangent;
                }
            }
        }

        for ((vertex, tangent), bitangent) in mesh.vertices.iter_mut().zip(tangents).zip(bitangents) {
            Self::orthonormalize(vertex, tangent, bitangent);
        }
        mesh
    }

    /// Solves the edge/UV system of one triangle. `None` when its UVs span no area.
    fn triangle_tangents(a: &Vertex, b: &Vertex, c: &Vertex) -> Option<(Vec3, Vec3)> {
        let edge_1 = b.position - a.position;
        let edge_2 = c.position - a.position;
        let delta_uv_1 = b.texcoord - a.texcoord;
        let delta_uv_2 = c.texcoord - a.texcoord;

        let determinant = delta_uv_1.x * delta_uv_2.y - delta_uv_2.x * delta_uv_1.y;
        if determinant.abs() < DEGENERATE_UV_EPSILON {
            return None;
        }

        let r = 1.0 / determinant;
        let tangent = (edge_1 * delta_uv_2.y - edge_2 * delta_uv_1.y) * r;
        let bitangent = (edge_2 * delta_uv_1.x - edge_1 * delta_uv_2.x) * r;
        Some((tangent, bitangent))
    }

    /// Gram-Schmidt against the normal, keeping the handedness of the accumulated bitangent.
    fn orthonormalize(vertex: &mut Vertex, tangent: Vec3, bitangent: Vec3) {
        let normal = vertex.normal.normalize_or_zero();
        let projected = tangent - normal * normal.dot(tangent);
        let tangent = if projected.length_squared() > DEGENERATE_UV_EPSILON {
            projected.normalize()
        } else {
            normal.any_orthonormal_vector()
        };

        let handedness = if normal.cross(tangent).dot(bitangent) < 0.0 { -1.0 } else { 1.0 };
        vertex.tangent = tangent;
        vertex.bitangent = normal.cross(tangent) * handedness;
    }
}
