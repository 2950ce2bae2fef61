use glam::Mat4;
use log::trace;

use crate::rendering::common::types::Bounds;
use crate::rendering::gpu::context::GpuContext;
use crate::rendering::gpu::{
    BufferHandle, DrawCall, GpuDevice, IndexType, TextureHandle, Topology, VertexArrayHandle, texture_units,
};
use crate::rendering::scene_graph::SceneGraph;

/// Textures bound while drawing a mesh. `None` skips the bind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Materials {
    pub diffuse: Option<TextureHandle>,
    pub normal: Option<TextureHandle>,
}

/// A drawable piece of a [`Model`]. The buffer handles are aliases, the owning [`Model`] frees them.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertex_array: VertexArrayHandle,
    pub vertex_buffers: Vec<BufferHandle>,
    pub index_buffer: Option<BufferHandle>,
    pub topology: Topology,
    /// Indices for indexed meshes, vertices otherwise.
    pub count: usize,
    pub index_type: Option<IndexType>,
    pub index_offset: usize,
    pub vertex_count: usize,
    pub materials: Materials,
    pub bounds: Option<Bounds>,
}

impl Mesh {
    fn draw(&self, device: &dyn GpuDevice, transform: Mat4) {
        if let Some(diffuse) = self.materials.diffuse {
            device.bind_texture(texture_units::DIFFUSE, diffuse);
        }

        if let Some(normal) = self.materials.normal {
            device.bind_texture(texture_units::NORMAL, normal);
        }

        device.draw(&DrawCall {
            vertex_array: self.vertex_array,
            topology: self.topology,
            count: self.count,
            index_type: self.index_type,
            index_offset: self.index_offset,
            transform,
        });
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModelStats {
    pub objects: usize,
    pub meshes: usize,
    pub vertices: usize,
    /// Sum of the indices (or vertices, when not indexed) every mesh draws.
    pub elements: usize,
    pub buffers: usize,
    pub textures: usize,
    pub nodes: usize,
    /// Union of the mesh bounds, node transforms are not applied.
    pub bounds: Option<Bounds>,
}

/// A loaded asset living on the GPU. Outer mesh index is the OBJ object or the glTF mesh, inner the
/// material group or primitive.
#[derive(Debug)]
pub struct Model {
    context: GpuContext,
    meshes: Vec<Vec<Mesh>>,
    buffers: Vec<BufferHandle>,
    textures: Vec<TextureHandle>,
    scene_graph: Option<SceneGraph>,
}

impl Model {
    pub fn new(
        context: GpuContext,
        meshes: Vec<Vec<Mesh>>,
        buffers: Vec<BufferHandle>,
        textures: Vec<TextureHandle>,
    ) -> Self {
        Self {
            context,
            meshes,
            buffers,
            textures,
            scene_graph: None,
        }
    }

    pub fn with_scene_graph(mut self, scene_graph: SceneGraph) -> Self {
        self.scene_graph = Some(scene_graph);
        self
    }

    pub fn meshes(&self) -> &[Vec<Mesh>] {
        &self.meshes
    }

    pub fn scene_graph(&self) -> Option<&SceneGraph> {
        self.scene_graph.as_ref()
    }

    pub fn stats(&self) -> ModelStats {
        let meshes = self.meshes.iter().flatten();
        ModelStats {
            objects: self.meshes.len(),
            meshes: meshes.clone().count(),
            vertices: meshes.clone().map(|mesh| mesh.vertex_count).sum(),
            elements: meshes.clone().map(|mesh| mesh.count).sum(),
            buffers: self.buffers.len(),
            textures: self.textures.len(),
            nodes: self.scene_graph.as_ref().map_or(0, |graph| graph.nodes().len()),
            bounds: meshes.filter_map(|mesh| mesh.bounds).reduce(Bounds::union),
        }
    }

    /// Draws every mesh with the same transform. Returns the number of draw calls issued.
    pub fn draw(&self, global: Mat4) -> usize {
        profiling::scope!("Model::draw");
        self.context.with_device(|device| {
            for mesh in self.meshes.iter().flatten() {
                mesh.draw(device, global);
            }
        });
        self.meshes.iter().map(Vec::len).sum()
    }

    /// Draws the meshes referenced by the nodes of the scene graph, each with its node's world
    /// transform. Nodes without a mesh only contribute their transform to their children.
    pub fn draw_graph(&mut self, global: Mat4) -> usize {
        profiling::scope!("Model::draw_graph");
        let Some(scene_graph) = self.scene_graph.as_mut() else {
            return 0;
        };

        scene_graph.resolve(global);
        let world = scene_graph.world_transforms();
        let meshes = &self.meshes;

        self.context.with_device(|device| {
            let mut draw_calls = 0;
            for (node, scene_node) in scene_graph.nodes().iter().enumerate() {
                let Some(primitives) = scene_node.mesh.and_then(|mesh| meshes.get(mesh)) else {
                    continue;
                };

                for mesh in primitives {
                    mesh.draw(device, world[node]);
                    draw_calls += 1;
                }
            }
            draw_calls
        })
    }

    /// [`Model::draw_graph`] for models that carry a scene graph, [`Model::draw`] otherwise.
    pub fn render(&mut self, global: Mat4) -> usize {
        if self.scene_graph.is_some() {
            self.draw_graph(global)
        } else {
            self.draw(global)
        }
    }
}

impl Drop for Model {
    fn drop(&mut self) {
        trace!(
            "Releasing {} buffers and {} textures",
            self.buffers.len(),
            self.textures.len()
        );

        self.context.with_device(|device| {
            for mesh in self.meshes.iter().flatten() {
                device.delete_vertex_array(mesh.vertex_array);
            }

            for &buffer in &self.buffers {
                device.delete_buffer(buffer);
            }

            for &texture in &self.textures {
                device.delete_texture(texture);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::{Mat4, Vec3};

    use crate::rendering::common::types::Bounds;
    use crate::rendering::gpu::context::GpuContext;
    use crate::rendering::gpu::headless::HeadlessDevice;
    use crate::rendering::gpu::{IndexType, Topology, texture_units};
    use crate::rendering::model::{Materials, Mesh, Model};
    use crate::rendering::scene_graph::{SceneGraph, SceneNode};

    fn mesh(context: &GpuContext, materials: Materials) -> Mesh {
        context.with_device(|gpu| {
            let vertex_array = gpu.create_vertex_array();
            let buffer = gpu.create_buffer(&[0u8; 42]);
            gpu.set_index_buffer(vertex_array, buffer);
            Mesh {
                vertex_array,
                vertex_buffers: vec![buffer],
                index_buffer: Some(buffer),
                topology: Topology::Triangles,
                count: 3,
                index_type: Some(IndexType::U16),
                index_offset: 36,
                vertex_count: 3,
                materials,
                bounds: None,
            }
        })
    }

    #[test_log::test]
    fn absent_materials_skip_texture_binds() {
        let device = Arc::new(HeadlessDevice::new());
        let context = GpuContext::new(device.clone());
        let texture = context.with_device(|gpu| gpu.create_texture(1, 1, &[0xff; 4]));

        let model = Model::new(
            context.clone(),
            vec![vec![
                mesh(&context, Materials::default()),
                mesh(
                    &context,
                    Materials {
                        diffuse: Some(texture),
                        normal: None,
                    },
                ),
            ]],
            Vec::new(),
            vec![texture],
        );

        assert_eq!(model.draw(Mat4::IDENTITY), 2);
        let stats = device.stats();
        assert_eq!(stats.texture_binds, 1);
        assert_eq!(stats.draw_calls, 2);
        assert_eq!(device.bound_texture(texture_units::DIFFUSE), Some(texture));
        assert_eq!(device.bound_texture(texture_units::NORMAL), None);
        assert_eq!(stats.context_violations, 0);
    }

    #[test_log::test]
    fn graph_draws_meshes_with_world_transforms() {
        let device = Arc::new(HeadlessDevice::new());
        let context = GpuContext::new(device.clone());
        let graph = SceneGraph::new(vec![
            SceneNode {
                children: vec![1],
                mesh: None,
                local: Mat4::from_translation(Vec3::X),
            },
            SceneNode {
                children: Vec::new(),
                mesh: Some(0),
                local: Mat4::from_translation(Vec3::Y),
            },
            // references a mesh that does not exist
            SceneNode {
                children: Vec::new(),
                mesh: Some(4),
                local: Mat4::IDENTITY,
            },
        ]);
        let mut model = Model::new(
            context.clone(),
            vec![vec![mesh(&context, Materials::default())]],
            Vec::new(),
            Vec::new(),
        )
        .with_scene_graph(graph);

        assert_eq!(model.render(Mat4::from_translation(Vec3::Z)), 1);
        let calls = device.take_draw_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].transform.transform_point3(Vec3::ZERO), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test_log::test]
    fn stats_merge_mesh_bounds() {
        let context = GpuContext::new(Arc::new(HeadlessDevice::new()));
        let mut first = mesh(&context, Materials::default());
        first.bounds = Some(Bounds {
            min: Vec3::NEG_ONE,
            max: Vec3::ZERO,
        });
        let mut second = mesh(&context, Materials::default());
        second.bounds = Some(Bounds {
            min: Vec3::ZERO,
            max: Vec3::new(2.0, 1.0, 1.0),
        });
        let unbounded = mesh(&context, Materials::default());

        let model = Model::new(context.clone(), vec![vec![first, unbounded], vec![second]], Vec::new(), Vec::new());
        let stats = model.stats();
        assert_eq!(stats.meshes, 3);
        assert_eq!(stats.elements, 9);
        assert_eq!(
            stats.bounds,
            Some(Bounds {
                min: Vec3::NEG_ONE,
                max: Vec3::new(2.0, 1.0, 1.0),
            })
        );
    }

    #[test_log::test]
    fn drop_releases_owned_resources() {
        let device = Arc::new(HeadlessDevice::new());
        let context = GpuContext::new(device.clone());
        let texture = context.with_device(|gpu| gpu.create_texture(1, 1, &[0; 4]));
        let first = mesh(&context, Materials::default());
        let second = mesh(&context, Materials::default());
        let buffers = [first.vertex_buffers.clone(), second.vertex_buffers.clone()].concat();

        let model = Model::new(context.clone(), vec![vec![first], vec![second]], buffers, vec![texture]);
        assert_eq!(device.stats().buffers, 2);
        drop(model);

        let stats = device.stats();
        assert_eq!(stats.buffers, 0);
        assert_eq!(stats.textures, 0);
        assert_eq!(stats.vertex_arrays, 0);
        assert_eq!(stats.context_violations, 0);
    }
}
