//! The graphics API as seen by the asset pipeline: opaque handles and a handful of synchronous calls.
//! Every call has to be made through [`context::GpuContext::with_device`], which serializes access to
//! the one graphics context and binds it to the calling thread.
use glam::Mat4;

pub mod context;
pub mod headless;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentFormat {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U8,
    U16,
    U32,
}

impl IndexType {
    pub fn size(&self) -> usize {
        match self {
            IndexType::U8 => 1,
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Where a vertex shader input reads from inside a bound buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    pub format: ComponentFormat,
    pub normalized: bool,
    pub stride: usize,
    pub offset: usize,
}

/// Shader input locations shared by the OBJ and glTF paths.
pub mod locations {
    pub const POSITION: u32 = 0;
    pub const TEXCOORD: u32 = 1;
    pub const NORMAL: u32 = 2;
    pub const TANGENT: u32 = 3;
    pub const BITANGENT: u32 = 4;
}

/// Texture units the material textures are bound to.
pub mod texture_units {
    pub const DIFFUSE: u32 = 0;
    pub const NORMAL: u32 = 1;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub vertex_array: VertexArrayHandle,
    pub topology: Topology,
    /// Indices to read, or vertices for non-indexed draws.
    pub count: usize,
    /// `None` for non-indexed draws.
    pub index_type: Option<IndexType>,
    /// Byte offset into the index buffer.
    pub index_offset: usize,
    pub transform: Mat4,
}

pub trait GpuDevice: Send + Sync {
    /// Binds the graphics context to the calling thread.
    fn make_current(&self);
    fn release_current(&self);

    fn create_vertex_array(&self) -> VertexArrayHandle;
    /// Allocates a buffer and uploads `data` into it.
    fn create_buffer(&self, data: &[u8]) -> BufferHandle;
    fn set_vertex_attribute(&self, vertex_array: VertexArrayHandle, buffer: BufferHandle, attribute: &VertexAttribute);
    fn set_index_buffer(&self, vertex_array: VertexArrayHandle, buffer: BufferHandle);
    /// Uploads tightly packed RGBA8 pixels.
    fn create_texture(&self, width: u32, height: u32, rgba: &[u8]) -> TextureHandle;
    fn bind_texture(&self, unit: u32, texture: TextureHandle);
    fn draw(&self, call: &DrawCall);

    fn delete_vertex_array(&self, vertex_array: VertexArrayHandle);
    fn delete_buffer(&self, buffer: BufferHandle);
    fn delete_texture(&self, texture: TextureHandle);
}
