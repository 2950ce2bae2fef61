use std::fmt::{Debug, Formatter};

use num_enum::TryFromPrimitive;

// https://registry.khronos.org/glTF/specs/2.0/glTF-2.0.html
// Cross references are plain indices into the sequences of the asset; an absent reference is `None`.

pub const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

pub const IDENTITY_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[derive(Debug, Default)]
pub struct GltfAsset {
    pub version: Option<String>,
    /// The `scene` field of the document.
    pub default_scene: Option<usize>,
    pub scenes: Vec<Scene>,
    pub nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
    pub buffers: Vec<Buffer>,
    pub buffer_views: Vec<BufferView>,
    pub accessors: Vec<Accessor>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub name: Option<String>,
    pub nodes: Vec<usize>,
}

#[derive(Clone)]
pub struct Buffer {
    pub byte_length: usize,
    pub uri: Option<String>,
    /// Filled by the loader from the file `uri` points to, empty until then.
    pub data: Vec<u8>,
}

impl Debug for Buffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ byte_length: {}, uri: {:?}, ", self.byte_length, self.uri)?;
        write!(f, "data: [{}] }}", self.data.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum BufferTarget {
    ArrayBuffer = 34962,
    ElementArrayBuffer = 34963,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BufferView {
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
    pub target: Option<BufferTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum ComponentType {
    Byte = 5120,
    UnsignedByte = 5121,
    Short = 5122,
    UnsignedShort = 5123,
    UnsignedInt = 5125,
    Float = 5126,
}

impl ComponentType {
    pub fn size(&self) -> usize {
        match self {
            ComponentType::Byte | ComponentType::UnsignedByte => 1,
            ComponentType::Short | ComponentType::UnsignedShort => 2,
            ComponentType::UnsignedInt | ComponentType::Float => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    pub fn component_count(&self) -> usize {
        match self {
            AccessorType::Scalar => 1,
            AccessorType::Vec2 => 2,
            AccessorType::Vec3 => 3,
            AccessorType::Vec4 | AccessorType::Mat2 => 4,
            AccessorType::Mat3 => 9,
            AccessorType::Mat4 => 16,
        }
    }
}

/// `min`/`max` of an accessor, shaped after the accessor's type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AccessorBound {
    Scalar(f64),
    Vec2([f64; 2]),
    Vec3([f64; 3]),
    Vec4([f64; 4]),
    Mat2([f64; 4]),
    Mat3([f64; 9]),
    Mat4([f64; 16]),
}

impl AccessorBound {
    pub fn as_slice(&self) -> &[f64] {
        match self {
            AccessorBound::Scalar(value) => std::slice::from_ref(value),
            AccessorBound::Vec2(values) => values,
            AccessorBound::Vec3(values) => values,
            AccessorBound::Vec4(values) | AccessorBound::Mat2(values) => values,
            AccessorBound::Mat3(values) => values,
            AccessorBound::Mat4(values) => values,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub buffer_view: Option<usize>,
    pub byte_offset: usize,
    pub component_type: ComponentType,
    pub normalized: bool,
    pub count: usize,
    pub ty: AccessorType,
    pub min: Option<AccessorBound>,
    pub max: Option<AccessorBound>,
}

impl Accessor {
    /// Size of one element without any stride padding.
    pub fn element_size(&self) -> usize {
        self.component_type.size() * self.ty.component_count()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attributes {
    pub position: Option<usize>,
    pub normal: Option<usize>,
    pub tangent: Option<usize>,
    pub texcoord_0: Option<usize>,
    pub texcoord_1: Option<usize>,
    pub color_0: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum PrimitiveMode {
    Points = 0,
    Lines = 1,
    LineLoop = 2,
    LineStrip = 3,
    #[default]
    Triangles = 4,
    TriangleStrip = 5,
    TriangleFan = 6,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Primitive {
    pub attributes: Attributes,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    pub mode: PrimitiveMode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureInfo {
    pub index: usize,
    pub tex_coord: usize,
    /// Only meaningful for normal textures.
    pub scale: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PbrMetallicRoughness {
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0; 4],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub pbr_metallic_roughness: PbrMetallicRoughness,
    pub normal_texture: Option<TextureInfo>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Texture {
    pub source: Option<usize>,
    pub sampler: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    pub uri: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    pub camera: Option<usize>,
    pub children: Vec<usize>,
    /// Column major, as stored in the document.
    pub matrix: [f32; 16],
    pub mesh: Option<usize>,
    /// Quaternion as (x, y, z, w).
    pub rotation: [f32; 4],
    pub translation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: None,
            camera: None,
            children: Vec::new(),
            matrix: IDENTITY_MATRIX,
            mesh: None,
            rotation: IDENTITY_ROTATION,
            translation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}
