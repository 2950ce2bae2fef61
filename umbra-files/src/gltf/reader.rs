use log::trace;
use num_enum::TryFromPrimitive;

use crate::ParserError;
use crate::common::hash::fnv1a_str;
use crate::gltf::types::{
    Accessor, AccessorBound, AccessorType, Attributes, Buffer, BufferTarget, BufferView, ComponentType, GltfAsset,
    Image, Material, Mesh, Node, PbrMetallicRoughness, Primitive, PrimitiveMode, Scene, Texture, TextureInfo,
};
use crate::json::{JsonDocument, JsonRef, JsonValue, unescape};

const KEY_ASSET: u64 = fnv1a_str("asset");
const KEY_SCENE: u64 = fnv1a_str("scene");
const KEY_SCENES: u64 = fnv1a_str("scenes");
const KEY_NODES: u64 = fnv1a_str("nodes");
const KEY_MESHES: u64 = fnv1a_str("meshes");
const KEY_BUFFERS: u64 = fnv1a_str("buffers");
const KEY_BUFFER_VIEWS: u64 = fnv1a_str("bufferViews");
const KEY_ACCESSORS: u64 = fnv1a_str("accessors");
const KEY_MATERIALS: u64 = fnv1a_str("materials");
const KEY_TEXTURES: u64 = fnv1a_str("textures");
const KEY_IMAGES: u64 = fnv1a_str("images");

const KEY_NAME: u64 = fnv1a_str("name");
const KEY_BUFFER_VIEW: u64 = fnv1a_str("bufferView");
const KEY_BYTE_OFFSET: u64 = fnv1a_str("byteOffset");
const KEY_COMPONENT_TYPE: u64 = fnv1a_str("componentType");
const KEY_NORMALIZED: u64 = fnv1a_str("normalized");
const KEY_COUNT: u64 = fnv1a_str("count");
const KEY_TYPE: u64 = fnv1a_str("type");
const KEY_MIN: u64 = fnv1a_str("min");
const KEY_MAX: u64 = fnv1a_str("max");

const KEY_CAMERA: u64 = fnv1a_str("camera");
const KEY_CHILDREN: u64 = fnv1a_str("children");
const KEY_MATRIX: u64 = fnv1a_str("matrix");
const KEY_MESH: u64 = fnv1a_str("mesh");
const KEY_ROTATION: u64 = fnv1a_str("rotation");
const KEY_TRANSLATION: u64 = fnv1a_str("translation");
const KEY_SCALE: u64 = fnv1a_str("scale");

const KEY_POSITION: u64 = fnv1a_str("POSITION");
const KEY_NORMAL: u64 = fnv1a_str("NORMAL");
const KEY_TANGENT: u64 = fnv1a_str("TANGENT");
const KEY_TEXCOORD_0: u64 = fnv1a_str("TEXCOORD_0");
const KEY_TEXCOORD_1: u64 = fnv1a_str("TEXCOORD_1");
const KEY_COLOR_0: u64 = fnv1a_str("COLOR_0");

const TYPE_SCALAR: u64 = fnv1a_str("SCALAR");
const TYPE_VEC2: u64 = fnv1a_str("VEC2");
const TYPE_VEC3: u64 = fnv1a_str("VEC3");
const TYPE_VEC4: u64 = fnv1a_str("VEC4");
const TYPE_MAT2: u64 = fnv1a_str("MAT2");
const TYPE_MAT3: u64 = fnv1a_str("MAT3");
const TYPE_MAT4: u64 = fnv1a_str("MAT4");

/// The top level arrays of a glTF document that decode independently of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Scenes,
    Buffers,
    BufferViews,
    Accessors,
    Meshes,
    Textures,
    Materials,
    Images,
    Nodes,
}

impl Section {
    pub const ALL: [Section; 9] = [
        Section::Scenes,
        Section::Buffers,
        Section::BufferViews,
        Section::Accessors,
        Section::Meshes,
        Section::Textures,
        Section::Materials,
        Section::Images,
        Section::Nodes,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Section::Scenes => "scenes",
            Section::Buffers => "buffers",
            Section::BufferViews => "bufferViews",
            Section::Accessors => "accessors",
            Section::Meshes => "meshes",
            Section::Textures => "textures",
            Section::Materials => "materials",
            Section::Images => "images",
            Section::Nodes => "nodes",
        }
    }
}

/// The decoded contents of one [`Section`].
#[derive(Debug)]
pub enum SectionData {
    Scenes(Vec<Scene>),
    Buffers(Vec<Buffer>),
    BufferViews(Vec<BufferView>),
    Accessors(Vec<Accessor>),
    Meshes(Vec<Mesh>),
    Textures(Vec<Texture>),
    Materials(Vec<Material>),
    Images(Vec<Image>),
    Nodes(Vec<Node>),
}

impl SectionData {
    pub fn len(&self) -> usize {
        match self {
            SectionData::Scenes(list) => list.len(),
            SectionData::Buffers(list) => list.len(),
            SectionData::BufferViews(list) => list.len(),
            SectionData::Accessors(list) => list.len(),
            SectionData::Meshes(list) => list.len(),
            SectionData::Textures(list) => list.len(),
            SectionData::Materials(list) => list.len(),
            SectionData::Images(list) => list.len(),
            SectionData::Nodes(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves the decoded list into its slot of the asset.
    pub fn store(self, asset: &mut GltfAsset) {
        match self {
            SectionData::Scenes(list) => asset.scenes = list,
            SectionData::Buffers(list) => asset.buffers = list,
            SectionData::BufferViews(list) => asset.buffer_views = list,
            SectionData::Accessors(list) => asset.accessors = list,
            SectionData::Meshes(list) => asset.meshes = list,
            SectionData::Textures(list) => asset.textures = list,
            SectionData::Materials(list) => asset.materials = list,
            SectionData::Images(list) => asset.images = list,
            SectionData::Nodes(list) => asset.nodes = list,
        }
    }
}

/// Cursors to the known top level members of a document, collected in a single pass over the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfSections<'d> {
    asset: Option<JsonRef<'d>>,
    scene: Option<JsonRef<'d>>,
    scenes: Option<JsonRef<'d>>,
    nodes: Option<JsonRef<'d>>,
    meshes: Option<JsonRef<'d>>,
    buffers: Option<JsonRef<'d>>,
    buffer_views: Option<JsonRef<'d>>,
    accessors: Option<JsonRef<'d>>,
    materials: Option<JsonRef<'d>>,
    textures: Option<JsonRef<'d>>,
    images: Option<JsonRef<'d>>,
}

impl<'d> GltfSections<'d> {
    pub fn collect(root: JsonRef<'d>) -> Result<Self, ParserError> {
        if !root.is_object() {
            return Err(ParserError::FormatError {
                reason: "A glTF document has to be a JSON object",
            });
        }

        let mut sections = GltfSections::default();
        for (key, value) in root.members() {
            match fnv1a_str(key) {
                KEY_ASSET => sections.asset = Some(value),
                KEY_SCENE => sections.scene = Some(value),
                KEY_SCENES => sections.scenes = Some(value),
                KEY_NODES => sections.nodes = Some(value),
                KEY_MESHES => sections.meshes = Some(value),
                KEY_BUFFERS => sections.buffers = Some(value),
                KEY_BUFFER_VIEWS => sections.buffer_views = Some(value),
                KEY_ACCESSORS => sections.accessors = Some(value),
                KEY_MATERIALS => sections.materials = Some(value),
                KEY_TEXTURES => sections.textures = Some(value),
                KEY_IMAGES => sections.images = Some(value),
                _ => trace!("Skipping top level member {}", key),
            }
        }
        Ok(sections)
    }

    pub fn get(&self, section: Section) -> Option<JsonRef<'d>> {
        match section {
            Section::Scenes => self.scenes,
            Section::Buffers => self.buffers,
            Section::BufferViews => self.buffer_views,
            Section::Accessors => self.accessors,
            Section::Meshes => self.meshes,
            Section::Textures => self.textures,
            Section::Materials => self.materials,
            Section::Images => self.images,
            Section::Nodes => self.nodes,
        }
    }

    /// `asset.version`
    pub fn version(&self) -> Result<Option<String>, ParserError> {
        match self.asset {
            Some(asset) => optional_string(asset, "version"),
            None => Ok(None),
        }
    }

    pub fn default_scene(&self) -> Result<Option<usize>, ParserError> {
        self.scene.map(|scene| index(scene, "scene")).transpose()
    }

    /// Decodes one section. A missing section decodes to an empty list.
    pub fn decode(&self, section: Section) -> Result<SectionData, ParserError> {
        let array = match self.get(section) {
            Some(value) if value.is_null() => None,
            Some(value) if !matches!(value.value(), JsonValue::Array(_)) => {
                return Err(ParserError::InvalidFieldType { field: section.key() });
            }
            value => value,
        };

        let data = match array {
            None => match section {
                Section::Scenes => SectionData::Scenes(Vec::new()),
                Section::Buffers => SectionData::Buffers(Vec::new()),
                Section::BufferViews => SectionData::BufferViews(Vec::new()),
                Section::Accessors => SectionData::Accessors(Vec::new()),
                Section::Meshes => SectionData::Meshes(Vec::new()),
                Section::Textures => SectionData::Textures(Vec::new()),
                Section::Materials => SectionData::Materials(Vec::new()),
                Section::Images => SectionData::Images(Vec::new()),
                Section::Nodes => SectionData::Nodes(Vec::new()),
            },
            Some(array) => match section {
                Section::Scenes => SectionData::Scenes(decode_all(array, GltfReader::read_scene)?),
                Section::Buffers => SectionData::Buffers(decode_all(array, GltfReader::read_buffer)?),
                Section::BufferViews => SectionData::BufferViews(decode_all(array, GltfReader::read_buffer_view)?),
                Section::Accessors => SectionData::Accessors(decode_all(array, GltfReader::read_accessor)?),
                Section::Meshes => SectionData::Meshes(decode_all(array, GltfReader::read_mesh)?),
                Section::Textures => SectionData::Textures(decode_all(array, GltfReader::read_texture)?),
                Section::Materials => SectionData::Materials(decode_all(array, GltfReader::read_material)?),
                Section::Images => SectionData::Images(decode_all(array, GltfReader::read_image)?),
                Section::Nodes => SectionData::Nodes(decode_all(array, GltfReader::read_node)?),
            },
        };

        trace!("Decoded {} entries of {}", data.len(), section.key());
        Ok(data)
    }
}

fn decode_all<'d, T>(
    array: JsonRef<'d>,
    decode: fn(JsonRef<'d>) -> Result<T, ParserError>,
) -> Result<Vec<T>, ParserError> {
    array.elements().map(decode).collect()
}

pub struct GltfReader {}

impl GltfReader {
    /// Decodes a whole document on the calling thread. Buffers are returned without their data,
    /// loading the files they point to is up to the caller.
    pub fn parse(document: &JsonDocument) -> Result<GltfAsset, ParserError> {
        let sections = GltfSections::collect(document.root())?;
        let mut asset = GltfAsset {
            version: sections.version()?,
            default_scene: sections.default_scene()?,
            ..Default::default()
        };

        for section in Section::ALL {
            sections.decode(section)?.store(&mut asset);
        }
        Ok(asset)
    }

    pub fn read_scene(value: JsonRef) -> Result<Scene, ParserError> {
        Ok(Scene {
            name: optional_string(value, "name")?,
            nodes: optional_index_list(value, "nodes")?,
        })
    }

    pub fn read_buffer(value: JsonRef) -> Result<Buffer, ParserError> {
        Ok(Buffer {
            byte_length: index(required(value, "byteLength", "buffer")?, "byteLength")?,
            uri: optional_string(value, "uri")?,
            data: Vec::new(),
        })
    }

    pub fn read_buffer_view(value: JsonRef) -> Result<BufferView, ParserError> {
        Ok(BufferView {
            buffer: index(required(value, "buffer", "bufferView")?, "buffer")?,
            byte_offset: optional_index(value, "byteOffset")?.unwrap_or(0),
            byte_length: index(required(value, "byteLength", "bufferView")?, "byteLength")?,
            byte_stride: optional_index(value, "byteStride")?,
            target: value
                .get("target")
                .map(|target| enum_value::<BufferTarget>(target, "target"))
                .transpose()?,
        })
    }

    pub fn read_accessor(value: JsonRef) -> Result<Accessor, ParserError> {
        let mut buffer_view = None;
        let mut byte_offset = 0;
        let mut component_type = None;
        let mut normalized = false;
        let mut count = None;
        let mut ty = None;
        let mut min = None;
        let mut max = None;

        for (key, member) in value.members() {
            match fnv1a_str(key) {
                KEY_BUFFER_VIEW => buffer_view = Some(index(member, "bufferView")?),
                KEY_BYTE_OFFSET => byte_offset = index(member, "byteOffset")?,
                KEY_COMPONENT_TYPE => component_type = Some(enum_value::<ComponentType>(member, "componentType")?),
                KEY_NORMALIZED => {
                    normalized = member
                        .as_bool()
                        .ok_or(ParserError::InvalidFieldType { field: "normalized" })?
                }
                KEY_COUNT => count = Some(index(member, "count")?),
                KEY_TYPE => ty = Some(Self::accessor_type(member)?),
                KEY_MIN => min = Some(member),
                KEY_MAX => max = Some(member),
                _ => trace!("Skipping accessor member {}", key),
            }
        }

        let missing = |field| ParserError::MissingField {
            field,
            section: "accessor",
        };
        let ty = ty.ok_or_else(|| missing("type"))?;

        Ok(Accessor {
            buffer_view,
            byte_offset,
            component_type: component_type.ok_or_else(|| missing("componentType"))?,
            normalized,
            count: count.ok_or_else(|| missing("count"))?,
            ty,
            min: min.map(|bound| Self::accessor_bound(bound, ty, "min")).transpose()?,
            max: max.map(|bound| Self::accessor_bound(bound, ty, "max")).transpose()?,
        })
    }

    fn accessor_type(value: JsonRef) -> Result<AccessorType, ParserError> {
        let name = value.as_str().ok_or(ParserError::InvalidFieldType { field: "type" })?;
        match fnv1a_str(name) {
            TYPE_SCALAR => Ok(AccessorType::Scalar),
            TYPE_VEC2 => Ok(AccessorType::Vec2),
            TYPE_VEC3 => Ok(AccessorType::Vec3),
            TYPE_VEC4 => Ok(AccessorType::Vec4),
            TYPE_MAT2 => Ok(AccessorType::Mat2),
            TYPE_MAT3 => Ok(AccessorType::Mat3),
            TYPE_MAT4 => Ok(AccessorType::Mat4),
            _ => Err(ParserError::UnknownAccessorType(name.to_string())),
        }
    }

    /// Integer and real literals are both accepted, the amount has to match the accessor type.
    fn accessor_bound(value: JsonRef, ty: AccessorType, field: &'static str) -> Result<AccessorBound, ParserError> {
        let values = value
            .elements()
            .map(|element| element.as_f64().ok_or(ParserError::InvalidFieldType { field }))
            .collect::<Result<Vec<f64>, _>>()?;

        let mismatch = ParserError::FormatError {
            reason: "Accessor bound does not match the accessor type",
        };
        let bound = match ty {
            AccessorType::Scalar => match values.as_slice() {
                [value] => AccessorBound::Scalar(*value),
                _ => return Err(mismatch),
            },
            AccessorType::Vec2 => AccessorBound::Vec2(fixed(&values).ok_or(mismatch)?),
            AccessorType::Vec3 => AccessorBound::Vec3(fixed(&values).ok_or(mismatch)?),
            AccessorType::Vec4 => AccessorBound::Vec4(fixed(&values).ok_or(mismatch)?),
            AccessorType::Mat2 => AccessorBound::Mat2(fixed(&values).ok_or(mismatch)?),
            AccessorType::Mat3 => AccessorBound::Mat3(fixed(&values).ok_or(mismatch)?),
            AccessorType::Mat4 => AccessorBound::Mat4(fixed(&values).ok_or(mismatch)?),
        };
        Ok(bound)
    }

    pub fn read_mesh(value: JsonRef) -> Result<Mesh, ParserError> {
        let primitives = required(value, "primitives", "mesh")?;
        Ok(Mesh {
            name: optional_string(value, "name")?,
            primitives: primitives
                .elements()
                .map(Self::read_primitive)
                .collect::<Result<_, _>>()?,
        })
    }

    fn read_primitive(value: JsonRef) -> Result<Primitive, ParserError> {
        let mut attributes = Attributes::default();
        if let Some(list) = value.get("attributes") {
            for (key, member) in list.members() {
                let accessor = Some(index(member, "attributes")?);
                match fnv1a_str(key) {
                    KEY_POSITION => attributes.position = accessor,
                    KEY_NORMAL => attributes.normal = accessor,
                    KEY_TANGENT => attributes.tangent = accessor,
                    KEY_TEXCOORD_0 => attributes.texcoord_0 = accessor,
                    KEY_TEXCOORD_1 => attributes.texcoord_1 = accessor,
                    KEY_COLOR_0 => attributes.color_0 = accessor,
                    _ => trace!("Skipping primitive attribute {}", key),
                }
            }
        }

        Ok(Primitive {
            attributes,
            indices: optional_index(value, "indices")?,
            material: optional_index(value, "material")?,
            mode: value
                .get("mode")
                .map(|mode| enum_value::<PrimitiveMode>(mode, "mode"))
                .transpose()?
                .unwrap_or_default(),
        })
    }

    pub fn read_material(value: JsonRef) -> Result<Material, ParserError> {
        let mut pbr = PbrMetallicRoughness::default();
        if let Some(pbr_value) = value.get("pbrMetallicRoughness") {
            if let Some(factor) = pbr_value.get("baseColorFactor") {
                pbr.base_color_factor = float_array(factor, "baseColorFactor")?;
            }
            pbr.base_color_texture = optional_texture_info(pbr_value, "baseColorTexture")?;
            if let Some(factor) = optional_f32(pbr_value, "metallicFactor")? {
                pbr.metallic_factor = factor;
            }
            if let Some(factor) = optional_f32(pbr_value, "roughnessFactor")? {
                pbr.roughness_factor = factor;
            }
        }

        Ok(Material {
            name: optional_string(value, "name")?,
            pbr_metallic_roughness: pbr,
            normal_texture: optional_texture_info(value, "normalTexture")?,
        })
    }

    pub fn read_texture(value: JsonRef) -> Result<Texture, ParserError> {
        Ok(Texture {
            source: optional_index(value, "source")?,
            sampler: optional_index(value, "sampler")?,
        })
    }

    pub fn read_image(value: JsonRef) -> Result<Image, ParserError> {
        Ok(Image {
            uri: optional_string(value, "uri")?,
            mime_type: optional_string(value, "mimeType")?,
        })
    }

    pub fn read_node(value: JsonRef) -> Result<Node, ParserError> {
        let mut node = Node::default();
        for (key, member) in value.members() {
            match fnv1a_str(key) {
                KEY_NAME => node.name = Some(string(member, "name")?),
                KEY_CAMERA => node.camera = Some(index(member, "camera")?),
                KEY_CHILDREN => node.children = index_list(member, "children")?,
                KEY_MATRIX => node.matrix = float_array(member, "matrix")?,
                KEY_MESH => node.mesh = Some(index(member, "mesh")?),
                KEY_ROTATION => node.rotation = float_array(member, "rotation")?,
                KEY_TRANSLATION => node.translation = float_array(member, "translation")?,
                KEY_SCALE => node.scale = float_array(member, "scale")?,
                _ => trace!("Skipping node member {}", key),
            }
        }
        Ok(node)
    }
}

fn fixed<const N: usize>(values: &[f64]) -> Option<[f64; N]> {
    <[f64; N]>::try_from(values).ok()
}

fn required<'d>(object: JsonRef<'d>, field: &'static str, section: &'static str) -> Result<JsonRef<'d>, ParserError> {
    object
        .get(field)
        .filter(|value| !value.is_null())
        .ok_or(ParserError::MissingField { field, section })
}

fn index(value: JsonRef, field: &'static str) -> Result<usize, ParserError> {
    value
        .as_u64()
        .and_then(|value| usize::try_from(value).ok())
        .ok_or(ParserError::InvalidFieldType { field })
}

fn optional_index(object: JsonRef, field: &'static str) -> Result<Option<usize>, ParserError> {
    object.get(field).map(|value| index(value, field)).transpose()
}

fn index_list(value: JsonRef, field: &'static str) -> Result<Vec<usize>, ParserError> {
    value.elements().map(|element| index(element, field)).collect()
}

fn optional_index_list(object: JsonRef, field: &'static str) -> Result<Vec<usize>, ParserError> {
    object
        .get(field)
        .map(|value| index_list(value, field))
        .transpose()
        .map(Option::unwrap_or_default)
}

fn string(value: JsonRef, field: &'static str) -> Result<String, ParserError> {
    let raw = value.as_str().ok_or(ParserError::InvalidFieldType { field })?;
    Ok(unescape(raw)?.into_owned())
}

fn optional_string(object: JsonRef, field: &'static str) -> Result<Option<String>, ParserError> {
    object.get(field).map(|value| string(value, field)).transpose()
}

fn optional_f32(object: JsonRef, field: &'static str) -> Result<Option<f32>, ParserError> {
    object
        .get(field)
        .map(|value| {
            value
                .as_f64()
                .map(|value| value as f32)
                .ok_or(ParserError::InvalidFieldType { field })
        })
        .transpose()
}

fn float_array<const N: usize>(value: JsonRef, field: &'static str) -> Result<[f32; N], ParserError> {
    if value.len() != N {
        return Err(ParserError::InvalidFieldType { field });
    }

    let mut out = [0.0; N];
    for (slot, element) in out.iter_mut().zip(value.elements()) {
        *slot = element.as_f64().ok_or(ParserError::InvalidFieldType { field })? as f32;
    }
    Ok(out)
}

fn optional_texture_info(object: JsonRef, field: &'static str) -> Result<Option<TextureInfo>, ParserError> {
    let Some(value) = object.get(field) else {
        return Ok(None);
    };

    Ok(Some(TextureInfo {
        index: index(required(value, "index", "textureInfo")?, "index")?,
        tex_coord: optional_index(value, "texCoord")?.unwrap_or(0),
        scale: optional_f32(value, "scale")?,
    }))
}

fn enum_value<E: TryFromPrimitive<Primitive = u32>>(value: JsonRef, field: &'static str) -> Result<E, ParserError> {
    let raw = value.as_u64().ok_or(ParserError::InvalidFieldType { field })?;
    u32::try_from(raw)
        .ok()
        .and_then(|primitive| E::try_from_primitive(primitive).ok())
        .ok_or(ParserError::UnknownEnumValue { field, value: raw })
}
