use crate::ParserError;
use crate::gltf::reader::{GltfReader, GltfSections, Section};
use crate::gltf::types::{
    AccessorBound, AccessorType, BufferTarget, ComponentType, GltfAsset, IDENTITY_MATRIX, IDENTITY_ROTATION,
    PrimitiveMode,
};
use crate::json::JsonDocument;

const TRIANGLE: &str = r#"{
    "asset": { "version": "2.0", "generator": "hand written" },
    "scene": 0,
    "scenes": [ { "name": "main", "nodes": [0] } ],
    "nodes": [
        { "name": "root", "children": [1], "translation": [1, 2, 3] },
        { "mesh": 0, "rotation": [0, 0, 0.7071068, 0.7071068], "scale": [2, 2, 2] }
    ],
    "meshes": [
        { "primitives": [ { "attributes": { "POSITION": 0, "TEXCOORD_0": 2 }, "indices": 1 } ] }
    ],
    "buffers": [ { "byteLength": 68, "uri": "triangle.bin" } ],
    "bufferViews": [
        { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
        { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 },
        { "buffer": 0, "byteOffset": 44, "byteLength": 24 }
    ],
    "accessors": [
        { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
          "min": [0, 0, 0], "max": [1.0, 1.0, 0.0] },
        { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" },
        { "bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC2" }
    ]
}"#;

fn triangle_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    for value in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    for index in [0u16, 1, 2, 0] {
        bytes.extend_from_slice(&index.to_le_bytes());
    }
    for value in [0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn parse(source: &str) -> Result<GltfAsset, ParserError> {
    GltfReader::parse(&JsonDocument::parse(source)?)
}

#[test]
fn parse_triangle() -> Result<(), anyhow::Error> {
    let asset = parse(TRIANGLE)?;
    assert_eq!(asset.version.as_deref(), Some("2.0"));
    assert_eq!(asset.default_scene, Some(0));
    assert_eq!(asset.scenes[0].nodes, vec![0]);
    assert_eq!(asset.scenes[0].name.as_deref(), Some("main"));

    assert_eq!(asset.buffers.len(), 1);
    assert_eq!(asset.buffers[0].byte_length, 68);
    assert_eq!(asset.buffers[0].uri.as_deref(), Some("triangle.bin"));
    assert!(asset.buffers[0].data.is_empty());

    assert_eq!(asset.buffer_views[1].byte_offset, 36);
    assert_eq!(asset.buffer_views[0].target, Some(BufferTarget::ArrayBuffer));
    assert_eq!(asset.buffer_views[1].target, Some(BufferTarget::ElementArrayBuffer));
    assert_eq!(asset.buffer_views[2].target, None);

    let positions = &asset.accessors[0];
    assert_eq!(positions.component_type, ComponentType::Float);
    assert_eq!(positions.ty, AccessorType::Vec3);
    assert_eq!(positions.element_size(), 12);
    assert_eq!(positions.min, Some(AccessorBound::Vec3([0.0, 0.0, 0.0])));
    assert_eq!(positions.max.map(|max| max.as_slice().to_vec()), Some(vec![1.0, 1.0, 0.0]));
    assert_eq!(asset.accessors[1].component_type, ComponentType::UnsignedShort);
    assert_eq!(asset.accessors[1].min, None);

    let primitive = &asset.meshes[0].primitives[0];
    assert_eq!(primitive.attributes.position, Some(0));
    assert_eq!(primitive.attributes.texcoord_0, Some(2));
    assert_eq!(primitive.attributes.normal, None);
    assert_eq!(primitive.indices, Some(1));
    assert_eq!(primitive.mode, PrimitiveMode::Triangles);

    asset.validate()?;
    Ok(())
}

#[test]
fn absent_references_stay_absent() -> Result<(), anyhow::Error> {
    let asset = parse(TRIANGLE)?;
    let primitive = &asset.meshes[0].primitives[0];
    assert_eq!(primitive.material, None);

    let root = &asset.nodes[0];
    assert_eq!(root.mesh, None);
    assert_eq!(root.camera, None);
    assert_eq!(root.children, vec![1]);
    Ok(())
}

#[test]
fn node_defaults() -> Result<(), anyhow::Error> {
    let asset = parse(TRIANGLE)?;
    let root = &asset.nodes[0];
    assert_eq!(root.translation, [1.0, 2.0, 3.0]);
    assert_eq!(root.rotation, IDENTITY_ROTATION);
    assert_eq!(root.scale, [1.0, 1.0, 1.0]);
    assert_eq!(root.matrix, IDENTITY_MATRIX);

    let child = &asset.nodes[1];
    assert_eq!(child.mesh, Some(0));
    assert_eq!(child.translation, [0.0; 3]);
    assert_eq!(child.scale, [2.0; 3]);
    Ok(())
}

#[test]
fn sections_decode_independently() -> Result<(), anyhow::Error> {
    let document = JsonDocument::parse(TRIANGLE)?;
    let sections = GltfSections::collect(document.root())?;
    assert!(sections.get(Section::Materials).is_none());

    let mut asset = GltfAsset::default();
    for section in Section::ALL.iter().rev() {
        sections.decode(*section)?.store(&mut asset);
    }
    assert_eq!(asset.nodes.len(), 2);
    assert_eq!(asset.accessors.len(), 3);
    assert!(asset.materials.is_empty());
    assert_eq!(sections.decode(Section::Textures)?.len(), 0);
    Ok(())
}

#[test]
fn string_fields_are_unescaped() -> Result<(), anyhow::Error> {
    let asset = parse(
        r#"{
        "buffers": [ { "byteLength": 4, "uri": "bin\/mesh.bin" } ],
        "images": [ { "uri": "tex\/a.bmp", "mimeType": "image\/bmp" } ],
        "nodes": [ { "name": "caf\u00e9" } ]
    }"#,
    )?;
    assert_eq!(asset.buffers[0].uri.as_deref(), Some("bin/mesh.bin"));
    assert_eq!(asset.images[0].uri.as_deref(), Some("tex/a.bmp"));
    assert_eq!(asset.images[0].mime_type.as_deref(), Some("image/bmp"));
    assert_eq!(asset.nodes[0].name.as_deref(), Some("café"));

    assert!(matches!(
        parse(r#"{ "images": [ { "uri": "tex\q.bmp" } ] }"#),
        Err(ParserError::FormatError { .. })
    ));
    Ok(())
}

#[test]
fn missing_required_fields() {
    assert!(matches!(
        parse(r#"{ "buffers": [ { "uri": "a.bin" } ] }"#),
        Err(ParserError::MissingField {
            field: "byteLength",
            section: "buffer"
        })
    ));
    assert!(matches!(
        parse(r#"{ "bufferViews": [ { "byteLength": 4 } ] }"#),
        Err(ParserError::MissingField { field: "buffer", .. })
    ));
    assert!(matches!(
        parse(r#"{ "accessors": [ { "count": 1, "type": "VEC3" } ] }"#),
        Err(ParserError::MissingField {
            field: "componentType",
            ..
        })
    ));
    assert!(matches!(
        parse(r#"{ "accessors": [ { "componentType": 5126, "type": "VEC3" } ] }"#),
        Err(ParserError::MissingField { field: "count", .. })
    ));
    assert!(matches!(
        parse(r#"{ "accessors": [ { "componentType": 5126, "count": 1 } ] }"#),
        Err(ParserError::MissingField { field: "type", .. })
    ));
    assert!(matches!(
        parse(r#"{ "meshes": [ { "name": "empty" } ] }"#),
        Err(ParserError::MissingField {
            field: "primitives",
            section: "mesh"
        })
    ));
}

#[test]
fn unknown_enumerations_are_rejected() {
    assert!(matches!(
        parse(r#"{ "accessors": [ { "componentType": 5124, "count": 1, "type": "SCALAR" } ] }"#),
        Err(ParserError::UnknownEnumValue {
            field: "componentType",
            value: 5124
        })
    ));
    assert!(matches!(
        parse(r#"{ "accessors": [ { "componentType": 5126, "count": 1, "type": "VEC5" } ] }"#),
        Err(ParserError::UnknownAccessorType(name)) if name == "VEC5"
    ));
    assert!(matches!(
        parse(r#"{ "meshes": [ { "primitives": [ { "mode": 7 } ] } ] }"#),
        Err(ParserError::UnknownEnumValue { field: "mode", .. })
    ));
}

#[test]
fn bounds_follow_accessor_type() -> Result<(), anyhow::Error> {
    let asset = parse(
        r#"{ "accessors": [
            { "componentType": 5125, "count": 4, "type": "SCALAR", "min": [0], "max": [3] },
            { "componentType": 5126, "count": 1, "type": "MAT2", "max": [1, 0, 0.5, 1] }
        ] }"#,
    )?;
    assert_eq!(asset.accessors[0].max, Some(AccessorBound::Scalar(3.0)));
    assert_eq!(asset.accessors[1].max, Some(AccessorBound::Mat2([1.0, 0.0, 0.5, 1.0])));

    assert!(matches!(
        parse(r#"{ "accessors": [ { "componentType": 5126, "count": 1, "type": "VEC3", "min": [0, 0] } ] }"#),
        Err(ParserError::FormatError { .. })
    ));
    Ok(())
}

#[test]
fn materials_and_textures() -> Result<(), anyhow::Error> {
    let asset = parse(
        r#"{
        "materials": [
            { "name": "brick",
              "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 }, "metallicFactor": 0 },
              "normalTexture": { "index": 1, "scale": 0.5 } },
            { "name": "plain" }
        ],
        "textures": [ { "source": 0 }, { "source": 1, "sampler": 0 } ],
        "images": [ { "uri": "brick.bmp" }, { "uri": "brick_normal.bmp", "mimeType": "image/bmp" } ]
    }"#,
    )?;

    let brick = &asset.materials[0];
    let base = brick.pbr_metallic_roughness.base_color_texture;
    assert_eq!(base.map(|info| info.index), Some(0));
    assert_eq!(base.map(|info| info.tex_coord), Some(0));
    assert_eq!(brick.pbr_metallic_roughness.metallic_factor, 0.0);
    assert_eq!(brick.pbr_metallic_roughness.roughness_factor, 1.0);
    assert_eq!(brick.normal_texture.and_then(|info| info.scale), Some(0.5));

    let plain = &asset.materials[1];
    assert!(plain.pbr_metallic_roughness.base_color_texture.is_none());
    assert!(plain.normal_texture.is_none());
    assert_eq!(plain.pbr_metallic_roughness.base_color_factor, [1.0; 4]);

    assert_eq!(asset.textures[1].sampler, Some(0));
    assert_eq!(asset.images[1].mime_type.as_deref(), Some("image/bmp"));
    asset.validate()?;
    Ok(())
}

#[test]
fn dangling_references_fail_validation() -> Result<(), anyhow::Error> {
    let mut asset = parse(TRIANGLE)?;
    asset.meshes[0].primitives[0].material = Some(3);
    assert!(matches!(
        asset.validate(),
        Err(ParserError::DanglingReference {
            kind: "material",
            index: 3,
            len: 0
        })
    ));

    let mut asset = parse(TRIANGLE)?;
    asset.nodes[0].children.push(9);
    assert!(matches!(
        asset.validate(),
        Err(ParserError::DanglingReference { kind: "node", .. })
    ));
    Ok(())
}

#[test]
fn accessor_range_is_checked() -> Result<(), anyhow::Error> {
    let mut asset = parse(TRIANGLE)?;
    asset.accessors[0].count = 4;
    assert!(matches!(
        asset.validate(),
        Err(ParserError::AccessorOutOfBounds { accessor: 0 })
    ));

    let mut asset = parse(TRIANGLE)?;
    asset.accessors[1].byte_offset = 2;
    assert!(matches!(
        asset.validate(),
        Err(ParserError::AccessorOutOfBounds { accessor: 1 })
    ));

    // a stride larger than the element only matters between elements
    let mut asset = parse(TRIANGLE)?;
    asset.buffer_views[0].byte_stride = Some(12);
    asset.validate()?;
    asset.buffer_views[0].byte_stride = Some(16);
    assert!(asset.validate().is_err());

    let mut asset = parse(TRIANGLE)?;
    asset.buffer_views[2].byte_length = 30;
    assert!(matches!(
        asset.validate(),
        Err(ParserError::BufferViewOutOfBounds { buffer_view: 2 })
    ));
    Ok(())
}

#[test]
fn read_accessors() -> Result<(), anyhow::Error> {
    let mut asset = parse(TRIANGLE)?;
    asset.buffers[0].data = triangle_bytes();
    asset.validate()?;

    assert_eq!(
        asset.read_vec3_f32(0)?,
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
    );
    assert_eq!(asset.read_indices(1)?, vec![0, 1, 2]);

    // texcoords are VEC2
    assert!(matches!(asset.read_vec3_f32(2), Err(ParserError::FormatError { .. })));
    assert!(matches!(
        asset.read_indices(7),
        Err(ParserError::DanglingReference { kind: "accessor", .. })
    ));
    Ok(())
}

#[test]
fn strided_reads_skip_padding() -> Result<(), anyhow::Error> {
    let mut asset = parse(
        r#"{
        "buffers": [ { "byteLength": 28 } ],
        "bufferViews": [ { "buffer": 0, "byteLength": 28, "byteStride": 16 } ],
        "accessors": [ { "bufferView": 0, "componentType": 5126, "count": 2, "type": "VEC3" } ]
    }"#,
    )?;

    let mut bytes = Vec::new();
    for value in [1.0f32, 2.0, 3.0, 99.0, 4.0, 5.0, 6.0] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    asset.buffers[0].data = bytes;
    asset.validate()?;

    assert_eq!(asset.read_vec3_f32(0)?, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    Ok(())
}

#[test]
fn loaded_checks_the_bytes_actually_read() -> Result<(), anyhow::Error> {
    let mut asset = parse(TRIANGLE)?;
    asset.validate()?;

    // nothing loaded yet, the declared byteLength alone does not count
    assert!(matches!(
        asset.ensure_loaded(0),
        Err(ParserError::BufferViewOutOfBounds { buffer_view: 0 })
    ));

    asset.buffers[0].data = triangle_bytes();
    for accessor in 0..asset.accessors.len() {
        asset.ensure_loaded(accessor)?;
    }

    asset.accessors[0].count = 4;
    assert!(matches!(
        asset.ensure_loaded(0),
        Err(ParserError::AccessorOutOfBounds { accessor: 0 })
    ));
    Ok(())
}

#[test]
fn accessor_without_view_reads_zeros() -> Result<(), anyhow::Error> {
    let asset = parse(r#"{ "accessors": [ { "componentType": 5126, "count": 2, "type": "VEC3" } ] }"#)?;
    asset.validate()?;
    assert_eq!(asset.read_vec3_f32(0)?, vec![[0.0; 3]; 2]);
    Ok(())
}
