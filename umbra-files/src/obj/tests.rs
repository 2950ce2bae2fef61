use crate::ParserError;
use crate::obj::mtl::MtlReader;
use crate::obj::reader::{DEFAULT_OBJECT_NAME, ObjReader};
use crate::obj::types::FaceCorner;

fn corner(position: u32, texcoord: Option<u32>, normal: Option<u32>) -> FaceCorner {
    FaceCorner {
        position,
        texcoord,
        normal,
    }
}

#[test]
fn parse_single_triangle_without_attributes() -> Result<(), anyhow::Error> {
    let file = ObjReader::parse(b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1/1 2/1/1 3/1/1\n")?;
    assert_eq!(file.positions, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    assert!(file.texcoords.is_empty());
    assert_eq!(file.objects.len(), 1);
    assert_eq!(file.objects[0].name, DEFAULT_OBJECT_NAME);

    // the texcoord and normal indices point at lists that were never declared
    let triangles = &file.objects[0].groups[0].triangles;
    assert_eq!(
        triangles,
        &vec![[corner(0, None, None), corner(1, None, None), corner(2, None, None)]]
    );
    Ok(())
}

#[test]
fn corner_forms() -> Result<(), anyhow::Error> {
    let source = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\n\
        f 1 2 3\n\
        f 1/1 2/2 3/3\n\
        f 1//1 2//1 3//1\n\
        f 1/1/1 2/2/1 3/3/1\n";
    let file = ObjReader::parse(source)?;
    let triangles = &file.objects[0].groups[0].triangles;
    assert_eq!(triangles.len(), 4);
    assert_eq!(triangles[0][1], corner(1, None, None));
    assert_eq!(triangles[1][1], corner(1, Some(1), None));
    assert_eq!(triangles[2][1], corner(1, None, Some(0)));
    assert_eq!(triangles[3][2], corner(2, Some(2), Some(0)));
    Ok(())
}

#[test]
fn negative_indices_are_relative() -> Result<(), anyhow::Error> {
    let file = ObjReader::parse(b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n")?;
    assert_eq!(
        file.objects[0].groups[0].triangles[0],
        [corner(0, None, None), corner(1, None, None), corner(2, None, None)]
    );
    Ok(())
}

#[test]
fn polygons_are_fan_triangulated() -> Result<(), anyhow::Error> {
    let file = ObjReader::parse(b"v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv -1 1 0\nf 1 2 3 4 5\n")?;
    let positions: Vec<[u32; 3]> = file.objects[0].groups[0]
        .triangles
        .iter()
        .map(|triangle| triangle.map(|corner| corner.position))
        .collect();
    assert_eq!(positions, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
    assert_eq!(file.triangle_count(), 3);
    Ok(())
}

#[test]
fn objects_and_material_groups() -> Result<(), anyhow::Error> {
    let source = b"# a comment\n\
        mtllib scene.mtl\n\
        v 0 0 0\nv 1 0 0\nv 0 1 0\n\
        o first\n\
        usemtl unused\n\
        usemtl red\n\
        f 1 2 3\n\
        usemtl blue\n\
        s off\n\
        f 3 2 1\n\
        o second object\n\
        f 1 2 3\n";
    let file = ObjReader::parse(source)?;
    assert_eq!(file.material_library.as_deref(), Some("scene.mtl"));
    assert_eq!(file.objects.len(), 2);

    let first = &file.objects[0];
    assert_eq!(first.name, "first");
    let materials: Vec<Option<&str>> = first.groups.iter().map(|group| group.material.as_deref()).collect();
    assert_eq!(materials, vec![Some("red"), Some("blue")]);

    let second = &file.objects[1];
    assert_eq!(second.name, "second object");
    assert_eq!(second.groups.len(), 1);
    assert_eq!(second.groups[0].material, None);
    Ok(())
}

#[test]
fn texcoord_without_v_defaults_to_zero() -> Result<(), anyhow::Error> {
    let file = ObjReader::parse(b"vt 0.5\nvt 0.25 0.75 0\n")?;
    assert_eq!(file.texcoords, vec![[0.5, 0.0], [0.25, 0.75]]);
    Ok(())
}

#[test]
fn malformed_input() {
    assert!(matches!(ObjReader::parse(b"  \n\t"), Err(ParserError::EmptySource)));
    assert!(matches!(
        ObjReader::parse(b"v 0 0 0\nv 1 0 0\nf 1 2\n"),
        Err(ParserError::FormatError { .. })
    ));
    assert!(matches!(
        ObjReader::parse(b"v 0 0 0\nf 1 2 3\n"),
        Err(ParserError::DanglingReference { kind: "position", .. })
    ));
    assert!(matches!(
        ObjReader::parse(b"v 0 zero 0\n"),
        Err(ParserError::InvalidNumber { .. })
    ));
    assert!(matches!(
        ObjReader::parse(b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n"),
        Err(ParserError::InvalidNumber { .. })
    ));
    assert!(matches!(ObjReader::parse(b"v 0 0\n"), Err(ParserError::FormatError { .. })));
}

#[test]
fn parse_mtl() -> Result<(), anyhow::Error> {
    let source = b"# exported\n\
        newmtl brick\n\
        Kd 1.0 1.0 1.0\n\
        map_Kd brick.bmp\n\
        map_bump -bm 0.5 brick_normal.bmp\n\
        newmtl glass\n\
        norm glass_n.bmp\n\
        newmtl plain\n";
    let file = MtlReader::parse(source)?;
    assert_eq!(file.materials.len(), 3);

    let brick = file.get("brick");
    assert_eq!(brick.and_then(|m| m.diffuse_map.as_deref()), Some("brick.bmp"));
    assert_eq!(brick.and_then(|m| m.normal_map.as_deref()), Some("brick_normal.bmp"));

    let glass = file.get("glass");
    assert_eq!(glass.and_then(|m| m.diffuse_map.as_deref()), None);
    assert_eq!(glass.and_then(|m| m.normal_map.as_deref()), Some("glass_n.bmp"));

    assert!(file.get("plain").is_some_and(|m| m.diffuse_map.is_none()));
    assert!(file.get("missing").is_none());
    assert_eq!(file.skipped_directives, vec!["Kd".to_string()]);
    Ok(())
}

#[test]
fn unsupported_directives_are_reported_once() -> Result<(), anyhow::Error> {
    let source = b"v 0 0 0
v 1 0 0
v 0 1 0
        g first
s 1
f 1 2 3
        g second
s off
f 3 2 1
";
    let file = ObjReader::parse(source)?;
    assert_eq!(file.triangle_count(), 2);
    assert_eq!(file.skipped_directives, vec!["g".to_string(), "s".to_string()]);
    Ok(())
}
