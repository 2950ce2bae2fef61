/// One corner of a face, with indices already converted to 0-based positions in the vertex lists
/// of the [`ObjFile`]. An absent texcoord or normal index is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceCorner {
    pub position: u32,
    pub texcoord: Option<u32>,
    pub normal: Option<u32>,
}

/// Triangles sharing one material, `usemtl` starts a new group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjGroup {
    pub material: Option<String>,
    pub triangles: Vec<[FaceCorner; 3]>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjObject {
    pub name: String,
    pub groups: Vec<ObjGroup>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjFile {
    /// The `mtllib` file name, relative to the OBJ file.
    pub material_library: Option<String>,
    pub positions: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub objects: Vec<ObjObject>,
    /// Unsupported directives, each listed once in order of appearance.
    pub skipped_directives: Vec<String>,
}

impl ObjFile {
    pub fn triangle_count(&self) -> usize {
        self.objects
            .iter()
            .flat_map(|object| object.groups.iter())
            .map(|group| group.triangles.len())
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MtlMaterial {
    pub name: String,
    /// `map_Kd`
    pub diffuse_map: Option<String>,
    /// `map_bump`, `bump` or `norm`
    pub normal_map: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MtlFile {
    pub materials: Vec<MtlMaterial>,
    pub skipped_directives: Vec<String>,
}

impl MtlFile {
    pub fn get(&self, name: &str) -> Option<&MtlMaterial> {
        self.materials.iter().find(|material| material.name == name)
    }
}
