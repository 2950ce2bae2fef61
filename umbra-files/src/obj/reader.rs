use log::{debug, warn};

use crate::ParserError;
use crate::common::hash::fnv1a;
use crate::common::tokenizer::{SeparatorSet, WordTokenizer};
use crate::obj::types::{FaceCorner, ObjFile, ObjGroup, ObjObject};

const KEY_MTLLIB: u64 = fnv1a(b"mtllib");
const KEY_OBJECT: u64 = fnv1a(b"o");
const KEY_USEMTL: u64 = fnv1a(b"usemtl");
const KEY_POSITION: u64 = fnv1a(b"v");
const KEY_TEXCOORD: u64 = fnv1a(b"vt");
const KEY_NORMAL: u64 = fnv1a(b"vn");
const KEY_FACE: u64 = fnv1a(b"f");

pub const DEFAULT_OBJECT_NAME: &str = "default";

pub struct ObjReader {}

impl ObjReader {
    pub fn parse(data: &[u8]) -> Result<ObjFile, ParserError> {
        if data.trim_ascii().is_empty() {
            return Err(ParserError::EmptySource);
        }

        let mut file = ObjFile::default();
        let mut tokenizer = WordTokenizer::new(data, SeparatorSet::WHITESPACE);
        let mut corners = Vec::with_capacity(4);

        while let Some(word) = tokenizer.next_word() {
            // comments do not need a blank after the '#'
            if word.starts_with(b"#") {
                tokenizer.skip_line();
                continue;
            }

            match fnv1a(word) {
                KEY_MTLLIB => {
                    let library = std::str::from_utf8(tokenizer.rest_of_line())?;
                    file.material_library = Some(library.to_string());
                }
                KEY_OBJECT => {
                    let name = std::str::from_utf8(tokenizer.rest_of_line())?;
                    file.objects.push(ObjObject {
                        name: name.to_string(),
                        groups: Vec::new(),
                    });
                }
                KEY_USEMTL => {
                    let material = std::str::from_utf8(tokenizer.rest_of_line())?.to_string();
                    let object = Self::current_object(&mut file.objects);
                    match object.groups.last_mut() {
                        // nothing was drawn with the previous material, reuse its group
                        Some(group) if group.triangles.is_empty() => group.material = Some(material),
                        _ => object.groups.push(ObjGroup {
                            material: Some(material),
                            triangles: Vec::new(),
                        }),
                    }
                }
                KEY_POSITION => {
                    file.positions.push([tokenizer.next_value()?, tokenizer.next_value()?, tokenizer.next_value()?]);
                    tokenizer.skip_line();
                }
                KEY_TEXCOORD => {
                    let u = tokenizer.next_value()?;
                    let v = match tokenizer.next_word_on_line() {
                        Some(word) => Self::parse_float(word, tokenizer.position())?,
                        None => 0.0,
                    };
                    file.texcoords.push([u, v]);
                    tokenizer.skip_line();
                }
                KEY_NORMAL => {
                    file.normals.push([tokenizer.next_value()?, tokenizer.next_value()?, tokenizer.next_value()?]);
                    tokenizer.skip_line();
                }
                KEY_FACE => {
                    corners.clear();
                    while let Some(corner) = tokenizer.next_word_on_line() {
                        corners.push(Self::parse_corner(corner, &file)?);
                    }
                    tokenizer.skip_line();

                    if corners.len() < 3 {
                        return Err(ParserError::FormatError {
                            reason: "A face needs at least three corners",
                        });
                    }

                    let group = Self::current_group(&mut file.objects);
                    for i in 1..corners.len() - 1 {
                        group.triangles.push([corners[0], corners[i], corners[i + 1]]);
                    }
                }
                _ => {
                    let directive = String::from_utf8_lossy(word);
                    if file.skipped_directives.iter().all(|skipped| *skipped != directive) {
                        warn!("Skipping unsupported OBJ directive {}", directive);
                        file.skipped_directives.push(directive.into_owned());
                    }
                    tokenizer.skip_line();
                }
            }
        }

        Self::resolve_references(&mut file)?;
        for object in &mut file.objects {
            object.groups.retain(|group| !group.triangles.is_empty());
        }

        debug!(
            "Parsed OBJ: {} positions, {} texcoords, {} normals, {} objects, {} triangles",
            file.positions.len(),
            file.texcoords.len(),
            file.normals.len(),
            file.objects.len(),
            file.triangle_count()
        );
        Ok(file)
    }

    fn current_object(objects: &mut Vec<ObjObject>) -> &mut ObjObject {
        if objects.is_empty() {
            objects.push(ObjObject {
                name: DEFAULT_OBJECT_NAME.to_string(),
                groups: Vec::new(),
            });
        }
        let last = objects.len() - 1;
        &mut objects[last]
    }

    fn current_group(objects: &mut Vec<ObjObject>) -> &mut ObjGroup {
        let object = Self::current_object(objects);
        if object.groups.is_empty() {
            object.groups.push(ObjGroup::default());
        }
        let last = object.groups.len() - 1;
        &mut object.groups[last]
    }

    fn parse_float(word: &[u8], offset: usize) -> Result<f32, ParserError> {
        let literal = std::str::from_utf8(word)?;
        literal.parse().map_err(|_| ParserError::InvalidNumber {
            literal: literal.to_string(),
            offset,
        })
    }

    /// `v`, `v/vt`, `v//vn` or `v/vt/vn`, each index 1-based or negative (relative to the end of the
    /// list read so far).
    fn parse_corner(word: &[u8], file: &ObjFile) -> Result<FaceCorner, ParserError> {
        let mut parts = word.split(|byte| *byte == b'/');
        let position = parts
            .next()
            .filter(|part| !part.is_empty())
            .ok_or(ParserError::FormatError {
                reason: "Face corner without a position index",
            })?;

        let mut optional = |len: usize| -> Result<Option<u32>, ParserError> {
            match parts.next() {
                Some(part) if !part.is_empty() => Ok(Some(Self::parse_index(part, len)?)),
                _ => Ok(None),
            }
        };

        let texcoord = optional(file.texcoords.len())?;
        let normal = optional(file.normals.len())?;
        Ok(FaceCorner {
            position: Self::parse_index(position, file.positions.len())?,
            texcoord,
            normal,
        })
    }

    fn parse_index(part: &[u8], len: usize) -> Result<u32, ParserError> {
        let literal = std::str::from_utf8(part)?;
        let invalid = || ParserError::InvalidNumber {
            literal: literal.to_string(),
            offset: 0,
        };
        let index: i64 = literal.parse().map_err(|_| invalid())?;

        let resolved = match index {
            0 => return Err(invalid()),
            index if index > 0 => index - 1,
            index => len as i64 + index,
        };
        u32::try_from(resolved).map_err(|_| invalid())
    }

    /// Positions have to exist. Texcoords and normals that were never declared degrade to absent,
    /// so the importer falls back to its defaults.
    fn resolve_references(file: &mut ObjFile) -> Result<(), ParserError> {
        let (positions, texcoords, normals) = (file.positions.len(), file.texcoords.len(), file.normals.len());
        let mut degraded = 0usize;

        for object in &mut file.objects {
            for group in &mut object.groups {
                for corner in group.triangles.iter_mut().flatten() {
                    if corner.position as usize >= positions {
                        return Err(ParserError::DanglingReference {
                            kind: "position",
                            index: corner.position as usize,
                            len: positions,
                        });
                    }
                    if corner.texcoord.is_some_and(|index| index as usize >= texcoords) {
                        corner.texcoord = None;
                        degraded += 1;
                    }
                    if corner.normal.is_some_and(|index| index as usize >= normals) {
                        corner.normal = None;
                        degraded += 1;
                    }
                }
            }
        }

        if degraded > 0 {
            debug!("{} texcoord/normal references point past their lists and were dropped", degraded);
        }
        Ok(())
    }
}
