use log::{debug, warn};

use crate::ParserError;
use crate::common::hash::fnv1a;
use crate::common::tokenizer::{SeparatorSet, WordTokenizer};
use crate::obj::types::{MtlFile, MtlMaterial};

const KEY_NEWMTL: u64 = fnv1a(b"newmtl");
const KEY_MAP_KD: u64 = fnv1a(b"map_Kd");
const KEY_MAP_BUMP: u64 = fnv1a(b"map_bump");
const KEY_BUMP: u64 = fnv1a(b"bump");
const KEY_NORM: u64 = fnv1a(b"norm");

pub struct MtlReader {}

impl MtlReader {
    pub fn parse(data: &[u8]) -> Result<MtlFile, ParserError> {
        let mut file = MtlFile::default();
        let mut tokenizer = WordTokenizer::new(data, SeparatorSet::WHITESPACE);

        while let Some(word) = tokenizer.next_word() {
            if word.starts_with(b"#") {
                tokenizer.skip_line();
                continue;
            }

            match fnv1a(word) {
                KEY_NEWMTL => {
                    let name = std::str::from_utf8(tokenizer.rest_of_line())?;
                    file.materials.push(MtlMaterial {
                        name: name.to_string(),
                        ..Default::default()
                    });
                }
                KEY_MAP_KD => {
                    let map = Self::map_file_name(&mut tokenizer)?;
                    match file.materials.last_mut() {
                        Some(material) => material.diffuse_map = map,
                        None => warn!("map_Kd before any newmtl, ignoring it"),
                    }
                }
                KEY_MAP_BUMP | KEY_BUMP | KEY_NORM => {
                    let map = Self::map_file_name(&mut tokenizer)?;
                    match file.materials.last_mut() {
                        Some(material) => material.normal_map = map,
                        None => warn!("Normal map before any newmtl, ignoring it"),
                    }
                }
                _ => {
                    let directive = String::from_utf8_lossy(word);
                    if file.skipped_directives.iter().all(|skipped| *skipped != directive) {
                        warn!("Skipping unsupported MTL directive {}", directive);
                        file.skipped_directives.push(directive.into_owned());
                    }
                    tokenizer.skip_line();
                }
            }
        }

        debug!("Parsed MTL with {} materials", file.materials.len());
        Ok(file)
    }

    /// Texture maps may carry options (`-bm 0.5 file.bmp`), the file name is the last word.
    fn map_file_name(tokenizer: &mut WordTokenizer) -> Result<Option<String>, ParserError> {
        let line = std::str::from_utf8(tokenizer.rest_of_line())?;
        Ok(line.split_ascii_whitespace().last().map(str::to_string))
    }
}
