use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, value_parser};
use glam::Vec3;
use itertools::Itertools;

#[derive(Parser, Debug)]
#[command(name = "umbra")]
#[command(version)]
#[command(about = "Loads glTF and OBJ scenes and draws them on a headless device")]
pub struct CliArgs {
    /// The `.gltf` or `.obj` file to load, relative to the asset directory.
    pub model: PathBuf,

    #[arg(long, env = "UMBRA_ASSET_DIR", default_value = ".")]
    pub asset_dir: PathBuf,

    /// Worker threads of the loader pool, defaults to one per hardware thread.
    #[arg(long, env = "UMBRA_THREADS")]
    pub threads: Option<usize>,

    /// Draw passes to run after loading.
    #[arg(long, default_value_t = 1)]
    pub frames: usize,

    /// Global translation applied to every draw, as `(x, y, z)`.
    #[arg(long, value_parser = value_parser!(Vector3), default_value = "(0, 0, 0)")]
    pub translation: Vector3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vector3> for Vec3 {
    fn from(value: Vector3) -> Self {
        Vec3::new(value.x, value.y, value.z)
    }
}

fn trim_brackets(input: &str) -> &str {
    let mut chars = input.chars();
    chars.next(); // skip first
    chars.next_back(); // skip last
    chars.as_str()
}

impl FromStr for Vector3 {
    type Err = String;

    // (-a, b, c)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let string: String = s.chars().filter(|&c| !c.is_whitespace()).collect();
        if !string.starts_with('(') || !string.ends_with(')') || string.len() < 2 {
            return Err("Missing start or end bracket".to_string());
        }

        let splits = trim_brackets(string.as_str()).split(',').collect_vec();
        if splits.len() != 3 {
            return Err(format!(
                "Comma splitting resulted in {} splits, not 3!",
                splits.len()
            ));
        }

        let components = splits
            .iter()
            .map(|&split| {
                split
                    .parse::<f32>()
                    .map_err(|err| format!("Failed to parse component {:?}: {}", split, err))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Vector3 {
            x: components[0],
            y: components[1],
            z: components[2],
        })
    }
}
