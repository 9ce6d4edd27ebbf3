use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Result, SceneError};

/// Texture ids the earth shader samples from.
pub mod manifest {
    pub const EARTH_DAY: &str = "earth_day";
    pub const EARTH_NIGHT: &str = "earth_night";
    pub const EARTH_SPECULAR_CLOUDS: &str = "earth_specular_clouds";
}

/// How texel values should be interpreted when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

/// Texture metadata once the image has been located and probed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureAsset {
    pub id: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub anisotropy: u8,
}

/// Per-mesh statistics of an imported glTF model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSummary {
    pub name: Option<String>,
    pub primitives: usize,
    pub vertex_count: usize,
}

/// A glTF scene reduced to what the scene graph needs to know.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAsset {
    pub path: PathBuf,
    pub meshes: Vec<MeshSummary>,
}

impl ModelAsset {
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.vertex_count).sum()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TypefaceGlyph {
    ha: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypefaceFile {
    glyphs: HashMap<String, TypefaceGlyph>,
    #[serde(default)]
    family_name: Option<String>,
    resolution: f32,
}

/// Typeface-style JSON font: per-character horizontal advances in font units.
#[derive(Debug, Clone)]
pub struct FontAsset {
    pub path: PathBuf,
    pub family: Option<String>,
    resolution: f32,
    advances: HashMap<char, f32>,
}

/// Result of laying out a string with a [`FontAsset`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub missing: Vec<char>,
}

impl FontAsset {
    pub fn from_json(path: impl Into<PathBuf>, raw: &str) -> Result<Self> {
        let path = path.into();
        let file: TypefaceFile = serde_json::from_str(raw)?;
        if file.resolution <= 0.0 {
            return Err(SceneError::asset(path, "font resolution must be positive"));
        }
        let advances = file
            .glyphs
            .into_iter()
            .filter_map(|(key, glyph)| {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Some((ch, glyph.ha)),
                    _ => None,
                }
            })
            .collect();
        Ok(Self {
            path,
            family: file.family_name,
            resolution: file.resolution,
            advances,
        })
    }

    pub fn glyph_count(&self) -> usize {
        self.advances.len()
    }

    /// Sums glyph advances for `text` at the requested size.
    pub fn measure(&self, text: &str, size: f32) -> TextMetrics {
        let scale = size / self.resolution;
        let mut width = 0.0;
        let mut missing = Vec::new();
        for ch in text.chars() {
            match self.advances.get(&ch) {
                Some(advance) => width += advance * scale,
                None => {
                    if !missing.contains(&ch) {
                        missing.push(ch);
                    }
                }
            }
        }
        TextMetrics { width, missing }
    }
}

/// Registry for all assets referenced by the scene, rooted at one directory.
#[derive(Debug)]
pub struct AssetStore {
    root: PathBuf,
    textures: HashMap<String, TextureAsset>,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            textures: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    pub fn load_texture(
        &mut self,
        id: &str,
        relative: &Path,
        color_space: ColorSpace,
        anisotropy: u8,
    ) -> Result<&TextureAsset> {
        let path = self.resolve(relative);
        ensure_exists(&path)?;
        let (width, height) =
            image::image_dimensions(&path).map_err(|err| SceneError::asset(&path, err))?;

        tracing::debug!(id, path = %path.display(), width, height, "texture ready");
        let asset = TextureAsset {
            id: id.to_string(),
            path,
            width,
            height,
            color_space,
            anisotropy,
        };
        self.textures.insert(id.to_string(), asset);
        self.texture(id)
            .ok_or_else(|| SceneError::msg(format!("texture `{id}` vanished after insert")))
    }

    pub fn texture(&self, id: &str) -> Option<&TextureAsset> {
        self.textures.get(id)
    }

    pub fn load_model(&self, relative: &Path) -> Result<ModelAsset> {
        let path = self.resolve(relative);
        ensure_exists(&path)?;
        let (document, buffers, _images) =
            gltf::import(&path).map_err(|err| SceneError::asset(&path, err))?;

        let meshes: Vec<MeshSummary> = document
            .meshes()
            .map(|mesh| {
                let vertex_count = mesh
                    .primitives()
                    .filter_map(|primitive| {
                        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
                        reader.read_positions().map(|positions| positions.count())
                    })
                    .sum();
                MeshSummary {
                    name: mesh.name().map(str::to_string),
                    primitives: mesh.primitives().count(),
                    vertex_count,
                }
            })
            .collect();

        if meshes.is_empty() {
            return Err(SceneError::asset(&path, "model contains no meshes"));
        }

        tracing::info!(path = %path.display(), meshes = meshes.len(), "loaded model");
        Ok(ModelAsset { path, meshes })
    }

    pub fn load_font(&self, relative: &Path) -> Result<FontAsset> {
        let path = self.resolve(relative);
        ensure_exists(&path)?;
        let raw = std::fs::read_to_string(&path)?;
        let font = FontAsset::from_json(&path, &raw)?;
        tracing::info!(path = %path.display(), glyphs = font.glyph_count(), "loaded font");
        Ok(font)
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SceneError::asset(path, "file not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: &str = r#"{
        "familyName": "Catrinity",
        "resolution": 1000,
        "glyphs": {
            "R": { "ha": 700, "o": "m 0 0" },
            "e": { "ha": 500 },
            "!": { "ha": 250 },
            "ligature": { "ha": 900 }
        }
    }"#;

    #[test]
    fn measures_text_in_scene_units() {
        let font = FontAsset::from_json("font.json", FONT).unwrap();
        assert_eq!(font.family.as_deref(), Some("Catrinity"));
        assert_eq!(font.glyph_count(), 3);

        let metrics = font.measure("Re!", 0.5);
        assert!((metrics.width - 0.725).abs() < 1e-6);
        assert!(metrics.missing.is_empty());
    }

    #[test]
    fn reports_missing_glyphs_once() {
        let font = FontAsset::from_json("font.json", FONT).unwrap();
        let metrics = font.measure("Rxx", 1.0);
        assert_eq!(metrics.missing, vec!['x']);
        assert!((metrics.width - 0.7).abs() < 1e-6);
    }

    #[test]
    fn loads_texture_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("earth")).unwrap();
        image::RgbImage::new(4, 2)
            .save(dir.path().join("earth/day.png"))
            .unwrap();

        let mut store = AssetStore::new(dir.path());
        let texture = store
            .load_texture(
                manifest::EARTH_DAY,
                Path::new("earth/day.png"),
                ColorSpace::Srgb,
                8,
            )
            .unwrap();
        assert_eq!((texture.width, texture.height), (4, 2));
        assert!(store.texture(manifest::EARTH_DAY).is_some());
    }

    #[test]
    fn missing_files_are_asset_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AssetStore::new(dir.path());

        let err = store.load_model(Path::new("gltf/hand/hand.glb")).unwrap_err();
        assert!(format!("{err}").contains("hand.glb"));

        let err = store
            .load_texture("night", Path::new("night.jpg"), ColorSpace::Srgb, 8)
            .unwrap_err();
        assert!(matches!(err, SceneError::Asset { .. }));
    }

    // One triangle with its vertex buffer embedded as a data URI.
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0 }],
        "meshes": [{ "name": "Hand", "primitives": [{ "attributes": { "POSITION": 0 } }] }],
        "buffers": [{
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        }],
        "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        }]
    }"#;

    #[test]
    fn loads_model_meshes_and_vertices() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hand.gltf"), TRIANGLE_GLTF).unwrap();
        let store = AssetStore::new(dir.path());

        let model = store.load_model(Path::new("hand.gltf")).unwrap();
        assert_eq!(model.mesh_count(), 1);
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.meshes[0].name.as_deref(), Some("Hand"));
        assert_eq!(model.meshes[0].primitives, 1);
    }

    #[test]
    fn garbage_models_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hand.glb"), b"not a model").unwrap();
        let store = AssetStore::new(dir.path());
        assert!(store.load_model(Path::new("hand.glb")).is_err());
    }
}
