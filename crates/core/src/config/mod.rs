use std::f32::consts::PI;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Color, Result, SceneError};

/// Top-level configuration structure for the application.
///
/// Every section is optional in the TOML file; missing sections and keys fall
/// back to the values the scene was authored with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub assets: AssetConfig,
    pub audio: AudioConfig,
    pub earth: EarthConfig,
    pub sun: SunConfig,
    pub particles: ParticleConfig,
    pub text: TextConfig,
    pub camera: CameraConfig,
    pub renderer: RendererConfig,
}

impl AppConfig {
    /// Reads and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&raw)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| SceneError::msg(err.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.earth.segments < 3 {
            return Err(SceneError::InvalidInput("earth.segments must be at least 3"));
        }
        if self.earth.radius <= 0.0 {
            return Err(SceneError::InvalidInput("earth.radius must be positive"));
        }
        if self.particles.count > ParticleConfig::MAX_COUNT {
            return Err(SceneError::InvalidInput("particles.count is too large"));
        }
        if self.particles.spread < 0.0 {
            return Err(SceneError::InvalidInput("particles.spread must not be negative"));
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            return Err(SceneError::InvalidInput(
                "camera planes must satisfy 0 < near < far",
            ));
        }
        if self.renderer.fps == 0 {
            return Err(SceneError::InvalidInput("renderer.fps must be positive"));
        }
        if self.renderer.width == 0 || self.renderer.height == 0 {
            return Err(SceneError::InvalidInput("renderer size must be non-zero"));
        }
        if self.audio.playback_rate <= 0.0 {
            return Err(SceneError::InvalidInput("audio.playback_rate must be positive"));
        }
        Ok(())
    }
}

/// Where assets live on disk and how strictly their absence is treated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub root: PathBuf,
    pub day_texture: PathBuf,
    pub night_texture: PathBuf,
    pub specular_clouds_texture: PathBuf,
    pub hand_model: PathBuf,
    pub font: PathBuf,
    pub anisotropy: u8,
    /// Fail startup when an earth texture is missing instead of warning.
    pub strict: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("static"),
            day_texture: PathBuf::from("earth/day.jpg"),
            night_texture: PathBuf::from("earth/night.jpg"),
            specular_clouds_texture: PathBuf::from("earth/specularClouds.jpg"),
            hand_model: PathBuf::from("gltf/hand/hand.glb"),
            font: PathBuf::from("fonts/Catrinity_Regular.json"),
            anisotropy: 8,
            strict: false,
        }
    }
}

/// Configuration specific to the audio track the timeline follows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub track: PathBuf,
    /// Track length; playback stops advancing once it is reached.
    pub duration_seconds: Option<f32>,
    pub playback_rate: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            track: PathBuf::from("audio/ambience.mp3"),
            duration_seconds: None,
            playback_rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthConfig {
    pub radius: f32,
    pub segments: u32,
    pub atmosphere_scale: f32,
    pub atmosphere_day_color: Color,
    pub atmosphere_twilight_color: Color,
    /// Radians of spin per second of audio.
    pub spin_rate: f32,
}

impl Default for EarthConfig {
    fn default() -> Self {
        Self {
            radius: 2.0,
            segments: 64,
            atmosphere_scale: 1.04,
            atmosphere_day_color: Color::from_u32(0x00aaff),
            atmosphere_twilight_color: Color::from_u32(0xff6600),
            spin_rate: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    pub phi: f32,
    pub theta: f32,
    pub marker_distance: f32,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            phi: PI * 0.5,
            theta: 0.5,
            marker_distance: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    pub spread: f32,
    /// Fixed seed for reproducible particle layouts.
    pub seed: Option<u64>,
}

impl ParticleConfig {
    pub const MAX_COUNT: usize = 1_000_000;
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 500,
            spread: 10.0,
            seed: None,
        }
    }
}

/// Extruded text settings shared by the label and the user's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub label: String,
    pub user: String,
    pub name_color: Color,
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            label: "Recycle!".to_string(),
            user: "you".to_string(),
            name_color: Color::from_u32(0x800080),
            size: 0.5,
            depth: 0.2,
            curve_segments: 5,
            bevel_enabled: true,
            bevel_thickness: 0.03,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub enable_damping: bool,
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 25.0,
            near: 0.1,
            far: 100.0,
            position: [12.0, 5.0, 4.0],
            enable_damping: true,
            damping_factor: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f32,
    pub clear_color: Color,
    pub antialias: bool,
    pub fps: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            device_pixel_ratio: 1.0,
            clear_color: Color::from_u32(0x000011),
            antialias: true,
            fps: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_authored_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.particles.count, 500);
        assert_eq!(config.camera.fov_degrees, 25.0);
        assert_eq!(config.earth.atmosphere_day_color.to_hex(), "#00aaff");
        assert_eq!(config.renderer.clear_color.to_hex(), "#000011");
        assert_eq!(config.text.label, "Recycle!");
    }

    #[test]
    fn partial_sections_override_only_named_keys() {
        let config = AppConfig::from_toml(
            r##"
            [earth]
            atmosphere_twilight_color = "#112233"

            [particles]
            seed = 7
            "##,
        )
        .unwrap();
        assert_eq!(config.earth.atmosphere_twilight_color.to_hex(), "#112233");
        assert_eq!(config.earth.segments, 64);
        assert_eq!(config.particles.seed, Some(7));
        assert_eq!(config.particles.count, 500);
    }

    #[test]
    fn rejects_inverted_camera_planes() {
        let err = AppConfig::from_toml("[camera]\nnear = 5.0\nfar = 1.0\n").unwrap_err();
        assert!(matches!(err, SceneError::InvalidInput(_)));
    }

    #[test]
    fn rejects_oversized_particle_counts() {
        let err = AppConfig::from_toml("[particles]\ncount = 100000000\n").unwrap_err();
        assert!(matches!(err, SceneError::InvalidInput(_)));
    }

    #[test]
    fn rejects_bad_colors() {
        let err = AppConfig::from_toml("[earth]\natmosphere_day_color = \"teal-ish\"\n").unwrap_err();
        assert!(matches!(err, SceneError::Config(_)));
    }

    #[test]
    fn survives_a_toml_round_trip() {
        let rendered = AppConfig::default().to_toml().unwrap();
        let parsed = AppConfig::from_toml(&rendered).unwrap();
        assert_eq!(parsed.sun.theta, 0.5);
        assert_eq!(parsed.assets.hand_model, PathBuf::from("gltf/hand/hand.glb"));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.toml");
        std::fs::write(&path, "[renderer]\nfps = 30\n").unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.renderer.fps, 30);
    }
}
