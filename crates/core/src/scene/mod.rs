//! Scene graph for the Earth showcase.
//!
//! Objects are created once at startup and mutated in place every frame. The
//! hand pair and the two text meshes depend on assets that may fail to load;
//! when that happens they are simply never inserted and every lookup for them
//! returns `None`.

use std::f32::consts::PI;

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::assets::{manifest, ColorSpace, FontAsset, ModelAsset};
use crate::config::{AppConfig, TextConfig};
use crate::{AssetStore, Color, ParameterUpdate, ParticleField, Result, Sun};

const HAND_SKIN: u32 = 0xffd6d5;
const HAND_SCALE: f32 = 0.1;
const TEXT_YAW: f32 = PI * 0.4;

/// Every object the showcase knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectId {
    Earth,
    Atmosphere,
    DebugSun,
    SunLight,
    Particles,
    Hand,
    HandClone,
    Label,
    Name,
}

impl ObjectId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectId::Earth => "earth",
            ObjectId::Atmosphere => "atmosphere",
            ObjectId::DebugSun => "debug_sun",
            ObjectId::SunLight => "sun_light",
            ObjectId::Particles => "particles",
            ObjectId::Hand => "hand",
            ObjectId::HandClone => "hand_clone",
            ObjectId::Label => "label",
            ObjectId::Name => "name",
        }
    }
}

/// Position, XYZ Euler rotation and scale of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.set_uniform_scale(scale);
        self
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.rotation.y = yaw;
        self
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vec3::splat(scale);
    }

    pub fn quaternion(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Rotates the object in world space: orientation becomes `q * orientation`.
    pub fn apply_quaternion(&mut self, q: Quat) {
        let (x, y, z) = (q * self.quaternion()).normalize().to_euler(EulerRot::XYZ);
        self.rotation = Vec3::new(x, y, z);
    }

    /// Swings the position around the world origin.
    pub fn rotate_position(&mut self, q: Quat) {
        self.position = q * self.position;
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quaternion(), self.position)
    }
}

/// Which faces of a mesh are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Front,
    Back,
}

/// Extrusion settings for text meshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl From<&TextConfig> for TextOptions {
    fn from(config: &TextConfig) -> Self {
        Self {
            size: config.size,
            depth: config.depth,
            curve_segments: config.curve_segments,
            bevel_enabled: config.bevel_enabled,
            bevel_thickness: config.bevel_thickness,
            bevel_size: config.bevel_size,
            bevel_offset: config.bevel_offset,
            bevel_segments: config.bevel_segments,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Icosahedron {
        radius: f32,
        detail: u32,
    },
    Text {
        content: String,
        options: TextOptions,
        advance_width: f32,
    },
    Model {
        mesh_count: usize,
        vertex_count: usize,
    },
}

/// Uniforms of the earth surface shader.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthUniforms {
    pub day_texture: String,
    pub night_texture: String,
    pub specular_clouds_texture: String,
    pub sun_direction: Vec3,
    pub atmosphere_day_color: Color,
    pub atmosphere_twilight_color: Color,
}

/// Uniforms of the atmosphere shell shader.
#[derive(Debug, Clone, PartialEq)]
pub struct AtmosphereUniforms {
    pub sun_direction: Vec3,
    pub atmosphere_day_color: Color,
    pub atmosphere_twilight_color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Earth(EarthUniforms),
    Atmosphere {
        uniforms: AtmosphereUniforms,
        side: Side,
        transparent: bool,
    },
    Basic { color: Color },
    Normal,
    Toon { color: Color },
    PointShader,
}

impl Material {
    pub fn kind(&self) -> &'static str {
        match self {
            Material::Earth(_) => "earth_shader",
            Material::Atmosphere { .. } => "atmosphere_shader",
            Material::Basic { .. } => "basic",
            Material::Normal => "normal",
            Material::Toon { .. } => "toon",
            Material::PointShader => "point_shader",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Renderable {
    Mesh { geometry: Geometry, material: Material },
    Points { material: Material },
    DirectionalLight {
        color: Color,
        intensity: f32,
        target: Vec3,
    },
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub id: ObjectId,
    pub renderable: Renderable,
    pub transform: Transform,
    in_scene: bool,
}

impl SceneObject {
    pub fn new(id: ObjectId, renderable: Renderable, transform: Transform) -> Self {
        Self {
            id,
            renderable,
            transform,
            in_scene: false,
        }
    }

    pub fn in_scene(&self) -> bool {
        self.in_scene
    }

    pub fn material(&self) -> Option<&Material> {
        match &self.renderable {
            Renderable::Mesh { material, .. } | Renderable::Points { material } => Some(material),
            Renderable::DirectionalLight { .. } => None,
        }
    }

    fn material_mut(&mut self) -> Option<&mut Material> {
        match &mut self.renderable {
            Renderable::Mesh { material, .. } | Renderable::Points { material } => Some(material),
            Renderable::DirectionalLight { .. } => None,
        }
    }
}

/// Flat list of scene objects addressed by [`ObjectId`].
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    objects: Vec<SceneObject>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an object, replacing any previous object with the same id.
    pub fn insert(&mut self, object: SceneObject) {
        match self.objects.iter_mut().find(|o| o.id == object.id) {
            Some(slot) => *slot = object,
            None => self.objects.push(object),
        }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn transform_mut(&mut self, id: ObjectId) -> Option<&mut Transform> {
        self.get_mut(id).map(|o| &mut o.transform)
    }

    /// Adds a loaded object to the rendered scene. Attaching twice is a no-op.
    /// Returns `true` only when the object was newly attached.
    pub fn attach(&mut self, id: ObjectId) -> bool {
        match self.get_mut(id) {
            Some(object) if !object.in_scene => {
                object.in_scene = true;
                tracing::debug!(object = id.as_str(), "attached to scene");
                true
            }
            _ => false,
        }
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn attached(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| o.in_scene)
    }
}

/// The live scene: graph, sun and particle buffer.
#[derive(Debug, Clone)]
pub struct Scene {
    pub graph: SceneGraph,
    pub sun: Sun,
    pub particles: ParticleField,
    pub clear_color: Color,
    /// Radians of earth spin per second of audio.
    pub earth_spin_rate: f32,
}

impl Scene {
    /// Loads every asset the scene references and builds the initial graph.
    ///
    /// Earth textures are required when `assets.strict` is set; the hand model
    /// and the font are always optional.
    pub fn build(config: &AppConfig, assets: &mut AssetStore) -> Result<Self> {
        let textures = [
            (manifest::EARTH_DAY, &config.assets.day_texture, ColorSpace::Srgb),
            (manifest::EARTH_NIGHT, &config.assets.night_texture, ColorSpace::Srgb),
            (
                manifest::EARTH_SPECULAR_CLOUDS,
                &config.assets.specular_clouds_texture,
                ColorSpace::Linear,
            ),
        ];
        for (id, path, color_space) in textures {
            if let Err(err) = assets.load_texture(id, path, color_space, config.assets.anisotropy) {
                if config.assets.strict {
                    return Err(err);
                }
                tracing::warn!(texture = id, "{err}; earth will render without it");
            }
        }

        let hand = assets
            .load_model(&config.assets.hand_model)
            .map_err(|err| tracing::warn!("{err}; hands will not appear"))
            .ok();
        let font = assets
            .load_font(&config.assets.font)
            .map_err(|err| tracing::warn!("{err}; text will not appear"))
            .ok();

        Ok(Self::assemble(
            config,
            ParticleField::from_config(&config.particles),
            hand.as_ref(),
            font.as_ref(),
        ))
    }

    /// Builds the initial graph from already-loaded parts.
    pub fn assemble(
        config: &AppConfig,
        particles: ParticleField,
        hand: Option<&ModelAsset>,
        font: Option<&FontAsset>,
    ) -> Self {
        let earth = &config.earth;
        let mut sun = Sun::new(&config.sun);
        let sun_direction = sun.update();

        let mut graph = SceneGraph::new();
        let sphere = Geometry::Sphere {
            radius: earth.radius,
            width_segments: earth.segments,
            height_segments: earth.segments,
        };

        graph.insert(SceneObject::new(
            ObjectId::Earth,
            Renderable::Mesh {
                geometry: sphere.clone(),
                material: Material::Earth(EarthUniforms {
                    day_texture: manifest::EARTH_DAY.to_string(),
                    night_texture: manifest::EARTH_NIGHT.to_string(),
                    specular_clouds_texture: manifest::EARTH_SPECULAR_CLOUDS.to_string(),
                    sun_direction,
                    atmosphere_day_color: earth.atmosphere_day_color,
                    atmosphere_twilight_color: earth.atmosphere_twilight_color,
                }),
            },
            Transform::IDENTITY,
        ));
        graph.insert(SceneObject::new(
            ObjectId::Atmosphere,
            Renderable::Mesh {
                geometry: sphere,
                material: Material::Atmosphere {
                    uniforms: AtmosphereUniforms {
                        sun_direction,
                        atmosphere_day_color: earth.atmosphere_day_color,
                        atmosphere_twilight_color: earth.atmosphere_twilight_color,
                    },
                    side: Side::Back,
                    transparent: true,
                },
            },
            Transform::IDENTITY.with_uniform_scale(earth.atmosphere_scale),
        ));
        graph.insert(SceneObject::new(
            ObjectId::DebugSun,
            Renderable::Mesh {
                geometry: Geometry::Icosahedron {
                    radius: 0.1,
                    detail: 2,
                },
                material: Material::Basic {
                    color: Color::WHITE,
                },
            },
            Transform::at(sun.marker_position()),
        ));
        graph.insert(SceneObject::new(
            ObjectId::SunLight,
            Renderable::DirectionalLight {
                color: Color::WHITE,
                intensity: 0.9,
                target: Vec3::new(3.0, 0.0, 0.0),
            },
            Transform::at(Vec3::new(2.0, 3.0, 4.0)),
        ));
        graph.insert(SceneObject::new(
            ObjectId::Particles,
            Renderable::Points {
                material: Material::PointShader,
            },
            Transform::IDENTITY,
        ));
        for id in [
            ObjectId::Earth,
            ObjectId::Atmosphere,
            ObjectId::DebugSun,
            ObjectId::SunLight,
            ObjectId::Particles,
        ] {
            graph.attach(id);
        }

        if let Some(model) = hand {
            // The clone is taken from the untransformed model, so each hand
            // gets its own placement below.
            let skinned = Renderable::Mesh {
                geometry: Geometry::Model {
                    mesh_count: model.mesh_count(),
                    vertex_count: model.vertex_count(),
                },
                material: Material::Toon {
                    color: Color::from_u32(HAND_SKIN),
                },
            };
            graph.insert(SceneObject::new(
                ObjectId::Hand,
                skinned.clone(),
                Transform::at(Vec3::new(3.0, 0.0, 0.0)).with_uniform_scale(HAND_SCALE),
            ));
            graph.insert(SceneObject::new(
                ObjectId::HandClone,
                skinned,
                Transform::at(Vec3::new(3.0, 0.0, 3.0)).with_uniform_scale(HAND_SCALE),
            ));
        }

        if let Some(font) = font {
            let text = &config.text;
            graph.insert(SceneObject::new(
                ObjectId::Label,
                Renderable::Mesh {
                    geometry: text_geometry(font, &text.label, text),
                    material: Material::Normal,
                },
                Transform::at(Vec3::new(4.0, 2.5, 2.0)).with_yaw(TEXT_YAW),
            ));
            graph.insert(SceneObject::new(
                ObjectId::Name,
                Renderable::Mesh {
                    geometry: text_geometry(font, &text.user, text),
                    material: Material::Toon {
                        color: text.name_color,
                    },
                },
                Transform::at(Vec3::new(2.0, 2.5, 2.0)).with_yaw(TEXT_YAW),
            ));
        }

        Self {
            graph,
            sun,
            particles,
            clear_color: config.renderer.clear_color,
            earth_spin_rate: earth.spin_rate,
        }
    }

    /// Recomputes the sun direction and pushes it to the marker and both
    /// shader materials.
    pub fn update_sun(&mut self) {
        let direction = self.sun.update();
        let marker = self.sun.marker_position();
        if let Some(transform) = self.graph.transform_mut(ObjectId::DebugSun) {
            transform.position = marker;
        }
        self.for_each_shader(|earth, atmosphere| {
            if let Some(uniforms) = earth {
                uniforms.sun_direction = direction;
            }
            if let Some(uniforms) = atmosphere {
                uniforms.sun_direction = direction;
            }
        });
    }

    pub fn set_atmosphere_day_color(&mut self, color: Color) {
        self.for_each_shader(|earth, atmosphere| {
            if let Some(uniforms) = earth {
                uniforms.atmosphere_day_color = color;
            }
            if let Some(uniforms) = atmosphere {
                uniforms.atmosphere_day_color = color;
            }
        });
    }

    pub fn set_atmosphere_twilight_color(&mut self, color: Color) {
        self.for_each_shader(|earth, atmosphere| {
            if let Some(uniforms) = earth {
                uniforms.atmosphere_twilight_color = color;
            }
            if let Some(uniforms) = atmosphere {
                uniforms.atmosphere_twilight_color = color;
            }
        });
    }

    /// Applies debug panel edits.
    pub fn apply_updates(&mut self, updates: &[ParameterUpdate]) {
        let mut sun_changed = false;
        for update in updates {
            match *update {
                ParameterUpdate::AtmosphereDayColor(color) => self.set_atmosphere_day_color(color),
                ParameterUpdate::AtmosphereTwilightColor(color) => {
                    self.set_atmosphere_twilight_color(color)
                }
                ParameterUpdate::SunPhi(phi) => {
                    self.sun.set_phi(phi);
                    sun_changed = true;
                }
                ParameterUpdate::SunTheta(theta) => {
                    self.sun.set_theta(theta);
                    sun_changed = true;
                }
            }
        }
        if sun_changed {
            self.update_sun();
        }
    }

    pub fn earth_uniforms(&self) -> Option<&EarthUniforms> {
        match self.graph.get(ObjectId::Earth)?.material()? {
            Material::Earth(uniforms) => Some(uniforms),
            _ => None,
        }
    }

    pub fn atmosphere_uniforms(&self) -> Option<&AtmosphereUniforms> {
        match self.graph.get(ObjectId::Atmosphere)?.material()? {
            Material::Atmosphere { uniforms, .. } => Some(uniforms),
            _ => None,
        }
    }

    fn for_each_shader(
        &mut self,
        mut apply: impl FnMut(Option<&mut EarthUniforms>, Option<&mut AtmosphereUniforms>),
    ) {
        let earth = self
            .graph
            .get_mut(ObjectId::Earth)
            .and_then(SceneObject::material_mut)
            .and_then(|material| match material {
                Material::Earth(uniforms) => Some(uniforms),
                _ => None,
            });
        apply(earth, None);

        let atmosphere = self
            .graph
            .get_mut(ObjectId::Atmosphere)
            .and_then(SceneObject::material_mut)
            .and_then(|material| match material {
                Material::Atmosphere { uniforms, .. } => Some(uniforms),
                _ => None,
            });
        apply(None, atmosphere);
    }
}

fn text_geometry(font: &FontAsset, content: &str, config: &TextConfig) -> Geometry {
    let metrics = font.measure(content, config.size);
    if !metrics.missing.is_empty() {
        tracing::warn!(text = content, missing = ?metrics.missing, "font lacks glyphs");
    }
    Geometry::Text {
        content: content.to_string(),
        options: TextOptions::from(config),
        advance_width: metrics.width,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::assets::MeshSummary;

    pub(crate) fn hand_model() -> ModelAsset {
        ModelAsset {
            path: PathBuf::from("hand.glb"),
            meshes: vec![MeshSummary {
                name: Some("Hand".to_string()),
                primitives: 1,
                vertex_count: 120,
            }],
        }
    }

    pub(crate) fn font() -> FontAsset {
        FontAsset::from_json(
            "font.json",
            r#"{ "resolution": 1000, "glyphs": { "y": { "ha": 500 }, "o": { "ha": 500 }, "u": { "ha": 500 } } }"#,
        )
        .unwrap()
    }

    pub(crate) fn full_scene() -> Scene {
        let config = AppConfig::default();
        let particles = ParticleField::from_positions(vec![0.5, 0.0, 0.0, -1.0, 2.0, 3.0]);
        Scene::assemble(&config, particles, Some(&hand_model()), Some(&font()))
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn startup_attaches_only_the_always_present_objects() {
        let scene = full_scene();
        let attached: Vec<ObjectId> = scene.graph.attached().map(|o| o.id).collect();
        assert_eq!(
            attached,
            vec![
                ObjectId::Earth,
                ObjectId::Atmosphere,
                ObjectId::DebugSun,
                ObjectId::SunLight,
                ObjectId::Particles,
            ]
        );
        assert!(scene.graph.contains(ObjectId::HandClone));
        assert!(scene.graph.contains(ObjectId::Name));
    }

    #[test]
    fn optional_assets_leave_no_objects_behind() {
        let config = AppConfig::default();
        let scene = Scene::assemble(&config, ParticleField::from_positions(Vec::new()), None, None);
        for id in [ObjectId::Hand, ObjectId::HandClone, ObjectId::Label, ObjectId::Name] {
            assert!(!scene.graph.contains(id));
        }
    }

    #[test]
    fn initial_placements_match_the_layout() {
        let scene = full_scene();
        let atmosphere = scene.graph.get(ObjectId::Atmosphere).unwrap();
        assert_eq!(atmosphere.transform.scale, Vec3::splat(1.04));

        let clone = scene.graph.get(ObjectId::HandClone).unwrap();
        assert_eq!(clone.transform.position, Vec3::new(3.0, 0.0, 3.0));
        assert_eq!(clone.transform.scale, Vec3::splat(0.1));

        let name = scene.graph.get(ObjectId::Name).unwrap();
        assert!((name.transform.rotation.y - PI * 0.4).abs() < 1e-6);
        match &name.renderable {
            Renderable::Mesh {
                geometry: Geometry::Text { advance_width, .. },
                material: Material::Toon { color },
            } => {
                assert!((advance_width - 0.75).abs() < 1e-6);
                assert_eq!(color.to_hex(), "#800080");
            }
            other => panic!("unexpected name renderable {other:?}"),
        }
    }

    #[test]
    fn attach_is_idempotent() {
        let mut scene = full_scene();
        assert!(scene.graph.attach(ObjectId::Hand));
        assert!(!scene.graph.attach(ObjectId::Hand));
        assert_eq!(scene.graph.attached().count(), 6);
    }

    #[test]
    fn sun_updates_reach_both_shaders_and_the_marker() {
        let mut scene = full_scene();
        scene.sun.set_theta(0.0);
        scene.update_sun();

        let earth = scene.earth_uniforms().unwrap().sun_direction;
        let atmosphere = scene.atmosphere_uniforms().unwrap().sun_direction;
        assert!(close(earth, Vec3::Z));
        assert_eq!(earth, atmosphere);

        let marker = scene.graph.get(ObjectId::DebugSun).unwrap().transform.position;
        assert!(close(marker, Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn color_updates_reach_both_shaders() {
        let mut scene = full_scene();
        let color = Color::from_u32(0x123456);
        scene.apply_updates(&[ParameterUpdate::AtmosphereTwilightColor(color)]);
        assert_eq!(scene.earth_uniforms().unwrap().atmosphere_twilight_color, color);
        assert_eq!(scene.atmosphere_uniforms().unwrap().atmosphere_twilight_color, color);
    }

    #[test]
    fn quaternions_compose_in_world_space() {
        let mut transform = Transform::IDENTITY;
        let qx = Quat::from_rotation_x(0.1);
        let qy = Quat::from_rotation_y(0.1);
        transform.apply_quaternion(qx);
        assert!(close(transform.rotation, Vec3::new(0.1, 0.0, 0.0)));

        transform.apply_quaternion(qy);
        let expected = qy * qx;
        assert!(transform.quaternion().dot(expected).abs() > 1.0 - 1e-5);
    }

    #[test]
    fn rotate_position_orbits_the_origin() {
        let mut transform = Transform::at(Vec3::Z);
        transform.rotate_position(Quat::from_rotation_x(PI * 0.5));
        assert!(close(transform.position, Vec3::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn matrix_places_scaled_objects() {
        let transform = Transform::at(Vec3::new(1.0, 2.0, 3.0)).with_uniform_scale(2.0);
        let point = transform.matrix().transform_point3(Vec3::X);
        assert!(close(point, Vec3::new(3.0, 2.0, 3.0)));
    }

    fn attached_ids(scene: &Scene) -> Vec<ObjectId> {
        scene.graph.attached().map(|o| o.id).collect()
    }

    fn write_earth_textures(root: &std::path::Path, config: &AppConfig) {
        for path in [
            &config.assets.day_texture,
            &config.assets.night_texture,
            &config.assets.specular_clouds_texture,
        ] {
            let path = root.join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            image::RgbImage::new(2, 1).save(path).unwrap();
        }
    }

    #[test]
    fn build_warns_past_missing_assets_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let mut assets = AssetStore::new(dir.path());

        let scene = Scene::build(&config, &mut assets).unwrap();
        assert_eq!(attached_ids(&scene).len(), 5);
        for id in [ObjectId::Hand, ObjectId::HandClone, ObjectId::Label, ObjectId::Name] {
            assert!(!scene.graph.contains(id));
        }
        assert!(assets.texture(manifest::EARTH_DAY).is_none());
    }

    #[test]
    fn strict_build_requires_earth_textures() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.assets.strict = true;

        let err = Scene::build(&config, &mut AssetStore::new(dir.path())).unwrap_err();
        assert!(matches!(err, crate::SceneError::Asset { .. }));
    }

    #[test]
    fn strict_build_still_treats_hand_and_font_as_optional() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.assets.strict = true;
        write_earth_textures(dir.path(), &config);
        let mut assets = AssetStore::new(dir.path());

        let scene = Scene::build(&config, &mut assets).unwrap();
        assert!(!scene.graph.contains(ObjectId::Hand));
        assert!(!scene.graph.contains(ObjectId::Label));
        for id in [
            manifest::EARTH_DAY,
            manifest::EARTH_NIGHT,
            manifest::EARTH_SPECULAR_CLOUDS,
        ] {
            assert!(assets.texture(id).is_some());
        }
    }

    #[test]
    fn build_adds_text_when_the_font_loads() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let font_path = dir.path().join(&config.assets.font);
        std::fs::create_dir_all(font_path.parent().unwrap()).unwrap();
        std::fs::write(
            &font_path,
            r#"{ "familyName": "Catrinity", "resolution": 1000, "glyphs": { "R": { "ha": 700 } } }"#,
        )
        .unwrap();

        let scene = Scene::build(&config, &mut AssetStore::new(dir.path())).unwrap();
        assert!(scene.graph.contains(ObjectId::Label));
        assert!(scene.graph.contains(ObjectId::Name));
        assert!(!scene.graph.contains(ObjectId::Hand));
        assert!(!scene.graph.get(ObjectId::Label).unwrap().in_scene());
    }

    #[test]
    fn build_rejects_unreadable_fonts_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let font_path = dir.path().join(&config.assets.font);
        std::fs::create_dir_all(font_path.parent().unwrap()).unwrap();
        std::fs::write(&font_path, "{ not json").unwrap();

        let scene = Scene::build(&config, &mut AssetStore::new(dir.path())).unwrap();
        assert!(!scene.graph.contains(ObjectId::Label));
        assert!(!scene.graph.contains(ObjectId::Name));
    }
}
