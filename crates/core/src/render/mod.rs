use serde::{Deserialize, Serialize};

use crate::camera::PerspectiveCamera;
use crate::config::RendererConfig;
use crate::scene::{Material, ObjectId, Renderable, Scene};
use crate::{Color, Result};

const MAX_PIXEL_RATIO: f32 = 2.0;

/// Drawable surface size in CSS pixels plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn from_config(config: &RendererConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            device_pixel_ratio: config.device_pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// High-density displays are capped at 2x.
    pub fn pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    pub fn framebuffer_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        (
            (self.width as f32 * ratio).round() as u32,
            (self.height as f32 * ratio).round() as u32,
        )
    }

    /// Applies a window resize and keeps the camera's aspect in step.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        device_pixel_ratio: f32,
        camera: &mut PerspectiveCamera,
    ) {
        self.width = width;
        self.height = height;
        self.device_pixel_ratio = device_pixel_ratio;
        camera.set_aspect(self.aspect());
        tracing::debug!(width, height, pixel_ratio = self.pixel_ratio(), "viewport resized");
    }
}

/// Shader inputs worth inspecting per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformSnapshot {
    pub sun_direction: [f32; 3],
    pub atmosphere_day_color: Color,
    pub atmosphere_twilight_color: Color,
}

/// One attached object, resolved for drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawItem {
    pub object: ObjectId,
    pub material: String,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub model: [[f32; 4]; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uniforms: Option<UniformSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSnapshot {
    pub position: [f32; 3],
    pub view_projection: [[f32; 4]; 4],
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub time: f32,
    pub clear_color: Color,
    pub pixel_ratio: f32,
    pub camera: CameraSnapshot,
    pub items: Vec<DrawItem>,
    /// Set when the particle buffer changed since the previous frame.
    pub particles_dirty: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub particle_positions: Vec<f32>,
}

impl FrameSnapshot {
    /// Resolves the attached objects of `scene`. Consumes the particle dirty
    /// flag, so the positions travel with the first frame after a change.
    pub fn capture(
        time: f32,
        scene: &mut Scene,
        camera: &PerspectiveCamera,
        viewport: &Viewport,
    ) -> Self {
        let items = scene
            .graph
            .attached()
            .map(|object| {
                let transform = object.transform;
                let (material, uniforms) = match &object.renderable {
                    Renderable::Mesh { material, .. } | Renderable::Points { material } => {
                        (material.kind().to_string(), uniform_snapshot(material))
                    }
                    Renderable::DirectionalLight { .. } => ("directional_light".to_string(), None),
                };
                DrawItem {
                    object: object.id,
                    material,
                    position: transform.position.to_array(),
                    rotation: transform.rotation.to_array(),
                    scale: transform.scale.to_array(),
                    model: transform.matrix().to_cols_array_2d(),
                    uniforms,
                }
            })
            .collect();

        let particles_dirty = scene.particles.take_update();
        let particle_positions = if particles_dirty {
            scene.particles.positions().to_vec()
        } else {
            Vec::new()
        };

        Self {
            time,
            clear_color: scene.clear_color,
            pixel_ratio: viewport.pixel_ratio(),
            camera: CameraSnapshot {
                position: camera.position.to_array(),
                view_projection: camera.view_projection().to_cols_array_2d(),
            },
            items,
            particles_dirty,
            particle_positions,
        }
    }

    pub fn item(&self, object: ObjectId) -> Option<&DrawItem> {
        self.items.iter().find(|item| item.object == object)
    }
}

fn uniform_snapshot(material: &Material) -> Option<UniformSnapshot> {
    match material {
        Material::Earth(u) => Some(UniformSnapshot {
            sun_direction: u.sun_direction.to_array(),
            atmosphere_day_color: u.atmosphere_day_color,
            atmosphere_twilight_color: u.atmosphere_twilight_color,
        }),
        Material::Atmosphere { uniforms: u, .. } => Some(UniformSnapshot {
            sun_direction: u.sun_direction.to_array(),
            atmosphere_day_color: u.atmosphere_day_color,
            atmosphere_twilight_color: u.atmosphere_twilight_color,
        }),
        _ => None,
    }
}

/// Rendering backend seam. A GPU backend uploads and draws the snapshot; the
/// headless backend only keeps it.
pub trait Renderer {
    fn render(&mut self, frame: &FrameSnapshot) -> Result<()>;
}

/// Renderer that records what would have been drawn.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames_drawn: u64,
    last_frame: Option<FrameSnapshot>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn last_frame(&self) -> Option<&FrameSnapshot> {
        self.last_frame.as_ref()
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, frame: &FrameSnapshot) -> Result<()> {
        self.frames_drawn += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, CameraConfig};
    use crate::scene::tests::full_scene;

    #[test]
    fn pixel_ratio_is_capped() {
        let mut viewport = Viewport::from_config(&RendererConfig::default());
        let mut camera = PerspectiveCamera::new(&CameraConfig::default(), 1.0);
        viewport.resize(800, 400, 3.0, &mut camera);

        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(viewport.framebuffer_size(), (1600, 800));
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn capture_lists_attached_objects_with_uniforms() {
        let config = AppConfig::default();
        let mut scene = full_scene();
        let viewport = Viewport::from_config(&config.renderer);
        let camera = PerspectiveCamera::new(&config.camera, viewport.aspect());

        let frame = FrameSnapshot::capture(0.0, &mut scene, &camera, &viewport);
        assert_eq!(frame.items.len(), 5);
        assert!(frame.item(ObjectId::Hand).is_none());
        assert_eq!(frame.clear_color.to_hex(), "#000011");

        let earth = frame.item(ObjectId::Earth).unwrap();
        let atmosphere = frame.item(ObjectId::Atmosphere).unwrap();
        assert_eq!(earth.material, "earth_shader");
        assert_eq!(earth.uniforms, atmosphere.uniforms);
        assert_eq!(
            frame.item(ObjectId::SunLight).unwrap().material,
            "directional_light"
        );
    }

    #[test]
    fn particle_positions_ship_only_when_dirty() {
        let config = AppConfig::default();
        let mut scene = full_scene();
        let viewport = Viewport::from_config(&config.renderer);
        let camera = PerspectiveCamera::new(&config.camera, viewport.aspect());

        let first = FrameSnapshot::capture(0.0, &mut scene, &camera, &viewport);
        assert!(first.particles_dirty);
        assert_eq!(first.particle_positions.len(), 6);

        let second = FrameSnapshot::capture(0.1, &mut scene, &camera, &viewport);
        assert!(!second.particles_dirty);
        assert!(second.particle_positions.is_empty());
    }

    #[test]
    fn headless_renderer_keeps_the_last_frame() {
        let config = AppConfig::default();
        let mut scene = full_scene();
        let viewport = Viewport::from_config(&config.renderer);
        let camera = PerspectiveCamera::new(&config.camera, viewport.aspect());
        let mut renderer = HeadlessRenderer::new();

        for t in [0.0, 1.0] {
            let frame = FrameSnapshot::capture(t, &mut scene, &camera, &viewport);
            renderer.render(&frame).unwrap();
        }
        assert_eq!(renderer.frames_drawn(), 2);
        assert_eq!(renderer.last_frame().unwrap().time, 1.0);
    }
}
