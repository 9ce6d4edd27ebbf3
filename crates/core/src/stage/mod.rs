use crate::camera::{OrbitControls, PerspectiveCamera};
use crate::config::AppConfig;
use crate::render::{FrameSnapshot, Viewport};
use crate::{AssetStore, ParameterPanel, Result, Scene, ScheduledEvent, Timeline};

/// Everything that changes from frame to frame, wired together.
///
/// One call to [`Stage::tick`] is one display refresh: panel edits are
/// applied, the timeline runs for the given audio position, the orbit
/// controls settle, and the resolved frame is returned for drawing.
#[derive(Debug)]
pub struct Stage {
    scene: Scene,
    timeline: Timeline,
    panel: ParameterPanel,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    viewport: Viewport,
    last_time: Option<f32>,
}

impl Stage {
    pub fn build(config: &AppConfig, assets: &mut AssetStore) -> Result<Self> {
        let scene = Scene::build(config, assets)?;
        Ok(Self::new(config, scene))
    }

    pub fn new(config: &AppConfig, scene: Scene) -> Self {
        let viewport = Viewport::from_config(&config.renderer);
        Self {
            scene,
            timeline: Timeline::new(),
            panel: ParameterPanel::new(config),
            camera: PerspectiveCamera::new(&config.camera, viewport.aspect()),
            controls: OrbitControls::new(&config.camera),
            viewport,
            last_time: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn panel_mut(&mut self) -> &mut ParameterPanel {
        &mut self.panel
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn cues(&self) -> &[ScheduledEvent] {
        self.timeline.cues()
    }

    pub fn last_time(&self) -> Option<f32> {
        self.last_time
    }

    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) {
        self.viewport
            .resize(width, height, device_pixel_ratio, &mut self.camera);
    }

    /// Runs one frame at audio position `t`.
    pub fn tick(&mut self, t: f32) -> FrameSnapshot {
        if self.panel.has_pending() {
            let updates = self.panel.drain();
            self.scene.apply_updates(&updates);
        }
        self.timeline.step(&mut self.scene, t);
        self.controls.update(&mut self.camera);
        self.last_time = Some(t);
        FrameSnapshot::capture(t, &mut self.scene, &self.camera, &self.viewport)
    }

    /// Plays frames at a steady `fps` from the last rendered time up to
    /// `target`, so per-frame nudges accumulate as they would during live
    /// playback. Returns the frame at `target`.
    pub fn replay_to(&mut self, target: f32, fps: u32) -> FrameSnapshot {
        let step = 1.0 / fps.max(1) as f32;
        let mut frame = self.last_time.map(|t| (t / step).floor() as u64 + 1).unwrap_or(0);
        loop {
            let t = frame as f32 * step;
            if t >= target {
                break;
            }
            self.tick(t);
            frame += 1;
        }
        self.tick(target)
    }
}
