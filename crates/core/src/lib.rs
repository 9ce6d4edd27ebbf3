//! Core library for the audio-synchronised Earth scene.
//!
//! The scene is built once from configuration and assets, then driven one
//! frame at a time by the playback position of an audio track. Each module
//! owns one concern (assets, playback, the scripted timeline, the debug
//! panel, rendering) and [`Stage`] wires them together per frame.

pub mod assets;
pub mod audio;
pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod panel;
pub mod particles;
pub mod record;
pub mod render;
pub mod scene;
pub mod stage;
pub mod sun;
pub mod timeline;

pub use assets::{AssetStore, FontAsset, ModelAsset, TextureAsset};
pub use audio::{AudioTrack, ManualClock, PlaybackClock, PlaybackHandle, PlaybackSource};
pub use camera::{OrbitControls, PerspectiveCamera};
pub use color::Color;
pub use config::AppConfig;
pub use error::{Result, SceneError};
pub use panel::{ParameterPanel, ParameterUpdate};
pub use particles::ParticleField;
pub use record::{Recorder, RecordingSettings};
pub use render::{FrameSnapshot, HeadlessRenderer, Renderer, Viewport};
pub use scene::{ObjectId, Scene, SceneGraph, SceneObject, Transform};
pub use stage::Stage;
pub use sun::{Spherical, Sun};
pub use timeline::{ScheduledEvent, Scheduler, Timeline};
