//! The scripted choreography that runs once per frame against the audio
//! position.
//!
//! Every step compares the elapsed audio time against fixed cue times. Steps
//! that nudge an object by a fixed angle accumulate per frame, so the result
//! depends on the frame rate exactly like a display-driven loop would.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::{ObjectId, Scene, Transform};
use crate::Sun;

pub const SUN_SWEEP: f32 = 9.0;
pub const NAME_REVEAL: f32 = 14.2;
pub const HAND_ENTRANCE: f32 = 24.7;
pub const FINALE: f32 = 56.0;
pub const LABEL_TUMBLE: f32 = 97.8;
pub const HAND_COLLAPSE: f32 = 120.0;

const HAND_GROWTH_START: f32 = 10.0;
const HAND_MAX_SCALE: f32 = 10.0;
/// Fixed per-frame rotation applied by the tumbling steps.
const NUDGE: f32 = 0.1;
/// Fixed per-frame swing around the origin.
const ORBIT_STEP: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub time_seconds: f32,
    pub label: String,
}

impl ScheduledEvent {
    pub fn new(time_seconds: f32, label: impl Into<String>) -> Self {
        Self {
            time_seconds,
            label: label.into(),
        }
    }
}

/// Reports each event once, in order, as playback moves past it.
#[derive(Debug, Default)]
pub struct Scheduler {
    events: Vec<ScheduledEvent>,
    next_event: usize,
    last_time: Option<f32>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_events(&mut self, events: Vec<ScheduledEvent>) {
        self.events = events;
        self.events
            .sort_by(|a, b| a.time_seconds.total_cmp(&b.time_seconds));
        self.next_event = 0;
        self.last_time = None;
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    /// Returns the events crossed since the previous tick. Seeking backwards
    /// re-arms every event that now lies ahead of the playhead.
    pub fn tick(&mut self, time_seconds: f32) -> Vec<ScheduledEvent> {
        if self.last_time.is_some_and(|last| time_seconds < last) {
            self.next_event = self
                .events
                .partition_point(|event| time_seconds > event.time_seconds);
        }
        self.last_time = Some(time_seconds);

        let mut crossed = Vec::new();
        while let Some(event) = self.events.get(self.next_event) {
            if time_seconds <= event.time_seconds {
                break;
            }
            crossed.push(event.clone());
            self.next_event += 1;
        }
        crossed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn vector(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
        }
    }
}

fn nudge(transform: &mut Transform, axes: &[Axis]) {
    for axis in axes {
        transform.apply_quaternion(Quat::from_axis_angle(axis.vector(), NUDGE));
    }
}

fn orbit(transform: &mut Transform) {
    transform.rotate_position(Quat::from_axis_angle(Vec3::X, ORBIT_STEP));
}

/// Runs the choreography and tracks which cues have fired.
#[derive(Debug)]
pub struct Timeline {
    scheduler: Scheduler,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        let mut scheduler = Scheduler::new();
        scheduler.set_events(vec![
            ScheduledEvent::new(SUN_SWEEP, "sun_sweep"),
            ScheduledEvent::new(NAME_REVEAL, "name_reveal"),
            ScheduledEvent::new(HAND_ENTRANCE, "hand_entrance"),
            ScheduledEvent::new(FINALE, "finale"),
            ScheduledEvent::new(LABEL_TUMBLE, "label_tumble"),
            ScheduledEvent::new(HAND_COLLAPSE, "hand_collapse"),
        ]);
        Self { scheduler }
    }

    pub fn cues(&self) -> &[ScheduledEvent] {
        self.scheduler.events()
    }

    /// Applies one frame of choreography for audio position `t` and returns
    /// the cues crossed since the previous frame.
    pub fn step(&mut self, scene: &mut Scene, t: f32) -> Vec<ScheduledEvent> {
        let crossed = self.scheduler.tick(t);
        for cue in &crossed {
            tracing::info!(cue = %cue.label, at = cue.time_seconds, "cue reached");
        }

        if let Some(earth) = scene.graph.transform_mut(ObjectId::Earth) {
            earth.rotation.y = t * scene.earth_spin_rate;
        }

        if t > SUN_SWEEP {
            scene.sun.set_theta(Sun::sweep_theta(t));
            scene.update_sun();
        }

        if scene.graph.contains(ObjectId::Label) && t > NAME_REVEAL && t < FINALE {
            scene.graph.attach(ObjectId::Name);
            if let Some(name) = scene.graph.transform_mut(ObjectId::Name) {
                nudge(name, &[Axis::X, Axis::Y]);
            }
            if let Some(label) = scene.graph.transform_mut(ObjectId::Label) {
                label.rotation.y = -t * 0.8;
            }
        }

        if t > FINALE {
            if let Some(label) = scene.graph.transform_mut(ObjectId::Label) {
                nudge(label, &[Axis::Y]);
            }
            if let Some(name) = scene.graph.transform_mut(ObjectId::Name) {
                orbit(name);
            }
            scene.graph.attach(ObjectId::Label);
            scene.graph.attach(ObjectId::HandClone);
            scene.particles.animate(t);
            if let Some(clone) = scene.graph.transform_mut(ObjectId::HandClone) {
                orbit(clone);
            }
        }

        if scene.graph.contains(ObjectId::Hand) && t > HAND_ENTRANCE {
            scene.graph.attach(ObjectId::Hand);
            if let Some(particles) = scene.graph.transform_mut(ObjectId::Particles) {
                particles.rotation.y = t * 0.2;
            }
            if let Some(hand) = scene.graph.transform_mut(ObjectId::Hand) {
                hand.rotation.y = -t * 1.2;
                if hand.scale.x < HAND_MAX_SCALE && t > HAND_GROWTH_START {
                    hand.set_uniform_scale(t * 0.01);
                    hand.rotation.x = t * 4.0;
                    hand.rotation.y = 0.5 + (t * 3.0).sin().abs() * 2.0;
                    hand.rotation.z = t.cos() * 4.0;
                }
            }
            if t > LABEL_TUMBLE {
                if let Some(label) = scene.graph.transform_mut(ObjectId::Label) {
                    nudge(label, &[Axis::X]);
                }
            }
            if t > HAND_COLLAPSE {
                if let Some(hand) = scene.graph.transform_mut(ObjectId::Hand) {
                    hand.set_uniform_scale(t * -0.5);
                }
            }
        }

        crossed
    }
}
