use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::config::AudioConfig;

/// Anything that can report how far into the audio track playback is.
///
/// The timeline only ever reads this value; it never drives the audio.
pub trait PlaybackSource {
    /// Elapsed playback position in seconds.
    fn current_time(&self) -> f32;
}

/// Description of the ambience track the scene is choreographed against.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    path: PathBuf,
    duration: Option<f32>,
}

impl AudioTrack {
    pub fn new(path: impl Into<PathBuf>, duration: Option<f32>) -> Self {
        Self {
            path: path.into(),
            duration,
        }
    }

    pub fn from_config(config: &AudioConfig) -> Self {
        Self::new(config.track.clone(), config.duration_seconds)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn duration(&self) -> Option<f32> {
        self.duration
    }
}

/// Wall-clock playback position with play/pause/seek semantics.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    started_at: Option<Instant>,
    offset: f32,
    rate: f32,
    duration: Option<f32>,
}

impl PlaybackClock {
    /// Creates a paused clock positioned at the start of the track.
    pub fn new(rate: f32, duration: Option<f32>) -> Self {
        Self {
            started_at: None,
            offset: 0.0,
            rate,
            duration,
        }
    }

    pub fn for_track(track: &AudioTrack, rate: f32) -> Self {
        Self::new(rate, track.duration())
    }

    pub fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn play(&mut self) {
        self.play_at(Instant::now());
    }

    pub fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    /// Jumps to `seconds`, keeping the current play state.
    pub fn seek(&mut self, seconds: f32) {
        self.seek_at(seconds, Instant::now());
    }

    pub fn position_at(&self, now: Instant) -> f32 {
        let running = self
            .started_at
            .map(|start| now.saturating_duration_since(start).as_secs_f32() * self.rate)
            .unwrap_or(0.0);
        self.clamp(self.offset + running)
    }

    /// Whether playback has run off the end of a track with a known length.
    pub fn is_finished(&self) -> bool {
        match self.duration {
            Some(duration) => self.position_at(Instant::now()) >= duration,
            None => false,
        }
    }

    fn play_at(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    fn pause_at(&mut self, now: Instant) {
        self.offset = self.position_at(now);
        self.started_at = None;
    }

    fn seek_at(&mut self, seconds: f32, now: Instant) {
        self.offset = self.clamp(seconds);
        if self.started_at.is_some() {
            self.started_at = Some(now);
        }
    }

    fn clamp(&self, seconds: f32) -> f32 {
        let seconds = seconds.max(0.0);
        match self.duration {
            Some(duration) => seconds.min(duration),
            None => seconds,
        }
    }
}

impl PlaybackSource for PlaybackClock {
    fn current_time(&self) -> f32 {
        self.position_at(Instant::now())
    }
}

/// Shared playback clock so a controller can seek while frames are produced.
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    shared: Arc<Mutex<PlaybackClock>>,
}

impl PlaybackHandle {
    pub fn new(clock: PlaybackClock) -> Self {
        Self {
            shared: Arc::new(Mutex::new(clock)),
        }
    }

    pub fn play(&self) {
        self.lock().play();
    }

    pub fn pause(&self) {
        self.lock().pause();
    }

    pub fn seek(&self, seconds: f32) {
        self.lock().seek(seconds);
    }

    pub fn is_finished(&self) -> bool {
        self.lock().is_finished()
    }

    // A poisoned clock still holds a valid position, so keep using it.
    fn lock(&self) -> MutexGuard<'_, PlaybackClock> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlaybackSource for PlaybackHandle {
    fn current_time(&self) -> f32 {
        self.lock().current_time()
    }
}

/// Externally driven position, used for offline rendering and tests.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    seconds: Arc<Mutex<f32>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(seconds: f32) -> Self {
        let clock = Self::new();
        clock.set(seconds);
        clock
    }

    pub fn set(&self, seconds: f32) {
        *self.lock() = seconds.max(0.0);
    }

    pub fn advance(&self, delta: f32) {
        let mut seconds = self.lock();
        *seconds = (*seconds + delta).max(0.0);
    }

    fn lock(&self) -> MutexGuard<'_, f32> {
        self.seconds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlaybackSource for ManualClock {
    fn current_time(&self) -> f32 {
        *self.lock()
    }
}
