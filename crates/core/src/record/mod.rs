use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Result, SceneError, Stage};

/// Configuration options for the recording subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    pub output_path: PathBuf,
    pub fps: u32,
    pub start_seconds: f32,
    pub end_seconds: f32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("frames.jsonl"),
            fps: 60,
            start_seconds: 0.0,
            end_seconds: 130.0,
        }
    }
}

/// Samples the stage offline at a fixed frame rate and writes one JSON
/// snapshot per line.
#[derive(Debug, Default)]
pub struct Recorder {
    settings: RecordingSettings,
    is_recording: bool,
}

impl Recorder {
    pub fn new(settings: RecordingSettings) -> Self {
        Self {
            settings,
            is_recording: false,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    /// Timestamps of every frame that will be written.
    pub fn frame_times(&self) -> impl Iterator<Item = f32> {
        let step = 1.0 / self.settings.fps.max(1) as f32;
        let start = self.settings.start_seconds;
        let end = self.settings.end_seconds;
        (0u64..)
            .map(move |frame| start + frame as f32 * step)
            .take_while(move |t| *t <= end)
    }

    pub fn record_to_file(&mut self, stage: &mut Stage) -> Result<usize> {
        let file = File::create(&self.settings.output_path)?;
        let mut writer = BufWriter::new(file);
        let frames = self.record(stage, &mut writer)?;
        writer.flush()?;
        tracing::info!(
            frames,
            path = %self.settings.output_path.display(),
            "recording written"
        );
        Ok(frames)
    }

    /// Returns the number of frames written.
    pub fn record<W: Write>(&mut self, stage: &mut Stage, writer: &mut W) -> Result<usize> {
        if self.settings.fps == 0 {
            return Err(SceneError::InvalidInput("recording fps must be positive"));
        }
        if self.settings.end_seconds < self.settings.start_seconds {
            return Err(SceneError::InvalidInput("recording ends before it starts"));
        }

        // A late start replays the lead-in; that replay's final tick is the
        // first recorded frame.
        let lead_in = self.settings.start_seconds > 0.0;
        let fps = self.settings.fps;

        self.is_recording = true;
        let times: Vec<f32> = self.frame_times().collect();
        let result = times.iter().enumerate().try_fold(0usize, |written, (i, &t)| {
            let frame = if i == 0 && lead_in {
                stage.replay_to(t, fps)
            } else {
                stage.tick(t)
            };
            serde_json::to_writer(&mut *writer, &frame)?;
            writer.write_all(b"\n")?;
            Ok::<usize, SceneError>(written + 1)
        });
        self.is_recording = false;
        result
    }
}
