//! Headless backend that records the last frame's commands

use std::convert::Infallible;

use serde::Serialize;

use super::DrawBackend;
use super::commands::DrawCommand;

/// Keeps the commands of the most recent frame in memory
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordingBackend {
    surface: Option<(u32, u32)>,
    frame: Vec<DrawCommand>,
    frames: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface size, once created
    pub fn surface(&self) -> Option<(u32, u32)> {
        self.surface
    }

    /// Commands of the last completed or in-progress frame
    pub fn frame(&self) -> &[DrawCommand] {
        &self.frame
    }

    /// Number of frames started
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Dump the last frame as JSON
    pub fn frame_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.frame)
    }
}

impl DrawBackend for RecordingBackend {
    type Error = Infallible;

    fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    fn create_surface(&mut self, width: u32, height: u32) {
        self.surface = Some((width, height));
    }

    fn begin_frame(&mut self) {
        self.frame.clear();
        self.frames += 1;
    }

    fn draw(&mut self, command: &DrawCommand) -> Result<(), Self::Error> {
        self.frame.push(command.clone());
        Ok(())
    }
}
