//! Per-tick orchestration: one scan, one projection, one display frame.

use std::sync::atomic::AtomicBool;

use crate::config::{BuildProfile, RadarSettings};
use crate::error::Result;
use crate::memory::ReadMemory;
use crate::scan::EntityScanner;
use crate::transform::{DisplayFrame, Viewport, project};

/// Owns the attached reader, the build profile and the current zoom.
///
/// Exactly one frame is in flight per tick: `tick` fully completes (or
/// fails) before the caller starts the next one, and the produced frame is
/// discarded, never mutated.
pub struct Radar<R: ReadMemory> {
    reader: R,
    profile: BuildProfile,
    settings: RadarSettings,
    range: f32,
}

impl<R: ReadMemory> Radar<R> {
    pub fn new(reader: R, profile: BuildProfile, settings: RadarSettings) -> Self {
        let range = settings.clamp_range(settings.default_range);
        Self {
            reader,
            profile,
            settings,
            range,
        }
    }

    /// Override the starting display range (clamped to the settings).
    pub fn with_range(mut self, range: f32) -> Self {
        self.range = self.settings.clamp_range(range);
        self
    }

    pub fn profile(&self) -> &BuildProfile {
        &self.profile
    }

    pub fn settings(&self) -> &RadarSettings {
        &self.settings
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    /// Step the display range down (closer zoom). Returns the new range.
    pub fn zoom_in(&mut self) -> f32 {
        self.range = self.settings.clamp_range(self.range - self.settings.range_step);
        self.range
    }

    /// Step the display range up (wider view). Returns the new range.
    pub fn zoom_out(&mut self) -> f32 {
        self.range = self.settings.clamp_range(self.range + self.settings.range_step);
        self.range
    }

    /// Run one scan-transform cycle.
    pub fn tick(&self, viewport: Viewport) -> Result<DisplayFrame> {
        let scanner = EntityScanner::new(&self.reader, &self.profile);
        Ok(project(&scanner.scan()?, self.range, viewport))
    }

    /// `tick` with a stop flag checked between pointer-table slots.
    pub fn tick_interruptible(&self, viewport: Viewport, stop: &AtomicBool) -> Result<DisplayFrame> {
        let scanner = EntityScanner::new(&self.reader, &self.profile);
        Ok(project(
            &scanner.scan_interruptible(stop)?,
            self.range,
            viewport,
        ))
    }
}
