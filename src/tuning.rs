//! Game balance and arena configuration
//!
//! Loaded from a JSON file when one is given; any missing field falls back to
//! its default.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::player::PlayerStats;

/// Tunable match parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Arena width (px)
    pub arena_width: f32,
    /// Arena height (px)
    pub arena_height: f32,
    /// Largest frame-scale delta a tick accepts (1.0 = one 60 Hz frame)
    pub max_frame_dt: f32,
    /// Particle cap; oldest particles are dropped first
    pub max_particles: usize,
    /// Starting player stats
    pub base_stats: PlayerStats,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            max_frame_dt: DEFAULT_MAX_FRAME_DT,
            max_particles: MAX_PARTICLES,
            base_stats: PlayerStats::default(),
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize tuning to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load tuning from a file, falling back to defaults on any error
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}; using defaults", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning.sanitized()
            }
            Err(e) => {
                log::warn!("Invalid tuning file {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Replace nonsensical values with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.arena_width.is_finite() && self.arena_width > 0.0) {
            log::warn!(
                "arena_width {} out of range, using {}",
                self.arena_width,
                defaults.arena_width
            );
            self.arena_width = defaults.arena_width;
        }
        if !(self.arena_height.is_finite() && self.arena_height > 0.0) {
            log::warn!(
                "arena_height {} out of range, using {}",
                self.arena_height,
                defaults.arena_height
            );
            self.arena_height = defaults.arena_height;
        }
        if !(self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0) {
            log::warn!(
                "max_frame_dt {} out of range, using {}",
                self.max_frame_dt,
                defaults.max_frame_dt
            );
            self.max_frame_dt = defaults.max_frame_dt;
        }
        self.base_stats.clamp();
        self
    }

    pub fn arena_size(&self) -> Vec2 {
        Vec2::new(self.arena_width, self.arena_height)
    }
}
