//! Player settings and preferences
//!
//! Persisted alongside progress in the save bundle.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsState {
    /// Master volume (0.0 - 1.0)
    pub volume: f64,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (minimize shake, flashes, particles)
    pub reduced_motion: bool,

    // === HUD ===
    /// Show the performance/adaptive overlay
    pub show_stats: bool,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            volume: 0.7,
            muted: false,
            reduced_motion: false,
            show_stats: false,
        }
    }
}

impl SettingsState {
    /// Volume after mute is applied
    pub fn effective_volume(&self) -> f64 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Set volume, clamped to [0, 1]
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Particle effects allowed (respects reduced_motion)
    pub fn effective_particles(&self) -> bool {
        !self.reduced_motion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_volume_respects_mute() {
        let mut settings = SettingsState::default();
        assert_eq!(settings.effective_volume(), 0.7);
        settings.toggle_mute();
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_set_volume_clamps() {
        let mut settings = SettingsState::default();
        settings.set_volume(1.5);
        assert_eq!(settings.volume, 1.0);
        settings.set_volume(-0.2);
        assert_eq!(settings.volume, 0.0);
        settings.set_volume(f64::NAN);
        assert_eq!(settings.volume, 0.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: SettingsState = serde_json::from_str(r#"{"muted":true}"#).unwrap();
        assert!(settings.muted);
        assert_eq!(settings.volume, 0.7);
        assert!(!settings.show_stats);
    }
}
