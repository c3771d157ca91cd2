//! Visual preferences
//!
//! Persisted in LocalStorage on web. Nothing about the game itself is stored.

use serde::{Deserialize, Serialize};

use crate::consts::{FIELD_PARTICLES, MAX_PARTICLES};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// The next preset up, wrapping from High back to Low
    pub fn next(&self) -> Self {
        match self {
            QualityPreset::Low => QualityPreset::Medium,
            QualityPreset::Medium => QualityPreset::High,
            QualityPreset::High => QualityPreset::Low,
        }
    }

    /// Explosion particles drawn per frame
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 90,
            QualityPreset::Medium => 240,
            QualityPreset::High => MAX_PARTICLES,
        }
    }

    /// Motes in the backdrop field
    pub fn field_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 0,
            QualityPreset::Medium => FIELD_PARTICLES / 2,
            QualityPreset::High => FIELD_PARTICLES,
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Screen shake on impacts
    pub screen_shake: bool,
    /// Brick explosion particles
    pub particles: bool,
    /// Drifting particle field behind the game
    pub backdrop: bool,
    /// Accessibility: no shake, frozen backdrop
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            screen_shake: true,
            particles: true,
            backdrop: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "cyber_breaker_settings";

    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Whether the backdrop field moves between frames
    pub fn animate_backdrop(&self) -> bool {
        self.backdrop && !self.reduced_motion
    }

    /// Effective explosion particle cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Effective backdrop mote count
    pub fn field_particles(&self) -> usize {
        if !self.backdrop {
            0
        } else {
            self.quality.field_particles()
        }
    }

    /// Settings after pressing a hotkey, or `None` if the key is not bound.
    ///
    /// Q cycles quality, S toggles shake, P toggles particles, B toggles the
    /// backdrop and M toggles reduced motion.
    pub fn with_hotkey(&self, key: &str) -> Option<Self> {
        let mut next = self.clone();
        match key {
            "q" | "Q" => next.quality = self.quality.next(),
            "s" | "S" => next.screen_shake = !self.screen_shake,
            "p" | "P" => next.particles = !self.particles,
            "b" | "B" => next.backdrop = !self.backdrop,
            "m" | "M" => next.reduced_motion = !self.reduced_motion,
            _ => return None,
        }
        Some(next)
    }

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match serde_json::to_string(self) {
                Ok(json) => match storage.set_item(Self::STORAGE_KEY, &json) {
                    Ok(()) => log::info!("Settings saved"),
                    Err(e) => log::warn!("Failed to save settings: {:?}", e),
                },
                Err(e) => log::warn!("Failed to serialize settings: {}", e),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No settings storage on native ({})", Self::STORAGE_KEY);
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
