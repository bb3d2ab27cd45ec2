//! Effect configuration.
//!
//! One parameter table replaces the per-component constants the effect used to
//! carry. A config is validated once at install time and is then immutable for
//! the lifetime of the effect.

use crate::constants::*;
use serde::{Deserialize, Serialize};

/// How the composite pass fills the alpha channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlphaMode {
    /// Full alpha everywhere; the canvas replaces the video.
    #[default]
    Opaque,
    /// Alpha follows local effect strength so the canvas can sit over the video.
    StrengthBlended,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectConfig {
    pub wave_speed: f32,
    pub spring_strength: f32,
    pub velocity_damping: f32,
    pub height_damping: f32,
    pub time_step: f32,
    pub ripple_radius: f32,
    pub ripple_strength: f32,
    pub ripple_falloff: f32,
    pub distortion_strength: f32,
    pub chroma_strength: f32,
    pub chroma_dispersal: f32,
    pub glint_strength: f32,
    pub glint_shininess: f32,
    pub caustics_strength: f32,
    pub caustics_scale: f32,
    pub rest_threshold: f32,
    pub resolution_scale: f32,
    pub alpha_mode: AlphaMode,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            wave_speed: DEFAULT_WAVE_SPEED,
            spring_strength: DEFAULT_SPRING_STRENGTH,
            velocity_damping: DEFAULT_VELOCITY_DAMPING,
            height_damping: DEFAULT_HEIGHT_DAMPING,
            time_step: DEFAULT_TIME_STEP,
            ripple_radius: DEFAULT_RIPPLE_RADIUS,
            ripple_strength: DEFAULT_RIPPLE_STRENGTH,
            ripple_falloff: DEFAULT_RIPPLE_FALLOFF,
            distortion_strength: DEFAULT_DISTORTION_STRENGTH,
            chroma_strength: DEFAULT_CHROMA_STRENGTH,
            chroma_dispersal: DEFAULT_CHROMA_DISPERSAL,
            glint_strength: DEFAULT_GLINT_STRENGTH,
            glint_shininess: DEFAULT_GLINT_SHININESS,
            caustics_strength: DEFAULT_CAUSTICS_STRENGTH,
            caustics_scale: DEFAULT_CAUSTICS_SCALE,
            rest_threshold: DEFAULT_REST_THRESHOLD,
            resolution_scale: DEFAULT_RESOLUTION_SCALE,
            alpha_mode: AlphaMode::Opaque,
        }
    }
}

/// Named parameter sets for the places the effect appears.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// Full-bleed background video.
    Hero,
    /// Small project card; stronger ripples blended over the poster video.
    Card,
    /// Barely-there motion for long reading pages.
    Ambient,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Hero, Preset::Card, Preset::Ambient];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hero" => Some(Preset::Hero),
            "card" => Some(Preset::Card),
            "ambient" => Some(Preset::Ambient),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Hero => "hero",
            Preset::Card => "card",
            Preset::Ambient => "ambient",
        }
    }

    pub fn config(self) -> EffectConfig {
        let base = EffectConfig::default();
        match self {
            Preset::Hero => base,
            Preset::Card => EffectConfig {
                wave_speed: 0.6,
                velocity_damping: 0.975,
                height_damping: 0.99,
                ripple_radius: 0.09,
                ripple_strength: 4.5,
                distortion_strength: 0.5,
                chroma_strength: 0.01,
                chroma_dispersal: 0.9,
                resolution_scale: 1.0,
                alpha_mode: AlphaMode::StrengthBlended,
                ..base
            },
            Preset::Ambient => EffectConfig {
                wave_speed: 0.4,
                velocity_damping: 0.99,
                height_damping: 0.997,
                ripple_strength: 1.5,
                distortion_strength: 0.2,
                chroma_strength: 0.003,
                glint_strength: 0.15,
                caustics_strength: 0.03,
                resolution_scale: 0.35,
                ..base
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },
    #[error("{name} must lie in (0, 1), got {value}")]
    Damping { name: &'static str, value: f32 },
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("resolution scale must lie in (0, 1], got {0}")]
    ResolutionScale(f32),
    #[error("unstable integrator: (8c^2 + k) dt^2 = {courant:.3} must stay below {limit}")]
    Unstable { courant: f32, limit: f32 },
}

impl EffectConfig {
    fn named_values(&self) -> [(&'static str, f32); 17] {
        [
            ("wave_speed", self.wave_speed),
            ("spring_strength", self.spring_strength),
            ("velocity_damping", self.velocity_damping),
            ("height_damping", self.height_damping),
            ("time_step", self.time_step),
            ("ripple_radius", self.ripple_radius),
            ("ripple_strength", self.ripple_strength),
            ("ripple_falloff", self.ripple_falloff),
            ("distortion_strength", self.distortion_strength),
            ("chroma_strength", self.chroma_strength),
            ("chroma_dispersal", self.chroma_dispersal),
            ("glint_strength", self.glint_strength),
            ("glint_shininess", self.glint_shininess),
            ("caustics_strength", self.caustics_strength),
            ("caustics_scale", self.caustics_scale),
            ("rest_threshold", self.rest_threshold),
            ("resolution_scale", self.resolution_scale),
        ]
    }

    /// Left-hand side of the stability bound for the explicit integrator.
    pub fn courant_number(&self) -> f32 {
        let c2 = self.wave_speed * self.wave_speed;
        (8.0 * c2 + self.spring_strength) * self.time_step * self.time_step
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.named_values() {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }
        for (name, value) in [
            ("velocity_damping", self.velocity_damping),
            ("height_damping", self.height_damping),
        ] {
            if value <= 0.0 || value >= 1.0 {
                return Err(ConfigError::Damping { name, value });
            }
        }
        for (name, value) in [
            ("time_step", self.time_step),
            ("ripple_radius", self.ripple_radius),
            ("ripple_falloff", self.ripple_falloff),
            ("rest_threshold", self.rest_threshold),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        for (name, value) in [
            ("wave_speed", self.wave_speed),
            ("spring_strength", self.spring_strength),
            ("ripple_strength", self.ripple_strength),
            ("distortion_strength", self.distortion_strength),
            ("chroma_strength", self.chroma_strength),
            ("chroma_dispersal", self.chroma_dispersal),
            ("glint_strength", self.glint_strength),
            ("glint_shininess", self.glint_shininess),
            ("caustics_strength", self.caustics_strength),
            ("caustics_scale", self.caustics_scale),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }
        if self.resolution_scale <= 0.0 || self.resolution_scale > 1.0 {
            return Err(ConfigError::ResolutionScale(self.resolution_scale));
        }
        let courant = self.courant_number();
        if courant >= COURANT_LIMIT {
            return Err(ConfigError::Unstable {
                courant,
                limit: COURANT_LIMIT,
            });
        }
        Ok(())
    }
}
