//! Declarative settings model for a sprite stream.
//!
//! A `StreamSettings` value is resolved once, before the stream starts, and
//! is never mutated afterwards: every particle born in the same stream reads
//! the same settings. All fields are required; deserializing a RON document
//! with a missing or mistyped field fails with [`SettingsError`] instead of
//! silently propagating bad numbers into the simulation.

use std::path::Path;

use bevy::prelude::*;
use bevy::sprite_render::AlphaMode2d;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Raised at configuration-resolution time, before any simulation starts.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    /// The RON document is malformed, or a required field is missing or of
    /// the wrong type.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Complete parameter set for one particle stream.
///
/// Lifespan, fade-start, and wave/wobble frequencies are measured in frames;
/// the simulation advances one step per rendered frame. Emission zone bounds
/// are percentages of the surface extent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Reflect)]
pub struct StreamSettings {
    /// Asset path of the sprite image drawn for every particle.
    pub texture: String,
    /// Blend mode name. Unknown names silently fall back to normal alpha
    /// blending, matching how a canvas ignores unsupported composite modes.
    pub blending: String,
    /// Delay between consecutive spawns, in milliseconds.
    pub emit_delay_ms: u64,

    // -- emission zone (percent of surface extent) --
    pub emit_left: f32,
    pub emit_right: f32,
    pub emit_top: f32,
    pub emit_bottom: f32,
    /// Draw a preview outline of the emission zone.
    pub zone_visible: bool,

    // -- kinematics --
    /// Vertical speed per frame, percent. Negative moves up.
    pub gravity: f32,
    /// Jitter multiplier applied to the birth vertical speed.
    pub gravity_jitter: f32,
    /// Horizontal dispersion of the birth velocity.
    pub spread_x: f32,
    /// Constant horizontal push.
    pub wind: f32,
    /// Amplitude of the sideways wave motion.
    pub wave_size: f32,
    /// Period of the wave motion, in frames.
    pub wave_freq: f32,

    // -- lifespan (frames) --
    pub life: f32,
    pub life_jitter: f32,
    /// Age at which opacity/size decay begins.
    pub fade_start: f32,
    pub fade_start_jitter: f32,

    // -- size (pixels) --
    pub size: f32,
    pub size_jitter: f32,
    /// Per-frame size multiplier once decay has begun.
    pub size_mult: f32,

    // -- rotation (degrees) --
    pub rotation: f32,
    pub rotation_jitter: f32,
    /// Oscillate back and forth instead of spinning at a constant rate.
    pub wobble: bool,
    /// Rotation speed per frame; doubles as the wobble amplitude.
    pub rotation_amount: f32,
    /// Period of the wobble oscillation, in frames.
    pub wobble_freq: f32,
    /// Spin clockwise or counter-clockwise, decided per particle at birth.
    pub rotation_dual: bool,

    // -- opacity (percent at birth) --
    pub opacity: f32,
    pub opacity_jitter: f32,
    /// Per-frame opacity multiplier once decay has begun.
    pub opacity_mult: f32,
}

impl StreamSettings {
    /// Parse settings from a RON document. Every field is required.
    pub fn from_ron(source: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(source)?)
    }

    /// Read and parse settings from a RON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Resolve the configured blend mode name, falling back silently.
    pub fn blend_mode(&self) -> BlendMode {
        BlendMode::from_name(&self.blending).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Blend mode
// ---------------------------------------------------------------------------

/// Compositing mode for particle sprites, resolved from the settings'
/// `blending` name.
///
/// An unrecognized name resolves to [`BlendMode::Blend`] without an error,
/// matching how a canvas ignores unsupported composite modes.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum BlendMode {
    /// Normal source-over alpha blending.
    #[default]
    Blend,
    Screen,
    Overlay,
    Multiply,
    ColorDodge,
    Add,
}

impl BlendMode {
    /// Resolve a canvas-style composite mode name. Returns `None` for names
    /// this crate does not recognize.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "" | "source-over" | "blend" => Some(Self::Blend),
            "screen" => Some(Self::Screen),
            "overlay" => Some(Self::Overlay),
            "multiply" => Some(Self::Multiply),
            "color-dodge" => Some(Self::ColorDodge),
            "lighter" | "add" => Some(Self::Add),
            _ => None,
        }
    }

    /// Convert to Bevy's `AlphaMode2d` for use with `ColorMaterial`.
    ///
    /// Screen and color-dodge are lightening modes the 2d material pipeline
    /// cannot express exactly; additive is the closest it has. The darkening
    /// modes fall back silently to plain alpha compositing.
    pub fn to_bevy(self) -> AlphaMode2d {
        match self {
            Self::Blend | Self::Overlay | Self::Multiply => AlphaMode2d::Blend,
            Self::Add | Self::Screen | Self::ColorDodge => AlphaMode2d::Add,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
