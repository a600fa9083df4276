//! # bevy_sprite_stream
//!
//! Streamed 2D sprite particles for Bevy: a continuous emitter drops
//! textured sprites into a rectangular zone of the window and pushes them
//! around with gravity, wind, sinusoidal drift, and rotation until an
//! age-gated decay fades them out.
//!
//! All simulation runs on the CPU in surface coordinates (origin top-left,
//! y down, like a 2D canvas); each particle owns one textured quad entity
//! that is synced from the simulated state every frame, composited with the
//! stream's configured blend mode.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_sprite_stream::{ParticleStream, SpriteStreamPlugin, StreamSettings};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(SpriteStreamPlugin)
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     commands.spawn(Camera2d);
//!     let settings = StreamSettings::load("assets/streams/haze.ron").unwrap();
//!     commands.spawn(ParticleStream::new(settings).with_limit(200));
//! }
//! ```

pub mod hud;
pub mod particle;
pub mod presets;
pub mod settings;
pub mod stream;

pub use hud::ParticleCountText;
pub use particle::Particle;
pub use settings::{BlendMode, SettingsError, StreamSettings};
pub use stream::{CapacityPolicy, ParticleStream, StreamState, StreamSprite};

use bevy::prelude::*;

/// Main stream plugin. Registers types and the chained per-frame pass:
/// emit, compact last frame's deaths, step, then sync sprites.
pub struct SpriteStreamPlugin;

impl Plugin for SpriteStreamPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<StreamSettings>()
            .register_type::<BlendMode>()
            .register_type::<ParticleStream>()
            .register_type::<CapacityPolicy>()
            .add_systems(
                Update,
                (
                    stream::init_streams,
                    stream::emit_particles,
                    stream::compact_streams,
                    stream::update_particles,
                    stream::sync_sprites,
                    stream::draw_emission_zone,
                    hud::update_count_text,
                    stream::cleanup_streams,
                )
                    .chain(),
            );
    }
}
