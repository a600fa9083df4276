//! Stream component, emitter scheduling, and the per-frame simulation pass.
//!
//! A stream is one entity carrying [`ParticleStream`] (the immutable
//! invocation parameters) and [`StreamState`] (the live set plus emitter
//! bookkeeping, auto-inserted by the plugin). Each live particle owns a
//! separate quad entity whose material carries the sprite image and the
//! stream's blend mode; the systems here run chained, so the store is only
//! ever mutated from one system at a time.

use std::time::Duration;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::particle::Particle;
use crate::settings::{BlendMode, StreamSettings};

/// Z spacing between consecutive store slots; insertion order becomes
/// draw/overlap order.
const LAYER_STEP: f32 = 1e-3;

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Bound on the live store size, applied at spawn time.
///
/// The default preserves the classic behavior: an uncapped emitter whose
/// particles outlive the spawn cadence grows the store without bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum CapacityPolicy {
    /// No bound; spawning is unconditional regardless of store size.
    #[default]
    Unbounded,
    /// Evict the oldest live particle to make room for a new one.
    DropOldest(usize),
    /// Skip the spawn while the store is full; refused spawns do not count
    /// toward the born total.
    Refuse(usize),
}

/// One particle stream invocation: settings plus the optional spawn cap.
///
/// Spawn this on an entity; the plugin inserts the runtime [`StreamState`]
/// and drives emission and simulation from there. The drawing surface is the
/// primary window.
#[derive(Component, Clone, Debug, Reflect)]
pub struct ParticleStream {
    /// Fully-resolved settings, shared read-only by every particle born
    /// in this stream.
    pub settings: StreamSettings,
    /// Stop emitting (irreversibly) once this many particles were born.
    pub limit: Option<u32>,
    /// Store-size policy applied before each spawn.
    pub capacity: CapacityPolicy,
    /// Seed for the stream's rng; random when absent.
    pub seed: Option<u64>,
}

impl ParticleStream {
    pub fn new(settings: StreamSettings) -> Self {
        Self {
            settings,
            limit: None,
            capacity: CapacityPolicy::default(),
            seed: None,
        }
    }

    /// Cap the total number of particles ever born by this stream.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_capacity_policy(mut self, capacity: CapacityPolicy) -> Self {
        self.capacity = capacity;
        self
    }

    /// Fix the rng seed, making every birth deterministic.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Runtime state of a stream: the insertion-ordered live store plus emitter
/// bookkeeping. Auto-inserted on entities with [`ParticleStream`].
#[derive(Component)]
pub struct StreamState {
    /// Live particles in insertion order. Appended exactly once per spawn;
    /// removed exactly once by the first compaction pass after death.
    pub particles: Vec<Particle>,
    /// Fixed-delay spawn cadence.
    pub emit_timer: Timer,
    /// Total particles born over the stream's lifetime; monotonic.
    pub born: u32,
    /// One-way flag set once the spawn cap is reached.
    pub stopped: bool,
    /// Blend mode resolved once from the settings' name; applied to every
    /// particle material at spawn.
    pub blend: BlendMode,
    /// Shared sprite image; drawing an unready image is a visual no-op.
    pub sprite: Handle<Image>,
    /// Shared unit quad scaled per particle.
    pub mesh: Handle<Mesh>,
    rng: fastrand::Rng,
    /// Latches the one-shot warning for negative size/opacity.
    warned_negative: bool,
}

impl StreamState {
    pub(crate) fn new(stream: &ParticleStream, sprite: Handle<Image>, mesh: Handle<Mesh>) -> Self {
        Self {
            particles: Vec::new(),
            emit_timer: Timer::new(
                Duration::from_millis(stream.settings.emit_delay_ms),
                TimerMode::Repeating,
            ),
            born: 0,
            stopped: false,
            blend: stream.settings.blend_mode(),
            sprite,
            mesh,
            rng: stream.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed),
            warned_negative: false,
        }
    }
}

/// Marker for the quad entities that draw stream particles.
#[derive(Component)]
pub struct StreamSprite;

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Auto-insert [`StreamState`] for streams that don't have one yet, kicking
/// off the sprite image load.
pub(crate) fn init_streams(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    query: Query<(Entity, &ParticleStream), Without<StreamState>>,
) {
    for (entity, stream) in &query {
        let sprite = asset_server.load(&stream.settings.texture);
        let mesh = meshes.add(Rectangle::from_size(Vec2::ONE));
        commands
            .entity(entity)
            .insert(StreamState::new(stream, sprite, mesh));
    }
}

/// Spawn new particles on each finished tick of the stream's emit timer.
///
/// Spawning is unconditional with the default capacity policy; once the
/// born total reaches the configured limit the stream stops for good.
pub(crate) fn emit_particles(
    mut commands: Commands,
    time: Res<Time>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut streams: Query<(&ParticleStream, &mut StreamState)>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let (width, height) = (window.width(), window.height());

    for (stream, mut state) in &mut streams {
        if state.stopped {
            continue;
        }
        state.emit_timer.tick(time.delta());
        let due = state.emit_timer.times_finished_this_tick();

        for _ in 0..due {
            if state.stopped {
                break;
            }
            match stream.capacity {
                CapacityPolicy::Unbounded => {}
                CapacityPolicy::Refuse(max) if state.particles.len() >= max => continue,
                CapacityPolicy::Refuse(_) => {}
                CapacityPolicy::DropOldest(max) => {
                    while state.particles.len() >= max.max(1) {
                        let evicted = state.particles.remove(0);
                        commands.entity(evicted.entity).try_despawn();
                    }
                }
            }

            let mut particle = Particle::spawn(&stream.settings, width, height, &mut state.rng);
            // One material per particle: alpha decays independently, and the
            // resolved blend mode picks the compositing.
            let material = materials.add(ColorMaterial {
                color: Color::srgba(1.0, 1.0, 1.0, particle.opacity),
                alpha_mode: state.blend.to_bevy(),
                texture: Some(state.sprite.clone()),
                ..default()
            });
            particle.entity = commands
                .spawn((
                    StreamSprite,
                    Mesh2d(state.mesh.clone()),
                    MeshMaterial2d(material),
                    Transform::from_translation(surface_to_world(
                        particle.x,
                        particle.y,
                        width,
                        height,
                        state.particles.len() as f32 * LAYER_STEP,
                    ))
                    .with_scale(Vec3::new(particle.size, particle.size, 1.0)),
                ))
                .id();
            state.particles.push(particle);
            state.born += 1;

            if let Some(limit) = stream.limit
                && state.born >= limit
            {
                state.stopped = true;
            }
        }
    }
}

/// Remove every particle flagged dead on a previous frame, preserving the
/// relative order of survivors.
///
/// Despawn-then-retain is a stable filter; nothing is removed while the
/// store is being forward-iterated.
pub(crate) fn compact_streams(mut commands: Commands, mut streams: Query<&mut StreamState>) {
    for mut state in &mut streams {
        if !state.particles.iter().any(|p| p.dead) {
            continue;
        }
        for particle in state.particles.iter().filter(|p| p.dead) {
            commands.entity(particle.entity).try_despawn();
        }
        state.particles.retain(|p| !p.dead);
    }
}

/// Step every live particle, in store order.
pub(crate) fn update_particles(mut streams: Query<(&ParticleStream, &mut StreamState)>) {
    for (stream, mut state) in &mut streams {
        let state = &mut *state;
        for particle in state.particles.iter_mut() {
            if particle.dead {
                continue;
            }
            particle.step(&stream.settings);

            if !state.warned_negative && (particle.size < 0.0 || particle.opacity < 0.0) {
                state.warned_negative = true;
                warn!(
                    "particle size/opacity went negative (size {}, opacity {}); \
                     check size_mult/opacity_mult against the birth jitter",
                    particle.size, particle.opacity
                );
            }
        }
    }
}

/// Write each particle's surface-space state to its quad entity.
///
/// Runs after the update pass and before compaction has seen this frame's
/// deaths, so a particle that died this frame is still drawn once more.
pub(crate) fn sync_sprites(
    windows: Query<&Window, With<PrimaryWindow>>,
    streams: Query<&StreamState>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut quads: Query<(&mut Transform, &MeshMaterial2d<ColorMaterial>), With<StreamSprite>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let (width, height) = (window.width(), window.height());

    for state in &streams {
        for (slot, particle) in state.particles.iter().enumerate() {
            let Ok((mut transform, material)) = quads.get_mut(particle.entity) else {
                continue;
            };
            transform.translation = surface_to_world(
                particle.x,
                particle.y,
                width,
                height,
                slot as f32 * LAYER_STEP,
            );
            // Canvas angles are clockwise-positive (y down); Bevy rotates
            // counter-clockwise.
            transform.rotation = Quat::from_rotation_z(-particle.angle.to_radians());
            transform.scale = Vec3::new(particle.size, particle.size, 1.0);
            if let Some(material) = materials.get_mut(&material.0) {
                material.color = Color::srgba(1.0, 1.0, 1.0, particle.opacity);
            }
        }
    }
}

/// Outline the emission zone in green when `zone_visible` is set.
pub(crate) fn draw_emission_zone(
    mut gizmos: Gizmos,
    windows: Query<&Window, With<PrimaryWindow>>,
    streams: Query<&ParticleStream>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let (width, height) = (window.width(), window.height());

    for stream in &streams {
        let settings = &stream.settings;
        if !settings.zone_visible {
            continue;
        }
        let left = width * settings.emit_left / 100.0;
        let right = width * settings.emit_right / 100.0;
        let top = height * settings.emit_top / 100.0;
        let bottom = height * settings.emit_bottom / 100.0;

        let center =
            surface_to_world((left + right) / 2.0, (top + bottom) / 2.0, width, height, 0.0);
        gizmos.rect_2d(
            Isometry2d::from_translation(center.truncate()),
            Vec2::new(right - left, bottom - top),
            Color::srgb(0.0, 1.0, 0.0),
        );
    }
}

/// Despawn orphaned sprites and drop the state when a stream's
/// [`ParticleStream`] component is removed out from under it.
pub(crate) fn cleanup_streams(
    mut commands: Commands,
    mut query: Query<(Entity, &mut StreamState), Without<ParticleStream>>,
) {
    for (entity, mut state) in &mut query {
        for particle in state.particles.drain(..) {
            commands.entity(particle.entity).try_despawn();
        }
        commands.entity(entity).remove::<StreamState>();
    }
}

/// Map surface coordinates (origin top-left, y down) to world space, with
/// the sprite's store slot as its z layer.
fn surface_to_world(x: f32, y: f32, width: f32, height: f32, layer: f32) -> Vec3 {
    Vec3::new(x - width / 2.0, height / 2.0 - y, layer)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
