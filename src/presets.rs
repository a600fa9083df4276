//! Default stream settings presets.

use crate::settings::StreamSettings;

/// Return the built-in stream presets as `(name, settings)` pairs.
pub fn default_presets() -> Vec<(&'static str, StreamSettings)> {
    vec![
        ("Rising Haze", rising_haze()),
        ("Falling Snow", falling_snow()),
        ("Embers", embers()),
    ]
}

/// Large soft shapes drifting up from the lower band, with wobble and a
/// color-dodge blend. Good for smoke and heat haze.
fn rising_haze() -> StreamSettings {
    StreamSettings {
        texture: "textures/particles/smoke_puff.png".into(),
        blending: "color-dodge".into(),
        emit_delay_ms: 30,
        emit_left: 10.0,
        emit_right: 90.0,
        emit_top: 80.0,
        emit_bottom: 90.0,
        zone_visible: false,
        gravity: -4.0,
        gravity_jitter: 2.0,
        spread_x: 0.5,
        wind: 2.0,
        wave_size: 1.0,
        wave_freq: 80.0,
        life: 250.0,
        life_jitter: 20.0,
        fade_start: 150.0,
        fade_start_jitter: 20.0,
        size: 110.0,
        size_jitter: 80.0,
        size_mult: 0.98,
        rotation: 0.0,
        rotation_jitter: 15.0,
        wobble: true,
        rotation_amount: 1.2,
        wobble_freq: 40.0,
        rotation_dual: false,
        opacity: 100.0,
        opacity_jitter: 0.0,
        opacity_mult: 0.8,
    }
}

/// Small flakes sinking slowly across the full width, swaying side to side.
fn falling_snow() -> StreamSettings {
    StreamSettings {
        texture: "textures/particles/snowflake.png".into(),
        blending: String::new(),
        emit_delay_ms: 60,
        emit_left: 0.0,
        emit_right: 100.0,
        emit_top: 0.0,
        emit_bottom: 5.0,
        zone_visible: false,
        gravity: 3.0,
        gravity_jitter: 2.0,
        spread_x: 0.2,
        wind: -1.0,
        wave_size: 2.0,
        wave_freq: 120.0,
        life: 600.0,
        life_jitter: 100.0,
        fade_start: 500.0,
        fade_start_jitter: 50.0,
        size: 18.0,
        size_jitter: 10.0,
        size_mult: 1.0,
        rotation: 0.0,
        rotation_jitter: 180.0,
        wobble: true,
        rotation_amount: 0.6,
        wobble_freq: 90.0,
        rotation_dual: false,
        opacity: 90.0,
        opacity_jitter: 10.0,
        opacity_mult: 0.97,
    }
}

/// Fast bright sparks shooting up, spinning in both directions and burning
/// out early with an additive blend.
fn embers() -> StreamSettings {
    StreamSettings {
        texture: "textures/particles/spark.png".into(),
        blending: "lighter".into(),
        emit_delay_ms: 15,
        emit_left: 45.0,
        emit_right: 55.0,
        emit_top: 90.0,
        emit_bottom: 95.0,
        zone_visible: false,
        gravity: -8.0,
        gravity_jitter: 3.0,
        spread_x: 1.5,
        wind: 0.5,
        wave_size: 0.5,
        wave_freq: 40.0,
        life: 90.0,
        life_jitter: 30.0,
        fade_start: 40.0,
        fade_start_jitter: 15.0,
        size: 12.0,
        size_jitter: 8.0,
        size_mult: 0.96,
        rotation: 0.0,
        rotation_jitter: 180.0,
        wobble: false,
        rotation_amount: 4.0,
        wobble_freq: 40.0,
        rotation_dual: true,
        opacity: 100.0,
        opacity_jitter: 20.0,
        opacity_mult: 0.92,
    }
}
