//! Optional live particle counter.
//!
//! Tag any text entity with [`ParticleCountText`] and the plugin keeps it
//! current with the total live count across all streams. No tagged entity,
//! no work.

use bevy::prelude::*;

use crate::stream::StreamState;

/// Marker for text entities that display the live particle total.
#[derive(Component)]
pub struct ParticleCountText;

pub(crate) fn update_count_text(
    streams: Query<&StreamState>,
    mut texts: Query<&mut Text, With<ParticleCountText>>,
) {
    if texts.is_empty() {
        return;
    }
    let total: usize = streams.iter().map(|state| state.particles.len()).sum();
    for mut text in &mut texts {
        **text = format!("Particle count: {total}");
    }
}
