use crate::{
    config::Config,
    object::BBox,
    registry::{Track, TrackId},
};
use noisy_float::prelude::r64;

/// Greedy nearest-anchor association. A track is a candidate for a
/// detection only when the last known anchor is within the gate distance on
/// both axes independently; the cheapest gate approximation of "close
/// enough to be the same object between frames".
pub struct NearestMatcher {
    gate_distance: f64,
}

impl NearestMatcher {
    pub fn new(config: &Config) -> Self {
        let Config { gate_distance, .. } = *config;

        Self { gate_distance }
    }

    /// Nearest candidate track by squared anchor distance, or `None` when
    /// nothing gates. Ties resolve to the first candidate in iteration
    /// order, i.e. the earliest-created track.
    pub fn find_nearest<'a, I>(&self, detection: &BBox, live_tracks: I) -> Option<TrackId>
    where
        I: IntoIterator<Item = &'a Track>,
    {
        live_tracks
            .into_iter()
            .filter_map(|track| {
                let diff = (track.last_bbox().anchor() - detection.anchor()).abs();
                let within_gate = diff.x < self.gate_distance && diff.y < self.gate_distance;
                within_gate.then(|| (track.id, r64(diff.norm_squared())))
            })
            .min_by_key(|&(_, cost)| cost)
            .map(|(id, _)| id)
    }
}
