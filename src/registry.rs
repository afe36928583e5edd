use crate::{
    config::Config,
    object::{BBox, Trajectory},
};
use itertools::{Either, Itertools};
use std::ops::RangeFrom;
use tracing::debug;

/// Identity assigned to a track at creation, stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackId(pub usize);

/// A single persistent object: its identity, the refined boxes observed so
/// far, and the number of match events it survives without being selected.
#[derive(Clone, Debug)]
pub struct Track {
    pub id: TrackId,
    pub history: Vec<BBox>,
    pub survival_budget: u32,
}

impl Track {
    pub fn last_bbox(&self) -> &BBox {
        self.history.last().unwrap()
    }
}

/// Owns every live track. Tracks whose budget reaches zero are removed from
/// the pool and never come back; their ids are not reused.
pub struct TrackRegistry {
    tracks: Vec<Track>,
    unique_id_iter: RangeFrom<usize>,
    initial_budget: u32,
}

impl TrackRegistry {
    pub fn new(config: &Config) -> Self {
        let Config { initial_budget, .. } = *config;

        Self {
            tracks: Vec::new(),
            unique_id_iter: 1..,
            initial_budget,
        }
    }

    /// Live tracks in creation order. The order is stable, which is what
    /// makes equal-cost matches resolve to the earliest-created track.
    pub fn live_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|track| track.id == id)
    }

    pub fn get_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|track| track.id == id)
    }

    /// Allocate a new track seeded with the refiner's initial trajectory.
    pub fn create(&mut self, trajectory: Trajectory) -> TrackId {
        debug_assert!(!trajectory.is_empty());
        let id = TrackId(self.unique_id_iter.next().unwrap());
        self.tracks.push(Track {
            id,
            history: trajectory,
            survival_budget: self.initial_budget,
        });
        id
    }

    /// Decrement the budget of every live track except the winner, evicting
    /// tracks that hit zero. Called once per match event, so the whole
    /// population decays whenever any match occurs.
    pub fn decay_all_except(&mut self, winner_id: TrackId) {
        let (live, evicted): (Vec<Track>, Vec<TrackId>) =
            self.tracks.drain(..).partition_map(|mut track| {
                if track.id != winner_id {
                    track.survival_budget -= 1;
                }
                if track.survival_budget > 0 {
                    Either::Left(track)
                } else {
                    Either::Right(track.id)
                }
            });
        self.tracks = live;

        for id in evicted {
            debug!("track {} ran out of budget and was evicted", id.0);
        }
    }

    pub fn reset_budget(&mut self, id: TrackId) {
        let initial_budget = self.initial_budget;
        if let Some(track) = self.get_mut(id) {
            track.survival_budget = initial_budget;
        }
    }

    /// Number of track ids handed out so far, including evicted tracks.
    pub fn created_count(&self) -> usize {
        self.unique_id_iter.start - 1
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
