use crate::{
    config::Config,
    error::TrackerError,
    nearest::NearestMatcher,
    object::{BBox, OutputTrack, Trajectory},
    registry::TrackRegistry,
};
use tracing::{debug, warn};

/// Boundary to the external optical-flow point tracker, generic over the
/// opaque frame type `F`.
///
/// Both modes return the refined trajectory for the detection. An `Err` or
/// an empty trajectory means the refiner could not lock onto the object;
/// the detection is then dropped for the frame.
pub trait PointRefiner<F> {
    /// Seed a trajectory for an object seen for the first time.
    fn initialize(&mut self, frame: &F, detection: &BBox) -> Result<Trajectory, TrackerError>;

    /// Refine the position of a previously tracked object across two
    /// consecutive frames.
    fn refine(
        &mut self,
        current: &F,
        previous: &F,
        history: &[BBox],
        detection: &BBox,
    ) -> Result<Trajectory, TrackerError>;
}

/// This is the main struct to associate per-frame detections into
/// persistent tracks.
pub struct Tracker {
    registry: TrackRegistry,
    matcher: NearestMatcher,
}

impl Tracker {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: TrackRegistry::new(config),
            matcher: NearestMatcher::new(config),
        }
    }

    /// Associate one frame's detections with the live tracks.
    ///
    /// Each detection either extends the nearest gated track with the
    /// refiner's output, or seeds a new track when nothing gates. Selecting
    /// a winner immediately decays every other live track and restores the
    /// winner's budget, before refinement is attempted.
    ///
    /// Example:
    ///
    /// ```rust
    /// use blob_tracking::config::Config;
    /// use blob_tracking::error::TrackerError;
    /// use blob_tracking::object::{BBox, Trajectory};
    /// use blob_tracking::{PointRefiner, Tracker};
    ///
    /// struct PassThrough;
    ///
    /// impl PointRefiner<()> for PassThrough {
    ///     fn initialize(
    ///         &mut self,
    ///         _frame: &(),
    ///         detection: &BBox,
    ///     ) -> Result<Trajectory, TrackerError> {
    ///         Ok(vec![detection.clone()])
    ///     }
    ///
    ///     fn refine(
    ///         &mut self,
    ///         _current: &(),
    ///         _previous: &(),
    ///         _history: &[BBox],
    ///         detection: &BBox,
    ///     ) -> Result<Trajectory, TrackerError> {
    ///         Ok(vec![detection.clone()])
    ///     }
    /// }
    ///
    /// let mut tracker = Tracker::new(&Config::default());
    /// let mut refiner = PassThrough;
    ///
    /// let detections = vec![BBox { x: 100.0, y: 100.0, width: 30.0, height: 20.0 }];
    /// tracker.process_frame(&mut refiner, &detections, &(), &());
    /// assert_eq!(tracker.output_tracks().len(), 1);
    ///
    /// let detections = vec![BBox { x: 110.0, y: 105.0, width: 30.0, height: 20.0 }];
    /// tracker.process_frame(&mut refiner, &detections, &(), &());
    /// assert_eq!(tracker.output_tracks()[0].history.len(), 2);
    /// ```
    pub fn process_frame<F, R>(
        &mut self,
        refiner: &mut R,
        detections: &[BBox],
        previous_frame: &F,
        current_frame: &F,
    ) where
        R: PointRefiner<F>,
    {
        for detection in detections {
            match self
                .matcher
                .find_nearest(detection, self.registry.live_tracks())
            {
                Some(winner_id) => {
                    self.registry.decay_all_except(winner_id);
                    self.registry.reset_budget(winner_id);

                    let refined = {
                        let track = self.registry.get(winner_id).unwrap();
                        refiner.refine(current_frame, previous_frame, &track.history, detection)
                    };
                    match refined {
                        Ok(trajectory) => match trajectory.last() {
                            Some(latest) => {
                                let track = self.registry.get_mut(winner_id).unwrap();
                                track.history.push(latest.clone());
                                debug!(
                                    "track {} updated, history has {} boxes",
                                    winner_id.0,
                                    track.history.len()
                                );
                            }
                            None => warn!(
                                "refiner returned an empty trajectory for track {}, \
                                 dropping detection at ({}, {})",
                                winner_id.0, detection.x, detection.y
                            ),
                        },
                        Err(err) => warn!(
                            "dropping detection at ({}, {}): {err}",
                            detection.x, detection.y
                        ),
                    }
                }
                None => match refiner.initialize(current_frame, detection) {
                    Ok(trajectory) if !trajectory.is_empty() => {
                        let id = self.registry.create(trajectory);
                        debug!(
                            "new track {}, {} tracks seen in total",
                            id.0,
                            self.registry.created_count()
                        );
                    }
                    Ok(_) => warn!(
                        "refiner returned an empty seed trajectory, dropping detection at ({}, {})",
                        detection.x, detection.y
                    ),
                    Err(err) => warn!(
                        "dropping detection at ({}, {}): {err}",
                        detection.x, detection.y
                    ),
                },
            }
        }
    }

    /// Live track views for drawing: id, latest box, and full history.
    pub fn output_tracks(&self) -> Vec<OutputTrack> {
        self.registry
            .live_tracks()
            .map(|track| OutputTrack {
                track_id: track.id,
                bbox: track.last_bbox().clone(),
                history: track.history.clone(),
            })
            .collect()
    }

    pub fn registry(&self) -> &TrackRegistry {
        &self.registry
    }

    /// Drop every live track. Called at stream end.
    pub fn clear(&mut self) {
        self.registry.clear();
    }
}
