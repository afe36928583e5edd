use crate::{
    config::Config,
    error::TrackerError,
    object::{BBox, OutputTrack},
    tracker::{PointRefiner, Tracker},
};
use tracing::debug;

/// Produces frames in strict temporal order. `None` means the stream ended.
pub trait FrameSource {
    type Frame;

    fn next_frame(&mut self) -> Option<Self::Frame>;
}

/// Boundary to the external motion/blob detector. An empty detection list
/// means there is no work for the frame.
pub trait Detector<F> {
    fn detect(&mut self, frame: &F) -> Vec<BBox>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub frames_read: usize,
    pub frames_processed: usize,
    pub tracks_created: usize,
}

/// Single-threaded control loop: pull a frame, detect, associate. The only
/// blocking point is the frame source.
pub struct Pipeline<S, D, R> {
    source: S,
    detector: D,
    refiner: R,
    tracker: Tracker,
}

impl<S, D, R> Pipeline<S, D, R>
where
    S: FrameSource,
    D: Detector<S::Frame>,
    R: PointRefiner<S::Frame>,
{
    pub fn new(config: &Config, source: S, detector: D, refiner: R) -> Result<Self, TrackerError> {
        config.validate()?;

        Ok(Self {
            source,
            detector,
            refiner,
            tracker: Tracker::new(config),
        })
    }

    /// Drive the loop until the source ends, then drop all live tracks.
    ///
    /// `observe` receives the live track views after every processed frame.
    /// The previous-frame slot only advances past frames that produced
    /// detections; on the first processed frame, when no track can match
    /// anyway, the current frame stands in for the missing previous one.
    pub fn run(&mut self, mut observe: impl FnMut(&[OutputTrack])) -> PipelineSummary {
        let mut summary = PipelineSummary::default();
        let mut previous_frame: Option<S::Frame> = None;

        while let Some(frame) = self.source.next_frame() {
            summary.frames_read += 1;

            let detections = self.detector.detect(&frame);
            if detections.is_empty() {
                debug!("no detections in frame {}", summary.frames_read);
                continue;
            }

            let reference = previous_frame.as_ref().unwrap_or(&frame);
            self.tracker
                .process_frame(&mut self.refiner, &detections, reference, &frame);
            summary.frames_processed += 1;

            observe(&self.tracker.output_tracks());
            previous_frame = Some(frame);
        }

        summary.tracks_created = self.tracker.registry().created_count();
        debug!(
            "stream ended after {} frames, {} tracks seen in total",
            summary.frames_read, summary.tracks_created
        );
        self.tracker.clear();

        summary
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }
}
