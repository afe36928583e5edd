use blob_tracking::config::Config;
use blob_tracking::error::TrackerError;
use blob_tracking::object::{BBox, OutputTrack, Trajectory};
use blob_tracking::pipeline::{Detector, FrameSource, Pipeline};
use blob_tracking::registry::TrackId;
use blob_tracking::PointRefiner;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

struct ScriptedSource {
    next: usize,
    last: usize,
}

fn frames(last: usize) -> ScriptedSource {
    ScriptedSource { next: 1, last }
}

impl FrameSource for ScriptedSource {
    type Frame = usize;

    fn next_frame(&mut self) -> Option<usize> {
        if self.next > self.last {
            return None;
        }
        let frame = self.next;
        self.next += 1;
        Some(frame)
    }
}

struct ScriptedDetector {
    per_frame: HashMap<usize, Vec<BBox>>,
}

impl Detector<usize> for ScriptedDetector {
    fn detect(&mut self, frame: &usize) -> Vec<BBox> {
        self.per_frame.get(frame).cloned().unwrap_or_default()
    }
}

struct PassThrough;

impl PointRefiner<usize> for PassThrough {
    fn initialize(&mut self, _frame: &usize, detection: &BBox) -> Result<Trajectory, TrackerError> {
        Ok(vec![detection.clone()])
    }

    fn refine(
        &mut self,
        _current: &usize,
        _previous: &usize,
        _history: &[BBox],
        detection: &BBox,
    ) -> Result<Trajectory, TrackerError> {
        Ok(vec![detection.clone()])
    }
}

/// Records the frame pair every refinement ran against.
struct Recording {
    refine_calls: Rc<RefCell<Vec<(usize, usize)>>>,
}

impl PointRefiner<usize> for Recording {
    fn initialize(&mut self, _frame: &usize, detection: &BBox) -> Result<Trajectory, TrackerError> {
        Ok(vec![detection.clone()])
    }

    fn refine(
        &mut self,
        current: &usize,
        previous: &usize,
        _history: &[BBox],
        detection: &BBox,
    ) -> Result<Trajectory, TrackerError> {
        self.refine_calls.borrow_mut().push((*current, *previous));
        Ok(vec![detection.clone()])
    }
}

fn bbox(x: f64, y: f64) -> BBox {
    BBox {
        x,
        y,
        width: 30.0,
        height: 20.0,
    }
}

#[test]
fn two_vehicles_tracked_until_one_fades_out() {
    // Frame 1 introduces the first vehicle, frame 2 moves it, frame 3
    // introduces a second one far away. From frame 4 on only the first
    // vehicle is detected, so the second one fades out after its ten
    // survival units are spent.
    let mut per_frame = HashMap::new();
    per_frame.insert(1, vec![bbox(100.0, 100.0)]);
    per_frame.insert(2, vec![bbox(110.0, 105.0)]);
    per_frame.insert(3, vec![bbox(500.0, 500.0)]);
    for frame in 4..=13 {
        per_frame.insert(frame, vec![bbox(110.0, 105.0)]);
    }

    let mut pipeline = Pipeline::new(
        &Config::default(),
        frames(13),
        ScriptedDetector { per_frame },
        PassThrough,
    )
    .unwrap();

    let mut snapshots: Vec<Vec<OutputTrack>> = Vec::new();
    let summary = pipeline.run(|tracks| snapshots.push(tracks.to_vec()));

    assert_eq!(snapshots.len(), 13);

    // Frame 1: a single fresh track.
    assert_eq!(snapshots[0].len(), 1);
    assert_eq!(snapshots[0][0].track_id, TrackId(1));
    assert_eq!(snapshots[0][0].history.len(), 1);

    // Frame 2: the detection at (110, 105) gates onto it (diffs 10 and 5).
    assert_eq!(snapshots[1].len(), 1);
    assert_eq!(snapshots[1][0].history.len(), 2);
    assert_eq!(snapshots[1][0].bbox, bbox(110.0, 105.0));

    // Frame 3: the far detection opens a second track.
    let ids: Vec<TrackId> = snapshots[2].iter().map(|t| t.track_id).collect();
    assert_eq!(ids, vec![TrackId(1), TrackId(2)]);

    // Frames 4-12: nine matches on track 1, track 2 still holding on.
    assert_eq!(snapshots[11].len(), 2);

    // Frame 13: the tenth match empties track 2's budget.
    assert_eq!(snapshots[12].len(), 1);
    assert_eq!(snapshots[12][0].track_id, TrackId(1));

    assert_eq!(summary.frames_read, 13);
    assert_eq!(summary.frames_processed, 13);
    assert_eq!(summary.tracks_created, 2);

    // Stream end tears everything down.
    assert!(pipeline.tracker().registry().is_empty());
}

#[test]
fn refinement_runs_against_the_last_frame_with_detections() {
    // Frame 2 yields no detections, so frame 3's refinement pairs frame 3
    // with frame 1, not with the empty frame 2.
    let mut per_frame = HashMap::new();
    per_frame.insert(1, vec![bbox(100.0, 100.0)]);
    per_frame.insert(3, vec![bbox(105.0, 102.0)]);

    let refine_calls = Rc::new(RefCell::new(Vec::new()));
    let mut pipeline = Pipeline::new(
        &Config::default(),
        frames(3),
        ScriptedDetector { per_frame },
        Recording {
            refine_calls: Rc::clone(&refine_calls),
        },
    )
    .unwrap();

    let summary = pipeline.run(|_| {});

    assert_eq!(*refine_calls.borrow(), vec![(3, 1)]);
    assert_eq!(summary.frames_read, 3);
    assert_eq!(summary.frames_processed, 2);
    assert_eq!(summary.tracks_created, 1);
}

#[test]
fn frames_without_detections_are_no_ops() {
    let mut pipeline = Pipeline::new(
        &Config::default(),
        frames(5),
        ScriptedDetector {
            per_frame: HashMap::new(),
        },
        PassThrough,
    )
    .unwrap();

    let mut observed = 0;
    let summary = pipeline.run(|_| observed += 1);

    assert_eq!(observed, 0);
    assert_eq!(summary.frames_read, 5);
    assert_eq!(summary.frames_processed, 0);
    assert_eq!(summary.tracks_created, 0);
}

#[test]
fn pipeline_rejects_invalid_config() {
    let config = Config {
        gate_distance: -1.0,
        ..Config::default()
    };

    let result = Pipeline::new(
        &config,
        frames(1),
        ScriptedDetector {
            per_frame: HashMap::new(),
        },
        PassThrough,
    );

    assert!(matches!(result, Err(TrackerError::InvalidConfig(_))));
}
