use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Rejected configuration, reported before the pipeline starts.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The point-refinement service could not produce a trajectory for a
    /// detection. Recovered locally: the detection is dropped for the frame.
    #[error("point refinement failed for detection at ({x:.1}, {y:.1})")]
    RefinementFailure { x: f64, y: f64 },
}
