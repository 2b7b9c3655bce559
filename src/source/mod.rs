//! Adapters to external landmark estimators.
//!
//! Every adapter speaks the same newline-delimited JSON record, one per frame:
//!
//! ```json
//! {"detections": [{"score": 0.93, "landmarks": [{"x": 0.41, "y": 0.62, "visibility": 0.99}, ...]}]}
//! ```
//!
//! An empty `detections` list means no subject was found. An `error` string
//! reports an estimator-side failure for that frame.

use crate::{
    error::Error,
    frame::Frame,
    landmark::{Landmark, LandmarkSet},
};
use serde::Deserialize;
use tracing::warn;

mod replay;
mod subprocess;

pub(crate) use replay::Replay;
pub(crate) use subprocess::{Subprocess, Timeouts};

pub(crate) trait LandmarkSource {
    /// Landmarks for the single tracked subject in `frame`, or `None` when there is none.
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, Error>;

    /// Whether the source has nothing more to give (end of a recording).
    fn is_exhausted(&self) -> bool {
        false
    }
}

impl<L: LandmarkSource + ?Sized> LandmarkSource for Box<L> {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, Error> {
        (**self).detect(frame)
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

#[derive(Debug, Deserialize)]
struct LandmarkRecord {
    x: f32,
    y: f32,
    #[serde(default)]
    visibility: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct Detection {
    #[serde(default = "full_confidence")]
    score: f32,
    landmarks: Vec<LandmarkRecord>,
}

fn full_confidence() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    detections: Vec<Detection>,
    #[serde(default)]
    error: Option<String>,
}

/// Filters applied to every record before it reaches the classifier.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Selection {
    pub(crate) expected_landmarks: usize,
    pub(crate) min_confidence: f32,
}

impl Selection {
    /// Parse one record line and return the first confident, well-formed detection.
    pub(crate) fn parse(&self, line: &str) -> Result<Option<LandmarkSet>, Error> {
        let record: Record = serde_json::from_str(line.trim())
            .map_err(|e| Error::ParseRecord(e, line.trim().to_owned()))?;

        if let Some(error) = record.error {
            return Err(Error::EstimatorReported(error));
        }

        for detection in record.detections {
            if detection.score < self.min_confidence {
                continue;
            }
            if detection.landmarks.len() != self.expected_landmarks {
                warn!(
                    message = "skipping detection with unexpected landmark count",
                    expected = self.expected_landmarks,
                    got = detection.landmarks.len()
                );
                continue;
            }
            return detection
                .landmarks
                .into_iter()
                .map(|LandmarkRecord { x, y, visibility }| Landmark::new(x, y, visibility))
                .collect::<Result<Vec<_>, _>>()
                .map(|landmarks| Some(LandmarkSet::new(landmarks)));
        }

        Ok(None)
    }
}
