use crate::{error::Error, point::Point};
use num_traits::cast::ToPrimitive;
use std::fmt;

/// Which body part the landmark source tracks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Modality {
    Pose,
    Hand,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pose => f.write_str("pose"),
            Self::Hand => f.write_str("hand"),
        }
    }
}

/// A fixed anatomical keypoint ordering. The discriminant is the landmark's
/// position in the set produced by the estimator.
pub(crate) trait Keypoint: Copy + fmt::Debug + ToPrimitive {
    const COUNT: usize;

    fn idx(self) -> Result<usize, Error> {
        self.to_usize()
            .ok_or_else(|| Error::KeypointVariantToUSize(format!("{:?}", self)))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub(crate) struct Landmark {
    pub(crate) point: Point,
    pub(crate) visibility: Option<f32>,
}

impl Landmark {
    pub(crate) fn new(x: f32, y: f32, visibility: Option<f32>) -> Result<Self, Error> {
        Ok(Self {
            point: Point::new(x, y)?,
            visibility,
        })
    }
}

/// One frame's worth of landmarks for a single subject.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct LandmarkSet {
    landmarks: Vec<Landmark>,
}

impl LandmarkSet {
    pub(crate) fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub(crate) fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub(crate) fn get<K: Keypoint>(&self, kind: K) -> Result<Landmark, Error> {
        let index = kind.idx()?;
        self.landmarks
            .get(index)
            .copied()
            .ok_or_else(|| Error::GetLandmark(index, self.landmarks.len()))
    }

    pub(crate) fn point<K: Keypoint>(&self, kind: K) -> Result<Point, Error> {
        self.get(kind).map(|landmark| landmark.point)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter()
    }
}
