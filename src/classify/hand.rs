use crate::{
    error::Error,
    features::{distance, finger_extended, thumb_extended},
    gesture::Gesture,
    hand::{constants::FINGERS, HandKeypoint},
    landmark::{Keypoint, LandmarkSet, Modality},
};

const DEFAULT_PINCH_THRESHOLD: &str = "0.07";
const DEFAULT_FINGER_MARGIN: &str = "0.02";
const DEFAULT_THUMB_MARGIN: &str = "0.02";

#[derive(Debug, Clone, Copy, structopt::StructOpt)]
pub(crate) struct Classifier {
    /// Thumb tip to index tip distance below which the hand counts as pinching.
    #[structopt(short, long, default_value = DEFAULT_PINCH_THRESHOLD)]
    pub(crate) pinch_threshold: f32,
    /// How far a fingertip must rise above its middle joint to count as extended.
    #[structopt(short, long, default_value = DEFAULT_FINGER_MARGIN)]
    pub(crate) finger_margin: f32,
    /// How far the thumb tip must sit outside its joint to count as extended.
    #[structopt(short, long, default_value = DEFAULT_THUMB_MARGIN)]
    pub(crate) thumb_margin: f32,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            pinch_threshold: DEFAULT_PINCH_THRESHOLD.parse().unwrap(),
            finger_margin: DEFAULT_FINGER_MARGIN.parse().unwrap(),
            thumb_margin: DEFAULT_THUMB_MARGIN.parse().unwrap(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Features {
    pub(crate) pinch_distance: f32,
    pub(crate) thumb_extended: bool,
    /// Index, middle, ring, pinky.
    pub(crate) fingers_extended: [bool; 4],
}

impl Classifier {
    pub(crate) fn extract(&self, landmarks: &LandmarkSet) -> Result<Features, Error> {
        let thumb_tip = landmarks.point(HandKeypoint::ThumbTip)?;
        let mut fingers_extended = [false; 4];
        for (extended, &(tip, pip)) in fingers_extended.iter_mut().zip(FINGERS.iter()) {
            *extended = finger_extended(
                landmarks.point(tip)?,
                landmarks.point(pip)?,
                self.finger_margin,
            );
        }

        Ok(Features {
            pinch_distance: distance(thumb_tip, landmarks.point(HandKeypoint::IndexTip)?),
            thumb_extended: thumb_extended(
                thumb_tip,
                landmarks.point(HandKeypoint::ThumbIp)?,
                self.thumb_margin,
            ),
            fingers_extended,
        })
    }

    /// First matching rule wins: pinch, then fist, then L-shape.
    pub(crate) fn classify_features(&self, features: Features) -> Gesture {
        let Features {
            pinch_distance,
            thumb_extended,
            fingers_extended: [index, middle, ring, pinky],
        } = features;

        // a pinch can be made with any finger configuration
        if pinch_distance < self.pinch_threshold {
            Gesture::Run
        } else if !index && !middle && !ring && !pinky {
            Gesture::Duck
        } else if thumb_extended && index && !middle && !ring && !pinky {
            Gesture::Jump
        } else {
            Gesture::Idle
        }
    }
}

impl super::Classifier for Classifier {
    fn modality(&self) -> Modality {
        Modality::Hand
    }

    fn expected_landmarks(&self) -> usize {
        HandKeypoint::COUNT
    }

    fn classify(&self, landmarks: &LandmarkSet) -> Result<Gesture, Error> {
        self.validate_landmark_count(landmarks.len())?;
        self.extract(landmarks)
            .map(|features| self.classify_features(features))
    }
}
