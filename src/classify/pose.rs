use crate::{
    error::Error,
    features::average_height,
    gesture::Gesture,
    landmark::{Keypoint, LandmarkSet, Modality},
    pose::PoseKeypoint,
};

const DEFAULT_JUMP_THRESHOLD: &str = "0.3";
const DEFAULT_DUCK_THRESHOLD: &str = "0.3";

#[derive(Debug, Clone, Copy, structopt::StructOpt)]
pub(crate) struct Classifier {
    /// How far above the shoulder line the wrists must be raised to jump.
    #[structopt(short, long, default_value = DEFAULT_JUMP_THRESHOLD)]
    pub(crate) jump_threshold: f32,
    /// How far below the shoulder line the hips must drop to duck.
    #[structopt(short, long, default_value = DEFAULT_DUCK_THRESHOLD)]
    pub(crate) duck_threshold: f32,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            jump_threshold: DEFAULT_JUMP_THRESHOLD.parse().unwrap(),
            duck_threshold: DEFAULT_DUCK_THRESHOLD.parse().unwrap(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Features {
    pub(crate) shoulder_height: f32,
    pub(crate) wrist_height: f32,
    pub(crate) hip_height: f32,
}

impl Features {
    pub(crate) fn extract(landmarks: &LandmarkSet) -> Result<Self, Error> {
        use PoseKeypoint::*;

        let pair_height = |left: PoseKeypoint, right: PoseKeypoint| -> Result<f32, Error> {
            Ok(average_height(
                landmarks.point(left)?,
                landmarks.point(right)?,
            ))
        };

        Ok(Self {
            shoulder_height: pair_height(LeftShoulder, RightShoulder)?,
            wrist_height: pair_height(LeftWrist, RightWrist)?,
            hip_height: pair_height(LeftHip, RightHip)?,
        })
    }
}

impl Classifier {
    pub(crate) fn classify_features(&self, features: Features) -> Gesture {
        let Features {
            shoulder_height,
            wrist_height,
            hip_height,
        } = features;

        if wrist_height < shoulder_height - self.jump_threshold {
            Gesture::Jump
        } else if hip_height > shoulder_height + self.duck_threshold {
            Gesture::Duck
        } else {
            Gesture::Idle
        }
    }
}

impl super::Classifier for Classifier {
    fn modality(&self) -> Modality {
        Modality::Pose
    }

    fn expected_landmarks(&self) -> usize {
        PoseKeypoint::COUNT
    }

    fn classify(&self, landmarks: &LandmarkSet) -> Result<Gesture, Error> {
        self.validate_landmark_count(landmarks.len())?;
        Features::extract(landmarks).map(|features| self.classify_features(features))
    }
}
