use crate::{
    error::Error,
    gesture::Gesture,
    landmark::{LandmarkSet, Modality},
};

pub(crate) trait Classifier {
    /// The modality whose landmark ordering this classifier reads.
    fn modality(&self) -> Modality;

    /// Return the number of landmarks the classifier expects to operate on.
    fn expected_landmarks(&self) -> usize;

    /// Map one frame's landmarks to a raw gesture label.
    fn classify(&self, landmarks: &LandmarkSet) -> Result<Gesture, Error>;

    /// Validate that the landmark set has the expected number of points.
    fn validate_landmark_count(&self, landmark_count: usize) -> Result<(), Error> {
        let expected_landmarks = self.expected_landmarks();
        if landmark_count != expected_landmarks {
            Err(Error::GetExpectedNumLandmarks(
                expected_landmarks,
                self.modality(),
                landmark_count,
            ))
        } else {
            Ok(())
        }
    }
}

pub(crate) mod hand;
pub(crate) mod pose;

#[derive(Debug, Clone, Copy, structopt::StructOpt)]
pub(crate) enum Classify {
    /// Classify body pose landmarks: raised wrists jump, dropped hips duck
    Pose(pose::Classifier),
    /// Classify hand landmarks: L-shape jumps, fist ducks, pinch runs
    Hand(hand::Classifier),
}

impl Default for Classify {
    fn default() -> Self {
        Self::Hand(hand::Classifier::default())
    }
}

impl Classifier for Classify {
    fn modality(&self) -> Modality {
        match self {
            Self::Pose(c) => c.modality(),
            Self::Hand(c) => c.modality(),
        }
    }

    fn expected_landmarks(&self) -> usize {
        match self {
            Self::Pose(c) => c.expected_landmarks(),
            Self::Hand(c) => c.expected_landmarks(),
        }
    }

    fn classify(&self, landmarks: &LandmarkSet) -> Result<Gesture, Error> {
        match self {
            Self::Pose(c) => c.classify(landmarks),
            Self::Hand(c) => c.classify(landmarks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Classifier, Classify};
    use crate::{error::Error, landmark::testing, landmark::Modality};

    #[test]
    fn default_is_hand() {
        let classify = Classify::default();
        assert_eq!(classify.modality(), Modality::Hand);
        assert_eq!(classify.expected_landmarks(), 21);
    }

    #[test]
    fn wrong_landmark_count_is_rejected() {
        let classify = Classify::default();
        let landmarks = testing::centered(33);
        assert!(matches!(
            classify.classify(&landmarks),
            Err(Error::GetExpectedNumLandmarks(21, Modality::Hand, 33))
        ));
    }
}
