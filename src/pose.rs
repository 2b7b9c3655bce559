use crate::landmark::Keypoint;

/// Body landmarks in BlazePose order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub(crate) enum PoseKeypoint {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl Keypoint for PoseKeypoint {
    const COUNT: usize = 33;
}

#[cfg(feature = "gui")]
pub(crate) mod constants {
    use crate::pose::PoseKeypoint::{self, *};

    pub(crate) const KEYPOINT_EDGES: [(PoseKeypoint, PoseKeypoint); 16] = [
        (Nose, LeftEye),
        (Nose, RightEye),
        (LeftEye, LeftEar),
        (RightEye, RightEar),
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (LeftShoulder, LeftHip),
        (RightShoulder, RightElbow),
        (RightShoulder, RightHip),
        (LeftElbow, LeftWrist),
        (RightElbow, RightWrist),
        (LeftHip, RightHip),
        (LeftHip, LeftKnee),
        (RightHip, RightKnee),
        (LeftKnee, LeftAnkle),
        (RightKnee, RightAnkle),
    ];

    /// Keypoints drawn as dots on the annotated frame.
    pub(crate) const DRAWN_KEYPOINTS: [PoseKeypoint; 13] = [
        Nose,
        LeftShoulder,
        RightShoulder,
        LeftElbow,
        RightElbow,
        LeftWrist,
        RightWrist,
        LeftHip,
        RightHip,
        LeftKnee,
        RightKnee,
        LeftAnkle,
        RightAnkle,
    ];
}

#[cfg(test)]
mod tests {
    use super::PoseKeypoint;
    use crate::landmark::Keypoint;
    use num_traits::FromPrimitive;

    #[test]
    fn count_matches_variants() {
        assert_eq!(
            PoseKeypoint::from_usize(PoseKeypoint::COUNT - 1),
            Some(PoseKeypoint::RightFootIndex)
        );
        assert_eq!(PoseKeypoint::from_usize(PoseKeypoint::COUNT), None);
    }

    #[test]
    fn torso_indices() {
        assert_eq!(PoseKeypoint::LeftShoulder.idx().unwrap(), 11);
        assert_eq!(PoseKeypoint::RightWrist.idx().unwrap(), 16);
        assert_eq!(PoseKeypoint::LeftHip.idx().unwrap(), 23);
    }
}
