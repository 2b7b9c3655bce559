use crate::landmark::Keypoint;

#[derive(Debug, Copy, Clone, PartialEq, Eq, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub(crate) enum HandKeypoint {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl Keypoint for HandKeypoint {
    const COUNT: usize = 21;
}

pub(crate) mod constants {
    use crate::hand::HandKeypoint::{self, *};

    /// (tip, pip) pairs for the four non-thumb fingers: index, middle, ring, pinky.
    pub(crate) const FINGERS: [(HandKeypoint, HandKeypoint); 4] = [
        (IndexTip, IndexPip),
        (MiddleTip, MiddlePip),
        (RingTip, RingPip),
        (PinkyTip, PinkyPip),
    ];

    #[cfg(feature = "gui")]
    pub(crate) const KEYPOINT_EDGES: [(HandKeypoint, HandKeypoint); 21] = [
        (Wrist, ThumbCmc),
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        (Wrist, IndexMcp),
        (IndexMcp, IndexPip),
        (IndexPip, IndexDip),
        (IndexDip, IndexTip),
        (IndexMcp, MiddleMcp),
        (MiddleMcp, MiddlePip),
        (MiddlePip, MiddleDip),
        (MiddleDip, MiddleTip),
        (MiddleMcp, RingMcp),
        (RingMcp, RingPip),
        (RingPip, RingDip),
        (RingDip, RingTip),
        (RingMcp, PinkyMcp),
        (Wrist, PinkyMcp),
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ];

    #[cfg(feature = "gui")]
    pub(crate) const DRAWN_KEYPOINTS: [HandKeypoint; 6] =
        [ThumbTip, IndexTip, MiddleTip, RingTip, PinkyTip, Wrist];
}
