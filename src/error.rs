use crate::landmark::Modality;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("failed to convert keypoint variant to usize: {0}")]
    KeypointVariantToUSize(String),

    #[error("expected {0} landmarks for {1} modality, got {2}")]
    GetExpectedNumLandmarks(usize, Modality, usize),

    #[error("landmark index {0} is out of bounds for landmark set of size {1}")]
    GetLandmark(usize, usize),

    #[error("stabilizer quorum must be at least 1")]
    ZeroQuorum,

    #[error("stabilizer quorum {0} exceeds window size {1}")]
    QuorumExceedsWindow(usize, usize),

    #[error("stabilizer window size {0} exceeds history size {1}")]
    WindowExceedsHistory(usize, usize),

    #[error("frame buffer of {0} bytes does not match {1}x{2}x{3}")]
    FrameSize(usize, u32, u32, u32),

    #[error("failed to convert frame dimension to u32")]
    ConvertDimToU32(#[source] std::num::TryFromIntError),

    #[cfg(feature = "camera")]
    #[error("failed to open video capture device {0}")]
    OpenCamera(#[source] opencv::Error, i32),

    #[cfg(feature = "camera")]
    #[error("video capture device {0} is not available")]
    CameraUnavailable(i32),

    #[cfg(feature = "camera")]
    #[error("failed to set video capture property {1}")]
    SetCaptureProperty(#[source] opencv::Error, &'static str),

    #[cfg(feature = "camera")]
    #[error("failed to read frame from video capture")]
    ReadFrame(#[source] opencv::Error),

    #[cfg(feature = "camera")]
    #[error("video capture returned no frame")]
    EmptyFrame,

    #[cfg(feature = "camera")]
    #[error("failed to mirror frame")]
    FlipFrame(#[source] opencv::Error),

    #[cfg(feature = "camera")]
    #[error("failed to get Mat data")]
    GetMatData(#[source] opencv::Error),

    #[cfg(feature = "camera")]
    #[error("failed to release video capture")]
    ReleaseCamera(#[source] opencv::Error),

    #[cfg(feature = "camera")]
    #[error("failed to get Mat step")]
    GetStep1(#[source] opencv::Error),

    #[cfg(feature = "camera")]
    #[error("failed to get Mat element size")]
    GetElemSize1(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to construct Mat from frame")]
    FrameToMat(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("cannot draw on a frame with {0} channels")]
    FrameChannels(u32),

    #[cfg(feature = "gui")]
    #[error("failed to draw line")]
    DrawLine(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to draw circle")]
    DrawCircle(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to draw rectangle")]
    DrawRectangle(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to draw text")]
    PutText(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to show image")]
    ImShow(#[source] opencv::Error),

    #[error("background capture thread hung up")]
    CaptureDisconnected,

    #[error("no frame available from background capture")]
    NoFrameReady,

    #[error("failed to spawn landmark estimator {1:?}")]
    SpawnEstimator(#[source] std::io::Error, String),

    #[error("failed to take estimator {0}")]
    EstimatorPipe(&'static str),

    #[error("landmark estimator did not signal ready, got: {0:?}")]
    EstimatorNotReady(String),

    #[error("landmark estimator closed its output")]
    EstimatorClosed,

    #[error("landmark estimator did not reply within {0:?}")]
    EstimatorTimeout(std::time::Duration),

    #[error("landmark estimator did not signal ready within {0:?}")]
    EstimatorReadyTimeout(std::time::Duration),

    #[error("failed to write frame to landmark estimator")]
    WriteFrame(#[source] std::io::Error),

    #[error("failed to read landmark record")]
    ReadRecord(#[source] std::io::Error),

    #[error("failed to parse landmark record: {1:?}")]
    ParseRecord(#[source] serde_json::Error, String),

    #[error("landmark estimator reported an error: {0}")]
    EstimatorReported(String),

    #[error("failed to open replay file {1:?}")]
    OpenReplay(#[source] std::io::Error, std::path::PathBuf),
}
