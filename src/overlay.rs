//! Draws tracked landmarks and the current gesture onto a copy of the input frame.

use crate::{
    error::Error,
    frame::Frame,
    gesture::Gesture,
    hand::{self, HandKeypoint},
    landmark::{Keypoint, LandmarkSet, Modality},
    pose,
};
use opencv::{
    core::{Mat, Point2i, Rect, Scalar, CV_8UC3},
    imgproc::{FONT_HERSHEY_SIMPLEX, LINE_8, LINE_AA},
    prelude::*,
};

const DOT_RADIUS: i32 = 6;
const BANNER_HEIGHT: i32 = 32;
const HISTORY_CELL: i32 = 8;
const FILLED: i32 = -1;

const EDGE_COLOR: [u8; 3] = [0, 255, 255];
const CAPTION_COLOR: [u8; 3] = [255, 255, 255];
const INFO_COLOR: [u8; 3] = [150, 150, 150];

fn scalar([b, g, r]: [u8; 3]) -> Scalar {
    Scalar::new(f64::from(b), f64::from(g), f64::from(r), 0.0)
}

/// Banner text for the gesture shown by `modality`.
fn caption(modality: Modality, gesture: Gesture) -> &'static str {
    match (modality, gesture) {
        (Modality::Hand, Gesture::Jump) => "L-SHAPE -> JUMP",
        (Modality::Hand, Gesture::Duck) => "FIST    -> DUCK",
        (Modality::Hand, Gesture::Run) => "PINCH   -> RUN",
        (Modality::Hand, Gesture::Idle) => "...",
        (Modality::Pose, Gesture::Jump) => "JUMP",
        (Modality::Pose, Gesture::Duck) => "DUCK",
        (Modality::Pose, Gesture::Run) => "RUN",
        (Modality::Pose, Gesture::Idle) => "IDLE",
    }
}

pub(crate) struct Overlay<'a> {
    pub(crate) modality: Modality,
    pub(crate) landmarks: Option<&'a LandmarkSet>,
    pub(crate) stabilized: Gesture,
    pub(crate) raw: Gesture,
    pub(crate) history: &'a [Gesture],
    pub(crate) frame_count: usize,
}

impl Overlay<'_> {
    pub(crate) fn draw(&self, frame: &Frame) -> Result<Mat, Error> {
        let mut out = frame_to_mat(frame)?;
        let size = (frame.width(), frame.height());

        if let Some(landmarks) = self.landmarks {
            let color = scalar(self.stabilized.color());
            match self.modality {
                Modality::Pose => draw_skeleton(
                    &mut out,
                    size,
                    landmarks,
                    &pose::constants::KEYPOINT_EDGES,
                    &pose::constants::DRAWN_KEYPOINTS,
                    color,
                )?,
                Modality::Hand => {
                    draw_skeleton(
                        &mut out,
                        size,
                        landmarks,
                        &hand::constants::KEYPOINT_EDGES,
                        &hand::constants::DRAWN_KEYPOINTS,
                        color,
                    )?;
                    // the pinch measurement
                    opencv::imgproc::line(
                        &mut out,
                        pixel(landmarks, HandKeypoint::ThumbTip, size)?,
                        pixel(landmarks, HandKeypoint::IndexTip, size)?,
                        color,
                        2,      // thickness
                        LINE_8, // line_type
                        0,      // shift
                    )
                    .map_err(Error::DrawLine)?;
                }
            }
        }

        self.draw_banner(&mut out, size)?;
        Ok(out)
    }

    fn draw_banner(&self, out: &mut Mat, (width, height): (u32, u32)) -> Result<(), Error> {
        // hands have no smoothing in the banner: it shows what the hand does now
        let shown = match self.modality {
            Modality::Hand => self.raw,
            Modality::Pose => self.stabilized,
        };

        opencv::imgproc::rectangle(
            out,
            Rect::new(0, 0, width as i32, BANNER_HEIGHT),
            scalar(self.stabilized.color()),
            FILLED,
            LINE_8,
            0, // shift
        )
        .map_err(Error::DrawRectangle)?;

        opencv::imgproc::put_text(
            out,
            caption(self.modality, shown),
            Point2i::new(6, 22),
            FONT_HERSHEY_SIMPLEX,
            0.55,
            scalar(CAPTION_COLOR),
            2,       // thickness
            LINE_AA, // line_type
            false,   // bottom_left_origin
        )
        .map_err(Error::PutText)?;

        for (i, gesture) in self.history.iter().enumerate() {
            let x = i as i32 * HISTORY_CELL;
            opencv::imgproc::rectangle(
                out,
                Rect::new(x + 1, BANNER_HEIGHT + 1, HISTORY_CELL - 2, HISTORY_CELL - 2),
                scalar(gesture.color()),
                FILLED,
                LINE_8,
                0, // shift
            )
            .map_err(Error::DrawRectangle)?;
        }

        opencv::imgproc::put_text(
            out,
            &format!("Frame: {}", self.frame_count),
            Point2i::new(6, height as i32 - 10),
            FONT_HERSHEY_SIMPLEX,
            0.5,
            scalar(INFO_COLOR),
            1,       // thickness
            LINE_AA, // line_type
            false,   // bottom_left_origin
        )
        .map_err(Error::PutText)
    }
}

fn pixel<K: Keypoint>(
    landmarks: &LandmarkSet,
    kind: K,
    (width, height): (u32, u32),
) -> Result<Point2i, Error> {
    let (x, y) = landmarks.point(kind)?.to_pixel(width, height);
    Ok(Point2i::new(x, y))
}

fn draw_skeleton<K: Keypoint>(
    out: &mut Mat,
    size: (u32, u32),
    landmarks: &LandmarkSet,
    edges: &[(K, K)],
    keypoints: &[K],
    color: Scalar,
) -> Result<(), Error> {
    for &(a, b) in edges {
        opencv::imgproc::line(
            out,
            pixel(landmarks, a, size)?,
            pixel(landmarks, b, size)?,
            scalar(EDGE_COLOR),
            2,      // thickness
            LINE_8, // line_type
            0,      // shift
        )
        .map_err(Error::DrawLine)?;
    }
    for &kind in keypoints {
        opencv::imgproc::circle(
            out,
            pixel(landmarks, kind, size)?,
            DOT_RADIUS,
            color,
            FILLED,
            LINE_8,
            0, // shift
        )
        .map_err(Error::DrawCircle)?;
    }
    Ok(())
}

/// Copy a BGR frame into a freshly allocated Mat.
fn frame_to_mat(frame: &Frame) -> Result<Mat, Error> {
    if frame.channels() != 3 {
        return Err(Error::FrameChannels(frame.channels()));
    }
    let mut mat = Mat::zeros(frame.height() as i32, frame.width() as i32, CV_8UC3)
        .map_err(Error::FrameToMat)?
        .to_mat()
        .map_err(Error::FrameToMat)?;
    let data = mat.data_mut().map_err(Error::FrameToMat)?;
    // SAFETY: a new CV_8UC3 Mat is continuous and holds width * height * 3 bytes
    unsafe { std::slice::from_raw_parts_mut(data, frame.data().len()) }
        .copy_from_slice(frame.data());
    Ok(mat)
}
