use crate::{
    error::Error,
    frame::{Frame, FrameSource},
};
use opencv::{
    core::{flip, Mat},
    prelude::*,
    videoio::{VideoCapture, CAP_PROP_FPS, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH, CAP_V4L2},
};
use std::convert::TryFrom;
use tracing::{error, info, instrument};

/// Flip around the vertical axis.
const FLIP_HORIZONTAL: i32 = 1;

/// A V4L2 camera. The device is released exactly once: on `close` or on drop,
/// whichever comes first.
pub(crate) struct Camera {
    device: i32,
    capture: Option<VideoCapture>,
    frame: Mat,
    mirrored: Mat,
    mirror: bool,
}

impl Camera {
    #[instrument(name = "Camera::open", level = "debug")]
    pub(crate) fn open(
        device: i32,
        width: Option<u16>,
        height: Option<u16>,
        fps: Option<u16>,
        mirror: bool,
    ) -> Result<Self, Error> {
        let mut capture =
            VideoCapture::new(device, CAP_V4L2).map_err(|e| Error::OpenCamera(e, device))?;

        if !capture
            .is_opened()
            .map_err(|e| Error::OpenCamera(e, device))?
        {
            return Err(Error::CameraUnavailable(device));
        }

        for (prop, name, value) in [
            (CAP_PROP_FRAME_WIDTH, "frame width", width),
            (CAP_PROP_FRAME_HEIGHT, "frame height", height),
            (CAP_PROP_FPS, "fps", fps),
        ] {
            if let Some(value) = value.map(f64::from) {
                capture
                    .set(prop, value)
                    .map_err(|e| Error::SetCaptureProperty(e, name))?;
            }
        }

        info!(
            message = "opened camera",
            device,
            width = ?capture.get(CAP_PROP_FRAME_WIDTH).ok(),
            height = ?capture.get(CAP_PROP_FRAME_HEIGHT).ok(),
            mirror,
        );

        Ok(Self {
            device,
            capture: Some(capture),
            frame: Mat::default(),
            mirrored: Mat::default(),
            mirror,
        })
    }
}

/// Copy a continuous Mat's bytes into an owned frame.
pub(crate) fn mat_to_frame(input: &Mat) -> Result<Frame, Error> {
    let step = input.step1(0).map_err(Error::GetStep1)?
        * input.elem_size1().map_err(Error::GetElemSize1)?;
    let (rows, cols) = (input.rows(), input.cols());
    let num_bytes = step * usize::try_from(rows).map_err(Error::ConvertDimToU32)?;

    let raw_data = input.data().map_err(Error::GetMatData)?;
    // SAFETY: the Mat owns `rows` rows of `step` bytes and outlives this borrow
    let data = unsafe { std::slice::from_raw_parts(raw_data, num_bytes) }.to_vec();

    let channels = if cols > 0 { step / cols as usize } else { 0 };
    Frame::from_dims(cols, rows, channels as i32, data)
}

impl FrameSource for Camera {
    fn read(&mut self) -> Result<Frame, Error> {
        let capture = self
            .capture
            .as_mut()
            .ok_or(Error::CameraUnavailable(self.device))?;

        if !capture.read(&mut self.frame).map_err(Error::ReadFrame)? {
            return Err(Error::EmptyFrame);
        }

        if self.mirror {
            flip(&self.frame, &mut self.mirrored, FLIP_HORIZONTAL).map_err(Error::FlipFrame)?;
            mat_to_frame(&self.mirrored)
        } else {
            mat_to_frame(&self.frame)
        }
    }

    fn close(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            match capture.release() {
                Ok(()) => info!(message = "released camera", device = self.device),
                Err(source) => error!(
                    message = "failed to release camera",
                    device = self.device,
                    error = %Error::ReleaseCamera(source)
                ),
            }
        }
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.close();
    }
}
