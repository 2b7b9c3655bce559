use crate::error::Error;
use std::convert::TryFrom;

/// An owned, interleaved 8-bit image in BGR channel order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Frame {
    width: u32,
    height: u32,
    channels: u32,
    data: Vec<u8>,
}

impl Frame {
    pub(crate) fn new(width: u32, height: u32, channels: u32, data: Vec<u8>) -> Result<Self, Error> {
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(Error::FrameSize(data.len(), width, height, channels));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub(crate) fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            channels: 3,
            data: vec![0; width as usize * height as usize * 3],
        }
    }

    #[cfg_attr(not(feature = "camera"), allow(dead_code))]
    pub(crate) fn from_dims(width: i32, height: i32, channels: i32, data: Vec<u8>) -> Result<Self, Error> {
        Self::new(
            u32::try_from(width).map_err(Error::ConvertDimToU32)?,
            u32::try_from(height).map_err(Error::ConvertDimToU32)?,
            u32::try_from(channels).map_err(Error::ConvertDimToU32)?,
            data,
        )
    }

    #[inline]
    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub(crate) fn channels(&self) -> u32 {
        self.channels
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    /// The channel bytes of the pixel at (x, y), or `None` outside the frame.
    pub(crate) fn pixel_mut(&mut self, x: i64, y: i64) -> Option<&mut [u8]> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        let channels = self.channels as usize;
        let start = (y as usize * self.width as usize + x as usize) * channels;
        self.data.get_mut(start..start + channels)
    }
}

/// Anything that can hand the pipeline one frame per tick.
pub(crate) trait FrameSource {
    /// Grab the next frame. Errors are per-frame: the caller skips the tick.
    fn read(&mut self) -> Result<Frame, Error>;

    /// Release the underlying device. Must be safe to call more than once.
    fn close(&mut self) {}
}

impl<F: FrameSource + ?Sized> FrameSource for Box<F> {
    fn read(&mut self) -> Result<Frame, Error> {
        (**self).read()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Black frames of a fixed size, for runs driven by recorded landmarks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Blank {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl FrameSource for Blank {
    fn read(&mut self) -> Result<Frame, Error> {
        Ok(Frame::blank(self.width, self.height))
    }
}
