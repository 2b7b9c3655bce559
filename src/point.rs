use crate::error::Error;
use ordered_float::NotNan;
use std::ops::Sub;

/// A point in normalized image coordinates: x and y nominally in [0, 1], y increasing downward.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub(crate) struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub(crate) fn new(x: f32, y: f32) -> Result<Self, Error> {
        Ok(Self {
            x: NotNan::new(x)
                .map_err(|e| Error::ConstructNotNan(e, x))?
                .into_inner(),
            y: NotNan::new(y)
                .map_err(|e| Error::ConstructNotNan(e, y))?
                .into_inner(),
        })
    }

    pub(crate) fn squared_distance(self, other: Self) -> f32 {
        let delta = other - self;
        delta.dot(delta)
    }

    pub(crate) fn distance(self, other: Self) -> f32 {
        self.squared_distance(other).sqrt()
    }

    #[inline]
    pub(crate) fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub(crate) fn x(self) -> f32 {
        self.x
    }

    #[inline]
    pub(crate) fn y(self) -> f32 {
        self.y
    }

    /// Pixel position in a `width` x `height` image. Off-frame points land on the nearest edge.
    #[cfg_attr(not(feature = "gui"), allow(dead_code))]
    pub(crate) fn to_pixel(self, width: u32, height: u32) -> (i32, i32) {
        fn scale(value: f32, extent: u32) -> i32 {
            let last = extent.saturating_sub(1) as f32;
            (value * extent as f32).round().max(0.0).min(last) as i32
        }
        (scale(self.x, width), scale(self.y, height))
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
