//! Scalar measurements over normalized landmarks.
//!
//! Image space has y increasing downward, so "higher" on screen means a
//! smaller y.

use crate::point::Point;

/// Euclidean distance between two points in normalized coordinates.
pub(crate) fn distance(a: Point, b: Point) -> f32 {
    a.distance(b)
}

/// Mean of the two points' y coordinates.
pub(crate) fn average_height(a: Point, b: Point) -> f32 {
    (a.y() + b.y()) / 2.0
}

/// A finger is extended when its tip sits above its proximal joint by more than `margin`.
pub(crate) fn finger_extended(tip: Point, pip: Point, margin: f32) -> bool {
    tip.y() < pip.y() - margin
}

/// A thumb is extended when its tip lies to the right of its interphalangeal
/// joint by more than `margin`.
///
/// Only meaningful for a single right hand seen through a mirrored
/// (selfie-view) feed. A left hand, or an unmirrored feed, flips the sign of
/// the test and this will report the thumb as curled when it is out.
pub(crate) fn thumb_extended(tip: Point, ip: Point, margin: f32) -> bool {
    tip.x() > ip.x() + margin
}
