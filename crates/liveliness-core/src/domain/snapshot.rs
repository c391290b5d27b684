//! Per-frame detector output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Point};

/// Index of the nose tip within the nose landmark group (68-point layout).
pub const NOSE_TIP_INDEX: usize = 3;

/// Points per eye contour.
pub const EYE_CONTOUR_POINTS: usize = 6;

/// Landmark groups used by the evaluator.
///
/// Groups are plain point lists so that partial detections can be represented;
/// the accessors return `None` when a group does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Landmarks {
    /// Left eye contour: corner, upper-outer, upper-inner, corner, lower-inner,
    /// lower-outer.
    pub left_eye: Vec<Point>,
    /// Right eye contour, same ordering as the left eye.
    pub right_eye: Vec<Point>,
    /// Nose group, bridge first.
    pub nose: Vec<Point>,
}

impl Landmarks {
    /// Left eye contour, if exactly six points are present.
    #[must_use]
    pub fn left_eye_contour(&self) -> Option<&[Point; EYE_CONTOUR_POINTS]> {
        self.left_eye.as_slice().try_into().ok()
    }

    /// Right eye contour, if exactly six points are present.
    #[must_use]
    pub fn right_eye_contour(&self) -> Option<&[Point; EYE_CONTOUR_POINTS]> {
        self.right_eye.as_slice().try_into().ok()
    }

    /// Nose tip, if the nose group is long enough to contain it.
    #[must_use]
    pub fn nose_tip(&self) -> Option<Point> {
        self.nose.get(NOSE_TIP_INDEX).copied()
    }
}

/// Structured measurements for one face in one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionSnapshot {
    /// Face bounding box.
    pub bounding_box: BoundingBox,
    /// Landmark groups.
    #[serde(default)]
    pub landmarks: Landmarks,
    /// Expression name to confidence in `[0, 1]`.
    #[serde(default)]
    pub expressions: BTreeMap<String, f32>,
}

impl DetectionSnapshot {
    /// Confidence for a named expression, if the detector reported it.
    #[must_use]
    pub fn expression(&self, name: &str) -> Option<f32> {
        self.expressions.get(name).copied()
    }
}
