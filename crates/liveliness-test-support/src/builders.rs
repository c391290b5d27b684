//! Synthetic detection snapshot builders for testing.

use std::collections::BTreeMap;

use image::{DynamicImage, GrayImage, Luma};
use liveliness_core::domain::{
    BoundingBox, Challenge, ChallengeKind, DetectionSnapshot, Frame, Landmarks, Point,
    PoseDirection,
};

/// Lid gap of an open eye; the 40 px wide contour gives an EAR of 0.3.
const OPEN_EYE_GAP: f32 = 12.0;
/// Lid gap of a closed eye; EAR 0.1.
const CLOSED_EYE_GAP: f32 = 4.0;
const EYE_WIDTH: f32 = 40.0;

/// Builder for synthetic detector output.
///
/// Starts from a neutral face: a 200x200 box at (100, 100), open eyes, nose
/// tip centred, and a confident "neutral" expression.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    bounding_box: BoundingBox,
    eye_gap: f32,
    nose_offset: (f32, f32),
    expressions: BTreeMap<String, f32>,
    landmarks: bool,
}

impl SnapshotBuilder {
    /// Starts a neutral face.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            bounding_box: BoundingBox::new(100.0, 100.0, 200.0, 200.0),
            eye_gap: OPEN_EYE_GAP,
            nose_offset: (0.5, 0.5),
            expressions: BTreeMap::from([
                ("neutral".to_string(), 0.95),
                ("happy".to_string(), 0.02),
            ]),
            landmarks: true,
        }
    }

    /// Builds a snapshot that satisfies `challenge` under default thresholds.
    #[must_use]
    pub fn satisfying(challenge: &Challenge) -> DetectionSnapshot {
        let builder = Self::neutral();
        match (challenge.kind(), challenge.pose_direction()) {
            (ChallengeKind::Expression, _) => builder.expression(challenge.key(), 0.97),
            (ChallengeKind::Blink, _) => builder.eyes_closed(),
            (ChallengeKind::Pose, Some(direction)) => builder.looking(direction),
            (ChallengeKind::Pose, None) => builder,
        }
        .build()
    }

    /// Sets the face box.
    #[must_use]
    pub fn bounding_box(mut self, bbox: BoundingBox) -> Self {
        self.bounding_box = bbox;
        self
    }

    /// Sets a named expression confidence.
    #[must_use]
    pub fn expression(mut self, name: &str, confidence: f32) -> Self {
        self.expressions.insert(name.to_string(), confidence);
        self
    }

    /// Smiles with high confidence.
    #[must_use]
    pub fn smiling(self) -> Self {
        self.expression("happy", 0.97)
    }

    /// Closes both eyes.
    #[must_use]
    pub fn eyes_closed(mut self) -> Self {
        self.eye_gap = CLOSED_EYE_GAP;
        self
    }

    /// Sets the lid gap of both eyes (EAR is `gap / 40`).
    #[must_use]
    pub fn eye_gap(mut self, gap: f32) -> Self {
        self.eye_gap = gap;
        self
    }

    /// Places the nose tip at a normalized offset within the face box.
    #[must_use]
    pub fn nose_at(mut self, x: f32, y: f32) -> Self {
        self.nose_offset = (x, y);
        self
    }

    /// Turns the head clearly towards `direction`.
    #[must_use]
    pub fn looking(self, direction: PoseDirection) -> Self {
        match direction {
            PoseDirection::Left => self.nose_at(0.3, 0.5),
            PoseDirection::Right => self.nose_at(0.7, 0.5),
            PoseDirection::Up => self.nose_at(0.5, 0.3),
            PoseDirection::Down => self.nose_at(0.5, 0.7),
        }
    }

    /// Drops every landmark, as a detector does on a partial face.
    #[must_use]
    pub fn without_landmarks(mut self) -> Self {
        self.landmarks = false;
        self
    }

    /// Builds the snapshot.
    #[must_use]
    pub fn build(self) -> DetectionSnapshot {
        let bbox = self.bounding_box;
        let landmarks = if self.landmarks {
            let eye_y = bbox.y + bbox.height * 0.35;
            let nose = Point::new(
                bbox.x + bbox.width * self.nose_offset.0,
                bbox.y + bbox.height * self.nose_offset.1,
            );
            Landmarks {
                left_eye: eye_contour(Point::new(bbox.x + bbox.width * 0.2, eye_y), self.eye_gap),
                right_eye: eye_contour(Point::new(bbox.x + bbox.width * 0.6, eye_y), self.eye_gap),
                nose: nose_bridge(nose),
            }
        } else {
            Landmarks::default()
        };

        DetectionSnapshot {
            bounding_box: bbox,
            landmarks,
            expressions: self.expressions,
        }
    }
}

/// Six-point eye contour starting at the outer corner `origin`.
fn eye_contour(origin: Point, gap: f32) -> Vec<Point> {
    let half = gap / 2.0;
    let third = EYE_WIDTH / 3.0;
    vec![
        Point::new(origin.x, origin.y),
        Point::new(origin.x + third, origin.y - half),
        Point::new(origin.x + 2.0 * third, origin.y - half),
        Point::new(origin.x + EYE_WIDTH, origin.y),
        Point::new(origin.x + 2.0 * third, origin.y + half),
        Point::new(origin.x + third, origin.y + half),
    ]
}

/// Nine nose points with the tip at index 3.
fn nose_bridge(tip: Point) -> Vec<Point> {
    vec![
        Point::new(tip.x, tip.y - 30.0),
        Point::new(tip.x, tip.y - 20.0),
        Point::new(tip.x, tip.y - 10.0),
        tip,
        Point::new(tip.x - 12.0, tip.y + 5.0),
        Point::new(tip.x - 6.0, tip.y + 7.0),
        Point::new(tip.x, tip.y + 8.0),
        Point::new(tip.x + 6.0, tip.y + 7.0),
        Point::new(tip.x + 12.0, tip.y + 5.0),
    ]
}

/// A small uniform gray frame.
#[must_use]
pub fn blank_frame(sequence: u64) -> Frame {
    let img = GrayImage::from_fn(8, 8, |_, _| Luma([128u8]));
    Frame::new(
        sequence,
        format!("synthetic://frame/{sequence}"),
        DynamicImage::ImageLuma8(img),
    )
}
