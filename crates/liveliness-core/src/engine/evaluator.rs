//! Per-challenge decision policy.
//!
//! Each challenge kind maps one metric onto a fixed threshold:
//! - Expression: named confidence `>=` the expression threshold
//! - Blink: mean EAR of both eyes `<` the EAR threshold
//! - Pose: normalized nose offset beyond the directional bound (open interval)
//!
//! Missing or malformed detector output never errors; it simply does not
//! satisfy the challenge.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{Challenge, ChallengeKind, DetectionSnapshot, Metric, PoseDirection};

use super::metrics::{average_ear, compute_nose_offset};

/// Decision thresholds, fixed for the lifetime of an evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum expression confidence (inclusive).
    pub expression: f32,
    /// Mean EAR below which eyes count as closed (exclusive).
    pub blink_ear: f32,
    /// Nose x offset below which the head counts as turned left.
    pub pose_left: f32,
    /// Nose x offset above which the head counts as turned right.
    pub pose_right: f32,
    /// Nose y offset below which the head counts as tilted up.
    pub pose_up: f32,
    /// Nose y offset above which the head counts as tilted down.
    pub pose_down: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            expression: 0.9,
            blink_ear: 0.20,
            pose_left: 0.4,
            pose_right: 0.6,
            pose_up: 0.4,
            pose_down: 0.6,
        }
    }
}

/// Outcome of evaluating one challenge against one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Whether the challenge is satisfied.
    pub satisfied: bool,
    /// Measurement backing the decision, when one applies.
    pub metric: Option<Metric>,
}

impl Evaluation {
    const fn unsatisfied() -> Self {
        Self {
            satisfied: false,
            metric: None,
        }
    }
}

/// Stateless challenge evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChallengeEvaluator {
    thresholds: Thresholds,
}

impl ChallengeEvaluator {
    /// Creates an evaluator with the given thresholds.
    #[must_use]
    pub const fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use.
    #[must_use]
    pub const fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Whether `snapshot` satisfies `challenge`.
    #[must_use]
    pub fn is_satisfied(&self, challenge: &Challenge, snapshot: &DetectionSnapshot) -> bool {
        self.evaluate(challenge, snapshot).satisfied
    }

    /// Evaluates `challenge` against `snapshot`, returning the decision and
    /// the metric it was based on.
    #[must_use]
    pub fn evaluate(&self, challenge: &Challenge, snapshot: &DetectionSnapshot) -> Evaluation {
        match challenge.kind() {
            ChallengeKind::Expression => self.evaluate_expression(challenge.key(), snapshot),
            ChallengeKind::Blink => self.evaluate_blink(snapshot),
            ChallengeKind::Pose => challenge
                .pose_direction()
                .map_or_else(Evaluation::unsatisfied, |direction| {
                    self.evaluate_pose(direction, snapshot)
                }),
        }
    }

    fn evaluate_expression(&self, key: &str, snapshot: &DetectionSnapshot) -> Evaluation {
        let Some(confidence) = snapshot.expression(key) else {
            trace!("Expression '{key}' not reported");
            return Evaluation::unsatisfied();
        };

        let satisfied = confidence >= self.thresholds.expression;
        trace!("Expression '{key}' confidence={confidence:.3} satisfied={satisfied}");

        Evaluation {
            satisfied,
            metric: Some(Metric::Expressions {
                confidences: snapshot.expressions.clone(),
            }),
        }
    }

    fn evaluate_blink(&self, snapshot: &DetectionSnapshot) -> Evaluation {
        let landmarks = &snapshot.landmarks;
        let (Some(left), Some(right)) = (landmarks.left_eye_contour(), landmarks.right_eye_contour())
        else {
            trace!("Eye contours incomplete");
            return Evaluation::unsatisfied();
        };

        let ear = average_ear(left, right);
        if !ear.is_finite() {
            trace!("Degenerate eye contour");
            return Evaluation::unsatisfied();
        }

        let satisfied = ear < self.thresholds.blink_ear;
        trace!("Average EAR={ear:.3} satisfied={satisfied}");

        Evaluation {
            satisfied,
            metric: Some(Metric::EyeAspectRatio { value: ear }),
        }
    }

    fn evaluate_pose(&self, direction: PoseDirection, snapshot: &DetectionSnapshot) -> Evaluation {
        let Some(nose) = snapshot.landmarks.nose_tip() else {
            trace!("Nose tip missing");
            return Evaluation::unsatisfied();
        };
        if !snapshot.bounding_box.has_area() {
            trace!("Empty face box");
            return Evaluation::unsatisfied();
        }

        let offset = compute_nose_offset(nose, &snapshot.bounding_box);
        if !offset.is_finite() {
            return Evaluation::unsatisfied();
        }

        let t = &self.thresholds;
        let satisfied = match direction {
            PoseDirection::Left => offset.x < t.pose_left,
            PoseDirection::Right => offset.x > t.pose_right,
            PoseDirection::Up => offset.y < t.pose_up,
            PoseDirection::Down => offset.y > t.pose_down,
        };
        trace!(
            "Nose offset=({:.3}, {:.3}) {} satisfied={satisfied}",
            offset.x,
            offset.y,
            direction.key()
        );

        Evaluation {
            satisfied,
            metric: None,
        }
    }
}
