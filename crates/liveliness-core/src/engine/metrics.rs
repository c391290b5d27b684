//! Pure metric functions over landmark geometry.

use crate::domain::{BoundingBox, NoseOffset, Point, EYE_CONTOUR_POINTS};

/// Eye aspect ratio of a six-point eye contour.
///
/// Points follow the canonical ordering: corner, upper-outer, upper-inner,
/// corner, lower-inner, lower-outer. Lower values mean a more closed eye; an
/// open eye sits around 0.3.
///
/// A contour whose corners coincide yields a non-finite value.
#[must_use]
pub fn compute_ear(eye: &[Point; EYE_CONTOUR_POINTS]) -> f32 {
    let vertical_outer = eye[1].distance(eye[5]);
    let vertical_inner = eye[2].distance(eye[4]);
    let horizontal = eye[0].distance(eye[3]);

    (vertical_outer + vertical_inner) / (2.0 * horizontal)
}

/// Mean EAR of both eyes.
#[must_use]
pub fn average_ear(
    left: &[Point; EYE_CONTOUR_POINTS],
    right: &[Point; EYE_CONTOUR_POINTS],
) -> f32 {
    (compute_ear(left) + compute_ear(right)) / 2.0
}

/// Position of the nose normalized to the face box.
///
/// Offsets outside `[0, 1]` are returned as-is.
#[must_use]
pub fn compute_nose_offset(nose: Point, bbox: &BoundingBox) -> NoseOffset {
    NoseOffset {
        x: (nose.x - bbox.x) / bbox.width,
        y: (nose.y - bbox.y) / bbox.height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An eye 40 px wide whose lids are `gap` px apart.
    fn eye(gap: f32) -> [Point; 6] {
        let half = gap / 2.0;
        [
            Point::new(0.0, 0.0),
            Point::new(13.0, -half),
            Point::new(27.0, -half),
            Point::new(40.0, 0.0),
            Point::new(27.0, half),
            Point::new(13.0, half),
        ]
    }

    #[test]
    fn test_ear_known_value() {
        // verticals are both 12, horizontal 40: 24 / 80
        let ear = compute_ear(&eye(12.0));
        assert!((ear - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_closed_eye_has_low_ear() {
        assert!(compute_ear(&eye(2.0)) < compute_ear(&eye(12.0)));
        assert!(compute_ear(&eye(0.0)).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ear_scale_invariant() {
        let base = eye(9.0);
        let reference = compute_ear(&base);

        for factor in [0.01_f32, 0.5, 2.0, 13.7, 1000.0] {
            let scaled = base.map(|p| p.scaled(factor));
            let ear = compute_ear(&scaled);
            assert!(
                (ear - reference).abs() < 1e-4,
                "EAR changed under scale {factor}: {ear} vs {reference}"
            );
        }
    }

    #[test]
    fn test_ear_degenerate_is_not_finite() {
        let collapsed = [Point::new(5.0, 5.0); 6];
        assert!(!compute_ear(&collapsed).is_finite());
    }

    #[test]
    fn test_average_ear_uses_both_eyes() {
        let avg = average_ear(&eye(4.0), &eye(12.0));
        let expected = (compute_ear(&eye(4.0)) + compute_ear(&eye(12.0))) / 2.0;
        assert!((avg - expected).abs() < f32::EPSILON);
    }

    #[test]
    fn test_nose_offset_centered() {
        let bbox = BoundingBox::new(100.0, 50.0, 200.0, 100.0);
        let offset = compute_nose_offset(Point::new(200.0, 100.0), &bbox);
        assert!((offset.x - 0.5).abs() < f32::EPSILON);
        assert!((offset.y - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_nose_offset_outside_box_tolerated() {
        let bbox = BoundingBox::new(100.0, 50.0, 200.0, 100.0);
        let offset = compute_nose_offset(Point::new(40.0, 210.0), &bbox);
        assert!((offset.x - -0.3).abs() < 1e-6);
        assert!((offset.y - 1.6).abs() < 1e-6);
    }
}
