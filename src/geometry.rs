// src/geometry.rs
use nalgebra::Point2;

/// Returned for angles at coincident points, where the rays are undefined.
pub const DEGENERATE_ANGLE: f64 = 0.0;

const MIN_RAY_LENGTH: f64 = 1e-9;

/// Interior angle at `b` between the rays `b -> a` and `b -> c`, in degrees
/// within [0, 180].
pub fn angle_between(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let ba = a - b;
    let bc = c - b;

    if !(ba.iter().chain(bc.iter()).all(|v| v.is_finite()))
        || ba.norm() < MIN_RAY_LENGTH
        || bc.norm() < MIN_RAY_LENGTH
    {
        return DEGENERATE_ANGLE;
    }

    let radians = bc.y.atan2(bc.x) - ba.y.atan2(ba.x);
    let angle = radians.to_degrees().abs();

    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Planar Euclidean distance.
pub fn distance(p1: &Point2<f64>, p2: &Point2<f64>) -> f64 {
    nalgebra::distance(p1, p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn test_right_and_straight_angles() {
        assert!((angle_between(&p(0.0, 1.0), &p(0.0, 0.0), &p(1.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((angle_between(&p(-1.0, 0.0), &p(0.0, 0.0), &p(1.0, 0.0)) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_reflex_angle_is_folded() {
        // atan2 difference here is 315 degrees before folding
        let angle = angle_between(&p(1.0, 0.0), &p(0.0, 0.0), &p(1.0, -1.0));
        assert!((angle - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_agrees_with_dot_product() {
        let cases = [
            (p(0.2, 0.3), p(0.5, 0.5), p(0.9, 0.1)),
            (p(0.1, 0.9), p(0.4, 0.4), p(0.45, 0.95)),
            (p(0.7, 0.2), p(0.3, 0.6), p(0.31, 0.2)),
        ];

        for (a, b, c) in cases {
            let by_dot = (a - b).angle(&(c - b)).to_degrees();
            assert!((angle_between(&a, &b, &c) - by_dot).abs() < 1e-6);
        }
    }

    #[test]
    fn test_degenerate_input_returns_sentinel() {
        let b = p(0.5, 0.5);
        assert_eq!(angle_between(&b, &b, &p(1.0, 1.0)), DEGENERATE_ANGLE);
        assert_eq!(angle_between(&p(f64::NAN, 0.0), &b, &p(1.0, 1.0)), DEGENERATE_ANGLE);
    }

    #[test]
    fn test_distance() {
        assert!((distance(&p(0.0, 0.0), &p(3.0, 4.0)) - 5.0).abs() < 1e-12);
        assert_eq!(distance(&p(0.2, 0.2), &p(0.2, 0.2)), 0.0);
    }
}
