//! Cubic Hermite position evaluation for keyframe segments

use crate::foundation::math::{Point3, Vec3};

/// Catmull-Rom tangent for a keyframe given its neighbors' positions.
/// End keyframes pass themselves as the missing neighbor.
pub(crate) fn position_tangent(prev: Point3, next: Point3) -> Vec3 {
    0.5 * (next - prev)
}

/// Cubic Hermite blend of two endpoint positions and tangents at
/// normalized parameter `alpha`.
pub(crate) fn hermite(p1: Point3, p2: Point3, t1: Vec3, t2: Vec3, alpha: f32) -> Point3 {
    let dp = p2 - p1;
    let v1 = 3.0 * dp - 2.0 * t1 - t2;
    let v2 = -2.0 * dp + t1 + t2;
    p1 + alpha * (t1 + alpha * (v1 + alpha * v2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hermite_hits_endpoints() {
        let p1 = Point3::new(1.0, 2.0, 3.0);
        let p2 = Point3::new(-2.0, 0.5, 4.0);
        let t1 = Vec3::new(1.0, 0.0, 0.0);
        let t2 = Vec3::new(0.0, 1.0, 0.0);
        assert_relative_eq!(hermite(p1, p2, t1, t2, 0.0), p1, epsilon = 1e-6);
        assert_relative_eq!(hermite(p1, p2, t1, t2, 1.0), p2, epsilon = 1e-5);
    }

    #[test]
    fn hermite_with_chord_tangents_is_linear() {
        let p1 = Point3::origin();
        let p2 = Point3::new(10.0, 0.0, 0.0);
        let chord = p2 - p1;
        let mid = hermite(p1, p2, chord, chord, 0.5);
        assert_relative_eq!(mid, Point3::new(5.0, 0.0, 0.0), epsilon = 1e-5);
    }
}
