//! Math utilities and types
//!
//! Provides the fundamental math types for the scene-graph core, plus the
//! quaternion helpers the spline interpolation needs (shortest-path slerp,
//! rotation-vector log/exp, SQUAD blending).

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Pi / 4
    pub const QUARTER_PI: f32 = PI * 0.25;
}

/// Math utility functions
pub mod utils {
    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}

/// Build a rotation quaternion from an axis and an angle.
///
/// A zero-length axis composes as the identity rotation instead of
/// producing NaNs.
pub fn axis_angle(axis: Vec3, angle: f32) -> Quat {
    Unit::try_new(axis, 1.0e-10).map_or_else(Quat::identity, |axis| Quat::from_axis_angle(&axis, angle))
}

/// Rotation vector (scaled-axis) representation of a unit quaternion.
///
/// Uses the shortest rotation, so `from_rotation_vector(rotation_vector(q))`
/// reproduces `q` up to quaternion sign.
pub fn rotation_vector(q: &Quat) -> Vec3 {
    q.axis_angle()
        .map_or_else(Vec3::zeros, |(axis, angle)| axis.into_inner() * angle)
}

/// Inverse of [`rotation_vector`]: rotation by `|v|` radians about `v`.
pub fn from_rotation_vector(v: Vec3) -> Quat {
    Quat::new(v)
}

/// Spherical linear interpolation without hemisphere flipping.
///
/// Falls back to normalized linear interpolation when the quaternions are
/// too close (or too opposed) for a stable slerp.
pub fn slerp(a: &Quat, b: &Quat, t: f32) -> Quat {
    if let Some(q) = a.try_slerp(b, t, 1.0e-6) {
        return q;
    }
    let blended = a.into_inner().lerp(&b.into_inner(), t);
    if blended.norm() > 1.0e-6 {
        Quat::new_normalize(blended)
    } else {
        *a
    }
}

/// Slerp taking the shortest path over the quaternion double cover.
pub fn slerp_shortest(a: &Quat, b: &Quat, t: f32) -> Quat {
    if a.coords.dot(&b.coords) < 0.0 {
        let flipped = Quat::new_unchecked(-b.into_inner());
        slerp(a, &flipped, t)
    } else {
        slerp(a, b, t)
    }
}

/// SQUAD tangent quaternion for the middle of three consecutive keyframe
/// orientations.
pub fn squad_tangent(prev: &Quat, cur: &Quat, next: &Quat) -> Quat {
    let inv = cur.inverse();
    let arg = -(rotation_vector(&(inv * *next)) + rotation_vector(&(inv * *prev))) / 4.0;
    *cur * from_rotation_vector(arg)
}

/// Spherical quadrangle interpolation between `q1` and `q2` with tangent
/// quaternions `a1`/`a2`.
pub fn squad(q1: &Quat, a1: &Quat, a2: &Quat, q2: &Quat, t: f32) -> Quat {
    let outer = slerp_shortest(q1, q2, t);
    let inner = slerp(a1, a2, t);
    slerp(&outer, &inner, 2.0 * t * (1.0 - t))
}
