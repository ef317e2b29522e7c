//! Frame: a local coordinate system nested under an optional parent
//!
//! A [`Frame`] stores a translation, a unit-quaternion rotation and a
//! positive uniform scale, all relative to an optional reference frame.
//! World-space values are never stored; the owning
//! [`Hierarchy`](crate::hierarchy::Hierarchy) derives them by composing
//! local values up the reference chain.

mod constraint;

pub use constraint::{AxisPlaneConstraint, Constraint, RotationFilter, TranslationFilter};

use crate::foundation::math::{Mat4, Point3, Quat, Vec3};
use crate::hierarchy::{FrameId, FrameKey, Hierarchy};

/// A node's local transform relative to its reference frame.
///
/// Local values coincide with world values while the frame has no
/// reference. All mutation of attached frames goes through the owning
/// [`Hierarchy`] so the modification tick cascades to descendants;
/// detached `Frame` values (builders, inverses) are plain data.
#[derive(Debug)]
pub struct Frame {
    pub(crate) translation: Vec3,
    pub(crate) rotation: Quat,
    pub(crate) scaling: f32,
    pub(crate) reference: Option<FrameKey>,
    pub(crate) children: Vec<FrameKey>,
    pub(crate) last_modified: u64,
    pub(crate) culled: bool,
    pub(crate) constraint: Option<Box<dyn Constraint>>,
    pub(crate) id: FrameId,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            scaling: 1.0,
            reference: None,
            children: Vec::new(),
            last_modified: 0,
            culled: false,
            constraint: None,
            id: FrameId::UNASSIGNED,
        }
    }
}

impl Frame {
    /// Create an identity frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the local translation.
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    /// Builder: set the local rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder: set the local uniform scale. Non-positive values keep the
    /// previous scale.
    pub fn with_scaling(mut self, scaling: f32) -> Self {
        if scaling > 0.0 {
            self.scaling = scaling;
        } else {
            log::warn!("ignoring non-positive frame scaling {scaling}");
        }
        self
    }

    /// Builder: attach a motion constraint.
    pub fn with_constraint(mut self, constraint: Box<dyn Constraint>) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Local translation relative to the reference frame.
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Local rotation relative to the reference frame.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Local uniform scale relative to the reference frame.
    pub fn scaling(&self) -> f32 {
        self.scaling
    }

    /// Key of the reference (parent) frame, if any.
    pub fn reference(&self) -> Option<FrameKey> {
        self.reference
    }

    /// Child frames in insertion order.
    pub fn children(&self) -> &[FrameKey] {
        &self.children
    }

    /// Monotonic tick of the last mutation affecting this frame.
    pub fn last_modified(&self) -> u64 {
        self.last_modified
    }

    /// Whether traversal skips this frame's subtree.
    pub fn is_culled(&self) -> bool {
        self.culled
    }

    /// The attached motion constraint, if any.
    pub fn constraint(&self) -> Option<&dyn Constraint> {
        self.constraint.as_deref()
    }

    /// Picking id assigned when the frame was attached to a hierarchy.
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// The 4x4 homogeneous matrix of the local transform (T * R * S).
    pub fn matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.translation)
            * self.rotation.to_homogeneous()
            * Mat4::new_scaling(self.scaling)
    }

    /// A detached frame whose local transform undoes this one.
    ///
    /// Composing a frame with its inverse yields the identity transform:
    /// rotation is inverted, scale reciprocated, and the translation is
    /// the inverse-rotated, inverse-scaled negation of the original.
    pub fn inverse(&self) -> Frame {
        let inv_rotation = self.rotation.inverse();
        Frame {
            translation: -(inv_rotation * self.translation) / self.scaling,
            rotation: inv_rotation,
            scaling: 1.0 / self.scaling,
            ..Frame::default()
        }
    }

    /// Apply the local transform to a point in this frame's space,
    /// producing reference-frame coordinates.
    pub(crate) fn transform_point(&self, point: Point3) -> Point3 {
        Point3::from(self.translation + self.rotation * (point.coords * self.scaling))
    }

    /// Invert the local transform for a point in reference-frame
    /// coordinates, producing this frame's local coordinates.
    pub(crate) fn untransform_point(&self, point: Point3) -> Point3 {
        Point3::from(self.rotation.inverse() * (point.coords - self.translation) / self.scaling)
    }

    /// Apply the linear part (rotation and scale) to a free vector.
    pub(crate) fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * (vector * self.scaling)
    }

    /// Invert the linear part for a free vector.
    pub(crate) fn untransform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation.inverse() * vector / self.scaling
    }
}

/// World-space sample of a frame: position, orientation and magnitude.
///
/// Snapshots are what keyframes store and what
/// [`Interpolator::path`](crate::interpolate::Interpolator::path) returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    /// World position.
    pub position: Point3,
    /// World orientation.
    pub orientation: Quat,
    /// World uniform scale.
    pub magnitude: f32,
}

impl Default for FrameSnapshot {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            orientation: Quat::identity(),
            magnitude: 1.0,
        }
    }
}

impl FrameSnapshot {
    /// Identity snapshot.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Snapshot the current world-space state of an attached frame.
    pub fn of(hierarchy: &Hierarchy, key: FrameKey) -> Self {
        let (position, orientation, magnitude) = hierarchy.world_transform(key);
        Self {
            position,
            orientation,
            magnitude,
        }
    }

    /// Build a snapshot from explicit world-space values.
    pub fn from_parts(position: Point3, orientation: Quat, magnitude: f32) -> Self {
        Self {
            position,
            orientation,
            magnitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::PI;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn identity_frame() {
        let frame = Frame::new();
        assert_eq!(frame.translation(), Vec3::zeros());
        assert_relative_eq!(frame.rotation(), Quat::identity(), epsilon = EPSILON);
        assert_relative_eq!(frame.scaling(), 1.0);
        assert!(frame.reference().is_none());
    }

    #[test]
    fn non_positive_scaling_is_rejected() {
        let frame = Frame::new().with_scaling(2.0).with_scaling(-1.0);
        assert_relative_eq!(frame.scaling(), 2.0);
        let frame = Frame::new().with_scaling(0.0);
        assert_relative_eq!(frame.scaling(), 1.0);
    }

    #[test]
    fn matrix_applies_translation_rotation_scale_in_order() {
        let frame = Frame::new()
            .with_translation(Vec3::new(1.0, 0.0, 0.0))
            .with_rotation(Quat::from_axis_angle(&Vec3::y_axis(), PI / 2.0))
            .with_scaling(2.0);
        let m = frame.matrix();
        // Local +X scaled to 2, rotated 90 deg about Y (to -Z), then moved.
        let p = m.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(1.0, 0.0, -2.0), epsilon = EPSILON);
    }

    #[test]
    fn inverse_undoes_the_local_transform() {
        let frame = Frame::new()
            .with_translation(Vec3::new(2.0, 3.0, 1.0))
            .with_rotation(Quat::from_axis_angle(&Vec3::y_axis(), 0.785))
            .with_scaling(2.0);
        let inverse = frame.inverse();

        let p = Point3::new(0.4, -1.0, 2.5);
        let round_trip = inverse.transform_point(frame.transform_point(p));
        assert_relative_eq!(round_trip, p, epsilon = EPSILON);

        let v = Vec3::new(-0.7, 0.3, 1.1);
        let round_trip = inverse.transform_vector(frame.transform_vector(v));
        assert_relative_eq!(round_trip, v, epsilon = EPSILON);
    }

    #[test]
    fn point_and_vector_transforms_round_trip() {
        let frame = Frame::new()
            .with_translation(Vec3::new(-1.0, 4.0, 0.5))
            .with_rotation(Quat::from_axis_angle(&Vec3::x_axis(), 0.3))
            .with_scaling(3.0);

        let p = Point3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(frame.untransform_point(frame.transform_point(p)), p, epsilon = EPSILON);

        let v = Vec3::new(1.0, -2.0, 0.25);
        assert_relative_eq!(
            frame.untransform_vector(frame.transform_vector(v)),
            v,
            epsilon = EPSILON
        );
    }
}
