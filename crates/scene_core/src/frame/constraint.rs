//! Motion constraints for frames
//!
//! A constraint filters proposed translation/rotation deltas before the
//! hierarchy composes them into a frame's local transform. Filters may
//! shrink, redirect or zero a delta; they never fail.

use crate::foundation::math::{from_rotation_vector, rotation_vector, Quat, Unit, Vec3};
use crate::frame::Frame;

/// Capability that filters motion deltas before they are applied.
///
/// Default implementations pass deltas through unchanged, so a constraint
/// may restrict only one of the two channels.
pub trait Constraint: std::fmt::Debug {
    /// Filter a proposed translation delta (frame-local coordinates).
    fn constrain_translation(&self, delta: Vec3, frame: &Frame) -> Vec3 {
        let _ = frame;
        delta
    }

    /// Filter a proposed rotation delta (frame-local coordinates).
    fn constrain_rotation(&self, delta: Quat, frame: &Frame) -> Quat {
        let _ = frame;
        delta
    }
}

/// Translation filter of an [`AxisPlaneConstraint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TranslationFilter {
    /// No restriction.
    Free,
    /// Project the delta onto the plane with this (frame-local) normal.
    Plane(Vec3),
    /// Project the delta onto this (frame-local) axis.
    Axis(Vec3),
    /// Zero every delta.
    Forbidden,
}

/// Rotation filter of an [`AxisPlaneConstraint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationFilter {
    /// No restriction.
    Free,
    /// Keep only the rotation component about this (frame-local) axis.
    Axis(Vec3),
    /// Zero every delta.
    Forbidden,
}

/// Axis/plane projection constraint expressed in the frame's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisPlaneConstraint {
    /// Translation channel filter.
    pub translation: TranslationFilter,
    /// Rotation channel filter.
    pub rotation: RotationFilter,
}

impl Default for AxisPlaneConstraint {
    fn default() -> Self {
        Self {
            translation: TranslationFilter::Free,
            rotation: RotationFilter::Free,
        }
    }
}

impl AxisPlaneConstraint {
    /// Unrestricted constraint.
    pub fn free() -> Self {
        Self::default()
    }
}

impl Constraint for AxisPlaneConstraint {
    fn constrain_translation(&self, delta: Vec3, _frame: &Frame) -> Vec3 {
        match self.translation {
            TranslationFilter::Free => delta,
            TranslationFilter::Plane(normal) => match Unit::try_new(normal, 1.0e-10) {
                Some(normal) => {
                    let normal = normal.into_inner();
                    delta - normal * delta.dot(&normal)
                }
                None => delta,
            },
            TranslationFilter::Axis(axis) => match Unit::try_new(axis, 1.0e-10) {
                Some(axis) => {
                    let axis = axis.into_inner();
                    axis * delta.dot(&axis)
                }
                None => delta,
            },
            TranslationFilter::Forbidden => Vec3::zeros(),
        }
    }

    fn constrain_rotation(&self, delta: Quat, _frame: &Frame) -> Quat {
        match self.rotation {
            RotationFilter::Free => delta,
            RotationFilter::Axis(axis) => match Unit::try_new(axis, 1.0e-10) {
                Some(axis) => {
                    let axis = axis.into_inner();
                    let rv = rotation_vector(&delta);
                    from_rotation_vector(axis * rv.dot(&axis))
                }
                None => delta,
            },
            RotationFilter::Forbidden => Quat::identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn plane_filter_removes_normal_component() {
        let constraint = AxisPlaneConstraint {
            translation: TranslationFilter::Plane(Vec3::y()),
            rotation: RotationFilter::Free,
        };
        let out = constraint.constrain_translation(Vec3::new(1.0, 2.0, 3.0), &Frame::new());
        assert_relative_eq!(out, Vec3::new(1.0, 0.0, 3.0), epsilon = EPSILON);
    }

    #[test]
    fn axis_filter_keeps_axis_component() {
        let constraint = AxisPlaneConstraint {
            translation: TranslationFilter::Axis(Vec3::new(0.0, 0.0, 2.0)),
            rotation: RotationFilter::Free,
        };
        let out = constraint.constrain_translation(Vec3::new(1.0, 2.0, 3.0), &Frame::new());
        assert_relative_eq!(out, Vec3::new(0.0, 0.0, 3.0), epsilon = EPSILON);
    }

    #[test]
    fn forbidden_zeroes_both_channels() {
        let constraint = AxisPlaneConstraint {
            translation: TranslationFilter::Forbidden,
            rotation: RotationFilter::Forbidden,
        };
        let frame = Frame::new();
        assert_eq!(constraint.constrain_translation(Vec3::new(1.0, 1.0, 1.0), &frame), Vec3::zeros());
        let filtered = constraint.constrain_rotation(Quat::from_axis_angle(&Vec3::y_axis(), 0.5), &frame);
        assert_relative_eq!(filtered, Quat::identity(), epsilon = EPSILON);
    }

    #[test]
    fn rotation_axis_filter_projects_rotation() {
        let constraint = AxisPlaneConstraint {
            translation: TranslationFilter::Free,
            rotation: RotationFilter::Axis(Vec3::y()),
        };
        // Rotation about Y passes through unchanged.
        let about_y = Quat::from_axis_angle(&Vec3::y_axis(), 0.7);
        let filtered = constraint.constrain_rotation(about_y, &Frame::new());
        assert!(filtered.coords.dot(&about_y.coords).abs() > 0.999_9);
        // Rotation about X is filtered down to identity.
        let about_x = Quat::from_axis_angle(&Vec3::x_axis(), 0.7);
        let filtered = constraint.constrain_rotation(about_x, &Frame::new());
        assert_relative_eq!(filtered, Quat::identity(), epsilon = EPSILON);
    }
}
