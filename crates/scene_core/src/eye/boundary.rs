//! Boundary (frustum) plane equations and visibility classification
//!
//! Planes are derived geometrically from the eye position and axes, with
//! outward-pointing unit normals: a positive signed distance means the
//! point lies outside that plane. 3D eyes carry six planes, 2D eyes only
//! the four lateral ones.

use crate::eye::{Eye, ProjectionKind};
use crate::foundation::math::{Point3, Vec3};
use crate::hierarchy::Hierarchy;

/// A half-space boundary: unit outward normal and signed distance such
/// that points `x` with `normal . x == distance` lie on the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Outward unit normal.
    pub normal: Vec3,
    /// Signed distance of the plane from the origin along the normal.
    pub distance: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vec3::z(),
            distance: 0.0,
        }
    }
}

impl Plane {
    /// Build a plane from an outward normal and a point on the plane.
    pub fn from_point(normal: Vec3, point: Vec3) -> Self {
        Self {
            normal,
            distance: normal.dot(&point),
        }
    }

    /// Signed distance of `point` from the plane; positive is outside.
    pub fn signed_distance(&self, point: Point3) -> f32 {
        self.normal.dot(&point.coords) - self.distance
    }
}

/// Result of classifying a volume against the boundary planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Entirely inside every plane.
    Visible,
    /// Straddles at least one plane.
    SemiVisible,
    /// Entirely outside at least one plane.
    Invisible,
}

impl Eye {
    /// Recompute and cache the boundary plane equations, unconditionally.
    pub fn compute_boundary_equations(&mut self, hierarchy: &Hierarchy) {
        let (planes, count) = self.derive_boundary(hierarchy);
        self.boundary = planes;
        self.boundary_count = count;
        self.boundary_tick = Some(self.eye_tick(hierarchy));
        self.boundary_dirty = false;
    }

    fn ensure_boundary(&mut self, hierarchy: &Hierarchy) {
        let current = !self.boundary_dirty && self.boundary_tick == Some(self.eye_tick(hierarchy));
        if self.boundary_tick.is_none() || (!current && self.auto_update()) {
            self.compute_boundary_equations(hierarchy);
        } else if !current {
            log::trace!("boundary equations stale; automatic updates disabled, using last-good values");
        }
    }

    /// The active boundary planes (6 in 3D, 4 in 2D), refreshed per the
    /// update policy.
    pub fn boundary_planes(&mut self, hierarchy: &Hierarchy) -> &[Plane] {
        self.ensure_boundary(hierarchy);
        &self.boundary[..self.boundary_count]
    }

    fn derive_boundary(&self, hierarchy: &Hierarchy) -> ([Plane; 6], usize) {
        let (position, orientation, magnitude) = hierarchy.world_transform(self.frame());
        let pos = position.coords;
        let view = orientation * -Vec3::z();
        let up = orientation * Vec3::y();
        let right = orientation * Vec3::x();
        let mut planes = [Plane::default(); 6];

        match self.kind() {
            ProjectionKind::Perspective | ProjectionKind::Custom => {
                // Half fields of view: magnitude == tan(vertical / 2).
                let half_v = magnitude.atan();
                let half_h = (magnitude * self.aspect_ratio()).atan();
                let (sh, ch) = half_h.sin_cos();
                let (sv, cv) = half_v.sin_cos();
                // Lateral planes pass through the eye position.
                planes[0] = Plane::from_point(-sh * view - ch * right, pos);
                planes[1] = Plane::from_point(-sh * view + ch * right, pos);
                planes[2] = Plane::from_point(-sv * view - cv * up, pos);
                planes[3] = Plane::from_point(-sv * view + cv * up, pos);
            }
            ProjectionKind::Orthographic | ProjectionKind::TwoD => {
                let (half_width, half_height) = self.ortho_half_extents(hierarchy);
                planes[0] = Plane::from_point(-right, pos - right * half_width);
                planes[1] = Plane::from_point(right, pos + right * half_width);
                planes[2] = Plane::from_point(-up, pos - up * half_height);
                planes[3] = Plane::from_point(up, pos + up * half_height);
            }
        }

        if self.kind() == ProjectionKind::TwoD {
            return (planes, 4);
        }
        planes[4] = Plane::from_point(-view, pos + view * self.z_near(hierarchy));
        planes[5] = Plane::from_point(view, pos + view * self.z_far(hierarchy));
        (planes, 6)
    }

    /// Whether a world point lies inside every boundary plane.
    pub fn is_point_visible(&mut self, hierarchy: &Hierarchy, point: Point3) -> bool {
        self.ensure_boundary(hierarchy);
        self.boundary[..self.boundary_count]
            .iter()
            .all(|plane| plane.signed_distance(point) <= 0.0)
    }

    /// Classify a sphere against the boundary planes.
    pub fn ball_visibility(&mut self, hierarchy: &Hierarchy, center: Point3, radius: f32) -> Visibility {
        self.ensure_boundary(hierarchy);
        let mut straddles = false;
        for plane in &self.boundary[..self.boundary_count] {
            let distance = plane.signed_distance(center);
            if distance > radius {
                return Visibility::Invisible;
            }
            if distance > -radius {
                straddles = true;
            }
        }
        if straddles {
            Visibility::SemiVisible
        } else {
            Visibility::Visible
        }
    }

    /// Classify an axis-aligned box against the boundary planes.
    ///
    /// Conservative 8-corner test: a box tangent to a plane may be
    /// reported SemiVisible where exact clipping would say Visible.
    /// Callers rely on that bias; keep it.
    pub fn box_visibility(&mut self, hierarchy: &Hierarchy, min: Point3, max: Point3) -> Visibility {
        self.ensure_boundary(hierarchy);
        let corners = [
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(min.x, max.y, max.z),
            Point3::new(max.x, max.y, max.z),
        ];
        let mut straddles = false;
        for plane in &self.boundary[..self.boundary_count] {
            let outside = corners
                .iter()
                .filter(|corner| plane.signed_distance(**corner) > 0.0)
                .count();
            if outside == corners.len() {
                return Visibility::Invisible;
            }
            if outside > 0 {
                straddles = true;
            }
        }
        if straddles {
            Visibility::SemiVisible
        } else {
            Visibility::Visible
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use approx::assert_relative_eq;

    fn looking_down_z() -> (Hierarchy, Eye) {
        let mut h = Hierarchy::new();
        let key = h
            .attach(Frame::new().with_translation(Vec3::new(0.0, 0.0, 10.0)), None)
            .unwrap();
        let mut eye = Eye::new(key);
        eye.set_viewport(600, 600);
        eye.set_scene_bounds(Point3::origin(), 4.0);
        (h, eye)
    }

    #[test]
    fn plane_signed_distance_sign_convention() {
        let plane = Plane::from_point(Vec3::z(), Vec3::new(0.0, 0.0, 2.0));
        assert!(plane.signed_distance(Point3::new(0.0, 0.0, 3.0)) > 0.0);
        assert!(plane.signed_distance(Point3::new(0.0, 0.0, 1.0)) < 0.0);
        assert_relative_eq!(plane.signed_distance(Point3::new(5.0, -1.0, 2.0)), 0.0);
    }

    #[test]
    fn scene_center_is_visible() {
        let (h, mut eye) = looking_down_z();
        assert!(eye.is_point_visible(&h, Point3::origin()));
        assert!(!eye.is_point_visible(&h, Point3::new(0.0, 0.0, 11.0)));
    }

    #[test]
    fn ball_classification_is_consistent() {
        let (h, mut eye) = looking_down_z();
        // Small ball at the center: inside every plane.
        assert_eq!(eye.ball_visibility(&h, Point3::origin(), 0.5), Visibility::Visible);
        // Ball far off to the side: outside a lateral plane.
        assert_eq!(
            eye.ball_visibility(&h, Point3::new(100.0, 0.0, 0.0), 1.0),
            Visibility::Invisible
        );
        // Huge ball straddling the planes.
        assert_eq!(
            eye.ball_visibility(&h, Point3::origin(), 50.0),
            Visibility::SemiVisible
        );
    }

    #[test]
    fn box_classification_matches_ball_on_clear_cases() {
        let (h, mut eye) = looking_down_z();
        assert_eq!(
            eye.box_visibility(&h, Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5)),
            Visibility::Visible
        );
        assert_eq!(
            eye.box_visibility(&h, Point3::new(90.0, -1.0, -1.0), Point3::new(95.0, 1.0, 1.0)),
            Visibility::Invisible
        );
        assert_eq!(
            eye.box_visibility(&h, Point3::new(-40.0, -40.0, -3.0), Point3::new(40.0, 40.0, 3.0)),
            Visibility::SemiVisible
        );
    }

    #[test]
    fn two_d_eye_has_four_planes() {
        let (h, mut eye) = looking_down_z();
        eye.set_kind(ProjectionKind::TwoD);
        assert_eq!(eye.boundary_planes(&h).len(), 4);
    }

    #[test]
    fn stale_boundary_reuses_last_good_planes() {
        let (mut h, mut eye) = looking_down_z();
        assert!(eye.is_point_visible(&h, Point3::origin()));
        eye.set_auto_update(false);
        // Move the eye far away; with auto updates off the cached planes
        // still classify the origin as visible.
        h.set_position(eye.frame(), Point3::new(1000.0, 0.0, 10.0));
        assert!(eye.is_point_visible(&h, Point3::origin()));
        eye.compute_boundary_equations(&h);
        assert!(!eye.is_point_visible(&h, Point3::origin()));
    }
}
