//! Eye: projection derivation and visibility for one designated frame
//!
//! The eye reads its frame's world position/orientation/magnitude from
//! the hierarchy and derives view/projection matrices, near/far clip
//! distances from the scene bounding sphere, and the frustum boundary
//! planes used for culling. Matrices and planes are cached; the cache is
//! refreshed when explicitly requested, or lazily when the eye frame's
//! modification tick advances while automatic updates are enabled.
//!
//! The vertical field of view is not stored: it derives from the eye
//! frame's magnitude as `fov = 2 * atan(magnitude)`, so zooming is a
//! scale change like any other frame mutation.

mod boundary;

pub use boundary::{Plane, Visibility};

use crate::foundation::math::{Mat3, Mat4, Point3, Quat, Vec3, Vec4};
use crate::hierarchy::{FrameKey, Hierarchy};
use thiserror::Error;

/// Projection formula selected by the eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    /// Perspective projection with fov derived from the eye magnitude.
    Perspective,
    /// Orthographic projection, rescaled by the distance to the anchor.
    Orthographic,
    /// Flat orthographic projection in pixel units.
    TwoD,
    /// Host-supplied projection override.
    Custom,
}

/// Errors from projection/unprojection queries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EyeError {
    /// The cached projection-view matrix has no inverse.
    #[error("projection-view matrix is not invertible")]
    SingularMatrix,
    /// A homogeneous divisor came out zero; the input point cannot be
    /// mapped.
    #[error("homogeneous divisor is zero")]
    DegenerateDivisor,
}

/// Host-supplied projection override used by [`ProjectionKind::Custom`].
pub type CustomProjection = Box<dyn Fn(&Eye, &Hierarchy) -> Mat4>;

/// The viewing state derived from one designated frame.
pub struct Eye {
    frame: FrameKey,
    kind: ProjectionKind,
    center: Point3,
    radius: f32,
    anchor: Point3,
    z_near_coefficient: f32,
    z_clipping_coefficient: f32,
    width: u32,
    height: u32,
    auto_update: bool,
    custom_projection: Option<CustomProjection>,

    cached_view: Mat4,
    cached_projection: Mat4,
    cached_proj_view: Mat4,
    matrices_tick: Option<u64>,
    matrices_dirty: bool,
    cached_inverse: Option<Mat4>,
    cache_inverse: bool,

    pub(crate) boundary: [Plane; 6],
    pub(crate) boundary_count: usize,
    pub(crate) boundary_tick: Option<u64>,
    pub(crate) boundary_dirty: bool,
}

impl Eye {
    /// Default near-plane coefficient.
    pub const DEFAULT_Z_NEAR_COEFFICIENT: f32 = 0.005;

    /// Default clipping coefficient (sqrt(3) encloses a scene cube).
    pub const DEFAULT_Z_CLIPPING_COEFFICIENT: f32 = 1.732_050_8;

    /// Create an eye viewing through `frame` with default parameters.
    pub fn new(frame: FrameKey) -> Self {
        Self {
            frame,
            kind: ProjectionKind::Perspective,
            center: Point3::origin(),
            radius: 1.0,
            anchor: Point3::origin(),
            z_near_coefficient: Self::DEFAULT_Z_NEAR_COEFFICIENT,
            z_clipping_coefficient: Self::DEFAULT_Z_CLIPPING_COEFFICIENT,
            width: 1,
            height: 1,
            auto_update: true,
            custom_projection: None,
            cached_view: Mat4::identity(),
            cached_projection: Mat4::identity(),
            cached_proj_view: Mat4::identity(),
            matrices_tick: None,
            matrices_dirty: true,
            cached_inverse: None,
            cache_inverse: false,
            boundary: [Plane::default(); 6],
            boundary_count: 6,
            boundary_tick: None,
            boundary_dirty: true,
        }
    }

    // --- state ---------------------------------------------------------

    /// The frame the eye views through.
    pub fn frame(&self) -> FrameKey {
        self.frame
    }

    /// View through a different frame.
    pub fn set_frame(&mut self, frame: FrameKey) {
        self.frame = frame;
        self.mark_dirty();
    }

    /// Current projection kind.
    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    /// Select the projection formula.
    pub fn set_kind(&mut self, kind: ProjectionKind) {
        self.kind = kind;
        self.mark_dirty();
    }

    /// Scene bounding-sphere center.
    pub fn scene_center(&self) -> Point3 {
        self.center
    }

    /// Scene bounding-sphere radius.
    pub fn scene_radius(&self) -> f32 {
        self.radius
    }

    /// Set the scene bounding sphere. A non-positive radius is rejected
    /// and the previous sphere retained.
    pub fn set_scene_bounds(&mut self, center: Point3, radius: f32) {
        if radius <= 0.0 {
            log::warn!("set_scene_bounds: ignoring non-positive radius {radius}");
            return;
        }
        self.center = center;
        self.radius = radius;
        self.mark_dirty();
    }

    /// The anchor (zoom pivot) used by the orthographic rescale.
    pub fn anchor(&self) -> Point3 {
        self.anchor
    }

    /// Move the anchor point.
    pub fn set_anchor(&mut self, anchor: Point3) {
        self.anchor = anchor;
        self.mark_dirty();
    }

    /// Near-plane placement coefficient.
    pub fn z_near_coefficient(&self) -> f32 {
        self.z_near_coefficient
    }

    /// Tune the near-plane clamp.
    pub fn set_z_near_coefficient(&mut self, coefficient: f32) {
        self.z_near_coefficient = coefficient;
        self.mark_dirty();
    }

    /// Clipping-sphere coefficient.
    pub fn z_clipping_coefficient(&self) -> f32 {
        self.z_clipping_coefficient
    }

    /// Tune the clipping-sphere coefficient.
    pub fn set_z_clipping_coefficient(&mut self, coefficient: f32) {
        self.z_clipping_coefficient = coefficient;
        self.mark_dirty();
    }

    /// Viewport size in pixels.
    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Set the viewport size. Non-positive dimensions are silently
    /// clamped to 1 to avoid division by zero.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.mark_dirty();
    }

    /// Viewport aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Whether caches refresh lazily when the eye frame changes.
    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    /// Enable or disable automatic cache refresh. With updates disabled,
    /// queries return the last computed values until an explicit
    /// recompute.
    pub fn set_auto_update(&mut self, enabled: bool) {
        self.auto_update = enabled;
    }

    /// Opt in or out of caching the inverse projection-view matrix used
    /// by unprojection (a performance/staleness trade-off the caller
    /// controls).
    pub fn set_inverse_caching(&mut self, enabled: bool) {
        self.cache_inverse = enabled;
        if !enabled {
            self.cached_inverse = None;
        }
    }

    /// Install the projection override used by [`ProjectionKind::Custom`].
    pub fn set_custom_projection(&mut self, projection: Option<CustomProjection>) {
        self.custom_projection = projection;
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.matrices_dirty = true;
        self.boundary_dirty = true;
        self.cached_inverse = None;
    }

    pub(crate) fn eye_tick(&self, hierarchy: &Hierarchy) -> u64 {
        hierarchy.frame(self.frame).map_or(0, crate::frame::Frame::last_modified)
    }

    // --- world-space reads ---------------------------------------------

    /// World position of the eye.
    pub fn position(&self, hierarchy: &Hierarchy) -> Point3 {
        hierarchy.position(self.frame)
    }

    /// World orientation of the eye.
    pub fn orientation(&self, hierarchy: &Hierarchy) -> Quat {
        hierarchy.orientation(self.frame)
    }

    /// World magnitude of the eye (drives the field of view).
    pub fn magnitude(&self, hierarchy: &Hierarchy) -> f32 {
        hierarchy.magnitude(self.frame)
    }

    /// Normalized world-space viewing direction.
    pub fn view_direction(&self, hierarchy: &Hierarchy) -> Vec3 {
        self.orientation(hierarchy) * -Vec3::z()
    }

    /// Normalized world-space up vector.
    pub fn up_vector(&self, hierarchy: &Hierarchy) -> Vec3 {
        self.orientation(hierarchy) * Vec3::y()
    }

    /// Normalized world-space right vector.
    pub fn right_vector(&self, hierarchy: &Hierarchy) -> Vec3 {
        self.orientation(hierarchy) * Vec3::x()
    }

    /// Vertical field of view in radians, derived from the eye magnitude.
    pub fn field_of_view(&self, hierarchy: &Hierarchy) -> f32 {
        2.0 * self.magnitude(hierarchy).atan()
    }

    /// Set the vertical field of view by adjusting the eye magnitude.
    pub fn set_field_of_view(&mut self, hierarchy: &mut Hierarchy, fov: f32) {
        hierarchy.set_magnitude(self.frame, (fov / 2.0).tan());
    }

    /// Signed distance from the eye to the scene center along the view
    /// axis.
    pub fn distance_to_scene_center(&self, hierarchy: &Hierarchy) -> f32 {
        let position = self.position(hierarchy);
        (self.center - position).dot(&self.view_direction(hierarchy))
    }

    // --- clip planes ----------------------------------------------------

    /// Near clip distance derived from the scene sphere.
    ///
    /// When the eye sits inside the clipping sphere the raw value would
    /// go non-positive; it is clamped to
    /// `z_near_coefficient * z_clipping_coefficient * radius` in
    /// perspective and to 0 otherwise.
    pub fn z_near(&self, hierarchy: &Hierarchy) -> f32 {
        let z_near = self.distance_to_scene_center(hierarchy) - self.z_clipping_coefficient * self.radius;
        let z_min = self.z_near_coefficient * self.z_clipping_coefficient * self.radius;
        if z_near < z_min {
            match self.kind {
                ProjectionKind::Perspective | ProjectionKind::Custom => z_min,
                ProjectionKind::Orthographic | ProjectionKind::TwoD => 0.0,
            }
        } else {
            z_near
        }
    }

    /// Far clip distance derived from the scene sphere.
    pub fn z_far(&self, hierarchy: &Hierarchy) -> f32 {
        self.distance_to_scene_center(hierarchy) + self.z_clipping_coefficient * self.radius
    }

    // --- matrices -------------------------------------------------------

    /// World-to-eye view matrix.
    pub fn view_matrix(&self, hierarchy: &Hierarchy) -> Mat4 {
        let (position, orientation, _) = hierarchy.world_transform(self.frame);
        orientation.inverse().to_homogeneous() * Mat4::new_translation(&-position.coords)
    }

    /// Orthographic half extents, rescaled by the projected distance to
    /// the anchor (3D) or taken from the pixel viewport (2D).
    pub fn ortho_half_extents(&self, hierarchy: &Hierarchy) -> (f32, f32) {
        let magnitude = self.magnitude(hierarchy);
        if self.kind == ProjectionKind::TwoD {
            return (
                (magnitude * self.width as f32 / 2.0).max(1.0e-6),
                (magnitude * self.height as f32 / 2.0).max(1.0e-6),
            );
        }
        let position = self.position(hierarchy);
        let dist = (self.anchor - position).dot(&self.view_direction(hierarchy)).abs();
        let k = (magnitude * dist).max(1.0e-6);
        let aspect = self.aspect_ratio();
        if aspect < 1.0 {
            (k, k / aspect)
        } else {
            (k * aspect, k)
        }
    }

    /// Derive the projection matrix for the current kind.
    pub fn projection_matrix(&self, hierarchy: &Hierarchy) -> Mat4 {
        match self.kind {
            ProjectionKind::Perspective => self.perspective_matrix(hierarchy),
            ProjectionKind::Orthographic | ProjectionKind::TwoD => self.orthographic_matrix(hierarchy),
            ProjectionKind::Custom => match &self.custom_projection {
                Some(projection) => projection(self, hierarchy),
                None => {
                    log::warn!("custom projection kind without an override, using perspective");
                    self.perspective_matrix(hierarchy)
                }
            },
        }
    }

    fn perspective_matrix(&self, hierarchy: &Hierarchy) -> Mat4 {
        // magnitude == tan(fov / 2)
        let f = 1.0 / self.magnitude(hierarchy);
        let near = self.z_near(hierarchy);
        let far = self.z_far(hierarchy).max(near + 1.0e-4);
        Mat4::new(
            f / self.aspect_ratio(), 0.0, 0.0, 0.0,
            0.0, f, 0.0, 0.0,
            0.0, 0.0, (near + far) / (near - far), 2.0 * near * far / (near - far),
            0.0, 0.0, -1.0, 0.0,
        )
    }

    fn orthographic_matrix(&self, hierarchy: &Hierarchy) -> Mat4 {
        let (half_width, half_height) = self.ortho_half_extents(hierarchy);
        let near = self.z_near(hierarchy);
        let far = self.z_far(hierarchy).max(near + 1.0e-4);
        Mat4::new(
            1.0 / half_width, 0.0, 0.0, 0.0,
            0.0, 1.0 / half_height, 0.0, 0.0,
            0.0, 0.0, -2.0 / (far - near), -(far + near) / (far - near),
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Recompute and cache view/projection, unconditionally.
    pub fn compute_matrices(&mut self, hierarchy: &Hierarchy) {
        self.cached_view = self.view_matrix(hierarchy);
        self.cached_projection = self.projection_matrix(hierarchy);
        self.cached_proj_view = self.cached_projection * self.cached_view;
        self.cached_inverse = None;
        self.matrices_tick = Some(self.eye_tick(hierarchy));
        self.matrices_dirty = false;
    }

    pub(crate) fn ensure_matrices(&mut self, hierarchy: &Hierarchy) {
        let current = !self.matrices_dirty && self.matrices_tick == Some(self.eye_tick(hierarchy));
        if self.matrices_tick.is_none() || (!current && self.auto_update) {
            self.compute_matrices(hierarchy);
        } else if !current {
            log::trace!("eye matrices stale; automatic updates disabled, returning last-good values");
        }
    }

    /// The cached view matrix, refreshed per the update policy.
    pub fn cached_view(&mut self, hierarchy: &Hierarchy) -> Mat4 {
        self.ensure_matrices(hierarchy);
        self.cached_view
    }

    /// The cached projection matrix, refreshed per the update policy.
    pub fn cached_projection(&mut self, hierarchy: &Hierarchy) -> Mat4 {
        self.ensure_matrices(hierarchy);
        self.cached_projection
    }

    // --- projection / unprojection --------------------------------------

    /// Map a world point to viewport coordinates: x/y in pixels (y down),
    /// z in [0, 1] depth.
    pub fn projected_coordinates_of(
        &mut self,
        hierarchy: &Hierarchy,
        point: Point3,
    ) -> Result<Point3, EyeError> {
        self.ensure_matrices(hierarchy);
        let clip = self.cached_proj_view * point.to_homogeneous();
        if clip.w.abs() < f32::EPSILON {
            log::warn!("projected_coordinates_of: zero homogeneous divisor");
            return Err(EyeError::DegenerateDivisor);
        }
        let ndc = clip.xyz() / clip.w;
        Ok(Point3::new(
            (ndc.x + 1.0) * 0.5 * self.width as f32,
            (1.0 - ndc.y) * 0.5 * self.height as f32,
            (ndc.z + 1.0) * 0.5,
        ))
    }

    /// Invert [`Self::projected_coordinates_of`]. Uses the cached inverse
    /// when inverse caching is enabled, otherwise inverts on demand.
    pub fn unprojected_coordinates_of(
        &mut self,
        hierarchy: &Hierarchy,
        point: Point3,
    ) -> Result<Point3, EyeError> {
        self.ensure_matrices(hierarchy);
        let inverse = if self.cache_inverse {
            if self.cached_inverse.is_none() {
                self.cached_inverse =
                    Some(self.cached_proj_view.try_inverse().ok_or(EyeError::SingularMatrix)?);
            }
            self.cached_inverse.expect("inverse cache filled above")
        } else {
            self.cached_proj_view.try_inverse().ok_or(EyeError::SingularMatrix)?
        };
        let ndc = Vec4::new(
            2.0 * point.x / self.width as f32 - 1.0,
            1.0 - 2.0 * point.y / self.height as f32,
            2.0 * point.z - 1.0,
            1.0,
        );
        let world = inverse * ndc;
        if world.w.abs() < f32::EPSILON {
            log::warn!("unprojected_coordinates_of: zero homogeneous divisor");
            return Err(EyeError::DegenerateDivisor);
        }
        Ok(Point3::from(world.xyz() / world.w))
    }

    // --- placement helpers ----------------------------------------------

    /// Aim the view axis at `target`, keeping roll minimal against the
    /// world up axis.
    pub fn look_at(&mut self, hierarchy: &mut Hierarchy, target: Point3) {
        let position = self.position(hierarchy);
        let direction = target - position;
        if direction.norm() < 1.0e-8 {
            log::warn!("look_at: target coincides with the eye position");
            return;
        }
        let forward = direction.normalize();
        let up_hint = if forward.cross(&Vec3::y()).norm() < 1.0e-6 {
            Vec3::x()
        } else {
            Vec3::y()
        };
        let right = forward.cross(&up_hint).normalize();
        let up = right.cross(&forward);
        let basis = Mat3::new(
            right.x, up.x, -forward.x,
            right.y, up.y, -forward.y,
            right.z, up.z, -forward.z,
        );
        hierarchy.set_orientation(self.frame, Quat::from_matrix(&basis));
    }

    /// Dolly the eye back along its view axis until the given sphere
    /// fits the frustum. 2D eyes do not dolly.
    pub fn fit_sphere(&mut self, hierarchy: &mut Hierarchy, center: Point3, radius: f32) {
        if radius <= 0.0 {
            log::warn!("fit_sphere: ignoring non-positive radius {radius}");
            return;
        }
        let distance = match self.kind {
            ProjectionKind::Perspective | ProjectionKind::Custom => {
                radius / (self.field_of_view(hierarchy) / 2.0).sin()
            }
            ProjectionKind::Orthographic => radius / self.magnitude(hierarchy),
            ProjectionKind::TwoD => {
                log::trace!("fit_sphere: 2D eye does not dolly");
                return;
            }
        };
        self.anchor = center;
        let view = self.view_direction(hierarchy);
        hierarchy.set_position(self.frame, center - view * distance);
        self.mark_dirty();
    }

    /// Move the eye so the whole scene sphere is visible.
    pub fn show_entire_scene(&mut self, hierarchy: &mut Hierarchy) {
        let (center, radius) = (self.center, self.radius);
        self.fit_sphere(hierarchy, center, radius);
    }

    /// World-units-per-pixel ratio at a given world point.
    pub fn pixel_ratio(&self, hierarchy: &Hierarchy, at: Point3) -> f32 {
        match self.kind {
            ProjectionKind::Perspective | ProjectionKind::Custom => {
                let position = self.position(hierarchy);
                let depth = (at - position).dot(&self.view_direction(hierarchy)).abs();
                2.0 * depth * self.magnitude(hierarchy) / self.height as f32
            }
            ProjectionKind::Orthographic | ProjectionKind::TwoD => {
                let (_, half_height) = self.ortho_half_extents(hierarchy);
                2.0 * half_height / self.height as f32
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use approx::assert_relative_eq;

    fn eye_at(position: Vec3) -> (Hierarchy, Eye) {
        let mut h = Hierarchy::new();
        let key = h.attach(Frame::new().with_translation(position), None).unwrap();
        let mut eye = Eye::new(key);
        eye.set_viewport(800, 600);
        (h, eye)
    }

    #[test]
    fn field_of_view_derives_from_magnitude() {
        let (mut h, mut eye) = eye_at(Vec3::new(0.0, 0.0, 5.0));
        h.set_magnitude(eye.frame(), 1.0);
        assert_relative_eq!(eye.field_of_view(&h), std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
        eye.set_field_of_view(&mut h, std::f32::consts::FRAC_PI_4);
        assert_relative_eq!(eye.field_of_view(&h), std::f32::consts::FRAC_PI_4, epsilon = 1e-5);
    }

    #[test]
    fn z_near_clamps_exactly_at_clipping_sphere_boundary() {
        let (mut h, mut eye) = eye_at(Vec3::new(0.0, 0.0, 300.0));
        eye.set_kind(ProjectionKind::Orthographic);
        eye.set_scene_bounds(Point3::origin(), 100.0);
        eye.look_at(&mut h, Point3::origin());

        // Eye outside the clipping sphere: positive z_near.
        let boundary = eye.z_clipping_coefficient() * eye.scene_radius();
        assert!(300.0 > boundary);
        assert!(eye.z_near(&h) > 0.0);

        // Exactly on the boundary: distance - coef*radius == 0, which is
        // below the perspective z_min, so the orthographic clamp kicks in.
        h.set_position(eye.frame(), Point3::new(0.0, 0.0, boundary));
        assert_relative_eq!(eye.z_near(&h), 0.0);

        // Inside the sphere: clamped to 0 for orthographic.
        h.set_position(eye.frame(), Point3::new(0.0, 0.0, 50.0));
        assert_relative_eq!(eye.z_near(&h), 0.0);

        // Perspective clamps to the positive minimum instead.
        eye.set_kind(ProjectionKind::Perspective);
        let z_min = eye.z_near_coefficient() * eye.z_clipping_coefficient() * eye.scene_radius();
        assert_relative_eq!(eye.z_near(&h), z_min, epsilon = 1e-5);
    }

    #[test]
    fn project_unproject_round_trip() {
        let (mut h, mut eye) = eye_at(Vec3::new(0.0, 0.0, 10.0));
        eye.set_scene_bounds(Point3::origin(), 2.0);
        eye.look_at(&mut h, Point3::origin());
        let p = Point3::new(0.3, -0.4, 1.0);
        let screen = eye.projected_coordinates_of(&h, p).unwrap();
        let back = eye.unprojected_coordinates_of(&h, screen).unwrap();
        assert_relative_eq!(back, p, epsilon = 1e-3);
    }

    #[test]
    fn inverse_caching_matches_on_demand_inversion() {
        let (mut h, mut eye) = eye_at(Vec3::new(1.0, 2.0, 8.0));
        eye.set_scene_bounds(Point3::origin(), 3.0);
        eye.look_at(&mut h, Point3::origin());
        let p = Point3::new(-0.5, 0.25, 0.0);
        let screen = eye.projected_coordinates_of(&h, p).unwrap();
        let plain = eye.unprojected_coordinates_of(&h, screen).unwrap();
        eye.set_inverse_caching(true);
        let cached = eye.unprojected_coordinates_of(&h, screen).unwrap();
        assert_relative_eq!(plain, cached, epsilon = 1e-5);
    }

    #[test]
    fn disabled_auto_update_returns_last_good_matrices() {
        let (mut h, mut eye) = eye_at(Vec3::new(0.0, 0.0, 5.0));
        eye.set_scene_bounds(Point3::origin(), 1.0);
        let before = eye.cached_view(&h);
        eye.set_auto_update(false);
        h.set_position(eye.frame(), Point3::new(100.0, 0.0, 5.0));
        let stale = eye.cached_view(&h);
        assert_relative_eq!(before, stale, epsilon = 1e-6);
        // Explicit recompute picks the move up.
        eye.compute_matrices(&h);
        let fresh = eye.cached_view(&h);
        assert!((fresh - before).abs().max() > 1.0);
    }

    #[test]
    fn fit_sphere_makes_sphere_visible() {
        let (mut h, mut eye) = eye_at(Vec3::new(0.0, 0.0, 1.0));
        eye.set_scene_bounds(Point3::new(5.0, 0.0, 0.0), 2.0);
        eye.look_at(&mut h, Point3::new(5.0, 0.0, 0.0));
        eye.show_entire_scene(&mut h);
        assert_eq!(
            eye.ball_visibility(&h, Point3::new(5.0, 0.0, 0.0), 1.9),
            Visibility::Visible
        );
    }

    #[test]
    fn look_at_aims_view_axis() {
        let (mut h, mut eye) = eye_at(Vec3::new(0.0, 0.0, 10.0));
        eye.look_at(&mut h, Point3::origin());
        assert_relative_eq!(eye.view_direction(&h), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }
}
