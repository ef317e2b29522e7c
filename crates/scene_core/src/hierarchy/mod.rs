//! Frame hierarchy: arena, membership and world-space composition
//!
//! The hierarchy owns every attached [`Frame`] in a slotmap arena; parent
//! links are non-owning [`FrameKey`]s. Reachability is a pure function of
//! the reference pointers and the membership sets (roots, per-frame
//! children) and is never inferred from traversal history.
//!
//! Every mutation bumps a monotonic clock and cascades the new tick to the
//! mutated frame's descendants, so dependents (the eye's cached matrices
//! and boundary planes) can detect staleness cheaply.

mod traversal;

pub use traversal::TraversalVisit;

use crate::foundation::math::{Mat4, Point3, Quat, Vec3};
use crate::frame::{Constraint, Frame};
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

new_key_type! {
    /// Handle to a frame owned by a [`Hierarchy`].
    pub struct FrameKey;
}

/// Process-wide unique, color-encodable identifier for picking.
///
/// Ids fit in 24 bits so they survive a round trip through an RGB8
/// picking buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u32);

impl FrameId {
    /// Id of a frame that has never been attached to a hierarchy.
    pub const UNASSIGNED: FrameId = FrameId(0);

    /// Largest id the allocator will hand out.
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Raw id value.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Encode the id as an RGBA color for a picking buffer.
    pub fn to_color(self) -> [u8; 4] {
        let [_, r, g, b] = self.0.to_be_bytes();
        [r, g, b, 0xFF]
    }

    /// Decode an id from an RGBA picking-buffer sample.
    pub fn from_color(color: [u8; 4]) -> Self {
        Self(u32::from_be_bytes([0, color[0], color[1], color[2]]))
    }
}

/// Explicit id source owned by the hierarchy context.
#[derive(Debug)]
pub struct FrameIdAllocator {
    next: u32,
}

impl Default for FrameIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl FrameIdAllocator {
    /// Start allocating from `first` (must be non-zero).
    pub fn starting_at(first: u32) -> Self {
        Self { next: first.max(1) }
    }

    /// Allocate the next id. Exhausting the id space is a fatal usage
    /// error: the picking buffer cannot represent further frames.
    pub fn allocate(&mut self) -> FrameId {
        if self.next > FrameId::MAX {
            panic!("frame id space exhausted ({} ids allocated)", FrameId::MAX);
        }
        let id = FrameId(self.next);
        self.next += 1;
        id
    }
}

/// Errors from hierarchy mutations. The failing operation is a no-op: the
/// previous state is fully retained.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    /// A key did not resolve to a live frame.
    #[error("frame key does not resolve to a live frame")]
    StaleKey,
    /// The proposed reference is the frame itself or one of its
    /// descendants.
    #[error("reference change would create a cycle")]
    WouldCycle,
    /// One frame is attached (reachable) and the other is not.
    #[error("frames are not attached to the same hierarchy state")]
    DetachmentMismatch,
}

/// Owns the frame arena, the root set and the modification clock.
#[derive(Debug)]
pub struct Hierarchy {
    pub(crate) frames: SlotMap<FrameKey, Frame>,
    pub(crate) roots: Vec<FrameKey>,
    clock: u64,
    ids: FrameIdAllocator,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl Hierarchy {
    /// Create an empty hierarchy.
    pub fn new() -> Self {
        Self::with_id_allocator(FrameIdAllocator::default())
    }

    /// Create an empty hierarchy with an explicit id source.
    pub fn with_id_allocator(ids: FrameIdAllocator) -> Self {
        Self {
            frames: SlotMap::with_key(),
            roots: Vec::new(),
            clock: 0,
            ids,
        }
    }

    /// Attach a frame under `reference` (or as a root) and return its key.
    pub fn attach(&mut self, frame: Frame, reference: Option<FrameKey>) -> Result<FrameKey, HierarchyError> {
        if let Some(parent) = reference {
            if !self.frames.contains_key(parent) {
                log::warn!("attach: reference key is stale");
                return Err(HierarchyError::StaleKey);
            }
        }
        let mut frame = frame;
        frame.reference = reference;
        frame.children.clear();
        frame.id = self.ids.allocate();
        let key = self.frames.insert(frame);
        match reference {
            Some(parent) => self.frames[parent].children.push(key),
            None => self.roots.push(key),
        }
        self.touch(key);
        Ok(key)
    }

    /// Number of frames owned by the arena (reachable or pruned).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the arena owns no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Root frames in insertion order.
    pub fn roots(&self) -> &[FrameKey] {
        &self.roots
    }

    /// Borrow a frame.
    pub fn frame(&self, key: FrameKey) -> Option<&Frame> {
        self.frames.get(key)
    }

    /// Whether `key` resolves to a live frame.
    pub fn contains(&self, key: FrameKey) -> bool {
        self.frames.contains_key(key)
    }

    /// Current value of the modification clock.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Whether `ancestor` appears on `key`'s reference chain (strictly
    /// above it).
    pub fn is_ancestor(&self, ancestor: FrameKey, key: FrameKey) -> bool {
        let mut cursor = self.frames.get(key).and_then(|f| f.reference);
        while let Some(k) = cursor {
            if k == ancestor {
                return true;
            }
            cursor = self.frames.get(k).and_then(|f| f.reference);
        }
        false
    }

    /// Whether the frame is reachable from the root set through the
    /// membership lists.
    pub fn is_reachable(&self, key: FrameKey) -> bool {
        let mut cursor = key;
        loop {
            let Some(frame) = self.frames.get(cursor) else {
                return false;
            };
            match frame.reference {
                None => return self.roots.contains(&cursor),
                Some(parent) => {
                    let Some(parent_frame) = self.frames.get(parent) else {
                        return false;
                    };
                    if !parent_frame.children.contains(&cursor) {
                        return false;
                    }
                    cursor = parent;
                }
            }
        }
    }

    // --- world-space composition -------------------------------------

    /// World position, orientation and magnitude of a frame, composed up
    /// the reference chain. Panics on a stale key.
    pub fn world_transform(&self, key: FrameKey) -> (Point3, Quat, f32) {
        let frame = &self.frames[key];
        match frame.reference {
            Some(parent) => {
                let (p_pos, p_ori, p_mag) = self.world_transform(parent);
                (
                    p_pos + p_ori * (frame.translation * p_mag),
                    p_ori * frame.rotation,
                    p_mag * frame.scaling,
                )
            }
            None => (Point3::from(frame.translation), frame.rotation, frame.scaling),
        }
    }

    /// World position of a frame.
    pub fn position(&self, key: FrameKey) -> Point3 {
        self.world_transform(key).0
    }

    /// World orientation of a frame.
    pub fn orientation(&self, key: FrameKey) -> Quat {
        let frame = &self.frames[key];
        match frame.reference {
            Some(parent) => self.orientation(parent) * frame.rotation,
            None => frame.rotation,
        }
    }

    /// World magnitude (composed uniform scale) of a frame.
    pub fn magnitude(&self, key: FrameKey) -> f32 {
        let frame = &self.frames[key];
        match frame.reference {
            Some(parent) => self.magnitude(parent) * frame.scaling,
            None => frame.scaling,
        }
    }

    /// The fully composed world matrix of a frame.
    pub fn world_matrix(&self, key: FrameKey) -> Mat4 {
        let (position, orientation, magnitude) = self.world_transform(key);
        Mat4::new_translation(&position.coords)
            * orientation.to_homogeneous()
            * Mat4::new_scaling(magnitude)
    }

    /// A detached frame undoing this frame's world transform.
    pub fn world_inverse(&self, key: FrameKey) -> Frame {
        let (position, orientation, magnitude) = self.world_transform(key);
        let inv_rotation = orientation.inverse();
        Frame::new()
            .with_rotation(inv_rotation)
            .with_scaling(1.0 / magnitude)
            .with_translation(-(inv_rotation * position.coords) / magnitude)
    }

    // --- point / vector conversion -----------------------------------

    /// Convert a world-space point into the frame's local space.
    pub fn location_of(&self, key: FrameKey, point: Point3) -> Point3 {
        let frame = &self.frames[key];
        let in_reference = match frame.reference {
            Some(parent) => self.location_of(parent, point),
            None => point,
        };
        frame.untransform_point(in_reference)
    }

    /// Convert a point in the frame's local space into world space.
    pub fn world_location_of(&self, key: FrameKey, point: Point3) -> Point3 {
        let frame = &self.frames[key];
        let in_reference = frame.transform_point(point);
        match frame.reference {
            Some(parent) => self.world_location_of(parent, in_reference),
            None => in_reference,
        }
    }

    /// Convert a point from `from`'s local space into `key`'s local space.
    pub fn location_from(&self, key: FrameKey, point: Point3, from: FrameKey) -> Point3 {
        if key == from {
            return point;
        }
        self.location_of(key, self.world_location_of(from, point))
    }

    /// Convert a world-space free vector into the frame's local space.
    /// Vectors are unaffected by translation but keep rotation and scale.
    pub fn displacement_of(&self, key: FrameKey, vector: Vec3) -> Vec3 {
        let frame = &self.frames[key];
        let in_reference = match frame.reference {
            Some(parent) => self.displacement_of(parent, vector),
            None => vector,
        };
        frame.untransform_vector(in_reference)
    }

    /// Convert a free vector in the frame's local space into world space.
    pub fn world_displacement_of(&self, key: FrameKey, vector: Vec3) -> Vec3 {
        let frame = &self.frames[key];
        let in_reference = frame.transform_vector(vector);
        match frame.reference {
            Some(parent) => self.world_displacement_of(parent, in_reference),
            None => in_reference,
        }
    }

    /// Convert a free vector from `from`'s local space into `key`'s.
    pub fn displacement_from(&self, key: FrameKey, vector: Vec3, from: FrameKey) -> Vec3 {
        if key == from {
            return vector;
        }
        self.displacement_of(key, self.world_displacement_of(from, vector))
    }

    // --- mutation ----------------------------------------------------

    /// Compose a translation delta into the frame's local translation,
    /// filtered through the frame's constraint if one is attached.
    pub fn translate(&mut self, key: FrameKey, delta: Vec3) {
        let filtered = {
            let frame = &self.frames[key];
            match &frame.constraint {
                Some(constraint) => constraint.constrain_translation(delta, frame),
                None => delta,
            }
        };
        self.frames[key].translation += filtered;
        self.touch(key);
    }

    /// Compose a rotation delta into the frame's local rotation, filtered
    /// through the constraint. The result is renormalized to counter
    /// floating-point drift.
    pub fn rotate(&mut self, key: FrameKey, delta: Quat) {
        let filtered = {
            let frame = &self.frames[key];
            match &frame.constraint {
                Some(constraint) => constraint.constrain_rotation(delta, frame),
                None => delta,
            }
        };
        let frame = &mut self.frames[key];
        frame.rotation = Quat::new_normalize(frame.rotation.into_inner() * filtered.into_inner());
        self.touch(key);
    }

    /// Set the local translation directly.
    pub fn set_translation(&mut self, key: FrameKey, translation: Vec3) {
        self.frames[key].translation = translation;
        self.touch(key);
    }

    /// Set the local rotation directly.
    pub fn set_rotation(&mut self, key: FrameKey, rotation: Quat) {
        self.frames[key].rotation = rotation;
        self.touch(key);
    }

    /// Set the local uniform scale. Non-positive requests are rejected
    /// and the previous scale is retained.
    pub fn set_scaling(&mut self, key: FrameKey, scaling: f32) {
        if scaling <= 0.0 {
            log::warn!("set_scaling: ignoring non-positive scale {scaling}");
            return;
        }
        self.frames[key].scaling = scaling;
        self.touch(key);
    }

    /// Set the world position by converting it into the equivalent local
    /// translation through the reference chain.
    pub fn set_position(&mut self, key: FrameKey, position: Point3) {
        let local = match self.frames[key].reference {
            Some(parent) => self.location_of(parent, position),
            None => position,
        };
        self.frames[key].translation = local.coords;
        self.touch(key);
    }

    /// Set the world orientation by converting it into the equivalent
    /// local rotation.
    pub fn set_orientation(&mut self, key: FrameKey, orientation: Quat) {
        let local = match self.frames[key].reference {
            Some(parent) => self.orientation(parent).inverse() * orientation,
            None => orientation,
        };
        self.frames[key].rotation = local;
        self.touch(key);
    }

    /// Set the world magnitude by converting it into the equivalent local
    /// scale. Non-positive requests are rejected.
    pub fn set_magnitude(&mut self, key: FrameKey, magnitude: f32) {
        if magnitude <= 0.0 {
            log::warn!("set_magnitude: ignoring non-positive magnitude {magnitude}");
            return;
        }
        let local = match self.frames[key].reference {
            Some(parent) => magnitude / self.magnitude(parent),
            None => magnitude,
        };
        self.frames[key].scaling = local;
        self.touch(key);
    }

    /// Flag or unflag the frame's subtree as skipped by traversal.
    pub fn set_culled(&mut self, key: FrameKey, culled: bool) {
        self.frames[key].culled = culled;
    }

    /// Attach, replace or remove the frame's motion constraint.
    pub fn set_constraint(&mut self, key: FrameKey, constraint: Option<Box<dyn Constraint>>) {
        self.frames[key].constraint = constraint;
    }

    /// Change the frame's reference (parent).
    ///
    /// Rejected with no state change when the proposed reference is the
    /// frame itself or one of its descendants, when either key is stale,
    /// or when exactly one of the two frames is detached from the
    /// reachable hierarchy.
    pub fn set_reference(&mut self, key: FrameKey, reference: Option<FrameKey>) -> Result<(), HierarchyError> {
        if !self.frames.contains_key(key) {
            log::warn!("set_reference: stale frame key");
            return Err(HierarchyError::StaleKey);
        }
        if let Some(new_parent) = reference {
            if !self.frames.contains_key(new_parent) {
                log::warn!("set_reference: stale reference key");
                return Err(HierarchyError::StaleKey);
            }
            if new_parent == key || self.is_ancestor(key, new_parent) {
                log::warn!("set_reference: rejected, would create a reference cycle");
                return Err(HierarchyError::WouldCycle);
            }
            if self.is_reachable(key) != self.is_reachable(new_parent) {
                log::warn!("set_reference: rejected, frames disagree on attachment");
                return Err(HierarchyError::DetachmentMismatch);
            }
        }
        self.unlink(key);
        match reference {
            Some(new_parent) => self.frames[new_parent].children.push(key),
            None => self.roots.push(key),
        }
        self.frames[key].reference = reference;
        self.touch(key);
        Ok(())
    }

    /// Remove the frame from its parent's child list or from the root
    /// set, whichever currently holds it.
    pub(crate) fn unlink(&mut self, key: FrameKey) {
        match self.frames[key].reference {
            Some(parent) => {
                if let Some(parent_frame) = self.frames.get_mut(parent) {
                    parent_frame.children.retain(|k| *k != key);
                }
            }
            None => self.roots.retain(|k| *k != key),
        }
    }

    /// Bump the modification clock and cascade the new tick over the
    /// frame's subtree (O(subtree size)).
    pub(crate) fn touch(&mut self, key: FrameKey) {
        self.clock += 1;
        let tick = self.clock;
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            let frame = &mut self.frames[k];
            frame.last_modified = tick;
            stack.extend(frame.children.iter().copied());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::PI;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn chain(h: &mut Hierarchy) -> (FrameKey, FrameKey, FrameKey) {
        let a = h.attach(Frame::new().with_scaling(2.0), None).unwrap();
        let b = h
            .attach(
                Frame::new()
                    .with_translation(Vec3::new(1.0, 0.0, 0.0))
                    .with_rotation(Quat::from_axis_angle(&Vec3::y_axis(), PI / 2.0))
                    .with_scaling(3.0),
                Some(a),
            )
            .unwrap();
        let c = h
            .attach(Frame::new().with_translation(Vec3::new(0.0, 0.0, 1.0)), Some(b))
            .unwrap();
        (a, b, c)
    }

    #[test]
    fn magnitude_composes_down_the_chain() {
        let mut h = Hierarchy::new();
        let (_, _, c) = chain(&mut h);
        assert_relative_eq!(h.magnitude(c), 6.0, epsilon = EPSILON);
    }

    #[test]
    fn world_position_matches_composition_law() {
        let mut h = Hierarchy::new();
        let (_, b, c) = chain(&mut h);
        let expected = h.position(b) + h.orientation(b) * (Vec3::new(0.0, 0.0, 1.0) * h.magnitude(b));
        assert_relative_eq!(h.position(c), expected, epsilon = EPSILON);
    }

    #[test]
    fn set_position_round_trips_at_depth() {
        let mut h = Hierarchy::new();
        let (_, _, c) = chain(&mut h);
        let target = Point3::new(-4.0, 2.5, 7.0);
        h.set_position(c, target);
        assert_relative_eq!(h.position(c), target, epsilon = 1e-4);
    }

    #[test]
    fn set_orientation_and_magnitude_round_trip() {
        let mut h = Hierarchy::new();
        let (_, _, c) = chain(&mut h);
        let q = Quat::from_axis_angle(&Vec3::x_axis(), 0.4);
        h.set_orientation(c, q);
        assert!(h.orientation(c).coords.dot(&q.coords).abs() > 0.999_9);
        h.set_magnitude(c, 5.0);
        assert_relative_eq!(h.magnitude(c), 5.0, epsilon = 1e-4);
    }

    #[test]
    fn location_round_trip() {
        let mut h = Hierarchy::new();
        let (_, _, c) = chain(&mut h);
        let p = Point3::new(0.3, -1.2, 2.0);
        assert_relative_eq!(h.location_of(c, h.world_location_of(c, p)), p, epsilon = 1e-4);
        let v = Vec3::new(1.0, 2.0, -0.5);
        assert_relative_eq!(h.displacement_of(c, h.world_displacement_of(c, v)), v, epsilon = 1e-4);
    }

    #[test]
    fn displacement_ignores_translation() {
        let mut h = Hierarchy::new();
        let a = h
            .attach(Frame::new().with_translation(Vec3::new(10.0, 0.0, 0.0)), None)
            .unwrap();
        let v = Vec3::new(0.0, 1.0, 0.0);
        assert_relative_eq!(h.world_displacement_of(a, v), v, epsilon = EPSILON);
    }

    #[test]
    fn set_reference_rejects_self_and_descendants() {
        let mut h = Hierarchy::new();
        let (a, b, c) = chain(&mut h);
        assert_eq!(h.set_reference(a, Some(a)), Err(HierarchyError::WouldCycle));
        assert_eq!(h.set_reference(a, Some(c)), Err(HierarchyError::WouldCycle));
        // State unchanged.
        assert_eq!(h.frame(a).unwrap().reference(), None);
        assert_eq!(h.frame(c).unwrap().reference(), Some(b));
    }

    #[test]
    fn set_reference_relinks_membership() {
        let mut h = Hierarchy::new();
        let (a, b, c) = chain(&mut h);
        h.set_reference(c, Some(a)).unwrap();
        assert!(h.frame(a).unwrap().children().contains(&c));
        assert!(!h.frame(b).unwrap().children().contains(&c));
        assert!(h.is_reachable(c));
    }

    #[test]
    fn mutation_tick_cascades_to_descendants() {
        let mut h = Hierarchy::new();
        let (a, _, c) = chain(&mut h);
        let before = h.frame(c).unwrap().last_modified();
        h.translate(a, Vec3::new(0.0, 1.0, 0.0));
        assert!(h.frame(c).unwrap().last_modified() > before);
    }

    #[test]
    fn translate_applies_constraint_filter() {
        use crate::frame::{AxisPlaneConstraint, RotationFilter, TranslationFilter};
        let mut h = Hierarchy::new();
        let a = h
            .attach(
                Frame::new().with_constraint(Box::new(AxisPlaneConstraint {
                    translation: TranslationFilter::Forbidden,
                    rotation: RotationFilter::Free,
                })),
                None,
            )
            .unwrap();
        h.translate(a, Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(h.frame(a).unwrap().translation(), Vec3::zeros(), epsilon = EPSILON);
    }

    #[test]
    fn world_inverse_undoes_world_transform() {
        let mut h = Hierarchy::new();
        let (_, _, c) = chain(&mut h);
        let inverse = h.world_inverse(c);
        let p = Point3::new(1.0, -2.0, 0.5);
        let world = h.world_location_of(c, p);
        // Applying the inverse's local transform to the world point must
        // recover the local point.
        let m = inverse.matrix();
        assert_relative_eq!(m.transform_point(&world), p, epsilon = 1e-4);
    }

    #[test]
    fn frame_id_color_round_trip() {
        let mut ids = FrameIdAllocator::starting_at(0x00AB_CDEF);
        let id = ids.allocate();
        assert_eq!(FrameId::from_color(id.to_color()), id);
    }
}
