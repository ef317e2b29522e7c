//! Depth-first traversal and branch surgery
//!
//! Traversal applies each frame's local transform to the matrix-stack
//! sink and invokes a per-frame visit hook; it never mutates the data
//! model itself. Branch pruning detaches a subtree from the membership
//! sets while keeping its keys alive so it can be re-attached later.

use crate::foundation::math::Mat4;
use crate::frame::Frame;
use crate::hierarchy::{FrameKey, Hierarchy, HierarchyError};
use crate::sink::MatrixSink;

/// Per-frame hook invoked during traversal with the frame and its
/// composed (root-to-frame) matrix.
pub type TraversalVisit<'a> = &'a mut dyn FnMut(FrameKey, &Frame, &Mat4);

impl Hierarchy {
    /// Depth-first traversal from every root, siblings in insertion
    /// order.
    ///
    /// For each visited frame: push a matrix-stack entry, apply the local
    /// transform, invoke `visit` with the composed matrix, recurse into
    /// children unless the frame is flagged culled, then pop.
    pub fn traverse(&self, sink: &mut dyn MatrixSink, visit: TraversalVisit<'_>) {
        let identity = Mat4::identity();
        for &root in &self.roots {
            self.traverse_frame(root, sink, &identity, visit);
        }
    }

    fn traverse_frame(
        &self,
        key: FrameKey,
        sink: &mut dyn MatrixSink,
        parent_matrix: &Mat4,
        visit: TraversalVisit<'_>,
    ) {
        let frame = &self.frames[key];
        let composed = parent_matrix * frame.matrix();
        sink.push_local();
        sink.apply_local(&frame.matrix());
        visit(key, frame, &composed);
        if !frame.culled {
            for &child in &frame.children {
                self.traverse_frame(child, sink, &composed, visit);
            }
        }
        sink.pop_local();
    }

    /// Collect `key` and its descendants depth-first (insertion order
    /// among siblings).
    pub fn collect_branch(&self, key: FrameKey) -> Vec<FrameKey> {
        let mut out = Vec::new();
        self.collect_into(key, &mut out);
        out
    }

    fn collect_into(&self, key: FrameKey, out: &mut Vec<FrameKey>) {
        out.push(key);
        for &child in &self.frames[key].children {
            self.collect_into(child, out);
        }
    }

    /// Detach `key`'s subtree from the reachable hierarchy.
    ///
    /// The frames stay alive in the arena (their keys remain valid and
    /// their reference pointers are preserved) so [`Self::append_branch`]
    /// can re-attach them. Returns the detached keys in depth-first
    /// order, or an empty list if `key` is not currently reachable.
    pub fn prune_branch(&mut self, key: FrameKey) -> Vec<FrameKey> {
        if !self.is_reachable(key) {
            return Vec::new();
        }
        let branch = self.collect_branch(key);
        self.unlink(key);
        branch
    }

    /// Re-attach a previously pruned branch under its recorded reference
    /// (or as a root if the reference no longer exists).
    pub fn append_branch(&mut self, key: FrameKey) -> Result<(), HierarchyError> {
        if !self.frames.contains_key(key) {
            log::warn!("append_branch: stale frame key");
            return Err(HierarchyError::StaleKey);
        }
        if self.is_reachable(key) {
            return Ok(());
        }
        match self.frames[key].reference {
            Some(parent) if self.frames.contains_key(parent) => {
                self.frames[parent].children.push(key);
            }
            _ => {
                self.frames[key].reference = None;
                self.roots.push(key);
            }
        }
        self.touch(key);
        Ok(())
    }

    /// Destroy `key`'s subtree: detach it and free every frame in it.
    /// Returns the number of frames removed (0 if the key was stale).
    pub fn remove_branch(&mut self, key: FrameKey) -> usize {
        if !self.frames.contains_key(key) {
            return 0;
        }
        let branch = self.collect_branch(key);
        self.unlink(key);
        for k in &branch {
            self.frames.remove(*k);
        }
        branch.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4, Point3, Vec3};
    use crate::sink::MatrixStack;
    use approx::assert_relative_eq;

    fn two_level(h: &mut Hierarchy) -> (FrameKey, FrameKey, FrameKey) {
        let root = h
            .attach(Frame::new().with_translation(Vec3::new(1.0, 0.0, 0.0)), None)
            .unwrap();
        let child = h
            .attach(Frame::new().with_translation(Vec3::new(0.0, 2.0, 0.0)), Some(root))
            .unwrap();
        let sibling = h
            .attach(Frame::new().with_translation(Vec3::new(0.0, 0.0, 3.0)), Some(root))
            .unwrap();
        (root, child, sibling)
    }

    #[test]
    fn traversal_visits_in_depth_first_insertion_order() {
        let mut h = Hierarchy::new();
        let (root, child, sibling) = two_level(&mut h);
        let mut order = Vec::new();
        let mut sink = MatrixStack::new();
        h.traverse(&mut sink, &mut |key, _, _| order.push(key));
        assert_eq!(order, vec![root, child, sibling]);
        // Balanced push/pop: depth restored.
        assert_eq!(sink.depth(), 1);
    }

    #[test]
    fn traversal_composes_local_transforms() {
        let mut h = Hierarchy::new();
        let (_, child, _) = two_level(&mut h);
        let mut composed = Mat4::identity();
        let mut sink = MatrixStack::new();
        h.traverse(&mut sink, &mut |key, _, matrix| {
            if key == child {
                composed = *matrix;
            }
        });
        let p = composed.transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(1.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn culled_frame_is_visited_but_subtree_is_skipped() {
        let mut h = Hierarchy::new();
        let (root, child, sibling) = two_level(&mut h);
        h.set_culled(root, true);
        let mut order = Vec::new();
        let mut sink = MatrixStack::new();
        h.traverse(&mut sink, &mut |key, _, _| order.push(key));
        assert_eq!(order, vec![root]);
        let _ = (child, sibling);
    }

    #[test]
    fn prune_then_append_restores_reachability() {
        let mut h = Hierarchy::new();
        let (root, child, sibling) = two_level(&mut h);
        let pruned = h.prune_branch(root);
        assert_eq!(pruned, vec![root, child, sibling]);
        assert!(!h.is_reachable(root));
        assert!(!h.is_reachable(child));
        // Keys stay valid while pruned.
        assert!(h.contains(child));

        h.append_branch(root).unwrap();
        assert!(h.is_reachable(child));
        assert!(h.is_reachable(sibling));
    }

    #[test]
    fn prune_unreachable_is_a_no_op() {
        let mut h = Hierarchy::new();
        let (root, child, _) = two_level(&mut h);
        let _ = h.prune_branch(root);
        assert!(h.prune_branch(child).is_empty());
    }

    #[test]
    fn remove_branch_frees_the_subtree() {
        let mut h = Hierarchy::new();
        let (root, child, sibling) = two_level(&mut h);
        assert_eq!(h.remove_branch(root), 3);
        assert!(!h.contains(root));
        assert!(!h.contains(child));
        assert!(!h.contains(sibling));
        assert!(h.roots().is_empty());
    }
}
