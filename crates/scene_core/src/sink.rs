//! Matrix-stack sink: the boundary to the host renderer
//!
//! The core never touches a graphics API. During traversal it pushes,
//! composes and pops local matrices through this trait, and binds the
//! eye's view/projection matrices the same way; what the host does with
//! them (GL, Vulkan, a 2D canvas, a test recorder) is its business.

use crate::foundation::math::{Mat4, Quat, Vec3};

/// Maximum push depth of the provided [`MatrixStack`]. Exceeding it on a
/// push, or popping the bottom entry, is a fatal usage error.
pub const MAX_STACK_DEPTH: usize = 64;

/// Sink for the matrices the core produces.
///
/// Mismatched push/pop pairs indicate a corrupted stack and must stop
/// execution rather than limp on; implementations are expected to treat
/// them as fatal the way [`MatrixStack`] does.
pub trait MatrixSink {
    /// Push a copy of the current local (model) matrix.
    fn push_local(&mut self);
    /// Pop the current local matrix, restoring the previous one.
    fn pop_local(&mut self);
    /// Right-multiply the current local matrix by `m`.
    fn apply_local(&mut self, m: &Mat4);
    /// Right-multiply the current local matrix by a translation.
    fn translate(&mut self, t: &Vec3);
    /// Right-multiply the current local matrix by a rotation.
    fn rotate(&mut self, q: &Quat);
    /// Right-multiply the current local matrix by a uniform scale.
    fn scale(&mut self, factor: f32);
    /// Push a copy of the current projection matrix.
    fn push_projection(&mut self);
    /// Pop the current projection matrix.
    fn pop_projection(&mut self);
    /// Replace the current projection matrix.
    fn bind_projection(&mut self, m: &Mat4);
    /// Replace the current view matrix.
    fn bind_view(&mut self, m: &Mat4);
}

/// Reference [`MatrixSink`] implementation: bounded CPU-side matrix
/// stacks. Hosts with retained pipelines read the tops after traversal;
/// tests use it to observe what the core emitted.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    local: Vec<Mat4>,
    projection: Vec<Mat4>,
    view: Mat4,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixStack {
    /// Create a stack with identity matrices at the bottom.
    pub fn new() -> Self {
        Self {
            local: vec![Mat4::identity()],
            projection: vec![Mat4::identity()],
            view: Mat4::identity(),
        }
    }

    /// The current composed local matrix.
    pub fn local(&self) -> &Mat4 {
        self.local.last().expect("local stack cannot be empty")
    }

    /// The current projection matrix.
    pub fn projection(&self) -> &Mat4 {
        self.projection.last().expect("projection stack cannot be empty")
    }

    /// The current view matrix.
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Current push depth of the local stack (1 = just the identity).
    pub fn depth(&self) -> usize {
        self.local.len()
    }
}

impl MatrixSink for MatrixStack {
    fn push_local(&mut self) {
        if self.local.len() >= MAX_STACK_DEPTH {
            panic!("matrix stack overflow: local depth exceeds {MAX_STACK_DEPTH}");
        }
        let top = *self.local.last().expect("local stack cannot be empty");
        self.local.push(top);
    }

    fn pop_local(&mut self) {
        if self.local.len() <= 1 {
            panic!("matrix stack underflow: pop_local without matching push_local");
        }
        self.local.pop();
    }

    fn apply_local(&mut self, m: &Mat4) {
        let top = self.local.last_mut().expect("local stack cannot be empty");
        *top *= *m;
    }

    fn translate(&mut self, t: &Vec3) {
        self.apply_local(&Mat4::new_translation(t));
    }

    fn rotate(&mut self, q: &Quat) {
        self.apply_local(&q.to_homogeneous());
    }

    fn scale(&mut self, factor: f32) {
        self.apply_local(&Mat4::new_scaling(factor));
    }

    fn push_projection(&mut self) {
        if self.projection.len() >= MAX_STACK_DEPTH {
            panic!("matrix stack overflow: projection depth exceeds {MAX_STACK_DEPTH}");
        }
        let top = *self.projection.last().expect("projection stack cannot be empty");
        self.projection.push(top);
    }

    fn pop_projection(&mut self) {
        if self.projection.len() <= 1 {
            panic!("matrix stack underflow: pop_projection without matching push_projection");
        }
        self.projection.pop();
    }

    fn bind_projection(&mut self, m: &Mat4) {
        let top = self.projection.last_mut().expect("projection stack cannot be empty");
        *top = *m;
    }

    fn bind_view(&mut self, m: &Mat4) {
        self.view = *m;
    }
}
