//! Graph: the scene-graph facade
//!
//! Owns the frame hierarchy, the eye, the cooperative scheduler and the
//! animated components (interpolators, spins), and exposes the
//! renderer-facing operations: advancing time, binding view/projection
//! matrices, traversing the hierarchy into a matrix sink and the screen-
//! coordinate bracket.

use crate::eye::Eye;
use crate::foundation::math::{constants, Mat4, Quat};
use crate::frame::Frame;
use crate::hierarchy::{FrameKey, Hierarchy, HierarchyError, TraversalVisit};
use crate::interpolate::Interpolator;
use crate::motion::Spin;
use crate::scheduler::{Scheduler, TaskKey};
use crate::sink::MatrixSink;
use slotmap::{new_key_type, SlotMap};
use std::time::Duration;

new_key_type! {
    /// Handle to an interpolator owned by a [`Graph`].
    pub struct InterpolatorKey;
    /// Handle to a spin owned by a [`Graph`].
    pub struct SpinKey;
}

/// Graph configuration.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Refresh eye caches lazily when the eye frame changes.
    pub auto_update: bool,

    /// Near-plane placement coefficient.
    pub z_near_coefficient: f32,

    /// Clipping-sphere coefficient.
    pub z_clipping_coefficient: f32,

    /// Vertical field of view the eye frame starts out with, in radians.
    pub initial_field_of_view: f32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            auto_update: true,
            z_near_coefficient: Eye::DEFAULT_Z_NEAR_COEFFICIENT,
            z_clipping_coefficient: Eye::DEFAULT_Z_CLIPPING_COEFFICIENT,
            initial_field_of_view: constants::QUARTER_PI,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Binding {
    Interpolator(InterpolatorKey),
    Spin(SpinKey),
}

/// The scene-graph core: hierarchy, eye, scheduler and animation state.
pub struct Graph {
    hierarchy: Hierarchy,
    eye: Eye,
    scheduler: Scheduler,
    interpolators: SlotMap<InterpolatorKey, Interpolator>,
    spins: SlotMap<SpinKey, Spin>,
    bindings: Vec<(TaskKey, Binding)>,
    in_screen_coordinates: bool,
    config: GraphConfig,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create a graph with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create a graph with an explicit configuration. The eye frame is
    /// attached as a root and placed so the (unit) scene sphere is
    /// visible.
    pub fn with_config(config: GraphConfig) -> Self {
        let mut hierarchy = Hierarchy::new();
        let magnitude = (config.initial_field_of_view / 2.0).tan().max(1.0e-4);
        let eye_frame = hierarchy
            .attach(Frame::new().with_scaling(magnitude), None)
            .expect("attaching the eye frame to an empty hierarchy cannot fail");
        let mut eye = Eye::new(eye_frame);
        eye.set_z_near_coefficient(config.z_near_coefficient);
        eye.set_z_clipping_coefficient(config.z_clipping_coefficient);
        eye.set_auto_update(config.auto_update);
        eye.show_entire_scene(&mut hierarchy);
        Self {
            hierarchy,
            eye,
            scheduler: Scheduler::new(),
            interpolators: SlotMap::with_key(),
            spins: SlotMap::with_key(),
            bindings: Vec::new(),
            in_screen_coordinates: false,
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// The frame hierarchy.
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Mutable access to the frame hierarchy.
    pub fn hierarchy_mut(&mut self) -> &mut Hierarchy {
        &mut self.hierarchy
    }

    /// The eye subsystem.
    pub fn eye(&self) -> &Eye {
        &self.eye
    }

    /// Mutable access to the eye subsystem.
    pub fn eye_mut(&mut self) -> &mut Eye {
        &mut self.eye
    }

    /// The cooperative scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Split mutable access to eye and hierarchy for eye operations that
    /// move the eye frame (`look_at`, `fit_sphere`, ...).
    pub fn eye_and_hierarchy_mut(&mut self) -> (&mut Eye, &mut Hierarchy) {
        (&mut self.eye, &mut self.hierarchy)
    }

    /// Attach a frame to the hierarchy.
    pub fn attach_frame(
        &mut self,
        frame: Frame,
        reference: Option<FrameKey>,
    ) -> Result<FrameKey, HierarchyError> {
        self.hierarchy.attach(frame, reference)
    }

    // --- animation -----------------------------------------------------

    /// Create an interpolator driving `target` and register its
    /// scheduler task.
    pub fn add_interpolator(&mut self, target: FrameKey) -> InterpolatorKey {
        let task = self.scheduler.register();
        let mut interpolator = Interpolator::new(target);
        interpolator.task = Some(task);
        let key = self.interpolators.insert(interpolator);
        self.bindings.push((task, Binding::Interpolator(key)));
        key
    }

    /// Borrow an interpolator.
    pub fn interpolator(&self, key: InterpolatorKey) -> Option<&Interpolator> {
        self.interpolators.get(key)
    }

    /// Mutably borrow an interpolator (keyframe editing, parameters).
    pub fn interpolator_mut(&mut self, key: InterpolatorKey) -> Option<&mut Interpolator> {
        self.interpolators.get_mut(key)
    }

    /// Arm an interpolator's playback task.
    pub fn start_interpolation(&mut self, key: InterpolatorKey) {
        if let Some(interpolator) = self.interpolators.get_mut(key) {
            interpolator.start(&mut self.scheduler);
        }
    }

    /// Disarm an interpolator's playback task.
    pub fn stop_interpolation(&mut self, key: InterpolatorKey) {
        if let Some(interpolator) = self.interpolators.get_mut(key) {
            interpolator.stop(&mut self.scheduler);
        }
    }

    /// Drop an interpolator and its scheduler task.
    pub fn remove_interpolator(&mut self, key: InterpolatorKey) {
        if let Some(interpolator) = self.interpolators.remove(key) {
            if let Some(task) = interpolator.task {
                self.scheduler.unregister(task);
                self.bindings.retain(|(t, _)| *t != task);
            }
        }
    }

    /// Create an inertial spin for `frame` and register its scheduler
    /// task.
    pub fn add_spin(&mut self, frame: FrameKey, damping: f32) -> SpinKey {
        let task = self.scheduler.register();
        let mut spin = Spin::new(frame, damping);
        spin.task = Some(task);
        let key = self.spins.insert(spin);
        self.bindings.push((task, Binding::Spin(key)));
        key
    }

    /// Borrow a spin.
    pub fn spin(&self, key: SpinKey) -> Option<&Spin> {
        self.spins.get(key)
    }

    /// Kick a spin into its decaying state and arm its task.
    pub fn start_spin(&mut self, key: SpinKey, increment: Quat, interval: Duration) {
        if let Some(spin) = self.spins.get_mut(key) {
            spin.kick(increment);
            if let Some(task) = spin.task {
                self.scheduler.run(task, interval);
            }
        }
    }

    /// Halt a spin and disarm its task.
    pub fn stop_spin(&mut self, key: SpinKey) {
        if let Some(spin) = self.spins.get_mut(key) {
            spin.halt();
            if let Some(task) = spin.task {
                self.scheduler.stop(task);
            }
        }
    }

    /// Drop a spin and its scheduler task.
    pub fn remove_spin(&mut self, key: SpinKey) {
        if let Some(spin) = self.spins.remove(key) {
            if let Some(task) = spin.task {
                self.scheduler.unregister(task);
                self.bindings.retain(|(t, _)| *t != task);
            }
        }
    }

    /// Advance the scheduler by `dt` and dispatch fired tasks to their
    /// interpolators and spins, synchronously and in registration order.
    pub fn advance(&mut self, dt: Duration) {
        for task in self.scheduler.advance(dt) {
            let Some(binding) = self
                .bindings
                .iter()
                .find(|(t, _)| *t == task)
                .map(|(_, binding)| *binding)
            else {
                continue;
            };
            match binding {
                Binding::Interpolator(key) => {
                    let still_running = self
                        .interpolators
                        .get_mut(key)
                        .is_some_and(|interpolator| interpolator.tick(&mut self.hierarchy));
                    if !still_running {
                        self.scheduler.stop(task);
                    }
                }
                Binding::Spin(key) => {
                    let still_spinning = self
                        .spins
                        .get_mut(key)
                        .is_some_and(|spin| spin.advance(&mut self.hierarchy));
                    if !still_spinning {
                        self.scheduler.stop(task);
                    }
                }
            }
        }
    }

    // --- renderer boundary ----------------------------------------------

    /// Bind the eye's projection and view matrices to the sink.
    pub fn bind(&mut self, sink: &mut dyn MatrixSink) {
        let projection = self.eye.cached_projection(&self.hierarchy);
        let view = self.eye.cached_view(&self.hierarchy);
        sink.bind_projection(&projection);
        sink.bind_view(&view);
    }

    /// Depth-first traversal of the hierarchy through the sink.
    pub fn traverse(&self, sink: &mut dyn MatrixSink, visit: TraversalVisit<'_>) {
        self.hierarchy.traverse(sink, visit);
    }

    /// Enter pixel-space drawing: push the projection, bind a pixel
    /// ortho matrix and an identity view, push a local matrix.
    ///
    /// Brackets must be paired and non-nested; violating this indicates
    /// a corrupted matrix stack and stops execution.
    pub fn begin_screen_coordinates(&mut self, sink: &mut dyn MatrixSink) {
        if self.in_screen_coordinates {
            panic!("begin_screen_coordinates: bracket is already open");
        }
        self.in_screen_coordinates = true;
        let (width, height) = self.eye.viewport();
        let (w, h) = (width as f32, height as f32);
        // glOrtho(0, w, h, 0, -1, 1): pixel origin at the top left.
        let ortho = Mat4::new(
            2.0 / w, 0.0, 0.0, -1.0,
            0.0, -2.0 / h, 0.0, 1.0,
            0.0, 0.0, -1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        sink.push_projection();
        sink.bind_projection(&ortho);
        sink.bind_view(&Mat4::identity());
        sink.push_local();
    }

    /// Leave pixel-space drawing and restore the eye's matrices.
    pub fn end_screen_coordinates(&mut self, sink: &mut dyn MatrixSink) {
        if !self.in_screen_coordinates {
            panic!("end_screen_coordinates: bracket is not open");
        }
        self.in_screen_coordinates = false;
        sink.pop_local();
        sink.pop_projection();
        let view = self.eye.cached_view(&self.hierarchy);
        sink.bind_view(&view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Point3, Vec3};
    use crate::frame::FrameSnapshot;
    use crate::motion::SpinState;
    use crate::sink::MatrixStack;
    use approx::assert_relative_eq;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn new_graph_sees_the_default_scene_sphere() {
        init_logging();
        let mut graph = Graph::new();
        let (eye, hierarchy) = graph.eye_and_hierarchy_mut();
        assert_eq!(
            eye.ball_visibility(hierarchy, Point3::origin(), 0.9),
            crate::eye::Visibility::Visible
        );
    }

    #[test]
    fn advance_drives_an_interpolator_to_completion() {
        init_logging();
        let mut graph = Graph::new();
        let target = graph.attach_frame(Frame::new(), None).unwrap();
        let key = graph.add_interpolator(target);
        {
            let interpolator = graph.interpolator_mut(key).unwrap();
            interpolator.add_keyframe(FrameSnapshot::identity(), 0.0).unwrap();
            interpolator
                .add_keyframe(
                    FrameSnapshot::from_parts(Point3::new(4.0, 0.0, 0.0), Quat::identity(), 1.0),
                    1.0,
                )
                .unwrap();
            interpolator.set_period(Duration::from_millis(100));
        }
        graph.start_interpolation(key);
        for _ in 0..15 {
            graph.advance(Duration::from_millis(100));
        }
        assert!(!graph.interpolator(key).unwrap().is_running());
        assert_relative_eq!(
            graph.hierarchy().position(target),
            Point3::new(4.0, 0.0, 0.0),
            epsilon = 1e-4
        );
        // The task disarmed itself at the end of the path.
        let task = graph.interpolator(key).unwrap().task.unwrap();
        assert!(!graph.scheduler().is_active(task));
    }

    #[test]
    fn advance_decays_a_spin_to_idle() {
        let mut graph = Graph::new();
        let frame = graph.attach_frame(Frame::new(), None).unwrap();
        let key = graph.add_spin(frame, 0.5);
        graph.start_spin(
            key,
            Quat::from_axis_angle(&Vec3::y_axis(), 0.2),
            Duration::from_millis(10),
        );
        for _ in 0..50 {
            graph.advance(Duration::from_millis(10));
        }
        assert_eq!(graph.spin(key).unwrap().state(), SpinState::Idle);
        assert!(graph.hierarchy().orientation(frame).angle() > 0.0);
    }

    #[test]
    fn bind_pushes_eye_matrices_into_the_sink() {
        let mut graph = Graph::new();
        let mut sink = MatrixStack::new();
        graph.bind(&mut sink);
        assert!(*sink.projection() != Mat4::identity());
        assert!(*sink.view() != Mat4::identity());
    }

    #[test]
    fn screen_coordinate_bracket_balances_the_sink() {
        let mut graph = Graph::new();
        graph.eye_mut().set_viewport(640, 480);
        let mut sink = MatrixStack::new();
        graph.begin_screen_coordinates(&mut sink);
        // Top-left pixel maps to the upper-left NDC corner.
        let corner = sink.projection().transform_point(&Point3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(corner.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(corner.y, 1.0, epsilon = 1e-5);
        graph.end_screen_coordinates(&mut sink);
        assert_eq!(sink.depth(), 1);
    }

    #[test]
    #[should_panic(expected = "already open")]
    fn nested_screen_bracket_is_fatal() {
        let mut graph = Graph::new();
        let mut sink = MatrixStack::new();
        graph.begin_screen_coordinates(&mut sink);
        graph.begin_screen_coordinates(&mut sink);
    }

    #[test]
    #[should_panic(expected = "not open")]
    fn unmatched_end_bracket_is_fatal() {
        let mut graph = Graph::new();
        let mut sink = MatrixStack::new();
        graph.end_screen_coordinates(&mut sink);
    }
}
