//! Inertial spin: timer-driven continuous rotation with decay
//!
//! An explicit state machine advanced once per scheduler fire: while
//! decaying, the target frame is rotated by the current increment and the
//! increment's angle is damped exponentially until it drops below a
//! threshold, at which point the spin goes idle.

use crate::foundation::math::Quat;
use crate::hierarchy::{FrameKey, Hierarchy};
use crate::scheduler::TaskKey;

/// Playback state of a [`Spin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinState {
    /// Not rotating.
    Idle,
    /// Rotating, losing angular velocity each tick.
    Decaying,
}

/// Exponential-decay rotation applied to one frame.
#[derive(Debug)]
pub struct Spin {
    frame: FrameKey,
    increment: Quat,
    damping: f32,
    min_angle: f32,
    state: SpinState,
    pub(crate) task: Option<TaskKey>,
}

impl Spin {
    /// Default angle threshold below which a spin goes idle (radians per
    /// tick).
    pub const DEFAULT_MIN_ANGLE: f32 = 1.0e-4;

    /// Create an idle spin for `frame`. `damping` is the per-tick angle
    /// multiplier; values outside (0, 1] are clamped.
    pub fn new(frame: FrameKey, damping: f32) -> Self {
        Self {
            frame,
            increment: Quat::identity(),
            damping: damping.clamp(f32::EPSILON, 1.0),
            min_angle: Self::DEFAULT_MIN_ANGLE,
            state: SpinState::Idle,
            task: None,
        }
    }

    /// The frame this spin rotates.
    pub fn frame(&self) -> FrameKey {
        self.frame
    }

    /// Current state.
    pub fn state(&self) -> SpinState {
        self.state
    }

    /// Current per-tick rotation increment.
    pub fn increment(&self) -> Quat {
        self.increment
    }

    /// The angle threshold below which the spin goes idle.
    pub fn min_angle(&self) -> f32 {
        self.min_angle
    }

    /// Set the idle threshold. A negative threshold is rejected and the
    /// previous value retained.
    pub fn set_min_angle(&mut self, min_angle: f32) {
        if min_angle < 0.0 {
            log::warn!("set_min_angle: ignoring negative threshold {min_angle}");
            return;
        }
        self.min_angle = min_angle;
    }

    /// Begin decaying from the given per-tick rotation. An increment
    /// below the idle threshold leaves the spin idle.
    pub fn kick(&mut self, increment: Quat) {
        if increment.angle() < self.min_angle {
            log::warn!("spin: increment below threshold, staying idle");
            self.state = SpinState::Idle;
            return;
        }
        self.increment = increment;
        self.state = SpinState::Decaying;
    }

    /// Force the spin idle.
    pub fn halt(&mut self) {
        self.state = SpinState::Idle;
    }

    /// Apply one tick: rotate the frame and damp the increment.
    /// Returns `false` once the spin has gone idle (so the caller can
    /// disarm the scheduler task).
    pub fn advance(&mut self, hierarchy: &mut Hierarchy) -> bool {
        if self.state != SpinState::Decaying {
            return false;
        }
        hierarchy.rotate(self.frame, self.increment);
        match self.increment.axis_angle() {
            Some((axis, angle)) => {
                let damped = angle * self.damping;
                if damped < self.min_angle {
                    self.state = SpinState::Idle;
                    return false;
                }
                self.increment = Quat::from_axis_angle(&axis, damped);
                true
            }
            None => {
                self.state = SpinState::Idle;
                false
            }
        }
    }
}
