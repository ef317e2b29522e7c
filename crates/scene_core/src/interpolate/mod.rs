//! Keyframe interpolation: Catmull-Rom positions, SQUAD orientations
//!
//! An [`Interpolator`] owns an ordered list of `(snapshot, time)`
//! keyframes and a target frame. On demand (or once per scheduler tick
//! while running) it evaluates the spline at the current time and writes
//! position, orientation and magnitude into the target through the
//! hierarchy's world setters.
//!
//! The bracketing keyframe pair is located with a four-index sliding
//! window: amortized O(1) while time moves forward, with a rescan when
//! time jumps backward or the keyframe list changed. Per-keyframe
//! tangents are recomputed lazily and cached until a keyframe mutation
//! invalidates them.

mod spline;

use crate::foundation::math::{self, utils, Quat, Vec3};
use crate::frame::FrameSnapshot;
use crate::hierarchy::{FrameKey, Hierarchy};
use crate::scheduler::{Scheduler, TaskKey};
use std::time::Duration;
use thiserror::Error;

/// Errors from keyframe list mutation. The list is unchanged on `Err`.
#[derive(Debug, Error, PartialEq)]
pub enum InterpolateError {
    /// Keyframe times must be non-decreasing in list order.
    #[error("keyframe time {time} precedes the last keyframe time {last}")]
    OutOfOrder {
        /// The rejected time.
        time: f32,
        /// The current last keyframe time.
        last: f32,
    },
    /// No keyframe at the given index.
    #[error("keyframe index {0} out of range")]
    IndexOutOfRange(usize),
}

/// One time-stamped sample on the interpolation path.
#[derive(Debug, Clone, Copy)]
pub struct Keyframe {
    snapshot: FrameSnapshot,
    time: f32,
    tangent: Vec3,
    quat_tangent: Quat,
}

impl Keyframe {
    /// The stored world-space sample.
    pub fn snapshot(&self) -> FrameSnapshot {
        self.snapshot
    }

    /// The sample's time stamp in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }
}

/// Spline engine driving one target frame along a keyframed path.
#[derive(Debug)]
pub struct Interpolator {
    keyframes: Vec<Keyframe>,
    target: FrameKey,
    time: f32,
    speed: f32,
    period: Duration,
    looping: bool,
    running: bool,
    window: [usize; 4],
    window_valid: bool,
    values_valid: bool,
    path_cache: Option<Vec<FrameSnapshot>>,
    path_resolution: usize,
    pub(crate) task: Option<TaskKey>,
}

impl Interpolator {
    /// Default scheduler tick period.
    pub const DEFAULT_PERIOD: Duration = Duration::from_millis(40);

    /// Default number of path samples per keyframe segment.
    pub const DEFAULT_PATH_RESOLUTION: usize = 30;

    /// Create an idle interpolator driving `target`.
    pub fn new(target: FrameKey) -> Self {
        Self {
            keyframes: Vec::new(),
            target,
            time: 0.0,
            speed: 1.0,
            period: Self::DEFAULT_PERIOD,
            looping: false,
            running: false,
            window: [0; 4],
            window_valid: false,
            values_valid: false,
            path_cache: None,
            path_resolution: Self::DEFAULT_PATH_RESOLUTION,
            task: None,
        }
    }

    // --- keyframe list -------------------------------------------------

    /// Append a keyframe. Times must be non-decreasing: an earlier time
    /// is rejected and the list retained.
    pub fn add_keyframe(&mut self, snapshot: FrameSnapshot, time: f32) -> Result<(), InterpolateError> {
        if let Some(last) = self.keyframes.last() {
            if time < last.time {
                log::warn!("add_keyframe: time {time} precedes last keyframe time {}", last.time);
                return Err(InterpolateError::OutOfOrder { time, last: last.time });
            }
        }
        self.keyframes.push(Keyframe {
            snapshot,
            time,
            tangent: Vec3::zeros(),
            quat_tangent: snapshot.orientation,
        });
        self.invalidate();
        Ok(())
    }

    /// Snapshot an attached frame and append it as a keyframe.
    pub fn add_keyframe_of(
        &mut self,
        hierarchy: &Hierarchy,
        key: FrameKey,
        time: f32,
    ) -> Result<(), InterpolateError> {
        self.add_keyframe(FrameSnapshot::of(hierarchy, key), time)
    }

    /// Remove the keyframe at `index`.
    pub fn remove_keyframe(&mut self, index: usize) -> Result<Keyframe, InterpolateError> {
        if index >= self.keyframes.len() {
            return Err(InterpolateError::IndexOutOfRange(index));
        }
        let removed = self.keyframes.remove(index);
        self.invalidate();
        Ok(removed)
    }

    /// Drop every keyframe.
    pub fn clear_keyframes(&mut self) {
        self.keyframes.clear();
        self.invalidate();
    }

    /// The keyframes in time order.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Number of keyframes.
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Time of the first keyframe (0 when empty).
    pub fn first_time(&self) -> f32 {
        self.keyframes.first().map_or(0.0, |k| k.time)
    }

    /// Time of the last keyframe (0 when empty).
    pub fn last_time(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Path duration in seconds.
    pub fn duration(&self) -> f32 {
        self.last_time() - self.first_time()
    }

    fn invalidate(&mut self) {
        self.values_valid = false;
        self.window_valid = false;
        self.path_cache = None;
    }

    // --- playback state ------------------------------------------------

    /// The frame this interpolator writes into.
    pub fn target(&self) -> FrameKey {
        self.target
    }

    /// Current interpolation time.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Jump the interpolation time without evaluating.
    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    /// Playback speed multiplier (negative plays backward).
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the playback speed multiplier.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Scheduler tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Set the scheduler tick period. A zero period is rejected and the
    /// previous period retained.
    pub fn set_period(&mut self, period: Duration) {
        if period.is_zero() {
            log::warn!("set_period: ignoring zero period");
            return;
        }
        self.period = period;
    }

    /// Whether playback wraps at the path ends instead of stopping.
    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Enable or disable looping playback.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Whether a scheduler task is currently advancing the time.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Arm playback. Requires at least two keyframes; otherwise a no-op.
    /// A time already past the end (for the current speed sign) restarts
    /// from the opposite end.
    pub fn start(&mut self, scheduler: &mut Scheduler) {
        if self.keyframes.len() < 2 {
            log::warn!("start: interpolation needs at least two keyframes");
            return;
        }
        if self.speed > 0.0 && self.time >= self.last_time() {
            self.time = self.first_time();
        } else if self.speed < 0.0 && self.time <= self.first_time() {
            self.time = self.last_time();
        }
        self.running = true;
        match self.task {
            Some(task) => scheduler.run(task, self.period),
            None => log::debug!("interpolator has no scheduler task; drive tick() manually"),
        }
    }

    /// Disarm playback. Idempotent.
    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        self.running = false;
        if let Some(task) = self.task {
            scheduler.stop(task);
        }
    }

    /// Advance one scheduler tick: move time by `period * speed` and
    /// evaluate. Returns `false` once playback stopped (end reached or
    /// not running) so the caller can disarm the task.
    pub fn tick(&mut self, hierarchy: &mut Hierarchy) -> bool {
        if !self.running || self.keyframes.len() < 2 {
            return false;
        }
        let first = self.first_time();
        let last = self.last_time();
        let span = last - first;
        let mut new_time = self.time + self.period.as_secs_f32() * self.speed;

        if self.speed > 0.0 && new_time > last {
            if self.looping && span > 0.0 {
                new_time = first + (new_time - first).rem_euclid(span);
            } else {
                self.interpolate(last, hierarchy);
                self.running = false;
                return false;
            }
        } else if self.speed < 0.0 && new_time < first {
            if self.looping && span > 0.0 {
                new_time = first + (new_time - first).rem_euclid(span);
            } else {
                self.interpolate(first, hierarchy);
                self.running = false;
                return false;
            }
        }
        self.interpolate(new_time, hierarchy);
        true
    }

    // --- evaluation ----------------------------------------------------

    /// Evaluate the spline at `time` and write the result into the
    /// target frame. A single keyframe snaps the target to it; an empty
    /// list is a no-op.
    pub fn interpolate(&mut self, time: f32, hierarchy: &mut Hierarchy) {
        match self.keyframes.len() {
            0 => return,
            1 => {
                let snapshot = self.keyframes[0].snapshot;
                self.write_target(snapshot, hierarchy);
                self.time = time;
                return;
            }
            _ => {}
        }
        self.ensure_values();
        self.update_window(time);
        let sample = self.eval_segment(self.window[1], self.segment_alpha(time));
        self.write_target(sample, hierarchy);
        self.time = time;
    }

    /// Sample the whole spline at a fixed per-segment resolution,
    /// independent of playback time. Cached until a keyframe mutation.
    pub fn path(&mut self) -> &[FrameSnapshot] {
        if self.path_cache.is_none() {
            self.ensure_values();
            let mut samples = Vec::new();
            match self.keyframes.len() {
                0 => {}
                1 => samples.push(self.keyframes[0].snapshot),
                n => {
                    for segment in 0..n - 1 {
                        for step in 0..self.path_resolution {
                            let alpha = step as f32 / self.path_resolution as f32;
                            samples.push(self.eval_segment(segment, alpha));
                        }
                    }
                    samples.push(self.keyframes[n - 1].snapshot);
                }
            }
            self.path_cache = Some(samples);
        }
        self.path_cache.as_deref().expect("path cache filled above")
    }

    fn write_target(&self, sample: FrameSnapshot, hierarchy: &mut Hierarchy) {
        hierarchy.set_position(self.target, sample.position);
        hierarchy.set_orientation(self.target, sample.orientation);
        hierarchy.set_magnitude(self.target, sample.magnitude);
    }

    /// Recompute per-keyframe Catmull-Rom and SQUAD tangents. Lazy:
    /// cached until the keyframe list is mutated.
    fn ensure_values(&mut self) {
        if self.values_valid {
            return;
        }
        let n = self.keyframes.len();
        let mut tangents = Vec::with_capacity(n);
        for i in 0..n {
            let prev = &self.keyframes[i.saturating_sub(1)];
            let cur = &self.keyframes[i];
            let next = &self.keyframes[(i + 1).min(n - 1)];
            tangents.push((
                spline::position_tangent(prev.snapshot.position, next.snapshot.position),
                math::squad_tangent(
                    &prev.snapshot.orientation,
                    &cur.snapshot.orientation,
                    &next.snapshot.orientation,
                ),
            ));
        }
        for (keyframe, (tangent, quat_tangent)) in self.keyframes.iter_mut().zip(tangents) {
            keyframe.tangent = tangent;
            keyframe.quat_tangent = quat_tangent;
        }
        self.values_valid = true;
    }

    /// Slide the four-index window so `window[1]`/`window[2]` bracket
    /// `time`. Forward motion slides in amortized O(1); backward motion
    /// or an invalidated window rescans from the front.
    fn update_window(&mut self, time: f32) {
        let n = self.keyframes.len();
        let mut i1 = if self.window_valid { self.window[1] } else { 0 };
        if i1 >= n || time < self.keyframes[i1].time {
            i1 = 0;
        }
        while i1 + 1 < n && self.keyframes[i1 + 1].time <= time {
            i1 += 1;
        }
        // Keep a real segment on hand when time sits at or past the end.
        if i1 == n - 1 {
            i1 = n - 2;
        }
        self.window = [i1.saturating_sub(1), i1, i1 + 1, (i1 + 2).min(n - 1)];
        self.window_valid = true;
    }

    fn segment_alpha(&self, time: f32) -> f32 {
        let k1 = &self.keyframes[self.window[1]];
        let k2 = &self.keyframes[self.window[2]];
        let span = k2.time - k1.time;
        // Identical time stamps force the parameter to 0: no divide by
        // zero, the earlier keyframe wins.
        if span <= 0.0 {
            0.0
        } else {
            (time - k1.time) / span
        }
    }

    fn eval_segment(&self, segment: usize, alpha: f32) -> FrameSnapshot {
        let k1 = &self.keyframes[segment];
        let k2 = &self.keyframes[segment + 1];
        FrameSnapshot {
            position: spline::hermite(
                k1.snapshot.position,
                k2.snapshot.position,
                k1.tangent,
                k2.tangent,
                alpha,
            ),
            orientation: math::squad(
                &k1.snapshot.orientation,
                &k1.quat_tangent,
                &k2.quat_tangent,
                &k2.snapshot.orientation,
                alpha.clamp(0.0, 1.0),
            ),
            magnitude: utils::lerp(k1.snapshot.magnitude, k2.snapshot.magnitude, alpha),
        }
    }
}
