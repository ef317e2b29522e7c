//! # Scene Core
//!
//! A renderer-agnostic scene-graph core: a hierarchy of spatial frames,
//! an eye with projection/frustum derivation, and keyframe spline
//! interpolation.
//!
//! ## Features
//!
//! - **Frame hierarchy**: local translation/rotation/uniform-scale nodes
//!   with reference-chain composition, safe re-parenting and motion
//!   constraints
//! - **Eye subsystem**: perspective, orthographic and 2D projections,
//!   scene-sphere clip heuristics and frustum-plane visibility queries
//! - **Interpolator**: Catmull-Rom positions and SQUAD orientations over
//!   time-stamped keyframes
//! - **Renderer-agnostic**: matrices flow to the host through a
//!   matrix-stack sink trait; no graphics API in sight
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_core::prelude::*;
//!
//! let mut graph = Graph::new();
//! let node = graph
//!     .attach_frame(Frame::new().with_translation(Vec3::new(0.0, 1.0, 0.0)), None)
//!     .unwrap();
//!
//! let mut sink = MatrixStack::new();
//! graph.bind(&mut sink);
//! let mut visited = 0;
//! graph.traverse(&mut sink, &mut |_key, _frame, _matrix| visited += 1);
//! assert_eq!(visited, 2); // the eye frame and `node`
//! # let _ = node;
//! ```
//!
//! All mutation and traversal are single-threaded and cooperative: the
//! host drives [`Graph::advance`] between frames and no callback ever
//! runs concurrently with traversal.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;

pub mod eye;
pub mod frame;
pub mod hierarchy;
pub mod interpolate;
pub mod motion;
pub mod scheduler;
pub mod sink;

mod graph;

pub use graph::{Graph, GraphConfig, InterpolatorKey, SpinKey};

/// Common imports for scene-core users
pub mod prelude {
    pub use crate::{
        eye::{Eye, EyeError, Plane, ProjectionKind, Visibility},
        foundation::math::{Mat4, Point3, Quat, Vec3},
        frame::{AxisPlaneConstraint, Constraint, Frame, FrameSnapshot, RotationFilter, TranslationFilter},
        hierarchy::{FrameId, FrameKey, Hierarchy, HierarchyError, TraversalVisit},
        interpolate::{InterpolateError, Interpolator, Keyframe},
        motion::{Spin, SpinState},
        scheduler::{Scheduler, TaskKey},
        sink::{MatrixSink, MatrixStack},
        Graph, GraphConfig, InterpolatorKey, SpinKey,
    };
}
