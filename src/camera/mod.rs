//! # Camera Navigation
//!
//! Projection/view state plus two navigation models:
//!
//! * **CAD mode** — orbit a movable target point with pan, zoom-to-cursor,
//!   and preset views (Front/Top/Right/Isometric)
//! * **Free mode** — quaternion first-person flight with no pitch clamp
//!
//! The matrices are derived state, recomputed every frame from whichever
//! mode is active.

#[allow(clippy::module_inception)]
mod camera;
mod free_controller;

pub use camera::{Camera, NavigationMode, ProjectionKind, ViewType};
pub use free_controller::{FreeLookController, KeyBindings};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CameraError {
    /// Aspect ratio must be positive and finite; a malformed resize event
    /// would otherwise produce a singular projection.
    #[error("invalid aspect ratio: {0}")]
    InvalidAspect(f32),
}
