// src/lib.rs
//! Maquette scene-editing core
//!
//! The interactive heart of a small CAD-style 3D scene editor: object
//! picking via ray casting, orbit/pan/zoom camera navigation with preset
//! views, and a sketch-and-extrude workflow that turns screen clicks on a
//! construction plane into box primitives.
//!
//! Rendering, windowing, and asset loading live in the host application.
//! Each frame the host polls input into an [`input::InputState`], updates
//! the [`camera::Camera`] first, then feeds the active tool — the
//! [`sketch::SketchSession`] when sketching, otherwise the
//! [`selection::SelectionManager`] — and finally hands the camera matrices
//! and the [`scene::Scene`] to its renderer.
//!
//! Coordinates follow the Vulkan convention throughout: right-handed world
//! with Y pointing down, camera forward +Z, screen Y increasing downward.

pub mod camera;
pub mod geometry;
pub mod input;
pub mod prelude;
pub mod scene;
pub mod selection;
pub mod sketch;

pub use camera::{Camera, CameraError, NavigationMode, ViewType};
pub use scene::{Scene, SceneObject};
pub use selection::SelectionManager;
pub use sketch::SketchSession;
