//! Convenience re-exports for host applications.
//!
//! ```rust
//! use maquette::prelude::*;
//! ```

pub use crate::camera::{Camera, FreeLookController, NavigationMode, ViewType};
pub use crate::geometry::intersect::{Aabb, Ray, Triangle};
pub use crate::geometry::plane::ConstructionPlane;
pub use crate::input::{EdgeDetector, InputState};
pub use crate::scene::{MeshData, ObjectId, Scene, SceneObject, Transform};
pub use crate::selection::SelectionManager;
pub use crate::sketch::{SketchSession, SketchState};
