//! # Scene Data Model
//!
//! Objects, their transforms, shared mesh data, and the id-keyed scene
//! collection. The scene owns no GPU state; the renderer reads it each
//! frame through plain iteration.

pub mod mesh;
pub mod object;
#[allow(clippy::module_inception)]
pub mod scene;

pub use mesh::MeshData;
pub use object::{ObjectId, SceneObject, Transform};
pub use scene::Scene;
