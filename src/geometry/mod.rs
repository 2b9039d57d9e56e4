//! # Geometric Primitives and Queries
//!
//! Pure, stateless geometry shared by the picking and sketching tools:
//! ray/AABB/triangle intersection tests and construction-plane math.

pub mod intersect;
pub mod plane;

pub use intersect::{ray_aabb_distance, ray_intersects_aabb, ray_triangle_distance};
pub use intersect::{Aabb, Ray, Triangle};
pub use plane::ConstructionPlane;
