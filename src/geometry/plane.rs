//! # Construction Plane
//!
//! The 2D drawing frame the sketch tool projects clicks onto. A plane is
//! an origin plus an orthonormal (right, up, normal) basis; sketch points
//! live in plane-local (right, up) coordinates and extrusion happens along
//! the normal.
//!
//! Handedness is fixed once, everywhere: `up = right × normal`. An
//! inconsistent ordering here would silently mirror generated geometry.

use cgmath::{InnerSpace, Vector2, Vector3};

use crate::camera::ViewType;

/// Rays closer to parallel than this don't intersect the plane.
const PARALLEL_EPSILON: f32 = 1e-4;

/// An oriented plane with a 2D coordinate frame on it.
#[derive(Debug, Clone, Copy)]
pub struct ConstructionPlane {
    pub origin: Vector3<f32>,
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
    pub normal: Vector3<f32>,
}

impl ConstructionPlane {
    /// Derive the plane for a camera view.
    ///
    /// The preset views map to fixed world planes:
    ///
    /// * Front — world X/Y, normal −Z
    /// * Top — world X/Z, normal +Y
    /// * Right — world Z/Y, normal +X
    ///
    /// Any other view picks the world axis most aligned with the view
    /// forward vector as the (signed) normal, so the plane faces the
    /// camera as squarely as possible.
    pub fn from_view(view: ViewType, forward: Vector3<f32>, origin: Vector3<f32>) -> Self {
        match view {
            ViewType::Front => Self::from_basis(
                origin,
                Vector3::unit_x(),
                -Vector3::unit_z(),
            ),
            ViewType::Top => Self::from_basis(origin, Vector3::unit_x(), Vector3::unit_y()),
            ViewType::Right => Self::from_basis(origin, Vector3::unit_z(), Vector3::unit_x()),
            ViewType::Isometric | ViewType::Free => Self::facing(forward, origin),
        }
    }

    /// Plane through `origin` whose normal is the world axis dominant in
    /// `forward`, signed to point the way the camera looks.
    fn facing(forward: Vector3<f32>, origin: Vector3<f32>) -> Self {
        let axes = [Vector3::unit_x(), Vector3::unit_y(), Vector3::unit_z()];

        let mut dominant = 0;
        for i in 1..3 {
            if forward[i].abs() > forward[dominant].abs() {
                dominant = i;
            }
        }

        let sign = if forward[dominant] >= 0.0 { 1.0 } else { -1.0 };
        let normal = axes[dominant] * sign;
        let right = axes[(dominant + 1) % 3];

        Self::from_basis(origin, right, normal)
    }

    fn from_basis(origin: Vector3<f32>, right: Vector3<f32>, normal: Vector3<f32>) -> Self {
        Self {
            origin,
            right,
            up: right.cross(normal),
            normal,
        }
    }

    /// Project a world point into plane-local (right, up) coordinates.
    pub fn world_to_local(&self, point: Vector3<f32>) -> Vector2<f32> {
        let rel = point - self.origin;
        Vector2::new(rel.dot(self.right), rel.dot(self.up))
    }

    /// Map plane-local coordinates plus a normal offset back to world space.
    pub fn local_to_world(&self, local: Vector2<f32>, height: f32) -> Vector3<f32> {
        self.origin + self.right * local.x + self.up * local.y + self.normal * height
    }

    /// Intersect a ray with the plane.
    ///
    /// Returns `None` when the ray runs parallel to the plane (within
    /// epsilon) or the intersection lies behind the ray origin — callers
    /// substitute a safe fallback point instead of propagating NaNs.
    pub fn intersect_ray(&self, origin: Vector3<f32>, direction: Vector3<f32>) -> Option<Vector3<f32>> {
        let denom = direction.dot(self.normal);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.origin - origin).dot(self.normal) / denom;
        (t >= 0.0).then(|| origin + direction * t)
    }
}
