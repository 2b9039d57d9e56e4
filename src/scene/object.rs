//! Scene objects: a flat record with optional components.
//!
//! Mesh objects and point lights are the same type with different fields
//! populated — a closed set of optional components rather than a class
//! hierarchy.

use std::sync::Arc;

use cgmath::{InnerSpace, Matrix3, Matrix4, Quaternion, Rad, Rotation, Rotation3, Vector3};

use crate::geometry::intersect::Aabb;
use crate::scene::mesh::MeshData;

/// Object identity. Assigned by the scene factory, monotonically
/// increasing, never reused.
pub type ObjectId = u32;

/// Translation, non-uniform scale, and a unit-quaternion rotation.
///
/// Quaternion rotation avoids gimbal lock; every composition renormalizes
/// so repeated small rotations don't drift off the unit sphere.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub rotation: Quaternion<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }
}

impl Transform {
    /// World matrix: translation * rotation * scale.
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Rotate about an axis in the object's local frame.
    pub fn rotate_local(&mut self, angle: Rad<f32>, axis: Vector3<f32>) {
        self.rotation =
            (self.rotation * Quaternion::from_axis_angle(axis.normalize(), angle)).normalize();
    }

    /// Rotate about an axis in the world frame.
    pub fn rotate_world(&mut self, angle: Rad<f32>, axis: Vector3<f32>) {
        self.rotation =
            (Quaternion::from_axis_angle(axis.normalize(), angle) * self.rotation).normalize();
    }

    /// Set the rotation from an orthonormal (x, y, z) axis triple.
    pub fn set_rotation_from_axes(
        &mut self,
        x: Vector3<f32>,
        y: Vector3<f32>,
        z: Vector3<f32>,
    ) {
        self.rotation = Quaternion::from(Matrix3::from_cols(x, y, z)).normalize();
    }

    pub fn right(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_x())
    }

    pub fn up(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_y())
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_z())
    }
}

pub struct SceneObject {
    id: ObjectId,
    /// Shared mesh reference; `None` for meshless objects (point lights).
    pub mesh: Option<Arc<MeshData>>,
    pub transform: Transform,
    pub color: Vector3<f32>,
    pub selected: bool,
    /// Optional texture reference, resolved by the asset system.
    pub texture: Option<String>,
    /// Set iff this object is a point light.
    pub light_intensity: Option<f32>,
}

impl SceneObject {
    pub(crate) fn new(id: ObjectId) -> Self {
        Self {
            id,
            mesh: None,
            transform: Transform::default(),
            color: Vector3::new(1.0, 1.0, 1.0),
            selected: false,
            texture: None,
            light_intensity: None,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// World-space bounding box, derived on demand: the mesh's local
    /// bounds transformed by the current matrix. Meshless objects get a
    /// small box around their translation so they stay pickable.
    pub fn world_bounds(&self) -> Aabb {
        match &self.mesh {
            Some(mesh) => {
                let matrix = self.transform.matrix();
                let corners = mesh.local_bounds().corners().map(|c| {
                    let h = matrix * c.extend(1.0);
                    h.truncate() / h.w
                });
                Aabb::from_points(&corners)
            }
            None => Aabb::new(
                self.transform.translation - Vector3::new(0.1, 0.1, 0.1),
                self.transform.translation + Vector3::new(0.1, 0.1, 0.1),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn world_bounds_follow_transform() {
        let mut object = SceneObject::new(0);
        object.mesh = Some(MeshData::unit_cube());
        object.transform.translation = Vector3::new(2.0, 0.0, 0.0);
        object.transform.scale = Vector3::new(4.0, 1.0, 1.0);

        let bounds = object.world_bounds();
        assert!((bounds.min.x - 0.0).abs() < 1e-5);
        assert!((bounds.max.x - 4.0).abs() < 1e-5);
        assert!((bounds.min.y + 0.5).abs() < 1e-5);
    }

    #[test]
    fn world_yaw_turns_forward_axis() {
        let mut t = Transform::default();
        t.rotate_world(Rad(FRAC_PI_2), Vector3::unit_y());

        // +Z rotated 90 degrees about +Y lands on +X.
        assert!((t.forward() - Vector3::unit_x()).magnitude() < 1e-5);
        assert!((t.rotation.magnitude() - 1.0).abs() < 1e-5);
    }
}
