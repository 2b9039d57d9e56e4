//! # Object Selection
//!
//! Click-to-select via ray casting:
//!
//! 1. **Cursor to ray** — unproject the click through the camera matrices
//! 2. **Closest hit** — exact triangle tests for dense meshes, bounding
//!    boxes for simple ones
//! 3. **Set update** — plain click replaces the selection, ctrl-click
//!    toggles membership
//!
//! Picking is stateless across frames apart from the click edge detector;
//! every ray is built fresh from the camera's current matrices.

use std::collections::BTreeSet;

use cgmath::Vector2;
use log::debug;
use winit::event::MouseButton;

use crate::camera::Camera;
use crate::geometry::intersect::{ray_aabb_distance, ray_triangle_distance, Ray, Triangle};
use crate::input::{EdgeDetector, InputState};
use crate::scene::{ObjectId, Scene};

/// Meshes above this triangle count get exact ray-triangle picking;
/// anything simpler (a cube is 12) uses its bounding box as a cheap proxy.
const COMPLEX_MESH_THRESHOLD: usize = 100;

pub struct SelectionManager {
    selected: BTreeSet<ObjectId>,
    click_edge: EdgeDetector,
    last_cursor: Vector2<f32>,
}

impl Default for SelectionManager {
    fn default() -> Self {
        Self {
            selected: BTreeSet::default(),
            click_edge: EdgeDetector::default(),
            last_cursor: Vector2::new(0.0, 0.0),
        }
    }
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-frame update: on a fresh left click, pick the closest object
    /// under the cursor and apply the selection policy.
    ///
    /// * plain click on an object — selection becomes just that object
    /// * plain click on empty space — selection cleared
    /// * ctrl-click on an object — toggle it, leave the rest untouched
    /// * ctrl-click on empty space — no-op
    pub fn update(&mut self, input: &InputState, camera: &Camera, scene: &mut Scene) {
        let clicked = self
            .click_edge
            .rising(input.mouse_down(MouseButton::Left));
        if !clicked {
            return;
        }

        self.last_cursor = input.cursor();
        let hit = self.pick(input.cursor(), input.window_size(), camera, scene);
        let multi = input.ctrl_down();

        match hit {
            Some((id, distance)) => {
                debug!("pick hit object {id} at distance {distance:.3}");
                if multi {
                    if self.selected.contains(&id) {
                        self.deselect(id, scene);
                    } else {
                        self.select(id, scene, true);
                    }
                } else {
                    self.select(id, scene, false);
                }
            }
            None if !multi => self.clear_all(scene),
            None => {}
        }
    }

    /// Find the closest object under a window pixel. Empty scenes and
    /// degenerate camera state yield `None`, never an error.
    pub fn pick(
        &self,
        cursor: Vector2<f32>,
        window: Vector2<f32>,
        camera: &Camera,
        scene: &Scene,
    ) -> Option<(ObjectId, f32)> {
        let ray = camera.screen_ray(cursor, window)?;

        let mut closest: Option<(ObjectId, f32)> = None;
        for object in scene.iter() {
            let Some(mesh) = &object.mesh else {
                continue;
            };

            let distance = if mesh.triangle_count() > COMPLEX_MESH_THRESHOLD {
                ray_mesh_distance(&ray, mesh.triangles(), &object.transform.matrix())
            } else {
                ray_aabb_distance(&ray, &object.world_bounds())
            };

            if let Some(distance) = distance {
                if closest.is_none_or(|(_, best)| distance < best) {
                    closest = Some((object.id(), distance));
                }
            }
        }

        closest
    }

    /// Empty the selection set and unset every object's flag. Idempotent.
    pub fn clear_all(&mut self, scene: &mut Scene) {
        for object in scene.iter_mut() {
            object.selected = false;
        }
        self.selected.clear();
    }

    pub fn select(&mut self, id: ObjectId, scene: &mut Scene, multi_select: bool) {
        if !multi_select {
            self.clear_all(scene);
        }
        if let Some(object) = scene.get_mut(id) {
            object.selected = true;
            self.selected.insert(id);
        }
    }

    pub fn deselect(&mut self, id: ObjectId, scene: &mut Scene) {
        if let Some(object) = scene.get_mut(id) {
            object.selected = false;
        }
        self.selected.remove(&id);
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.selected.iter().copied()
    }

    pub fn selection_count(&self) -> usize {
        self.selected.len()
    }

    /// Delete every selected object from the scene.
    pub fn remove_selected(&mut self, scene: &mut Scene) {
        let before = scene.len();
        scene.retain(|object| !object.selected);
        self.selected.clear();
        debug!("removed {} selected objects", before - scene.len());
    }
}

/// Closest hit over a mesh's triangles, transformed into world space by
/// the object matrix.
fn ray_mesh_distance(
    ray: &Ray,
    triangles: impl Iterator<Item = Triangle>,
    matrix: &cgmath::Matrix4<f32>,
) -> Option<f32> {
    let mut closest: Option<f32> = None;
    for tri in triangles {
        let to_world = |v: cgmath::Vector3<f32>| {
            let h = matrix * v.extend(1.0);
            h.truncate() / h.w
        };
        let world = Triangle {
            v0: to_world(tri.v0),
            v1: to_world(tri.v1),
            v2: to_world(tri.v2),
        };
        if let Some(t) = ray_triangle_distance(ray, &world) {
            if closest.is_none_or(|best| t < best) {
                closest = Some(t);
            }
        }
    }
    closest
}
