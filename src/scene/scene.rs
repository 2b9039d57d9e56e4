//! The id-keyed object collection.

use std::collections::HashMap;

use log::debug;

use crate::scene::object::{ObjectId, SceneObject};

/// Scene objects keyed by id. Ids come from an internal counter and are
/// never reused, so removal leaves holes rather than shifting positions.
#[derive(Default)]
pub struct Scene {
    objects: HashMap<ObjectId, SceneObject>,
    next_id: ObjectId,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty object, assign it the next id, and insert it.
    /// Returns the id; configure the object through [`Scene::get_mut`].
    pub fn spawn(&mut self) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(id, SceneObject::new(id));
        debug!("spawned object {id}");
        id
    }

    /// Spawn a point light: no mesh, just an intensity.
    pub fn spawn_point_light(&mut self, intensity: f32) -> ObjectId {
        let id = self.spawn();
        if let Some(light) = self.objects.get_mut(&id) {
            light.light_intensity = Some(intensity);
        }
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        self.objects.remove(&id)
    }

    /// Keep only the objects the predicate accepts. This is the one safe
    /// way to erase while iterating an unordered collection; ids are not
    /// positions, so there is no index-based removal.
    pub fn retain(&mut self, f: impl FnMut(&SceneObject) -> bool) {
        let mut f = f;
        self.objects.retain(|_, object| f(object));
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.values_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
