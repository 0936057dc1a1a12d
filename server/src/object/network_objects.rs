use std::collections::BTreeMap;

use shoal_shared::{ClientId, KeyGenerator, ObjectId, SceneId};

use crate::object::{NetworkObject, Position};

/// Every spawned NetworkObject, keyed by id. Ids are never reused.
pub struct NetworkObjects {
    object_ids: KeyGenerator<ObjectId>,
    objects: BTreeMap<ObjectId, NetworkObject>,
}

impl NetworkObjects {
    pub fn new() -> Self {
        Self {
            object_ids: KeyGenerator::new(),
            objects: BTreeMap::new(),
        }
    }

    /// Returns None once the id space is exhausted
    pub(crate) fn insert(
        &mut self,
        owner: Option<ClientId>,
        scene: Option<SceneId>,
        position: Position,
    ) -> Option<ObjectId> {
        let id = self.object_ids.generate()?;
        self.objects
            .insert(id, NetworkObject::new(id, owner, scene, position));
        Some(id)
    }

    pub(crate) fn remove(&mut self, id: &ObjectId) -> Option<NetworkObject> {
        self.objects.remove(id)
    }

    pub fn get(&self, id: &ObjectId) -> Option<&NetworkObject> {
        self.objects.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &ObjectId) -> Option<&mut NetworkObject> {
        self.objects.get_mut(id)
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkObject> {
        self.objects.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut NetworkObject> {
        self.objects.values_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for NetworkObjects {
    fn default() -> Self {
        Self::new()
    }
}
