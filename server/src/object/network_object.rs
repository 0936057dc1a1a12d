use std::collections::BTreeSet;

use shoal_shared::{ClientId, ObjectId, SceneId};

use crate::observer::ObserverSettings;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_squared(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &Position) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// A replicated object. Server-owned when `owner` is None.
#[derive(Debug)]
pub struct NetworkObject {
    id: ObjectId,
    owner: Option<ClientId>,
    scene: Option<SceneId>,
    position: Position,
    observers: BTreeSet<ClientId>,
}

impl NetworkObject {
    pub(crate) fn new(
        id: ObjectId,
        owner: Option<ClientId>,
        scene: Option<SceneId>,
        position: Position,
    ) -> Self {
        Self {
            id,
            owner,
            scene,
            position,
            observers: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn owner(&self) -> Option<ClientId> {
        self.owner
    }

    pub fn is_owned_by(&self, client_id: &ClientId) -> bool {
        self.owner.as_ref() == Some(client_id)
    }

    pub fn scene(&self) -> Option<SceneId> {
        self.scene
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn observers(&self) -> &BTreeSet<ClientId> {
        &self.observers
    }

    pub fn is_observed_by(&self, client_id: &ClientId) -> bool {
        self.observers.contains(client_id)
    }

    // Crate-public

    pub(crate) fn set_owner(&mut self, owner: Option<ClientId>) {
        self.owner = owner;
    }

    pub(crate) fn set_scene(&mut self, scene: Option<SceneId>) {
        self.scene = scene;
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    // Observer set, only touched by the ObserverEngine

    pub(crate) fn add_observer(&mut self, client_id: ClientId) -> bool {
        self.observers.insert(client_id)
    }

    pub(crate) fn remove_observer(&mut self, client_id: &ClientId) -> bool {
        self.observers.remove(client_id)
    }
}

/// Everything needed to spawn a NetworkObject
#[derive(Default)]
pub struct ObjectSpawn {
    pub scene: Option<SceneId>,
    pub position: Position,
    pub observers: ObserverSettings,
}

impl ObjectSpawn {
    pub fn new(observers: ObserverSettings) -> Self {
        Self {
            observers,
            ..Default::default()
        }
    }

    pub fn in_scene(mut self, scene: SceneId) -> Self {
        self.scene = Some(scene);
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}
