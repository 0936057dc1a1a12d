use std::collections::{BTreeSet, HashMap};

use log::{debug, error, warn};

use shoal_shared::{ClientId, ObjectId};

use crate::{
    connection::{Connection, ConnectionRegistry},
    object::NetworkObjects,
    observer::{ConditionContext, ObserverError, ObserverSettings},
};

/// Outcome of re-evaluating one (object, connection) pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObserverStateChange {
    Added,
    Removed,
    Unchanged,
}

/// A change in who observes what, as produced by a rebuild pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObserverChange {
    pub object: ObjectId,
    pub client: ClientId,
    pub change: ObserverStateChange,
}

struct ObserverEntry {
    settings: ObserverSettings,
    enabled: bool,
}

/// Decides which connections observe which objects. Holds the conditions
/// for each object; the observer sets themselves live on the objects.
#[derive(Default)]
pub struct ObserverEngine {
    entries: HashMap<ObjectId, ObserverEntry>,
    timed_objects: BTreeSet<ObjectId>,
}

impl ObserverEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the conditions for an object. An empty condition list
    /// disables observer processing for the object, so only its owner will
    /// observe it; this is reported as an error.
    pub fn register_object(
        &mut self,
        object: ObjectId,
        settings: ObserverSettings,
    ) -> Result<(), ObserverError> {
        if self.entries.contains_key(&object) {
            return Err(ObserverError::AlreadyRegistered { object });
        }

        if settings.is_empty() {
            let err = ObserverError::NoConditions { object };
            error!("{}", err);
            self.entries.insert(
                object,
                ObserverEntry {
                    settings,
                    enabled: false,
                },
            );
            return Err(err);
        }

        if settings.is_timed() {
            self.timed_objects.insert(object);
        }
        debug!("{} observed under {:?}", object, settings.names());
        self.entries.insert(
            object,
            ObserverEntry {
                settings,
                enabled: true,
            },
        );
        Ok(())
    }

    pub fn unregister_object(&mut self, object: &ObjectId) {
        self.entries.remove(object);
        self.timed_objects.remove(object);
    }

    pub fn is_registered(&self, object: &ObjectId) -> bool {
        self.entries.contains_key(object)
    }

    /// False for objects registered without conditions
    pub fn is_enabled(&self, object: &ObjectId) -> bool {
        self.entries.get(object).is_some_and(|entry| entry.enabled)
    }

    pub fn is_timed(&self, object: &ObjectId) -> bool {
        self.timed_objects.contains(object)
    }

    pub fn timed_objects(&self) -> impl Iterator<Item = &ObjectId> {
        self.timed_objects.iter()
    }

    /// Re-evaluates whether `connection` observes `object` and updates the
    /// object's observer set to match.
    ///
    /// The owner always observes its object. Anyone else observes it only
    /// while every condition holds, checked in order up to the first
    /// failure. Disabled or unknown objects are left unchanged.
    pub fn rebuild_observers(
        &self,
        objects: &mut NetworkObjects,
        object_id: &ObjectId,
        connection: &Connection,
    ) -> ObserverStateChange {
        let client_id = connection.client_id();

        let Some(object) = objects.get(object_id) else {
            warn!("cannot rebuild observers of unknown {}", object_id);
            return ObserverStateChange::Unchanged;
        };
        let observing = object.is_observed_by(&client_id);

        let should_observe = if object.is_owned_by(&client_id) {
            true
        } else {
            match self.entries.get(object_id) {
                Some(entry) if entry.enabled => entry.settings.all_met(&ConditionContext {
                    object,
                    connection,
                    objects,
                    currently_observing: observing,
                }),
                _ => return ObserverStateChange::Unchanged,
            }
        };

        let Some(object) = objects.get_mut(object_id) else {
            return ObserverStateChange::Unchanged;
        };
        match (should_observe, observing) {
            (true, false) => {
                object.add_observer(client_id);
                ObserverStateChange::Added
            }
            (false, true) => {
                object.remove_observer(&client_id);
                ObserverStateChange::Removed
            }
            _ => ObserverStateChange::Unchanged,
        }
    }

    /// Re-evaluates one object against every authenticated connection, after
    /// a spawn or a change to the object
    pub fn rebuild_object(
        &self,
        objects: &mut NetworkObjects,
        object_id: &ObjectId,
        connections: &ConnectionRegistry,
    ) -> Vec<ObserverChange> {
        let mut changes = Vec::new();
        for connection in connections.authenticated() {
            self.push_rebuild(&mut changes, objects, object_id, connection);
        }
        changes
    }

    /// Re-evaluates every object against one connection, after it
    /// authenticates or its scenes or owned objects change
    pub fn rebuild_connection(
        &self,
        objects: &mut NetworkObjects,
        connection: &Connection,
    ) -> Vec<ObserverChange> {
        let mut changes = Vec::new();
        if !connection.is_authenticated() {
            return changes;
        }
        for object_id in objects.ids() {
            self.push_rebuild(&mut changes, objects, &object_id, connection);
        }
        changes
    }

    /// Re-evaluates every object with a timed condition against every
    /// authenticated connection
    pub fn rebuild_timed(
        &self,
        objects: &mut NetworkObjects,
        connections: &ConnectionRegistry,
    ) -> Vec<ObserverChange> {
        let mut changes = Vec::new();
        for object_id in &self.timed_objects {
            for connection in connections.authenticated() {
                self.push_rebuild(&mut changes, objects, object_id, connection);
            }
        }
        changes
    }

    /// Removes a departing client from every observer set. Returns the
    /// objects it was removed from.
    pub fn remove_connection(
        &self,
        objects: &mut NetworkObjects,
        client_id: &ClientId,
    ) -> Vec<ObserverChange> {
        objects
            .iter_mut()
            .filter_map(|object| {
                object.remove_observer(client_id).then(|| ObserverChange {
                    object: object.id(),
                    client: *client_id,
                    change: ObserverStateChange::Removed,
                })
            })
            .collect()
    }

    fn push_rebuild(
        &self,
        changes: &mut Vec<ObserverChange>,
        objects: &mut NetworkObjects,
        object_id: &ObjectId,
        connection: &Connection,
    ) {
        let change = self.rebuild_observers(objects, object_id, connection);
        if change != ObserverStateChange::Unchanged {
            changes.push(ObserverChange {
                object: *object_id,
                client: connection.client_id(),
                change,
            });
        }
    }
}
