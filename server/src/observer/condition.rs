use crate::{
    connection::Connection,
    object::{NetworkObject, NetworkObjects},
};

/// What a condition gets to look at when deciding visibility
pub struct ConditionContext<'a> {
    pub object: &'a NetworkObject,
    pub connection: &'a Connection,
    /// All objects, so a condition can look at the connection's own objects
    pub objects: &'a NetworkObjects,
    /// Whether the connection observes `object` right now
    pub currently_observing: bool,
}

/// A visibility predicate attached to a NetworkObject. Conditions hold
/// configuration only.
pub trait ObserverCondition {
    fn name(&self) -> &'static str;

    /// Timed conditions are re-evaluated periodically. Others only when the
    /// object or the connection changes.
    fn is_timed(&self) -> bool;

    fn condition_met(&self, context: &ConditionContext) -> bool;
}

/// Ordered list of conditions. A connection observes the object only if
/// every condition is met; evaluation stops at the first failure.
#[derive(Default)]
pub struct ObserverSettings {
    conditions: Vec<Box<dyn ObserverCondition>>,
}

impl ObserverSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition<C: ObserverCondition + 'static>(mut self, condition: C) -> Self {
        self.add_condition(condition);
        self
    }

    pub fn add_condition<C: ObserverCondition + 'static>(&mut self, condition: C) {
        self.conditions.push(Box::new(condition));
    }

    pub fn is_timed(&self) -> bool {
        self.conditions.iter().any(|condition| condition.is_timed())
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.conditions.iter().map(|condition| condition.name()).collect()
    }

    pub(crate) fn all_met(&self, context: &ConditionContext) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.condition_met(context))
    }
}
