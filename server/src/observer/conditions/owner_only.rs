use crate::observer::{ConditionContext, ObserverCondition};

/// Only the owner observes the object
#[derive(Clone, Copy, Debug, Default)]
pub struct OwnerOnlyCondition;

impl ObserverCondition for OwnerOnlyCondition {
    fn name(&self) -> &'static str {
        "owner_only"
    }

    fn is_timed(&self) -> bool {
        false
    }

    fn condition_met(&self, context: &ConditionContext) -> bool {
        context
            .object
            .is_owned_by(&context.connection.client_id())
    }
}
