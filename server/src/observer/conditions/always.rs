use crate::observer::{ConditionContext, ObserverCondition};

/// Every authenticated connection observes the object
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysCondition;

impl ObserverCondition for AlwaysCondition {
    fn name(&self) -> &'static str {
        "always"
    }

    fn is_timed(&self) -> bool {
        false
    }

    fn condition_met(&self, _context: &ConditionContext) -> bool {
        true
    }
}
