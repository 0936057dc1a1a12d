use crate::observer::{ConditionContext, ObserverCondition};

/// The connection must have loaded the object's scene. Objects that live in
/// no scene pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct SceneCondition;

impl ObserverCondition for SceneCondition {
    fn name(&self) -> &'static str {
        "scene"
    }

    fn is_timed(&self) -> bool {
        false
    }

    fn condition_met(&self, context: &ConditionContext) -> bool {
        match context.object.scene() {
            Some(scene) => context.connection.has_loaded_scene(&scene),
            None => true,
        }
    }
}
