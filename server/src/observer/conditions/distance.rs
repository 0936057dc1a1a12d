use crate::observer::{ConditionContext, ObserverCondition};

/// Passes while the object is within `max_distance` of the connection's
/// first owned object. A connection that owns nothing never passes.
///
/// With a non-zero `hide_ratio`, a connection that already observes the
/// object keeps it until it is beyond `max_distance * (1 + hide_ratio)`, so
/// objects near the boundary don't flicker in and out.
#[derive(Clone, Copy, Debug)]
pub struct DistanceCondition {
    max_distance: f32,
    hide_ratio: f32,
}

impl DistanceCondition {
    pub fn new(max_distance: f32) -> Self {
        Self {
            max_distance: max_distance.max(0.0),
            hide_ratio: 0.0,
        }
    }

    pub fn with_hide_ratio(mut self, hide_ratio: f32) -> Self {
        self.hide_ratio = hide_ratio.max(0.0);
        self
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    pub fn hide_distance(&self) -> f32 {
        self.max_distance * (1.0 + self.hide_ratio)
    }
}

impl ObserverCondition for DistanceCondition {
    fn name(&self) -> &'static str {
        "distance"
    }

    fn is_timed(&self) -> bool {
        true
    }

    fn condition_met(&self, context: &ConditionContext) -> bool {
        let Some(viewer_id) = context.connection.first_owned_object() else {
            return false;
        };
        let Some(viewer) = context.objects.get(&viewer_id) else {
            return false;
        };

        let threshold = if context.currently_observing {
            self.hide_distance()
        } else {
            self.max_distance
        };

        viewer.position().distance_squared(context.object.position()) <= threshold * threshold
    }
}
