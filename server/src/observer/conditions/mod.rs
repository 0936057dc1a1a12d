mod always;
mod distance;
mod owner_only;
mod scene;

pub use always::AlwaysCondition;
pub use distance::DistanceCondition;
pub use owner_only::OwnerOnlyCondition;
pub use scene::SceneCondition;
