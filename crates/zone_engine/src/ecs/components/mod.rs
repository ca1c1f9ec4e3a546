//! ECS Components module
//!
//! Pure data components stored by the [`World`](crate::ecs::World)

pub mod transform;
pub mod interactable;
pub mod rigid_body;
pub mod collision;

pub use transform::TransformComponent;
pub use interactable::{InteractableComponent, HoldNotification};
pub use rigid_body::RigidBodyComponent;
pub use collision::ColliderComponent;
