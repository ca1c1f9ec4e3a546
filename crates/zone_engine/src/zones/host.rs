//! Collaborator interfaces consumed by zones
//!
//! Zones never reach into an engine directly. Everything they read or write
//! about an object goes through [`ZoneHost`], and visual feedback goes
//! through [`Highlighter`]. The built-in [`World`](crate::ecs::World)
//! implements the host side.

use crate::ecs::{Entity, WorldError};
use crate::foundation::math::Transform;
use crate::physics::{CollisionLayers, JointHandle, PhysicsFlags};
use crate::zones::tracker::VolumeResolver;

/// Everything a zone needs from the engine hosting it
///
/// Volumes and objects are both entities: a volume resolves to the
/// interactable object owning it.
pub trait ZoneHost: VolumeResolver<Entity, Entity> {
    /// Collision layer of a volume (used by zone layer filters)
    fn volume_layers(&self, _volume: Entity) -> CollisionLayers {
        CollisionLayers::ALL
    }

    /// Whether something is currently holding the object
    fn is_held(&self, object: Entity) -> bool;

    /// Make whatever holds the object let go
    fn end_hold(&mut self, object: Entity);

    /// Whether the object may currently be grabbed
    fn is_interactable(&self, object: Entity) -> bool;

    /// Allow or forbid grabbing the object
    fn set_interactable(&mut self, object: Entity, interactable: bool);

    /// World-space pose of an entity
    fn pose(&self, entity: Entity) -> Option<Transform>;

    /// Move an entity to a world-space pose
    fn set_pose(&mut self, entity: Entity, pose: &Transform);

    /// Physics flags of the object's body, `None` without a body
    fn physics_flags(&self, object: Entity) -> Option<PhysicsFlags>;

    /// Change the physics flags of the object's body
    fn set_physics_flags(&mut self, object: Entity, flags: PhysicsFlags) -> Result<(), WorldError>;

    /// Parent of an entity in the pose hierarchy
    fn parent(&self, entity: Entity) -> Option<Entity>;

    /// Reparent an entity, keeping its world pose
    fn set_parent(&mut self, entity: Entity, parent: Option<Entity>) -> Result<(), WorldError>;

    /// Connect two bodies with a breakable joint
    fn create_joint(&mut self, body: Entity, connected_body: Entity, break_force: f32) -> Result<JointHandle, WorldError>;

    /// Remove a joint (no-op when already gone)
    fn destroy_joint(&mut self, joint: JointHandle);

    /// Claim exclusive attachment of an object for a zone
    ///
    /// Returns false when another zone holds the claim. Hosts without a
    /// registry leave exclusivity to the application.
    fn claim_attachment(&mut self, _object: Entity, _zone: Entity) -> bool {
        true
    }

    /// Zone currently holding the object's attachment claim
    fn attachment_owner(&self, _object: Entity) -> Option<Entity> {
        None
    }

    /// Give up a claim taken with [`claim_attachment`](Self::claim_attachment)
    fn release_attachment_claim(&mut self, _object: Entity, _zone: Entity) {}
}

/// Visual feedback toggled by a zone
pub trait Highlighter {
    /// Turn the highlight on or off
    fn set_active(&mut self, active: bool);
}

impl<F> Highlighter for F
where
    F: FnMut(bool),
{
    fn set_active(&mut self, active: bool) {
        self(active);
    }
}
