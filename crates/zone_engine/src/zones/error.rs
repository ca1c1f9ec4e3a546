//! Zone error types

use crate::ecs::{Entity, WorldError};

/// Zone configuration and attachment errors
///
/// None of these are fatal: the tick loop logs them and carries on with the
/// operation turned into a no-op.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoneError {
    /// The joint strategy needs a physics body on both ends
    #[error("Object {object:?} or zone body {body:?} has no physics body")]
    MissingPhysicsBody {
        /// Object being attached
        object: Entity,
        /// Zone body the joint would connect to
        body: Entity,
    },

    /// A joint between this object and zone already exists
    #[error("Joint between {object:?} and zone {zone:?} already exists")]
    JointAlreadyExists {
        /// Object being attached
        object: Entity,
        /// Zone owning the joint
        zone: Entity,
    },

    /// The object is not known to the host
    #[error("Unknown object: {0:?}")]
    UnknownObject(Entity),

    /// The attachment anchor is not known to the host
    #[error("Attachment anchor {0:?} does not exist")]
    MissingAnchor(Entity),

    /// Another zone currently owns the object's attachment
    #[error("Object {object:?} is already attached by zone {owner:?}")]
    AttachmentClaimed {
        /// Object being attached
        object: Entity,
        /// Zone holding the claim
        owner: Option<Entity>,
    },

    /// The zone has no attachment behaviour
    #[error("Zone {0:?} cannot attach objects")]
    NotAttachable(Entity),

    /// Error reported by the host world
    #[error("World error: {0}")]
    World(#[from] WorldError),
}
