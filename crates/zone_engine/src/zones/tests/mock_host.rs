//! In-memory [`ZoneHost`] recording what zones do to objects

use crate::ecs::{Entity, WorldError};
use crate::foundation::math::Transform;
use crate::physics::{CollisionLayers, JointHandle, PhysicsFlags};
use crate::zones::{VolumeResolver, ZoneHost};
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};

/// Poses are stored in world space; parenting is bookkeeping only
#[derive(Default)]
pub(crate) struct MockHost {
    keys: SlotMap<Entity, ()>,
    pub owners: HashMap<Entity, Entity>,
    pub dead: HashSet<Entity>,
    pub layers: HashMap<Entity, CollisionLayers>,
    pub held: HashSet<Entity>,
    pub interactable: HashMap<Entity, bool>,
    pub poses: HashMap<Entity, Transform>,
    pub physics: HashMap<Entity, PhysicsFlags>,
    pub parents: HashMap<Entity, Entity>,
    pub joints: SlotMap<JointHandle, (Entity, Entity)>,
    pub end_hold_calls: Vec<Entity>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A kinematic body usable as zone, anchor or joint body
    pub fn spawn_anchor(&mut self, pose: Transform) -> Entity {
        let entity = self.keys.insert(());
        self.poses.insert(entity, pose);
        self.physics.insert(entity, PhysicsFlags::LOCKED);
        entity
    }

    /// A grabbable dynamic object with one volume
    pub fn spawn_object(&mut self, pose: Transform) -> (Entity, Entity) {
        let object = self.keys.insert(());
        self.poses.insert(object, pose);
        self.interactable.insert(object, true);
        self.physics.insert(object, PhysicsFlags::DYNAMIC);
        let volume = self.add_volume(object);
        (object, volume)
    }

    /// Another volume owned by `object`
    pub fn add_volume(&mut self, object: Entity) -> Entity {
        let volume = self.keys.insert(());
        self.owners.insert(volume, object);
        volume
    }

    /// A plain entity with a pose and nothing else
    pub fn spawn_node(&mut self, pose: Transform) -> Entity {
        let entity = self.keys.insert(());
        self.poses.insert(entity, pose);
        entity
    }

    /// Destroy an entity and every volume it owns
    pub fn kill(&mut self, entity: Entity) {
        self.dead.insert(entity);
        self.poses.remove(&entity);
        let volumes: Vec<Entity> = self
            .owners
            .iter()
            .filter(|(_, owner)| **owner == entity)
            .map(|(volume, _)| *volume)
            .collect();
        self.dead.extend(volumes);
    }
}

impl VolumeResolver<Entity, Entity> for MockHost {
    fn resolve_owner(&self, volume: Entity) -> Option<Entity> {
        self.owners.get(&volume).copied()
    }

    fn is_object_valid(&self, object: Entity) -> bool {
        !self.dead.contains(&object) && self.interactable.contains_key(&object)
    }

    fn is_volume_valid(&self, volume: Entity) -> bool {
        !self.dead.contains(&volume)
    }
}

impl ZoneHost for MockHost {
    fn volume_layers(&self, volume: Entity) -> CollisionLayers {
        self.layers.get(&volume).copied().unwrap_or(CollisionLayers::ALL)
    }

    fn is_held(&self, object: Entity) -> bool {
        self.held.contains(&object)
    }

    fn end_hold(&mut self, object: Entity) {
        self.held.remove(&object);
        self.end_hold_calls.push(object);
    }

    fn is_interactable(&self, object: Entity) -> bool {
        self.interactable.get(&object).copied().unwrap_or(false)
    }

    fn set_interactable(&mut self, object: Entity, interactable: bool) {
        self.interactable.insert(object, interactable);
    }

    fn pose(&self, entity: Entity) -> Option<Transform> {
        self.poses.get(&entity).cloned()
    }

    fn set_pose(&mut self, entity: Entity, pose: &Transform) {
        self.poses.insert(entity, pose.clone());
    }

    fn physics_flags(&self, object: Entity) -> Option<PhysicsFlags> {
        self.physics.get(&object).copied()
    }

    fn set_physics_flags(&mut self, object: Entity, flags: PhysicsFlags) -> Result<(), WorldError> {
        match self.physics.get_mut(&object) {
            Some(current) => {
                *current = flags;
                Ok(())
            }
            None => Err(WorldError::MissingRigidBody(object)),
        }
    }

    fn parent(&self, entity: Entity) -> Option<Entity> {
        self.parents.get(&entity).copied()
    }

    fn set_parent(&mut self, entity: Entity, parent: Option<Entity>) -> Result<(), WorldError> {
        match parent {
            Some(parent) => self.parents.insert(entity, parent),
            None => self.parents.remove(&entity),
        };
        Ok(())
    }

    fn create_joint(&mut self, body: Entity, connected_body: Entity, _break_force: f32) -> Result<JointHandle, WorldError> {
        let exists = self
            .joints
            .values()
            .any(|(a, b)| (*a == body && *b == connected_body) || (*a == connected_body && *b == body));
        if exists {
            return Err(WorldError::JointAlreadyExists { body, connected_body });
        }
        Ok(self.joints.insert((body, connected_body)))
    }

    fn destroy_joint(&mut self, joint: JointHandle) {
        self.joints.remove(joint);
    }
}
