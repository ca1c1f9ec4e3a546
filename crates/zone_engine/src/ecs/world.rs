//! ECS World implementation
//!
//! Entities live in a generational slot map, so handles to despawned
//! entities never alias new ones. Each entity carries a parent-relative
//! transform plus the optional components the zone system cares about.

use super::components::{
    ColliderComponent, HoldNotification, InteractableComponent, RigidBodyComponent, TransformComponent,
};
use super::Entity;
use crate::foundation::math::Transform;
use crate::physics::{CollisionLayers, ColliderSnapshot, JointComponent, JointHandle, PhysicsFlags};
use crate::zones::host::ZoneHost;
use crate::zones::tracker::VolumeResolver;
use slotmap::SlotMap;
use std::collections::HashMap;

/// World errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// The entity does not exist (or was despawned)
    #[error("Unknown entity: {0:?}")]
    UnknownEntity(Entity),

    /// Reparenting would make an entity its own ancestor
    #[error("Parenting {child:?} under {parent:?} would create a cycle")]
    HierarchyCycle {
        /// Entity being reparented
        child: Entity,
        /// Requested parent
        parent: Entity,
    },

    /// The entity has no rigid body
    #[error("Entity {0:?} has no rigid body")]
    MissingRigidBody(Entity),

    /// A joint between the two bodies already exists
    #[error("Joint between {body:?} and {connected_body:?} already exists")]
    JointAlreadyExists {
        /// First body
        body: Entity,
        /// Second body
        connected_body: Entity,
    },
}

#[derive(Debug, Clone)]
struct EntityRecord {
    name: String,
    active: bool,
    parent: Option<Entity>,
    transform: TransformComponent,
    interactable: Option<InteractableComponent>,
    rigid_body: Option<RigidBodyComponent>,
    collider: Option<ColliderComponent>,
}

impl EntityRecord {
    fn new(name: &str, transform: TransformComponent) -> Self {
        Self {
            name: name.to_string(),
            active: true,
            parent: None,
            transform,
            interactable: None,
            rigid_body: None,
            collider: None,
        }
    }
}

/// ECS World containing all entities and components
#[derive(Debug, Default)]
pub struct World {
    entities: SlotMap<Entity, EntityRecord>,
    joints: SlotMap<JointHandle, JointComponent>,
    /// Object -> zone currently attaching it
    attachment_claims: HashMap<Entity, Entity>,
    hold_notifications: Vec<HoldNotification>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Entities
    // ---------------------------------------------------------------------

    /// Create a new entity at the origin
    pub fn spawn(&mut self, name: &str) -> Entity {
        self.spawn_at(name, Transform::identity())
    }

    /// Create a new root entity at a pose
    pub fn spawn_at(&mut self, name: &str, pose: Transform) -> Entity {
        let entity = self
            .entities
            .insert(EntityRecord::new(name, TransformComponent::from_local_pose(&pose)));
        log::trace!("Spawned {:?} '{}'", entity, name);
        entity
    }

    /// Remove an entity and all of its descendants
    ///
    /// Joints involving a removed entity are destroyed and its attachment
    /// claims dropped. Returns false when the entity did not exist.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.entities.contains_key(entity) {
            return false;
        }

        let mut doomed = vec![entity];
        let mut index = 0;
        while index < doomed.len() {
            let current = doomed[index];
            doomed.extend(self.children(current));
            index += 1;
        }

        for removed in &doomed {
            self.entities.remove(*removed);
            self.joints.retain(|_, joint| !joint.involves(*removed));
            self.attachment_claims
                .retain(|object, zone| object != removed && zone != removed);
        }
        log::debug!("Despawned {:?} with {} descendants", entity, doomed.len() - 1);
        true
    }

    /// Whether the entity exists
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    /// Debug name of an entity
    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.entities.get(entity).map(|r| r.name.as_str())
    }

    /// Enable or disable an entity (and, effectively, its descendants)
    pub fn set_active(&mut self, entity: Entity, active: bool) {
        if let Some(record) = self.entities.get_mut(entity) {
            record.active = active;
        }
    }

    /// Whether the entity and all its ancestors are enabled
    pub fn is_active_in_hierarchy(&self, entity: Entity) -> bool {
        let mut current = Some(entity);
        while let Some(e) = current {
            match self.entities.get(e) {
                Some(record) if record.active => current = record.parent,
                _ => return false,
            }
        }
        true
    }

    // ---------------------------------------------------------------------
    // Hierarchy and poses
    // ---------------------------------------------------------------------

    /// Parent of an entity
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.entities.get(entity).and_then(|r| r.parent)
    }

    /// Direct children of an entity
    pub fn children(&self, entity: Entity) -> Vec<Entity> {
        self.entities
            .iter()
            .filter(|(_, record)| record.parent == Some(entity))
            .map(|(child, _)| child)
            .collect()
    }

    /// Parent-relative transform
    pub fn local_transform(&self, entity: Entity) -> Option<&TransformComponent> {
        self.entities.get(entity).map(|r| &r.transform)
    }

    /// World-space pose, composed up the hierarchy
    pub fn world_pose(&self, entity: Entity) -> Option<Transform> {
        let record = self.entities.get(entity)?;
        match record.parent {
            Some(parent) => Some(record.transform.under(&self.world_pose(parent)?)),
            None => Some(record.transform.local_pose()),
        }
    }

    /// Move an entity to a world-space pose
    pub fn set_world_pose(&mut self, entity: Entity, pose: &Transform) -> Result<(), WorldError> {
        let parent = self
            .entities
            .get(entity)
            .ok_or(WorldError::UnknownEntity(entity))?
            .parent;
        let local = match parent.and_then(|p| self.world_pose(p)) {
            Some(parent_pose) => parent_pose.inverse().combine(pose),
            None => pose.clone(),
        };

        let record = self.entities.get_mut(entity).ok_or(WorldError::UnknownEntity(entity))?;
        record.transform = TransformComponent::from_local_pose(&local);
        Ok(())
    }

    /// Reparent an entity, keeping its world pose
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> Result<(), WorldError> {
        let world_pose = self.world_pose(child).ok_or(WorldError::UnknownEntity(child))?;

        if let Some(new_parent) = parent {
            if !self.is_alive(new_parent) {
                return Err(WorldError::UnknownEntity(new_parent));
            }
            let mut ancestor = Some(new_parent);
            while let Some(a) = ancestor {
                if a == child {
                    return Err(WorldError::HierarchyCycle { child, parent: new_parent });
                }
                ancestor = self.parent(a);
            }
        }

        if let Some(record) = self.entities.get_mut(child) {
            record.parent = parent;
        }
        self.set_world_pose(child, &world_pose)
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    fn record_mut(&mut self, entity: Entity) -> Result<&mut EntityRecord, WorldError> {
        self.entities.get_mut(entity).ok_or(WorldError::UnknownEntity(entity))
    }

    /// Make an entity a grabbable object
    pub fn insert_interactable(&mut self, entity: Entity, component: InteractableComponent) -> Result<(), WorldError> {
        self.record_mut(entity)?.interactable = Some(component);
        Ok(())
    }

    /// Give an entity a physics body
    pub fn insert_rigid_body(&mut self, entity: Entity, component: RigidBodyComponent) -> Result<(), WorldError> {
        self.record_mut(entity)?.rigid_body = Some(component);
        Ok(())
    }

    /// Give an entity an overlap volume
    pub fn insert_collider(&mut self, entity: Entity, component: ColliderComponent) -> Result<(), WorldError> {
        self.record_mut(entity)?.collider = Some(component);
        Ok(())
    }

    /// Interactable component of an entity
    pub fn interactable(&self, entity: Entity) -> Option<&InteractableComponent> {
        self.entities.get(entity).and_then(|r| r.interactable.as_ref())
    }

    /// Rigid body of an entity
    pub fn rigid_body(&self, entity: Entity) -> Option<&RigidBodyComponent> {
        self.entities.get(entity).and_then(|r| r.rigid_body.as_ref())
    }

    /// Collider of an entity
    pub fn collider(&self, entity: Entity) -> Option<&ColliderComponent> {
        self.entities.get(entity).and_then(|r| r.collider.as_ref())
    }

    /// Nearest interactable at or above `volume` in the hierarchy
    pub fn owning_interactable(&self, volume: Entity) -> Option<Entity> {
        let mut current = Some(volume);
        while let Some(e) = current {
            let record = self.entities.get(e)?;
            if record.interactable.is_some() {
                return Some(e);
            }
            current = record.parent;
        }
        None
    }

    /// World-space colliders of all enabled entities
    pub fn collider_snapshots(&self) -> Vec<ColliderSnapshot> {
        self.entities
            .iter()
            .filter_map(|(entity, record)| {
                let collider = record.collider.as_ref()?;
                if !self.is_active_in_hierarchy(entity) {
                    return None;
                }
                let pose = self.world_pose(entity)?;
                Some(ColliderSnapshot {
                    entity,
                    sphere: collider.shape.transformed(&pose),
                    layer: collider.layer,
                    mask: collider.mask,
                    is_trigger: collider.is_trigger,
                })
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Holding
    // ---------------------------------------------------------------------

    /// Start holding an object
    ///
    /// Returns false when the object cannot be grabbed right now.
    pub fn begin_hold(&mut self, object: Entity) -> Result<bool, WorldError> {
        let record = self.record_mut(object)?;
        let Some(interactable) = record.interactable.as_mut() else {
            return Ok(false);
        };
        if !interactable.interactable || interactable.held {
            return Ok(false);
        }
        interactable.held = true;
        self.hold_notifications.push(HoldNotification::Began(object));
        Ok(true)
    }

    /// Stop holding an object; returns false when it was not held
    pub fn end_hold(&mut self, object: Entity) -> bool {
        let Some(interactable) = self.entities.get_mut(object).and_then(|r| r.interactable.as_mut()) else {
            return false;
        };
        if !interactable.held {
            return false;
        }
        interactable.held = false;
        self.hold_notifications.push(HoldNotification::Ended(object));
        true
    }

    /// Put an object back at a root pose, dropping any hold
    pub fn reset_entity(&mut self, object: Entity, pose: &Transform) -> Result<(), WorldError> {
        let record = self.record_mut(object)?;
        record.parent = None;
        record.transform = TransformComponent::from_local_pose(pose);
        if let Some(interactable) = record.interactable.as_mut() {
            interactable.held = false;
        }
        self.hold_notifications.push(HoldNotification::Reset(object));
        Ok(())
    }

    /// Take the hold notifications queued since the last call
    pub fn drain_hold_notifications(&mut self) -> Vec<HoldNotification> {
        std::mem::take(&mut self.hold_notifications)
    }

    // ---------------------------------------------------------------------
    // Joints
    // ---------------------------------------------------------------------

    /// Connect two bodies with a breakable joint
    pub fn create_joint(&mut self, body: Entity, connected_body: Entity, break_force: f32) -> Result<JointHandle, WorldError> {
        for entity in [body, connected_body] {
            if !self.is_alive(entity) {
                return Err(WorldError::UnknownEntity(entity));
            }
            if self.rigid_body(entity).is_none() {
                return Err(WorldError::MissingRigidBody(entity));
            }
        }
        if self.joints.values().any(|j| j.connects(body, connected_body)) {
            return Err(WorldError::JointAlreadyExists { body, connected_body });
        }

        let handle = self.joints.insert(JointComponent::new(body, connected_body, break_force));
        log::debug!("Joint {:?} connects {:?} and {:?}", handle, body, connected_body);
        Ok(handle)
    }

    /// Remove a joint; returns false when it was already gone
    pub fn destroy_joint(&mut self, joint: JointHandle) -> bool {
        self.joints.remove(joint).is_some()
    }

    /// A joint by handle
    pub fn joint(&self, joint: JointHandle) -> Option<&JointComponent> {
        self.joints.get(joint)
    }

    /// Joints involving an entity
    pub fn joints_of(&self, entity: Entity) -> Vec<JointHandle> {
        self.joints
            .iter()
            .filter(|(_, j)| j.involves(entity))
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Apply a load to a joint; returns the joint if it broke
    pub fn apply_joint_load(&mut self, joint: JointHandle, load: f32) -> Option<JointComponent> {
        if !self.joints.get(joint)?.breaks_under(load) {
            return None;
        }
        let broken = self.joints.remove(joint)?;
        log::info!("Joint {:?} broke under load {:.1}", joint, load);
        Some(broken)
    }

    // ---------------------------------------------------------------------
    // Attachment registry
    // ---------------------------------------------------------------------

    /// Zone currently attaching an object
    pub fn attachment_owner(&self, object: Entity) -> Option<Entity> {
        self.attachment_claims.get(&object).copied()
    }
}

impl VolumeResolver<Entity, Entity> for World {
    fn resolve_owner(&self, volume: Entity) -> Option<Entity> {
        self.owning_interactable(volume)
    }

    fn is_object_valid(&self, object: Entity) -> bool {
        self.interactable(object).is_some() && self.is_active_in_hierarchy(object)
    }

    fn is_volume_valid(&self, volume: Entity) -> bool {
        self.collider(volume).is_some() && self.is_active_in_hierarchy(volume)
    }
}

impl ZoneHost for World {
    fn volume_layers(&self, volume: Entity) -> CollisionLayers {
        self.collider(volume).map_or(CollisionLayers::NONE, |c| c.layer)
    }

    fn is_held(&self, object: Entity) -> bool {
        self.interactable(object).is_some_and(|i| i.held)
    }

    fn end_hold(&mut self, object: Entity) {
        World::end_hold(self, object);
    }

    fn is_interactable(&self, object: Entity) -> bool {
        self.interactable(object).is_some_and(|i| i.interactable)
    }

    fn set_interactable(&mut self, object: Entity, interactable: bool) {
        match self.entities.get_mut(object).and_then(|r| r.interactable.as_mut()) {
            Some(component) => component.interactable = interactable,
            None => log::debug!("{:?} has no interactable to update", object),
        }
    }

    fn pose(&self, entity: Entity) -> Option<Transform> {
        self.world_pose(entity)
    }

    fn set_pose(&mut self, entity: Entity, pose: &Transform) {
        if let Err(e) = self.set_world_pose(entity, pose) {
            log::warn!("Failed to move {:?}: {}", entity, e);
        }
    }

    fn physics_flags(&self, object: Entity) -> Option<PhysicsFlags> {
        self.rigid_body(object).map(|b| b.flags)
    }

    fn set_physics_flags(&mut self, object: Entity, flags: PhysicsFlags) -> Result<(), WorldError> {
        let record = self.record_mut(object)?;
        let body = record.rigid_body.as_mut().ok_or(WorldError::MissingRigidBody(object))?;
        body.flags = flags;
        Ok(())
    }

    fn parent(&self, entity: Entity) -> Option<Entity> {
        World::parent(self, entity)
    }

    fn set_parent(&mut self, entity: Entity, parent: Option<Entity>) -> Result<(), WorldError> {
        World::set_parent(self, entity, parent)
    }

    fn create_joint(&mut self, body: Entity, connected_body: Entity, break_force: f32) -> Result<JointHandle, WorldError> {
        World::create_joint(self, body, connected_body, break_force)
    }

    fn destroy_joint(&mut self, joint: JointHandle) {
        World::destroy_joint(self, joint);
    }

    fn claim_attachment(&mut self, object: Entity, zone: Entity) -> bool {
        match self.attachment_claims.get(&object) {
            Some(owner) if *owner != zone => false,
            _ => {
                self.attachment_claims.insert(object, zone);
                true
            }
        }
    }

    fn attachment_owner(&self, object: Entity) -> Option<Entity> {
        World::attachment_owner(self, object)
    }

    fn release_attachment_claim(&mut self, object: Entity, zone: Entity) {
        if self.attachment_claims.get(&object) == Some(&zone) {
            self.attachment_claims.remove(&object);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_reparent_keeps_world_pose() {
        let mut world = World::new();
        let parent = world.spawn_at(
            "parent",
            Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).with_euler_degrees(0.0, 90.0, 0.0),
        );
        let child = world.spawn_at("child", Transform::from_position(Vec3::new(4.0, 0.0, 0.0)));

        world.set_parent(child, Some(parent)).unwrap();
        let pose = world.world_pose(child).unwrap();
        assert_relative_eq!(pose.position, Vec3::new(4.0, 0.0, 0.0), epsilon = EPSILON);

        world
            .set_world_pose(parent, &Transform::from_position(Vec3::new(0.0, 10.0, 0.0)))
            .unwrap();
        assert_relative_eq!(world.world_pose(child).unwrap().position.y, 10.0 - 2.0, epsilon = EPSILON);

        world.set_parent(child, None).unwrap();
        assert_eq!(world.parent(child), None);
    }

    #[test]
    fn test_hierarchy_cycles_are_rejected() {
        let mut world = World::new();
        let a = world.spawn("a");
        let b = world.spawn("b");
        world.set_parent(b, Some(a)).unwrap();

        assert_eq!(
            world.set_parent(a, Some(b)),
            Err(WorldError::HierarchyCycle { child: a, parent: b })
        );
        assert!(world.set_parent(a, Some(a)).is_err());
    }

    #[test]
    fn test_despawn_removes_descendants_joints_and_claims() {
        let mut world = World::new();
        let root = world.spawn("root");
        let child = world.spawn("child");
        let other = world.spawn("other");
        world.set_parent(child, Some(root)).unwrap();
        world.insert_rigid_body(child, RigidBodyComponent::default()).unwrap();
        world.insert_rigid_body(other, RigidBodyComponent::default()).unwrap();
        let joint = world.create_joint(child, other, f32::INFINITY).unwrap();
        assert!(world.claim_attachment(child, other));

        assert!(world.despawn(root));

        assert!(!world.is_alive(child));
        assert!(world.joint(joint).is_none());
        assert_eq!(world.attachment_owner(child), None);
        assert!(!world.despawn(root));
    }

    #[test]
    fn test_colliders_resolve_to_nearest_interactable() {
        let mut world = World::new();
        let object = world.spawn("object");
        let handle = world.spawn("handle");
        world.set_parent(handle, Some(object)).unwrap();
        world.insert_interactable(object, InteractableComponent::new()).unwrap();
        world.insert_collider(handle, ColliderComponent::sphere(0.1)).unwrap();

        assert_eq!(world.resolve_owner(handle), Some(object));
        assert!(world.is_volume_valid(handle));

        world.set_active(object, false);
        assert!(!world.is_volume_valid(handle));
        assert!(!world.is_object_valid(object));
    }

    #[test]
    fn test_hold_notifications() {
        let mut world = World::new();
        let object = world.spawn("object");
        world.insert_interactable(object, InteractableComponent::new()).unwrap();

        assert_eq!(world.begin_hold(object), Ok(true));
        assert_eq!(world.begin_hold(object), Ok(false));
        assert!(world.end_hold(object));
        assert!(!world.end_hold(object));
        world.reset_entity(object, &Transform::identity()).unwrap();

        assert_eq!(
            world.drain_hold_notifications(),
            vec![
                HoldNotification::Began(object),
                HoldNotification::Ended(object),
                HoldNotification::Reset(object),
            ]
        );
        assert!(world.drain_hold_notifications().is_empty());
    }

    #[test]
    fn test_non_interactable_objects_cannot_be_held() {
        let mut world = World::new();
        let object = world.spawn("object");
        world
            .insert_interactable(object, InteractableComponent::new().with_interactable(false))
            .unwrap();

        assert_eq!(world.begin_hold(object), Ok(false));
        assert!(!ZoneHost::is_held(&world, object));
    }

    #[test]
    fn test_duplicate_joint_is_an_error() {
        let mut world = World::new();
        let a = world.spawn("a");
        let b = world.spawn("b");
        let c = world.spawn("c");
        world.insert_rigid_body(a, RigidBodyComponent::default()).unwrap();
        world.insert_rigid_body(b, RigidBodyComponent::kinematic()).unwrap();

        let joint = world.create_joint(a, b, 50.0).unwrap();

        assert_eq!(
            world.create_joint(b, a, 50.0),
            Err(WorldError::JointAlreadyExists { body: b, connected_body: a })
        );
        assert_eq!(world.create_joint(a, c, 1.0), Err(WorldError::MissingRigidBody(c)));
        assert!(world.apply_joint_load(joint, 10.0).is_none());
        assert!(world.apply_joint_load(joint, 60.0).is_some());
        assert!(world.joint(joint).is_none());
    }

    #[test]
    fn test_attachment_claims_are_exclusive() {
        let mut world = World::new();
        let object = world.spawn("object");
        let zone_a = world.spawn("zone a");
        let zone_b = world.spawn("zone b");

        assert!(world.claim_attachment(object, zone_a));
        assert!(world.claim_attachment(object, zone_a));
        assert!(!world.claim_attachment(object, zone_b));

        world.release_attachment_claim(object, zone_b);
        assert_eq!(world.attachment_owner(object), Some(zone_a));

        world.release_attachment_claim(object, zone_a);
        assert!(world.claim_attachment(object, zone_b));
    }
}
