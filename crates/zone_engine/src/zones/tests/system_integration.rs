//! End-to-end scenarios through the built-in world and zone system

use super::event_types;
use crate::ecs::components::{ColliderComponent, InteractableComponent, RigidBodyComponent};
use crate::ecs::systems::ZoneSystem;
use crate::ecs::{Entity, World};
use crate::events::ZoneEventType;
use crate::foundation::math::{Transform, Vec3};
use crate::physics::{OverlapEvent, OverlapPair, OverlapSource, PhysicsFlags};
use crate::zones::{
    AttachmentBehavior, AttachmentSettings, AttachmentStrategy, DetectionSettings, DetectionZone,
};
use approx::assert_relative_eq;
use std::collections::VecDeque;

const DT: f32 = 0.05;

fn spawn_zone(world: &mut World, name: &str, position: Vec3) -> Entity {
    let zone = world.spawn_at(name, Transform::from_position(position));
    world
        .insert_collider(zone, ColliderComponent::sphere(0.5).as_trigger())
        .unwrap();
    world.insert_rigid_body(zone, RigidBodyComponent::kinematic()).unwrap();
    zone
}

fn spawn_object(world: &mut World, position: Vec3) -> Entity {
    let object = world.spawn_at("object", Transform::from_position(position));
    world.insert_interactable(object, InteractableComponent::new()).unwrap();
    world.insert_rigid_body(object, RigidBodyComponent::dynamic(0.5)).unwrap();
    world.insert_collider(object, ColliderComponent::sphere(0.1)).unwrap();
    object
}

fn snapping_zone(zone: Entity, threshold: f32, strategy: AttachmentStrategy) -> DetectionZone {
    let settings = AttachmentSettings::default()
        .with_strategy(strategy)
        .with_movement(None);
    DetectionZone::new(zone, DetectionSettings::default().with_threshold(threshold))
        .with_attachment(AttachmentBehavior::new(zone, settings))
}

fn run(system: &mut ZoneSystem, world: &mut World, ticks: usize) -> Vec<ZoneEventType> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        system.fixed_update(world, DT);
        events.extend(system.late_update());
    }
    event_types(&events)
}

fn move_to(world: &mut World, entity: Entity, position: Vec3) {
    world.set_world_pose(entity, &Transform::from_position(position)).unwrap();
}

#[test]
fn test_object_placed_in_zone_snaps() {
    let mut world = World::new();
    let zone = spawn_zone(&mut world, "socket", Vec3::zeros());
    let object = spawn_object(&mut world, Vec3::new(0.2, 0.0, 0.0));
    let mut system = ZoneSystem::new();
    system.add_zone(snapping_zone(zone, 0.2, AttachmentStrategy::Reparent));

    assert!(run(&mut system, &mut world, 3).is_empty());
    assert_eq!(
        run(&mut system, &mut world, 1),
        vec![ZoneEventType::Detected, ZoneEventType::Snapped]
    );

    assert_eq!(world.parent(object), Some(zone));
    assert_eq!(world.attachment_owner(object), Some(zone));
    assert_eq!(world.rigid_body(object).unwrap().flags, PhysicsFlags::LOCKED);
    assert_relative_eq!(world.world_pose(object).unwrap().position, Vec3::zeros(), epsilon = 1e-5);
    assert!(run(&mut system, &mut world, 5).is_empty());
}

#[test]
fn test_grabbing_a_snapped_object_hands_it_back() {
    let mut world = World::new();
    let zone = spawn_zone(&mut world, "socket", Vec3::zeros());
    let object = spawn_object(&mut world, Vec3::new(0.2, 0.0, 0.0));
    let mut system = ZoneSystem::new();
    system.add_zone(snapping_zone(zone, 0.0, AttachmentStrategy::Reparent));
    run(&mut system, &mut world, 1);

    assert_eq!(system.grab(&mut world, object), Ok(true));
    assert_eq!(world.parent(object), None);

    assert_eq!(
        run(&mut system, &mut world, 1),
        vec![ZoneEventType::Unsnapped, ZoneEventType::Removed]
    );
    assert_eq!(world.attachment_owner(object), None);
    assert_eq!(world.rigid_body(object).unwrap().flags, PhysicsFlags::LOCKED);
    assert!(system.zone(zone).unwrap().has_pending_restore(object));

    // Carry it away and let go
    move_to(&mut world, object, Vec3::new(3.0, 0.0, 0.0));
    assert!(system.release_hold(&mut world, object));
    assert_eq!(world.rigid_body(object).unwrap().flags, PhysicsFlags::DYNAMIC);

    assert!(run(&mut system, &mut world, 1).is_empty());
    assert!(!system.zone(zone).unwrap().contains(object));
}

#[test]
fn test_held_object_waits_for_release() {
    let mut world = World::new();
    let zone = spawn_zone(&mut world, "socket", Vec3::zeros());
    let object = spawn_object(&mut world, Vec3::new(3.0, 0.0, 0.0));
    let mut system = ZoneSystem::new();
    system.add_zone(snapping_zone(zone, 0.1, AttachmentStrategy::Reparent));

    assert_eq!(system.grab(&mut world, object), Ok(true));
    move_to(&mut world, object, Vec3::new(0.1, 0.0, 0.0));
    assert!(run(&mut system, &mut world, 10).is_empty());
    assert!(system.zone(zone).unwrap().contains(object));

    system.release_hold(&mut world, object);
    assert_eq!(
        run(&mut system, &mut world, 2),
        vec![ZoneEventType::Detected, ZoneEventType::Snapped]
    );
}

#[test]
fn test_overlapping_zones_attach_exclusively() {
    let mut world = World::new();
    let first = spawn_zone(&mut world, "first", Vec3::zeros());
    let second = spawn_zone(&mut world, "second", Vec3::new(0.3, 0.0, 0.0));
    let object = spawn_object(&mut world, Vec3::new(0.15, 0.0, 0.0));
    let mut system = ZoneSystem::new();
    system.add_zone(snapping_zone(first, 0.0, AttachmentStrategy::Reparent));
    system.add_zone(snapping_zone(second, 0.0, AttachmentStrategy::Reparent));

    let events = run(&mut system, &mut world, 1);

    assert_eq!(
        events,
        vec![ZoneEventType::Detected, ZoneEventType::Snapped, ZoneEventType::Detected]
    );
    assert_eq!(world.attachment_owner(object), Some(first));
    assert!(system.zone(first).unwrap().is_snapped(object));
    assert!(!system.zone(second).unwrap().state(object).unwrap().is_attached());
}

#[test]
fn test_joint_break_releases_the_object() {
    let mut world = World::new();
    let zone = spawn_zone(&mut world, "hook", Vec3::zeros());
    let object = spawn_object(&mut world, Vec3::new(0.2, 0.0, 0.0));
    let mut system = ZoneSystem::new();
    system.add_zone(snapping_zone(zone, 0.0, AttachmentStrategy::PhysicalJoint { break_force: 50.0 }));

    assert_eq!(
        run(&mut system, &mut world, 1),
        vec![ZoneEventType::Detected, ZoneEventType::Snapped]
    );
    assert_eq!(world.rigid_body(object).unwrap().flags, PhysicsFlags::DYNAMIC);
    let joints = world.joints_of(object);
    assert_eq!(joints.len(), 1);

    assert!(!system.apply_joint_load(&mut world, joints[0], 10.0));
    assert!(system.apply_joint_load(&mut world, joints[0], 100.0));

    assert_eq!(
        event_types(&system.late_update()),
        vec![ZoneEventType::Unsnapped, ZoneEventType::Removed]
    );
    assert!(world.joints_of(object).is_empty());
    assert_eq!(world.attachment_owner(object), None);
}

#[test]
fn test_despawned_object_is_removed() {
    let mut world = World::new();
    let zone = spawn_zone(&mut world, "scanner", Vec3::zeros());
    let object = spawn_object(&mut world, Vec3::new(0.2, 0.0, 0.0));
    let mut system = ZoneSystem::new();
    system.add_zone(DetectionZone::new(zone, DetectionSettings::default().with_threshold(0.0)));
    assert_eq!(run(&mut system, &mut world, 1), vec![ZoneEventType::Detected]);

    assert!(world.despawn(object));

    assert_eq!(run(&mut system, &mut world, 1), vec![ZoneEventType::Removed]);
    assert!(system.zone(zone).unwrap().tracked_objects().is_empty());
}

#[test]
fn test_reset_object_drops_attachment() {
    let mut world = World::new();
    let zone = spawn_zone(&mut world, "socket", Vec3::zeros());
    let object = spawn_object(&mut world, Vec3::new(0.2, 0.0, 0.0));
    let mut system = ZoneSystem::new();
    system.add_zone(snapping_zone(zone, 0.0, AttachmentStrategy::Reparent));
    run(&mut system, &mut world, 1);

    let spawn = Transform::from_position(Vec3::new(5.0, 0.0, 0.0));
    system.reset_object(&mut world, object, &spawn).unwrap();

    assert_eq!(
        event_types(&system.late_update()),
        vec![ZoneEventType::Unsnapped, ZoneEventType::Removed]
    );
    assert_eq!(world.parent(object), None);
    assert_eq!(world.attachment_owner(object), None);
    assert_eq!(world.rigid_body(object).unwrap().flags, PhysicsFlags::LOCKED);
    assert!(run(&mut system, &mut world, 1).is_empty());
    assert!(!system.zone(zone).unwrap().contains(object));
}

#[test]
fn test_cleared_overlaps_reenter_without_events() {
    let mut world = World::new();
    let zone = spawn_zone(&mut world, "scanner", Vec3::zeros());
    let object = spawn_object(&mut world, Vec3::new(0.2, 0.0, 0.0));
    let mut system = ZoneSystem::new();
    system.add_zone(DetectionZone::new(zone, DetectionSettings::default().with_threshold(0.0)));
    assert_eq!(run(&mut system, &mut world, 1), vec![ZoneEventType::Detected]);

    system.clear_overlaps();

    assert!(run(&mut system, &mut world, 2).is_empty());
    assert_eq!(system.zone(zone).unwrap().collider_count(object), 1);

    move_to(&mut world, object, Vec3::new(3.0, 0.0, 0.0));
    assert_eq!(run(&mut system, &mut world, 1), vec![ZoneEventType::Removed]);
}

/// Overlap source replaying a fixed script, one batch per step
struct ScriptedSource {
    steps: VecDeque<Vec<OverlapEvent>>,
}

impl OverlapSource for ScriptedSource {
    fn detect(&mut self, _world: &World) -> Vec<OverlapEvent> {
        self.steps.pop_front().unwrap_or_default()
    }

    fn clear(&mut self) {
        self.steps.clear();
    }
}

#[test]
fn test_custom_overlap_source_routes_by_trigger() {
    let mut world = World::new();
    let zone = world.spawn("zone");
    let stranger = world.spawn("unregistered trigger");
    let object = spawn_object(&mut world, Vec3::new(10.0, 0.0, 0.0));
    let script = vec![
        vec![
            OverlapEvent::Enter(OverlapPair::new(stranger, object)),
            OverlapEvent::Enter(OverlapPair::new(zone, object)),
        ],
        vec![],
        vec![OverlapEvent::Exit(OverlapPair::new(zone, object))],
    ];
    let mut system = ZoneSystem::with_source(Box::new(ScriptedSource {
        steps: script.into_iter().collect(),
    }));
    system.add_zone(DetectionZone::new(zone, DetectionSettings::default().with_threshold(0.05)));

    assert_eq!(run(&mut system, &mut world, 1), vec![ZoneEventType::Detected]);
    assert!(run(&mut system, &mut world, 1).is_empty());
    assert_eq!(run(&mut system, &mut world, 1), vec![ZoneEventType::Removed]);
}
