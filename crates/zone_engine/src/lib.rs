//! # Zone Engine
//!
//! Trigger-zone interaction substrate for interactive scenes: tracks which
//! pickable objects are inside which zones, debounces that detection over
//! time, and drives a snap/attach/release lifecycle for zones that take
//! temporary ownership of an object's pose and physics state.
//!
//! ## Features
//!
//! - **Overlap Tracking**: Multi-volume objects folded into one record each
//! - **Debounced Detection**: Confirmation timers with edge-triggered events
//! - **Pose Matching**: Position/orientation tolerance gating
//! - **Snap Attachment**: Reparent or joint strategies with eased movement
//! - **Reference Host**: A small ECS world and trigger overlap detector
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zone_engine::prelude::*;
//!
//! let mut world = World::new();
//! let zone_entity = world.spawn_at("socket", Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));
//! world
//!     .insert_collider(zone_entity, ColliderComponent::sphere(0.25).as_trigger())
//!     .expect("zone entity exists");
//!
//! let mut zones = ZoneSystem::new();
//! zones.add_zone(
//!     DetectionZone::new(zone_entity, DetectionSettings::default())
//!         .with_attachment(AttachmentBehavior::new(zone_entity, AttachmentSettings::default())),
//! );
//!
//! // Once per fixed step:
//! zones.fixed_update(&mut world, 1.0 / 60.0);
//! // Once per frame:
//! for event in zones.late_update() {
//!     println!("{:?}", event);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod events;
pub mod physics;
pub mod zones;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        foundation::{
            math::{Vec3, Quat, Transform},
            time::FixedTimestep,
        },
        config::{Config, ConfigError},
        core::config::ZoneSettings,
        ecs::{World, Entity},
        ecs::components::{ColliderComponent, InteractableComponent, RigidBodyComponent},
        ecs::systems::ZoneSystem,
        events::{ZoneEvent, ZoneEventType, ZoneEventHandler},
        physics::{CollisionLayers, PhysicsFlags},
        zones::{
            AttachmentBehavior, AttachmentSettings, AttachmentStrategy, DetectionSettings,
            DetectionZone, EasingCurve, EligibilityPolicy, ForceAttachOutcome, Highlighter,
            MovementProfile, PoseMatchGate, PoseMatchSettings, TimerPolicy, ZoneError, ZoneHost,
        },
    };
}
