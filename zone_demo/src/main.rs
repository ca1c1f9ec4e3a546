//! Headless zone demo
//!
//! Runs a small scripted scene through the zone engine and logs every zone
//! event: a cube drops into a socket and snaps, gets pulled back out by a
//! hand, and a key is hung on a breakable hook until it is yanked off.
//!
//! Usage: `zone_demo [socket-settings.ron|toml]`

use rand::Rng;
use thiserror::Error;
use zone_engine::foundation::logging;
use zone_engine::prelude::*;
use zone_engine::ecs::WorldError;

/// Frame delta the scene is scripted around (a 72 Hz headset)
const FRAME_TIME: f32 = 1.0 / 72.0;

/// Frames the script runs for
const FRAME_COUNT: u32 = 360;

#[derive(Debug, Error)]
enum DemoError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("scene error: {0}")]
    World(#[from] WorldError),
}

/// Scripted actions keyed by frame number
#[derive(Debug, Clone, Copy)]
enum Action {
    /// Drop the cube just above the socket
    DropCube,
    /// Grab the cube and carry it off
    GrabCube,
    /// Let go of the cube away from the socket
    ReleaseCube,
    /// Put the key onto the hook
    HangKey,
    /// Pull on the key hard enough to break the joint
    YankKey,
}

fn script(frame: u32) -> Option<Action> {
    match frame {
        10 => Some(Action::DropCube),
        120 => Some(Action::GrabCube),
        150 => Some(Action::ReleaseCube),
        180 => Some(Action::HangKey),
        300 => Some(Action::YankKey),
        _ => None,
    }
}

struct Scene {
    world: World,
    zones: ZoneSystem,
    socket: Entity,
    hook: Entity,
    cube: Entity,
    key: Entity,
}

impl Scene {
    fn new(socket_settings: &ZoneSettings) -> Result<Self, DemoError> {
        let mut world = World::new();

        // Step 1: Zones
        let socket = world.spawn_at("socket", Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));
        world.insert_collider(socket, ColliderComponent::sphere(0.2).as_trigger())?;
        let socket_anchor = world.spawn_at("socket anchor", Transform::from_position(Vec3::new(0.0, 1.05, 0.0)));
        world.set_parent(socket_anchor, Some(socket))?;

        let hook = world.spawn_at("hook", Transform::from_position(Vec3::new(2.0, 1.5, 0.0)));
        world.insert_collider(
            hook,
            ColliderComponent::sphere(0.15)
                .with_layers(CollisionLayers::TRIGGER, CollisionLayers::TOOL)
                .as_trigger(),
        )?;
        world.insert_rigid_body(hook, RigidBodyComponent::kinematic())?;

        // Step 2: Objects, parked out of reach until the script uses them
        let cube = world.spawn_at("cube", Transform::from_position(Vec3::new(-5.0, 0.0, 0.0)));
        world.insert_interactable(cube, InteractableComponent::new())?;
        world.insert_rigid_body(cube, RigidBodyComponent::dynamic(0.4))?;
        world.insert_collider(
            cube,
            ColliderComponent::sphere(0.08).with_layers(CollisionLayers::PICKUP, CollisionLayers::ALL),
        )?;

        let key = world.spawn_at("key", Transform::from_position(Vec3::new(5.0, 0.0, 0.0)));
        world.insert_interactable(key, InteractableComponent::new())?;
        world.insert_rigid_body(key, RigidBodyComponent::dynamic(0.05))?;
        let key_ring = world.spawn_at("key ring", Transform::from_position(Vec3::new(5.0, 0.05, 0.0)));
        world.set_parent(key_ring, Some(key))?;
        world.insert_collider(
            key_ring,
            ColliderComponent::sphere(0.03).with_layers(CollisionLayers::TOOL, CollisionLayers::ALL),
        )?;

        // Step 3: Zone behaviour
        let mut zones = ZoneSystem::new();
        zones.add_zone(socket_settings.build_zone(socket, socket_anchor, None));

        let hook_settings = AttachmentSettings::default()
            .with_strategy(AttachmentStrategy::PhysicalJoint { break_force: 25.0 })
            .with_movement(Some(MovementProfile::new(0.2).with_easing(EasingCurve::EaseOut)));
        zones.add_zone(
            DetectionZone::new(
                hook,
                DetectionSettings::default()
                    .with_threshold(0.25)
                    .with_accepted_layers(CollisionLayers::TOOL),
            )
            .with_attachment(AttachmentBehavior::new(hook, hook_settings))
            .with_highlighter(Box::new(|active: bool| log::info!("Hook highlight {}", if active { "on" } else { "off" }))),
        );

        Ok(Self {
            world,
            zones,
            socket,
            hook,
            cube,
            key,
        })
    }

    fn perform(&mut self, action: Action, rng: &mut impl Rng) -> Result<(), DemoError> {
        log::info!("Script: {:?}", action);
        match action {
            Action::DropCube => {
                let jitter = Vec3::new(rng.gen_range(-0.05..0.05), 0.0, rng.gen_range(-0.05..0.05));
                self.move_to(self.cube, Vec3::new(0.0, 1.1, 0.0) + jitter)?;
            }
            Action::GrabCube => {
                if !self.zones.grab(&mut self.world, self.cube)? {
                    log::warn!("Cube could not be grabbed");
                }
            }
            Action::ReleaseCube => {
                self.move_to(self.cube, Vec3::new(-1.0, 1.0, 0.0))?;
                self.zones.release_hold(&mut self.world, self.cube);
            }
            Action::HangKey => {
                let jitter = Vec3::new(rng.gen_range(-0.03..0.03), rng.gen_range(-0.03..0.03), 0.0);
                self.move_to(self.key, Vec3::new(2.0, 1.4, 0.0) + jitter)?;
            }
            Action::YankKey => {
                for joint in self.world.joints_of(self.key) {
                    let load = rng.gen_range(30.0..60.0);
                    if self.zones.apply_joint_load(&mut self.world, joint, load) {
                        log::info!("Hook let go of the key under {:.1} N", load);
                    }
                }
            }
        }
        Ok(())
    }

    fn move_to(&mut self, entity: Entity, position: Vec3) -> Result<(), DemoError> {
        self.world.set_world_pose(entity, &Transform::from_position(position))?;
        Ok(())
    }

    fn name(&self, entity: Entity) -> &str {
        self.world.name(entity).unwrap_or("<despawned>")
    }

    fn report(&self) {
        for (zone, label) in [(self.socket, "socket"), (self.hook, "hook")] {
            if let Some(zone) = self.zones.zone(zone) {
                let description = zone.describe_all();
                if description.is_empty() {
                    log::info!("{}: empty", label);
                } else {
                    log::info!("{}:\n{}", label, description);
                }
            }
        }
    }
}

fn load_socket_settings() -> Result<ZoneSettings, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading socket settings from {}", path);
            Ok(ZoneSettings::load_from_file(&path)?)
        }
        None => Ok(ZoneSettings::new("socket")
            .with_detection(DetectionSettings::default().with_threshold(0.15))
            .with_attachment(
                AttachmentSettings::default()
                    .with_movement(Some(MovementProfile::new(0.3).with_easing(EasingCurve::SmoothStep))),
            )),
    }
}

fn run() -> Result<(), DemoError> {
    let settings = load_socket_settings()?;
    settings.validate()?;
    let mut scene = Scene::new(&settings)?;
    let mut timestep = FixedTimestep::new(1.0 / 90.0);
    let mut rng = rand::thread_rng();

    for frame in 0..FRAME_COUNT {
        if let Some(action) = script(frame) {
            scene.perform(action, &mut rng)?;
        }

        // Frame times wobble a little around the nominal rate
        let frame_delta = FRAME_TIME * rng.gen_range(0.9..1.1);
        for _ in 0..timestep.accumulate(frame_delta) {
            scene.zones.fixed_update(&mut scene.world, timestep.step());
        }

        for event in scene.zones.late_update() {
            log::info!(
                "[{:>6.3}s] {} {} {}",
                event.timestamp,
                scene.name(event.zone),
                event.event_type,
                scene.name(event.object)
            );
        }
    }

    scene.report();
    log::info!("Ran {} fixed steps", timestep.total_steps());
    Ok(())
}

fn main() {
    logging::init();
    log::info!("Starting zone demo");

    if let Err(e) = run() {
        log::error!("Zone demo failed: {}", e);
        std::process::exit(1);
    }
}
