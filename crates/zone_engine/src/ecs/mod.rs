//! Entity-Component-System implementation
//!
//! A small slotmap-backed world that stores just enough state to host
//! interaction zones: hierarchy, transforms, interactables, rigid bodies,
//! colliders and joints.

pub mod world;
pub mod entity;
pub mod components;
pub mod systems;

pub use world::{World, WorldError};
pub use entity::Entity;
