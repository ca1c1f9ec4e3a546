//! ECS Systems module

pub mod zone_system;

pub use zone_system::ZoneSystem;
