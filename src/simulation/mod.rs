mod collision_system;

pub use collision_system::*;
