mod particle_collisions;

pub use particle_collisions::*;

#[cfg(test)]
mod particle_collisions_tests;
