mod particle;

pub use particle::*;
