pub mod utils;
pub mod models;
pub mod particles;
pub mod quadtree;
pub mod collisions;
pub mod simulation;
