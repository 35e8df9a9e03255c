mod quadtree_node;
mod particle_quadtree;

pub use quadtree_node::*;
pub use particle_quadtree::*;
