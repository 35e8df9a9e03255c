pub mod errors;
mod constants;
mod quadtree_config;
mod math_helpers;

pub use errors::*;
pub use constants::*;
pub use quadtree_config::*;
pub use math_helpers::*;
