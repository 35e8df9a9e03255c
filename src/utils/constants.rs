use crate::utils;

pub const DEFAULT_QUADTREE_CONFIG: utils::QuadTreeConfig = utils::QuadTreeConfig {
    rows: 8,
    columns: 8,
    node_capacity: 50,
    max_node_multiplier: 8,
    deduplicate_neighbor_checks: false,
};

/// sin(45°), projects an influence radius onto either axis of a node corner.
pub const SIN_45: f32 = std::f32::consts::FRAC_1_SQRT_2;
