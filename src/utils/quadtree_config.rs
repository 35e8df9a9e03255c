// src/utils/quadtree_config.rs
use crate::utils::{
    DEFAULT_QUADTREE_CONFIG,
    errors::PhysicsError
};

/// Fixed layout of the particle quadtree.
///
/// Every value here is consumed once when the tree is built. The node table and the
/// particle-index pool are sized from it and never grow afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadTreeConfig {
    /// Rows of the uniform base grid.
    pub rows: usize,
    /// Columns of the uniform base grid.
    pub columns: usize,
    /// Particle indices a leaf can hold before it must be subdivided.
    pub node_capacity: usize,
    /// Size of the whole node table as a multiple of the base grid.
    pub max_node_multiplier: usize,
    /// Skip a neighbor node that was already checked for the same particle
    /// through another direction.
    pub deduplicate_neighbor_checks: bool,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        DEFAULT_QUADTREE_CONFIG
    }
}

impl QuadTreeConfig {
    /// Builds a configuration, falling back to the default for every `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_quadtree_collisions::utils::QuadTreeConfig;
    ///
    /// let config = QuadTreeConfig::new(Some(4), Some(4), None, Some(2), None);
    /// assert_eq!(config.base_node_count(), 16);
    /// assert_eq!(config.max_nodes(), 32);
    /// assert_eq!(config.node_capacity, 50);
    /// ```
    pub fn new(
        rows: Option<usize>,
        columns: Option<usize>,
        node_capacity: Option<usize>,
        max_node_multiplier: Option<usize>,
        deduplicate_neighbor_checks: Option<bool>,
    ) -> Self {
        let default = DEFAULT_QUADTREE_CONFIG;
        Self {
            rows: rows.unwrap_or(default.rows),
            columns: columns.unwrap_or(default.columns),
            node_capacity: node_capacity.unwrap_or(default.node_capacity),
            max_node_multiplier: max_node_multiplier.unwrap_or(default.max_node_multiplier),
            deduplicate_neighbor_checks: deduplicate_neighbor_checks
                .unwrap_or(default.deduplicate_neighbor_checks),
        }
    }

    pub fn base_node_count(&self) -> usize {
        self.rows * self.columns
    }

    pub fn max_nodes(&self) -> usize {
        self.base_node_count() * self.max_node_multiplier
    }

    /// Rejects layouts the tree cannot be built from, including ones whose node table
    /// or particle-index pool would not fit in a `usize`.
    ///
    /// [`max_nodes`](Self::max_nodes) is only meaningful after this returns `Ok`.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(PhysicsError::InvalidConfiguration(
                "base grid needs at least one row and one column".to_string(),
            ));
        }
        if self.node_capacity == 0 {
            return Err(PhysicsError::InvalidConfiguration(
                "node capacity must be positive".to_string(),
            ));
        }
        if self.max_node_multiplier == 0 {
            return Err(PhysicsError::InvalidConfiguration(
                "node table must hold at least the base grid".to_string(),
            ));
        }
        let pool_size = self.rows
            .checked_mul(self.columns)
            .and_then(|n| n.checked_mul(self.max_node_multiplier))
            .and_then(|n| n.checked_mul(self.node_capacity));
        if pool_size.is_none() {
            return Err(PhysicsError::InvalidConfiguration(
                "node table size overflows".to_string(),
            ));
        }
        Ok(())
    }
}
