//! Statically pre-subdivided quadtree that indexes particles for collision detection.
//!
//! The tree starts every step from a uniform `rows x columns` base grid whose bounds and
//! neighbor links never change. Particles are dropped straight into their base cell with
//! constant-time arithmetic, and a cell that overflows its capacity is split into four
//! quadrants taken from the end of a fixed node table. Children inherit neighbor links
//! from their siblings and from their parent's neighbors, so no neighbor search is needed
//! while the tree grows.
//!
//! All storage is allocated once in [`ParticleQuadTree::new`]. Building the tree never
//! allocates: subdivision claims slots by bumping `nodes_in_use`, and [`ParticleQuadTree::reset_tree`]
//! hands them all back at once.
//!
//! # Example
//!
//! ```
//! use rs_quadtree_collisions::models::Vec2;
//! use rs_quadtree_collisions::particles::Particle;
//! use rs_quadtree_collisions::quadtree::ParticleQuadTree;
//! use rs_quadtree_collisions::utils::QuadTreeConfig;
//!
//! let mut tree = ParticleQuadTree::new(QuadTreeConfig::default(), Vec2::ZERO, 1.0)
//!     .expect("Failed to build tree");
//!
//! let particles = vec![
//!     Particle::new(Vec2::new(-0.5, 0.5), Vec2::ZERO, 1.0, 0.01).unwrap(),
//!     Particle::new(Vec2::new(0.3, -0.2), Vec2::ZERO, 1.0, 0.01).unwrap(),
//! ];
//!
//! tree.reset_tree();
//! let report = tree.add_particles_to_tree(&particles);
//! assert_eq!(report.inserted, 2);
//! assert_eq!(tree.nodes_in_use(), 64);
//! ```
use log::{debug, trace, warn};

use crate::models::Vec2;
use crate::particles::Particle;
use crate::quadtree::{Children, Direction, NodeBounds, Quadrant, QuadTreeNode};
use crate::utils::{PhysicsError, QuadTreeConfig};

/// Outcome of one bulk insertion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertionReport {
    /// Active particles that ended up in a leaf.
    pub inserted: usize,
    /// Active particles left out of the tree because the node table ran out of slots.
    pub dropped: usize,
    /// Active particles whose base cell fell outside the grid and was clamped back in.
    pub clamped: usize,
}

/// Fixed-capacity quadtree over a square particle region.
#[derive(Debug, Clone)]
pub struct ParticleQuadTree {
    config: QuadTreeConfig,
    nodes: Vec<QuadTreeNode>,
    /// `node_capacity` slots per node, node `i` owns `[i * capacity, (i + 1) * capacity)`.
    particle_slots: Vec<usize>,
    nodes_in_use: usize,
    region_center: Vec2,
    region_radius: f32,
}

impl ParticleQuadTree {
    /// Allocates the node table and index pool, then lays out the base grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or `region_radius` is not a
    /// positive, finite number.
    pub fn new(
        config: QuadTreeConfig,
        region_center: Vec2,
        region_radius: f32,
    ) -> Result<Self, PhysicsError> {
        config.validate()?;
        let max_nodes = config.max_nodes();

        let mut tree = ParticleQuadTree {
            config,
            nodes: vec![QuadTreeNode::default(); max_nodes],
            particle_slots: vec![0; max_nodes * config.node_capacity],
            nodes_in_use: config.base_node_count(),
            region_center,
            region_radius,
        };
        tree.initialize_tree(region_center, region_radius)?;
        Ok(tree)
    }

    /// Lays out the base grid over `[center - radius, center + radius]` on both axes.
    ///
    /// Node `row * columns + column` covers one cell; row 0 is the top of the region and
    /// column 0 its left side. Each base node is linked to the up to eight cells around it.
    /// Every other slot of the table is cleared and marked unused.
    pub fn initialize_tree(&mut self, region_center: Vec2, region_radius: f32) -> Result<(), PhysicsError> {
        if !(region_radius > 0.0) || !region_radius.is_finite() {
            return Err(PhysicsError::InvalidConfiguration(
                "region radius must be positive and finite".to_string(),
            ));
        }
        self.region_center = region_center;
        self.region_radius = region_radius;

        let rows = self.config.rows;
        let columns = self.config.columns;
        let cell_width = self.cell_width();
        let cell_height = self.cell_height();
        let min_x = region_center.x - region_radius;
        let max_y = region_center.y + region_radius;

        for node in self.nodes.iter_mut() {
            *node = QuadTreeNode::default();
        }

        for row in 0..rows {
            for column in 0..columns {
                let node_index = row * columns + column;
                let node = &mut self.nodes[node_index];

                node.bounds = NodeBounds {
                    left: min_x + column as f32 * cell_width,
                    right: min_x + (column + 1) as f32 * cell_width,
                    top: max_y - row as f32 * cell_height,
                    bottom: max_y - (row + 1) as f32 * cell_height,
                };
                node.in_use = true;

                for direction in Direction::ALL {
                    let (row_step, column_step) = direction.offset();
                    let neighbor_row = row as isize + row_step;
                    let neighbor_column = column as isize + column_step;
                    let on_grid = (0..rows as isize).contains(&neighbor_row)
                        && (0..columns as isize).contains(&neighbor_column);
                    let neighbor = on_grid
                        .then(|| neighbor_row as usize * columns + neighbor_column as usize);
                    node.neighbors.set(direction, neighbor);
                }
            }
        }

        self.nodes_in_use = self.config.base_node_count();
        debug!(
            "Initialized {}x{} base grid over center ({}, {}) radius {}, {} node slots",
            rows, columns, region_center.x, region_center.y, region_radius, self.nodes.len()
        );
        Ok(())
    }

    /// Returns every node to an empty leaf and releases all subdivision slots.
    ///
    /// Bounds and neighbor links of the base grid are left as they are; subdivided slots
    /// get theirs rewritten the next time they are claimed.
    pub fn reset_tree(&mut self) {
        let base_nodes = self.config.base_node_count();
        for (node_index, node) in self.nodes.iter_mut().enumerate() {
            node.clear();
            if node_index >= base_nodes {
                node.in_use = false;
            }
        }
        self.nodes_in_use = base_nodes;
    }

    /// Inserts every active particle, starting from its base-grid cell.
    ///
    /// Particles that cannot be placed because the node table is full are counted as
    /// dropped; they stay in the particle store but take no part in this step's collisions.
    pub fn add_particles_to_tree(&mut self, particles: &[Particle]) -> InsertionReport {
        let mut report = InsertionReport::default();

        for (particle_index, particle) in particles.iter().enumerate() {
            if !particle.active {
                continue;
            }

            let (node_index, clamped) = self.base_node_index(particle.position);
            if clamped {
                report.clamped += 1;
                debug!(
                    "Particle {} at ({}, {}) lies outside the base grid, clamped to node {}",
                    particle_index, particle.position.x, particle.position.y, node_index
                );
            }

            match self.add_particle_to_node(particles, particle_index, node_index) {
                Ok(_) => report.inserted += 1,
                Err(_) => report.dropped += 1,
            }
        }

        if report.dropped > 0 {
            warn!(
                "Node table exhausted ({} nodes), {} particles left out of the tree this step",
                self.nodes.len(), report.dropped
            );
        }
        if report.clamped > 0 {
            warn!("{} particles were outside the particle region and got clamped", report.clamped);
        }
        debug!(
            "Inserted {} particles into {} nodes",
            report.inserted, self.nodes_in_use
        );
        report
    }

    /// Base-grid node for a position, computed directly instead of descending the tree.
    ///
    /// Cells outside the grid are clamped to the nearest edge cell; the flag reports
    /// whether that happened. Whenever the flag is `false` the returned node's
    /// [`NodeBounds::contains`] accepts `position`.
    pub fn base_node_index(&self, position: Vec2) -> (usize, bool) {
        let columns = self.config.columns;
        let rows = self.config.rows;
        let min_x = self.region_center.x - self.region_radius;
        let max_y = self.region_center.y + self.region_radius;

        let column = ((position.x - min_x) / self.cell_width()).floor();
        let row = ((max_y - position.y) / self.cell_height()).floor();

        // A NaN coordinate fails both range checks and is clamped to the first cell
        let (column, column_clamped) = clamp_cell(column, columns);
        let (row, row_clamped) = clamp_cell(row, rows);

        // The division rounds differently from the stored edges, so settle on the
        // cell whose bounds actually own the position
        let bounds = self.nodes[row * columns + column].bounds;
        let (column, column_outside) = step_into_cell(
            column,
            columns,
            position.x < bounds.left,
            position.x >= bounds.right,
        );
        let (row, row_outside) = step_into_cell(
            row,
            rows,
            position.y > bounds.top,
            position.y <= bounds.bottom,
        );

        let node_index = row * columns + column;
        let outside = column_outside || row_outside || !self.nodes[node_index].bounds.contains(position);
        (node_index, column_clamped || row_clamped || outside)
    }

    /// Places one particle into `node_index` or the leaf below it that contains the
    /// particle, splitting full leaves on the way.
    ///
    /// Returns the index of the leaf that now holds the particle.
    ///
    /// # Errors
    ///
    /// * `ParticleIndexOutOfRange` if `particle_index` is not an index into `particles`.
    /// * `NodeTableExhausted` if a full leaf had to be split but the table has no room left.
    ///
    /// # Panics
    ///
    /// Panics if `node_index` is not a node currently in use.
    pub fn add_particle_to_node(
        &mut self,
        particles: &[Particle],
        particle_index: usize,
        node_index: usize,
    ) -> Result<usize, PhysicsError> {
        let position = particles
            .get(particle_index)
            .ok_or(PhysicsError::ParticleIndexOutOfRange {
                index: particle_index,
                len: particles.len(),
            })?
            .position;
        assert!(
            node_index < self.nodes_in_use,
            "node {} is beyond the {} nodes in use",
            node_index, self.nodes_in_use
        );

        let capacity = self.config.node_capacity;
        let mut current = node_index;
        loop {
            let (children, count, bounds) = {
                let node = &self.nodes[current];
                (node.children, node.count, node.bounds)
            };

            match children {
                Some(children) => {
                    current = children.get(bounds.quadrant_of(position));
                }
                None if count < capacity => {
                    self.particle_slots[current * capacity + count] = particle_index;
                    self.nodes[current].count += 1;
                    return Ok(current);
                }
                None => {
                    // Full leaf: split it, then retry the same node which now routes to a child
                    self.subdivide_node(particles, current)?;
                }
            }
        }
    }

    /// Splits a leaf into four quadrant children claimed from the end of the node table and
    /// moves its particles into them.
    ///
    /// Each child links to its siblings where they border it and inherits the parent's
    /// neighbor in the direction it leaves the parent through. A top-left child, for
    /// instance, gets the top-right sibling as its right neighbor and the parent's top
    /// neighbor as both its top and its top-right neighbor.
    ///
    /// # Errors
    ///
    /// Returns `NodeTableExhausted` and leaves the node untouched if fewer than four free
    /// slots remain.
    ///
    /// # Panics
    ///
    /// Panics if `node_index` is not an in-use leaf.
    pub fn subdivide_node(
        &mut self,
        particles: &[Particle],
        node_index: usize,
    ) -> Result<Children, PhysicsError> {
        assert!(node_index < self.nodes_in_use, "node {} is not in use", node_index);
        assert!(
            !self.nodes[node_index].is_subdivided(),
            "node {} is already subdivided",
            node_index
        );

        if self.nodes_in_use + 4 > self.nodes.len() {
            return Err(PhysicsError::NodeTableExhausted {
                nodes_in_use: self.nodes_in_use,
                max_nodes: self.nodes.len(),
            });
        }

        let children = Children::contiguous(self.nodes_in_use);
        self.nodes_in_use += 4;

        let parent_bounds = self.nodes[node_index].bounds;
        let parent_neighbors = self.nodes[node_index].neighbors;
        self.nodes[node_index].children = Some(children);
        trace!(
            "Subdividing node {} into {:?}, {} nodes in use",
            node_index, children.as_array(), self.nodes_in_use
        );

        for quadrant in Quadrant::ALL {
            let (row, column) = quadrant.cell();
            let child = &mut self.nodes[children.get(quadrant)];
            child.bounds = parent_bounds.quadrant(quadrant);
            child.count = 0;
            child.children = None;
            child.in_use = true;

            for direction in Direction::ALL {
                let (row_step, column_step) = direction.offset();
                let neighbor_row = row + row_step;
                let neighbor_column = column + column_step;
                let neighbor = match Quadrant::from_cell(neighbor_row, neighbor_column) {
                    Some(sibling) => Some(children.get(sibling)),
                    None => {
                        // Leaves the parent: take the parent's neighbor on the side(s) it crossed
                        let crossed_row = if (0..2).contains(&neighbor_row) { 0 } else { row_step };
                        let crossed_column = if (0..2).contains(&neighbor_column) { 0 } else { column_step };
                        Direction::from_offset(crossed_row, crossed_column)
                            .and_then(|crossed| parent_neighbors.get(crossed))
                    }
                };
                child.neighbors.set(direction, neighbor);
            }
        }

        let capacity = self.config.node_capacity;
        let held = self.nodes[node_index].count;
        for slot in 0..held {
            let particle_index = self.particle_slots[node_index * capacity + slot];
            let position = particles[particle_index].position;
            let child = children.get(parent_bounds.quadrant_of(position));
            // A fresh child holds at most what the parent held, so this cannot split again
            self.add_particle_to_node(particles, particle_index, child)?;
        }
        self.nodes[node_index].count = 0;

        Ok(children)
    }

    /// Calls `f` with every leaf at or below `node_index`.
    pub fn for_each_leaf<F: FnMut(usize)>(&self, node_index: usize, f: &mut F) {
        match self.nodes[node_index].children {
            Some(children) => {
                for child in children.as_array() {
                    self.for_each_leaf(child, f);
                }
            }
            None => f(node_index),
        }
    }

    /// Particle indices held directly by a node.
    pub fn particles_in_node(&self, node_index: usize) -> &[usize] {
        let capacity = self.config.node_capacity;
        let start = node_index * capacity;
        &self.particle_slots[start..start + self.nodes[node_index].count]
    }

    pub fn node(&self, node_index: usize) -> &QuadTreeNode {
        &self.nodes[node_index]
    }

    /// Number of node slots claimed so far, base grid included.
    pub fn nodes_in_use(&self) -> usize {
        self.nodes_in_use
    }

    pub fn max_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn base_node_count(&self) -> usize {
        self.config.base_node_count()
    }

    pub fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    pub fn region_center(&self) -> Vec2 {
        self.region_center
    }

    pub fn region_radius(&self) -> f32 {
        self.region_radius
    }

    /// Rectangles of every node slot in use, subdivided parents included.
    pub fn node_outlines(&self) -> impl Iterator<Item = NodeBounds> + '_ {
        self.nodes[..self.nodes_in_use].iter().map(|node| node.bounds)
    }

    /// Four line segments per node in use, ready to be drawn as the tree outline.
    ///
    /// Edges shared by adjacent nodes are emitted once per node.
    pub fn outline_segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.node_outlines().flat_map(|bounds| {
            let [top_left, top_right, bottom_right, bottom_left] = bounds.corners();
            [
                (top_left, top_right),
                (top_right, bottom_right),
                (bottom_right, bottom_left),
                (bottom_left, top_left),
            ]
        })
    }

    fn cell_width(&self) -> f32 {
        2.0 * self.region_radius / self.config.columns as f32
    }

    fn cell_height(&self) -> f32 {
        2.0 * self.region_radius / self.config.rows as f32
    }
}

/// Clamps a floored cell coordinate into `[0, cells)`.
fn clamp_cell(cell: f32, cells: usize) -> (usize, bool) {
    let last = (cells - 1) as f32;
    if cell >= 0.0 && cell <= last {
        (cell as usize, false)
    } else if cell > last {
        (cells - 1, true)
    } else {
        (0, true)
    }
}

/// Moves one cell towards the position when it lies before or past the cell's edges.
/// Reports `true` if there is no cell left to move to.
fn step_into_cell(cell: usize, cells: usize, before: bool, past: bool) -> (usize, bool) {
    if before {
        match cell.checked_sub(1) {
            Some(previous) => (previous, false),
            None => (cell, true),
        }
    } else if past {
        if cell + 1 < cells {
            (cell + 1, false)
        } else {
            (cell, true)
        }
    } else {
        (cell, false)
    }
}
