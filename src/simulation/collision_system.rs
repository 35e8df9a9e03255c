//! One-step driver that ties the quadtree and the collision engine together.
//!
//! Every call to [`CollisionSystem::step`] runs the same three phases in order: the node
//! table is reset to the base grid, every active particle is inserted, and the collision
//! pass accumulates forces into the particles. Integrating those forces, emitting new
//! particles and retiring old ones is left to the caller.
//!
//! # Example
//!
//! ```
//! use rs_quadtree_collisions::models::Vec2;
//! use rs_quadtree_collisions::particles::{clear_frame_state, Particle};
//! use rs_quadtree_collisions::simulation::CollisionSystem;
//! use rs_quadtree_collisions::utils::QuadTreeConfig;
//!
//! let mut system = CollisionSystem::new(QuadTreeConfig::default(), Vec2::ZERO, 1.0)
//!     .expect("Failed to create collision system");
//!
//! let mut particles = vec![
//!     Particle::new(Vec2::new(0.1, 0.1), Vec2::new(1.0, 0.0), 1.0, 0.01).unwrap(),
//!     Particle::new(Vec2::new(0.105, 0.1), Vec2::new(-1.0, 0.0), 1.0, 0.01).unwrap(),
//! ];
//!
//! let dt = 0.016;
//! let report = system.step(&mut particles, dt).expect("Step failed");
//! assert_eq!(report.collisions.collisions, 1);
//!
//! // The integrator consumes the forces, then clears them for the next step
//! for p in particles.iter_mut() {
//!     let acceleration = p.net_force * (1.0 / p.mass);
//!     p.velocity += acceleration * dt;
//!     p.position += p.velocity * dt;
//! }
//! clear_frame_state(&mut particles);
//! ```
use log::debug;

use crate::collisions::{do_particle_collisions, CollisionReport};
use crate::models::Vec2;
use crate::particles::Particle;
use crate::quadtree::{InsertionReport, ParticleQuadTree};
use crate::utils::{PhysicsError, QuadTreeConfig};

/// Everything one step found out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub insertion: InsertionReport,
    pub collisions: CollisionReport,
    /// Node slots claimed by the end of the step, base grid included.
    pub nodes_in_use: usize,
}

/// Owns the quadtree for a fixed particle region and runs the per-step pipeline.
#[derive(Debug, Clone)]
pub struct CollisionSystem {
    tree: ParticleQuadTree,
}

impl CollisionSystem {
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or `region_radius` is not a
    /// positive, finite number.
    pub fn new(
        config: QuadTreeConfig,
        region_center: Vec2,
        region_radius: f32,
    ) -> Result<Self, PhysicsError> {
        Ok(CollisionSystem {
            tree: ParticleQuadTree::new(config, region_center, region_radius)?,
        })
    }

    /// Rebuilds the tree from `particles` and resolves their collisions.
    ///
    /// Particles dropped because the node table filled up are reported in
    /// `StepReport::insertion` and simply sit out this step's collisions.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTime` if `dt` is not positive and finite, before the tree is touched.
    pub fn step(&mut self, particles: &mut [Particle], dt: f32) -> Result<StepReport, PhysicsError> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(PhysicsError::InvalidTime);
        }

        self.tree.reset_tree();
        let insertion = self.tree.add_particles_to_tree(particles);
        let collisions = do_particle_collisions(&self.tree, particles, dt)?;

        let report = StepReport {
            insertion,
            collisions,
            nodes_in_use: self.tree.nodes_in_use(),
        };
        debug!("Step finished: {:?}", report);
        Ok(report)
    }

    pub fn tree(&self) -> &ParticleQuadTree {
        &self.tree
    }

    pub fn nodes_in_use(&self) -> usize {
        self.tree.nodes_in_use()
    }
}
