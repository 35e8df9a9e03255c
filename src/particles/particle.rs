use crate::models::Vec2;
use crate::utils::PhysicsError;

/// A point particle as seen by the collision core.
///
/// The particle store owns these records and decides when they are emitted or
/// retired. The core only reads the kinematic fields and accumulates into
/// `net_force` and `collision_count_this_frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// World-space position.
    pub position: Vec2,
    pub velocity: Vec2,
    /// Force accumulated during the current step. Collisions add to it, never overwrite it.
    pub net_force: Vec2,
    pub mass: f32,
    /// Two particles collide when their centers are closer than the sum of both radii.
    pub radius_of_influence: f32,
    /// Inactive particles are neither indexed nor collided.
    pub active: bool,
    /// Number of contacts resolved for this particle during the current step.
    pub collision_count_this_frame: u32,
}

impl Default for Particle {
    /// An inactive particle with the store's stock mass and radius.
    fn default() -> Self {
        Particle {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            net_force: Vec2::ZERO,
            mass: 0.1,
            radius_of_influence: 0.01,
            active: false,
            collision_count_this_frame: 0,
        }
    }
}

impl Particle {
    /// Creates a new active Particle with no accumulated force.
    ///
    /// # Errors
    ///
    /// Returns an error if `mass` or `radius_of_influence` is not strictly positive.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_quadtree_collisions::models::Vec2;
    /// use rs_quadtree_collisions::particles::Particle;
    ///
    /// let particle = Particle::new(Vec2::new(0.1, 0.2), Vec2::new(1.0, 0.0), 1.0, 0.01)
    ///     .expect("Failed to create particle");
    /// assert!(particle.active);
    /// assert_eq!(particle.net_force, Vec2::ZERO);
    /// ```
    pub fn new(
        position: Vec2,
        velocity: Vec2,
        mass: f32,
        radius_of_influence: f32,
    ) -> Result<Self, PhysicsError> {
        if !(mass > 0.0) || !mass.is_finite() {
            return Err(PhysicsError::InvalidMass);
        }
        if !(radius_of_influence > 0.0) || !radius_of_influence.is_finite() {
            return Err(PhysicsError::InvalidRadius);
        }
        Ok(Particle {
            position,
            velocity,
            mass,
            radius_of_influence,
            active: true,
            ..Particle::default()
        })
    }

    pub fn momentum(&self) -> Vec2 {
        self.velocity * self.mass
    }

    /// Zeroes the per-step accumulators before the next collision pass.
    pub fn clear_frame_state(&mut self) {
        self.net_force = Vec2::ZERO;
        self.collision_count_this_frame = 0;
    }
}

/// Clears the per-step accumulators of every particle in the store.
///
/// The integrator calls this after it has consumed `net_force`, so the next
/// collision pass starts from zero.
pub fn clear_frame_state(particles: &mut [Particle]) {
    particles.iter_mut().for_each(Particle::clear_frame_state);
}

/// Number of particles currently flagged active.
pub fn count_active(particles: &[Particle]) -> usize {
    particles.iter().filter(|p| p.active).count()
}
