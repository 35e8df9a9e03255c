//! Particle fountain driven by the quadtree collision core.
//!
//! A point emitter at the bottom of a circular region sprays particles upwards, gravity
//! pulls them back, and particles leaving the circle are retired and handed back to the
//! emitter. Each frame the collision system rebuilds the tree and accumulates contact
//! forces, which the Euler step below turns into velocity changes.
//!
//! Run with `RUST_LOG=info cargo run --release --example particle_fountain`.
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rs_quadtree_collisions::models::Vec2;
use rs_quadtree_collisions::particles::{clear_frame_state, count_active, Particle};
use rs_quadtree_collisions::simulation::CollisionSystem;
use rs_quadtree_collisions::utils::{PhysicsError, QuadTreeConfig};

const PARTICLE_COUNT: usize = 15_000;
const MAX_EMITTED_PER_FRAME: usize = 200;
const FRAMES: usize = 600;
const DT: f32 = 1.0 / 60.0;
const GRAVITY: Vec2 = Vec2::new(0.0, -0.9);

const REGION_CENTER: Vec2 = Vec2::new(0.0, 0.0);
const REGION_RADIUS: f32 = 0.8;

/// Sprays particles from one point inside a cone around straight up.
struct PointEmitter {
    position: Vec2,
    /// Half-width of the square around `position` that particles start from.
    jitter: f32,
    min_speed: f32,
    max_speed: f32,
    spread: f32,
    rng: StdRng,
}

impl PointEmitter {
    fn reset_particle(&mut self, particle: &mut Particle) {
        let angle = std::f32::consts::FRAC_PI_2 + self.rng.random_range(-self.spread..self.spread);
        let speed = self.rng.random_range(self.min_speed..self.max_speed);

        let offset = Vec2::new(
            self.rng.random_range(-self.jitter..self.jitter),
            self.rng.random_range(-self.jitter..self.jitter),
        );

        particle.position = self.position + offset;
        particle.velocity = Vec2::new(angle.cos(), angle.sin()) * speed;
        particle.active = true;
        particle.clear_frame_state();
    }
}

/// Circle the particles live in. It is inscribed in the square the tree covers.
struct CircularRegion {
    center: Vec2,
    radius: f32,
}

impl CircularRegion {
    fn out_of_bounds(&self, particle: &Particle) -> bool {
        (particle.position - self.center).length_squared() > self.radius * self.radius
    }
}

/// Retires particles that left the region, re-emits up to the frame quota and
/// integrates everything that is still active.
fn update_particles(
    particles: &mut [Particle],
    region: &CircularRegion,
    emitter: &mut PointEmitter,
    dt: f32,
) -> usize {
    let mut emitted = 0;
    for particle in particles.iter_mut() {
        if particle.active && region.out_of_bounds(particle) {
            particle.active = false;
        }

        if particle.active {
            let acceleration = particle.net_force * (1.0 / particle.mass) + GRAVITY;
            particle.velocity += acceleration * dt;
            particle.position += particle.velocity * dt;
        } else if emitted < MAX_EMITTED_PER_FRAME {
            emitter.reset_particle(particle);
            emitted += 1;
        }
    }
    clear_frame_state(particles);
    emitted
}

fn main() -> Result<(), PhysicsError> {
    env_logger::init();

    let config = QuadTreeConfig::default();
    let mut system = CollisionSystem::new(config, REGION_CENTER, REGION_RADIUS)?;
    let region = CircularRegion { center: REGION_CENTER, radius: REGION_RADIUS };
    let mut emitter = PointEmitter {
        position: Vec2::new(0.0, -0.75),
        jitter: 0.03,
        min_speed: 0.6,
        max_speed: 1.2,
        spread: 0.35,
        rng: StdRng::seed_from_u64(2015),
    };

    // The store starts out fully retired; the emitter brings particles in over time
    let mut particles = vec![Particle::default(); PARTICLE_COUNT];
    info!(
        "Fountain with {} particles, {} node slots of {} particles each",
        PARTICLE_COUNT, config.max_nodes(), config.node_capacity
    );

    for frame in 0..FRAMES {
        let emitted = update_particles(&mut particles, &region, &mut emitter, DT);
        let report = system.step(&mut particles, DT)?;

        if report.insertion.dropped > 0 {
            warn!("Frame {}: {} particles skipped collisions", frame, report.insertion.dropped);
        }
        if frame % 60 == 0 {
            info!(
                "Frame {}: {} active, {} emitted, {} nodes in use, {} pair checks, {} collisions",
                frame,
                count_active(&particles),
                emitted,
                report.nodes_in_use,
                report.collisions.pair_checks,
                report.collisions.collisions
            );
        }
    }

    let outline = system.tree().outline_segments().count();
    info!("Final tree outline has {} segments", outline);
    Ok(())
}
