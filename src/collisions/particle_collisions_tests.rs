use approx::assert_relative_eq;

use crate::collisions::{collide_particle_pair, do_particle_collisions, CollisionReport, EdgeCrossings};
use crate::models::Vec2;
use crate::particles::Particle;
use crate::quadtree::{Direction, NodeBounds, ParticleQuadTree};
use crate::utils::{PhysicsError, QuadTreeConfig};

fn particle(position: (f32, f32), velocity: (f32, f32), mass: f32, radius: f32) -> Particle {
    Particle::new(position.into(), velocity.into(), mass, radius).expect("Failed to create particle")
}

fn build_tree(config: QuadTreeConfig, particles: &[Particle]) -> ParticleQuadTree {
    let mut tree = ParticleQuadTree::new(config, Vec2::ZERO, 1.0).expect("Failed to build tree");
    tree.reset_tree();
    let report = tree.add_particles_to_tree(particles);
    assert_eq!(report.dropped, 0);
    tree
}

#[test]
fn test_edge_crossings() {
    let bounds = NodeBounds { left: 0.0, right: 0.25, top: 0.25, bottom: 0.0 };

    let interior = EdgeCrossings::new(Vec2::new(0.125, 0.125), 0.01, &bounds);
    assert_eq!(interior, EdgeCrossings::default());
    assert_eq!(interior.count(), 0);

    // Close to the bottom-left corner on both axes: two edges and the corner
    let corner = EdgeCrossings::new(Vec2::new(0.005, 0.005), 0.01, &bounds);
    assert!(corner.left && corner.bottom && corner.bottom_left);
    assert_eq!(corner.count(), 3);

    // The full radius reaches the left edge but the diagonal projection does not
    let edge = EdgeCrossings::new(Vec2::new(0.008, 0.008), 0.01, &bounds);
    assert!(edge.crosses(Direction::Left));
    assert!(edge.crosses(Direction::Bottom));
    assert!(!edge.crosses(Direction::BottomLeft));

    let right = EdgeCrossings::new(Vec2::new(0.245, 0.1), 0.01, &bounds);
    assert!(right.right);
    assert_eq!(right.count(), 1);
}

#[test]
fn test_head_on_equal_masses() {
    let dt = 0.01;
    let mut a = particle((0.0, 0.0), (1.0, 0.0), 1.0, 0.01);
    let mut b = particle((0.005, 0.0), (-1.0, 0.0), 1.0, 0.01);

    assert!(collide_particle_pair(&mut a, &mut b, dt));

    // Equal masses swap their normal velocities: a goes from +1 to -1
    assert_relative_eq!(a.net_force.x, -2.0 / dt, max_relative = 1e-2);
    assert_eq!(a.net_force.y, 0.0);
    assert_eq!(a.net_force, -b.net_force);
    assert_eq!(a.collision_count_this_frame, 1);
    assert_eq!(b.collision_count_this_frame, 1);

    // Only forces are accumulated
    assert_eq!(a.velocity, Vec2::new(1.0, 0.0));
    assert_eq!(b.velocity, Vec2::new(-1.0, 0.0));
}

#[test]
fn test_head_on_unequal_masses() {
    let dt = 0.01;
    let mut heavy = particle((0.0, 0.0), (1.0, 0.0), 2.0, 0.01);
    let mut light = particle((0.01, 0.0), (-1.0, 0.0), 1.0, 0.01);

    assert!(collide_particle_pair(&mut heavy, &mut light, dt));

    // v1' = ((m1 - m2) v1 + 2 m2 v2) / (m1 + m2) = -1/3, so dp1 = 2 * (-1/3 - 1)
    assert_relative_eq!(heavy.net_force.x, -8.0 / 3.0 / dt, max_relative = 1e-2);
    let light_velocity_after = light.velocity.x + light.net_force.x * dt / light.mass;
    assert_relative_eq!(light_velocity_after, 5.0 / 3.0, max_relative = 1e-2);

    let total = heavy.net_force + light.net_force;
    assert_eq!(total, Vec2::ZERO);
}

#[test]
fn test_collision_symmetry() {
    let dt = 1.0 / 60.0;
    let a = particle((0.1, 0.2), (0.3, -0.2), 1.5, 0.02);
    let b = particle((0.115, 0.21), (-0.4, 0.1), 0.7, 0.015);

    let (mut a1, mut b1) = (a.clone(), b.clone());
    assert!(collide_particle_pair(&mut a1, &mut b1, dt));

    let (mut a2, mut b2) = (a.clone(), b.clone());
    assert!(collide_particle_pair(&mut b2, &mut a2, dt));

    assert_relative_eq!(a1.net_force.x, a2.net_force.x, max_relative = 1e-4);
    assert_relative_eq!(a1.net_force.y, a2.net_force.y, max_relative = 1e-4);
    assert_relative_eq!(b1.net_force.x, b2.net_force.x, max_relative = 1e-4);
    assert_relative_eq!(b1.net_force.y, b2.net_force.y, max_relative = 1e-4);

    // dp1 = -dp2 in both orders
    assert_eq!(a1.net_force, -b1.net_force);
    assert_eq!(a2.net_force, -b2.net_force);
}

#[test]
fn test_no_response_cases() {
    let dt = 0.01;

    // Too far apart
    let mut a = particle((0.0, 0.0), (1.0, 0.0), 1.0, 0.01);
    let mut b = particle((0.025, 0.0), (-1.0, 0.0), 1.0, 0.01);
    assert!(!collide_particle_pair(&mut a, &mut b, dt));

    // Coincident centers have no contact normal
    let mut a = particle((0.3, 0.3), (1.0, 0.0), 1.0, 0.01);
    let mut b = particle((0.3, 0.3), (-1.0, 0.0), 1.0, 0.01);
    assert!(!collide_particle_pair(&mut a, &mut b, dt));

    for p in [&a, &b] {
        assert_eq!(p.net_force, Vec2::ZERO);
        assert_eq!(p.collision_count_this_frame, 0);
    }
}

#[test]
fn test_overlapping_separating_pair_still_collides() {
    let dt = 0.01;
    let mut a = particle((0.0, 0.0), (-1.0, 0.0), 1.0, 0.01);
    let mut b = particle((0.005, 0.0), (1.0, 0.0), 1.0, 0.01);

    assert!(collide_particle_pair(&mut a, &mut b, dt));

    assert_eq!(a.collision_count_this_frame, 1);
    assert_eq!(b.collision_count_this_frame, 1);
    assert_eq!(a.net_force, -b.net_force);
    // Equal masses still swap normal velocities: a goes from -1 to +1
    assert_relative_eq!(a.net_force.x, 2.0 / dt, max_relative = 1e-2);
}

#[test]
fn test_forces_accumulate() {
    let dt = 0.01;
    let mut a = particle((0.0, 0.0), (1.0, 0.0), 1.0, 0.01);
    a.net_force = Vec2::new(0.0, -9.8);
    let mut b = particle((0.005, 0.0), (-1.0, 0.0), 1.0, 0.01);

    assert!(collide_particle_pair(&mut a, &mut b, dt));
    assert_eq!(a.net_force.y, -9.8);
    assert!(a.net_force.x < 0.0);
}

#[test]
fn test_do_particle_collisions_rejects_invalid_dt() {
    let mut particles = vec![
        particle((0.1, 0.1), (1.0, 0.0), 1.0, 0.01),
        particle((0.105, 0.1), (-1.0, 0.0), 1.0, 0.01),
    ];
    let tree = build_tree(QuadTreeConfig::default(), &particles);

    for dt in [0.0, -0.01, f32::NAN, f32::INFINITY] {
        let result = do_particle_collisions(&tree, &mut particles, dt);
        assert_eq!(result, Err(PhysicsError::InvalidTime));
    }
    assert!(particles.iter().all(|p| p.net_force == Vec2::ZERO));
}

#[test]
fn test_same_node_pair_checks() {
    let _ = env_logger::builder().is_test(true).try_init();
    // Ten particles well inside the base cell [0, 0.25) x (0, 0.25]
    let mut particles: Vec<Particle> = (0..10)
        .map(|k| particle((0.05 + 0.015 * k as f32, 0.1), (0.0, 0.0), 1.0, 0.001))
        .collect();
    let tree = build_tree(QuadTreeConfig::default(), &particles);
    assert_eq!(tree.node(28).count(), 10);

    let report = do_particle_collisions(&tree, &mut particles, 0.01).unwrap();
    assert_eq!(report, CollisionReport { pair_checks: 45, collisions: 0 });
}

#[test]
fn test_head_on_through_tree() {
    let mut particles = vec![
        particle((0.1, 0.1), (1.0, 0.0), 1.0, 0.01),
        particle((0.105, 0.1), (-1.0, 0.0), 1.0, 0.01),
    ];
    let tree = build_tree(QuadTreeConfig::default(), &particles);

    let report = do_particle_collisions(&tree, &mut particles, 0.01).unwrap();
    assert_eq!(report, CollisionReport { pair_checks: 1, collisions: 1 });
    assert_eq!(particles[0].net_force, -particles[1].net_force);
    assert!(particles[0].net_force.x < 0.0);
}

#[test]
fn test_inactive_particles_are_not_collided() {
    let mut particles = vec![
        particle((0.1, 0.1), (1.0, 0.0), 1.0, 0.01),
        particle((0.105, 0.1), (-1.0, 0.0), 1.0, 0.01),
    ];
    particles[1].active = false;
    let tree = build_tree(QuadTreeConfig::default(), &particles);

    let report = do_particle_collisions(&tree, &mut particles, 0.01).unwrap();
    assert_eq!(report, CollisionReport::default());
    assert_eq!(particles[0].net_force, Vec2::ZERO);
}

#[test]
fn test_collision_across_node_boundary() {
    let dt = 0.01;
    // Either side of the vertical edge x = 0.25 between base nodes 28 and 29
    let mut particles = vec![
        particle((0.245, 0.1), (1.0, 0.0), 1.0, 0.01),
        particle((0.255, 0.1), (-1.0, 0.0), 1.0, 0.01),
    ];
    let tree = build_tree(QuadTreeConfig::default(), &particles);
    assert_eq!(tree.node(28).count(), 1);
    assert_eq!(tree.node(29).count(), 1);

    let (mut single_a, mut single_b) = (particles[0].clone(), particles[1].clone());
    assert!(collide_particle_pair(&mut single_a, &mut single_b, dt));

    let report = do_particle_collisions(&tree, &mut particles, dt).unwrap();

    // Each node reaches across the edge, so the pair is resolved from both sides
    assert_eq!(report, CollisionReport { pair_checks: 2, collisions: 2 });
    assert_eq!(particles[0].collision_count_this_frame, 2);
    assert_relative_eq!(particles[0].net_force.x, 2.0 * single_a.net_force.x, max_relative = 1e-4);
    assert_relative_eq!(particles[1].net_force.x, 2.0 * single_b.net_force.x, max_relative = 1e-4);
}

/// 51 slow particles along y = 0.05 that force base node 28 to split, a corner particle near
/// the top edge of the top-left child and one particle just across that edge in node 20.
///
/// The corner particle's top and top-right links both lead to node 20.
fn aliased_neighbor_scene() -> Vec<Particle> {
    let mut particles: Vec<Particle> = (0..51)
        .map(|k| particle((0.01 + 0.0046 * k as f32, 0.05), (0.0, 0.0), 1.0, 0.001))
        .collect();
    particles.push(particle((0.12, 0.245), (0.0, 1.0), 1.0, 0.01));
    particles.push(particle((0.12, 0.252), (0.0, -1.0), 1.0, 0.01));
    particles
}

#[test]
fn test_aliased_neighbor_checked_twice_by_default() {
    let mut particles = aliased_neighbor_scene();
    let tree = build_tree(QuadTreeConfig::default(), &particles);
    assert_eq!(tree.nodes_in_use(), 68);

    let corner_leaf = tree.node(28).children().unwrap().top_left;
    assert_eq!(tree.particles_in_node(corner_leaf), &[51]);
    assert_eq!(tree.node(corner_leaf).neighbor(Direction::Top), Some(20));
    assert_eq!(tree.node(corner_leaf).neighbor(Direction::TopRight), Some(20));

    let report = do_particle_collisions(&tree, &mut particles, 0.01).unwrap();
    assert_eq!(report.collisions, 3);
    assert_eq!(particles[51].collision_count_this_frame, 3);
    assert_eq!(particles[52].collision_count_this_frame, 3);
}

#[test]
fn test_deduplicated_neighbor_checks() {
    let scene = aliased_neighbor_scene();

    let mut reference = scene.clone();
    let reference_tree = build_tree(QuadTreeConfig::default(), &reference);
    let reference_report = do_particle_collisions(&reference_tree, &mut reference, 0.01).unwrap();

    let mut deduplicated = scene;
    let config = QuadTreeConfig::new(None, None, None, None, Some(true));
    let tree = build_tree(config, &deduplicated);
    let report = do_particle_collisions(&tree, &mut deduplicated, 0.01).unwrap();

    assert_eq!(report.collisions, 2);
    assert_eq!(report.pair_checks + 1, reference_report.pair_checks);
    assert_eq!(deduplicated[51].collision_count_this_frame, 2);
    assert_eq!(deduplicated[51].net_force, -deduplicated[52].net_force);
}
