use log::debug;

use crate::models::Vec2;
use crate::particles::Particle;
use crate::quadtree::{Direction, NodeBounds, ParticleQuadTree};
use crate::utils::{fast_inv_sqrt, PhysicsError, SIN_45};

/// Counters gathered during one collision pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Pairs whose distance was tested.
    pub pair_checks: usize,
    /// Pairs whose influence regions overlapped and received an impulse.
    pub collisions: usize,
}

/// Which edges and corners of a node a particle's influence region reaches past.
///
/// Straight edges are tested with the full radius. Corners are tested with the radius
/// projected onto the diagonal (`r * sin 45`) and require both of the corner's edges to
/// be crossed, so a particle next to a corner can raise up to three flags at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeCrossings {
    pub left: bool,
    pub top_left: bool,
    pub top: bool,
    pub top_right: bool,
    pub right: bool,
    pub bottom_right: bool,
    pub bottom: bool,
    pub bottom_left: bool,
}

impl EdgeCrossings {
    /// # Examples
    ///
    /// ```
    /// use rs_quadtree_collisions::collisions::EdgeCrossings;
    /// use rs_quadtree_collisions::models::Vec2;
    /// use rs_quadtree_collisions::quadtree::{Direction, NodeBounds};
    ///
    /// let bounds = NodeBounds { left: 0.0, right: 1.0, top: 1.0, bottom: 0.0 };
    /// let crossings = EdgeCrossings::new(Vec2::new(0.98, 0.98), 0.05, &bounds);
    /// assert!(crossings.crosses(Direction::Top));
    /// assert!(crossings.crosses(Direction::TopRight));
    /// assert!(crossings.crosses(Direction::Right));
    /// assert!(!crossings.crosses(Direction::Left));
    /// ```
    pub fn new(position: Vec2, radius: f32, bounds: &NodeBounds) -> Self {
        let diagonal = radius * SIN_45;

        let diagonal_left = position.x - diagonal < bounds.left;
        let diagonal_right = position.x + diagonal > bounds.right;
        let diagonal_top = position.y + diagonal > bounds.top;
        let diagonal_bottom = position.y - diagonal < bounds.bottom;

        EdgeCrossings {
            left: position.x - radius < bounds.left,
            top_left: diagonal_left && diagonal_top,
            top: position.y + radius > bounds.top,
            top_right: diagonal_right && diagonal_top,
            right: position.x + radius > bounds.right,
            bottom_right: diagonal_right && diagonal_bottom,
            bottom: position.y - radius < bounds.bottom,
            bottom_left: diagonal_left && diagonal_bottom,
        }
    }

    pub fn crosses(&self, direction: Direction) -> bool {
        match direction {
            Direction::Left => self.left,
            Direction::TopLeft => self.top_left,
            Direction::Top => self.top,
            Direction::TopRight => self.top_right,
            Direction::Right => self.right,
            Direction::BottomRight => self.bottom_right,
            Direction::Bottom => self.bottom,
            Direction::BottomLeft => self.bottom_left,
        }
    }

    /// Number of raised flags.
    pub fn count(&self) -> usize {
        Direction::ALL.iter().filter(|&&d| self.crosses(d)).count()
    }
}

/// Resolves a possible contact between two particles as an elastic collision along the
/// line between their centers.
///
/// The resulting momentum change is turned into a force (`dp / dt`) that is added to
/// `p1.net_force` and subtracted from `p2.net_force`, so both contributions are exactly
/// opposite. Velocities are left to the integrator. Returns `true` when a response was
/// applied.
///
/// No response is applied when the influence regions do not overlap or when both centers
/// coincide, since there is no contact normal.
///
/// # Examples
///
/// ```
/// use rs_quadtree_collisions::collisions::collide_particle_pair;
/// use rs_quadtree_collisions::models::Vec2;
/// use rs_quadtree_collisions::particles::Particle;
///
/// let mut a = Particle::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 1.0, 0.01).unwrap();
/// let mut b = Particle::new(Vec2::new(0.005, 0.0), Vec2::new(-1.0, 0.0), 1.0, 0.01).unwrap();
///
/// assert!(collide_particle_pair(&mut a, &mut b, 0.01));
/// assert!(a.net_force.x < 0.0);
/// assert_eq!(a.net_force, -b.net_force);
/// ```
pub fn collide_particle_pair(p1: &mut Particle, p2: &mut Particle, dt: f32) -> bool {
    let offset = p2.position - p1.position;
    let distance_squared = offset.length_squared();
    let reach = p1.radius_of_influence + p2.radius_of_influence;
    if distance_squared >= reach * reach {
        return false;
    }
    if distance_squared <= 0.0 {
        return false;
    }

    let normal = offset * fast_inv_sqrt(distance_squared);
    let v1_normal = p1.velocity.dot(normal);
    let v2_normal = p2.velocity.dot(normal);

    let m1 = p1.mass;
    let m2 = p2.mass;
    let v1_normal_after = ((m1 - m2) * v1_normal + 2.0 * m2 * v2_normal) / (m1 + m2);
    let impulse = normal * (m1 * (v1_normal_after - v1_normal));
    let force = impulse * (1.0 / dt);

    p1.net_force += force;
    p2.net_force += -force;
    p1.collision_count_this_frame += 1;
    p2.collision_count_this_frame += 1;
    true
}

/// Runs every collision test owed by one leaf.
///
/// Each pair of particles held by the leaf is tested once. Then every particle whose
/// influence region reaches past an edge or corner of the leaf is tested against all
/// particles in the neighbor node on that side, descending into the neighbor's leaves
/// if it has been subdivided. With `deduplicate_neighbor_checks` off, a neighbor reached
/// through two directions is checked twice.
///
/// # Panics
///
/// Panics if the tree holds a particle index beyond `particles`, i.e. the tree was built
/// from a different particle slice.
pub fn collisions_within_node(
    tree: &ParticleQuadTree,
    node_index: usize,
    particles: &mut [Particle],
    dt: f32,
    report: &mut CollisionReport,
) {
    let node = tree.node(node_index);
    debug_assert!(!node.is_subdivided(), "node {} is not a leaf", node_index);
    let members = tree.particles_in_node(node_index);
    let bounds = node.bounds();
    let deduplicate = tree.config().deduplicate_neighbor_checks;

    for (slot, &i) in members.iter().enumerate() {
        for &j in &members[slot + 1..] {
            check_pair(particles, i, j, dt, report);
        }

        let particle = &particles[i];
        let crossings = EdgeCrossings::new(particle.position, particle.radius_of_influence, &bounds);
        let mut checked: [Option<usize>; 8] = [None; 8];

        for (direction_slot, direction) in Direction::ALL.into_iter().enumerate() {
            if !crossings.crosses(direction) {
                continue;
            }
            let neighbor = match node.neighbor(direction) {
                Some(neighbor) => neighbor,
                None => continue,
            };
            if deduplicate {
                if checked.contains(&Some(neighbor)) {
                    continue;
                }
                checked[direction_slot] = Some(neighbor);
            }

            tree.for_each_leaf(neighbor, &mut |leaf| {
                for &j in tree.particles_in_node(leaf) {
                    check_pair(particles, i, j, dt, report);
                }
            });
        }
    }
}

/// Detects and resolves collisions between all particles indexed by the tree.
///
/// Starts from every base-grid node and descends to the leaves, so each leaf is visited
/// exactly once. Forces are accumulated into the particles' `net_force`.
///
/// # Errors
///
/// Returns `InvalidTime` if `dt` is not positive and finite. No particle is touched in
/// that case.
///
/// # Panics
///
/// Panics if the tree was built from a particle slice longer than `particles`.
pub fn do_particle_collisions(
    tree: &ParticleQuadTree,
    particles: &mut [Particle],
    dt: f32,
) -> Result<CollisionReport, PhysicsError> {
    if !(dt > 0.0) || !dt.is_finite() {
        return Err(PhysicsError::InvalidTime);
    }

    let mut report = CollisionReport::default();
    for base_node in 0..tree.base_node_count() {
        tree.for_each_leaf(base_node, &mut |leaf| {
            collisions_within_node(tree, leaf, particles, dt, &mut report);
        });
    }

    debug!(
        "Collision pass over {} nodes: {} pair checks, {} collisions",
        tree.nodes_in_use(), report.pair_checks, report.collisions
    );
    Ok(report)
}

fn check_pair(
    particles: &mut [Particle],
    i: usize,
    j: usize,
    dt: f32,
    report: &mut CollisionReport,
) {
    report.pair_checks += 1;
    let (p1, p2) = pair_mut(particles, i, j);
    if collide_particle_pair(p1, p2, dt) {
        report.collisions += 1;
    }
}

/// Two distinct elements of the slice, borrowed mutably at the same time.
fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    assert_ne!(i, j, "a particle cannot collide with itself");
    if i < j {
        let (head, tail) = particles.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = particles.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}
