use std::fmt;
use std::error::Error;

/// Represents errors that can occur while indexing particles or resolving their collisions.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Indicates an invalid mass value (e.g., negative or zero mass).
    InvalidMass,
    /// Indicates an invalid radius of influence (e.g., negative or zero radius).
    InvalidRadius,
    /// Indicates an invalid time step (zero, negative or not finite).
    InvalidTime,
    /// Indicates a configuration that cannot describe a usable tree.
    InvalidConfiguration(String),
    /// The node table has fewer than four free slots left, so a full node cannot be subdivided.
    NodeTableExhausted {
        nodes_in_use: usize,
        max_nodes: usize,
    },
    /// A particle index does not refer to an element of the particle slice.
    ParticleIndexOutOfRange {
        index: usize,
        len: usize,
    },
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PhysicsError::InvalidMass => write!(f, "Invalid mass value"),
            PhysicsError::InvalidRadius => write!(f, "Invalid radius of influence"),
            PhysicsError::InvalidTime => write!(f, "Invalid time value"),
            PhysicsError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            PhysicsError::NodeTableExhausted { nodes_in_use, max_nodes } => write!(
                f,
                "Node table exhausted: {} of {} nodes in use",
                nodes_in_use, max_nodes
            ),
            PhysicsError::ParticleIndexOutOfRange { index, len } => write!(
                f,
                "Particle index {} out of range for {} particles",
                index, len
            ),
        }
    }
}

impl Error for PhysicsError {}
