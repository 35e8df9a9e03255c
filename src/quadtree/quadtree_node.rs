use crate::models::Vec2;

/// Axis-aligned rectangle covered by one quadtree node.
///
/// `top > bottom` and `right > left`. Ownership of points on the edges follows the
/// insertion arithmetic: a node owns `left <= x < right` and `bottom < y <= top`.
///
/// # Examples
///
/// ```
/// use rs_quadtree_collisions::models::Vec2;
/// use rs_quadtree_collisions::quadtree::NodeBounds;
///
/// let bounds = NodeBounds { left: 0.0, right: 1.0, top: 1.0, bottom: 0.0 };
/// assert!(bounds.contains(Vec2::new(0.0, 1.0)));   // left and top edges are owned
/// assert!(!bounds.contains(Vec2::new(1.0, 0.5)));  // right edge is not
/// assert!(!bounds.contains(Vec2::new(0.5, 0.0)));  // nor is the bottom edge
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl NodeBounds {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.bottom + self.top) * 0.5,
        )
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left &&
            point.x < self.right &&
            point.y > self.bottom &&
            point.y <= self.top
    }

    /// Picks the quadrant a point falls into when this node is split at its center.
    ///
    /// `x < center.x` selects the left half and `y > center.y` the top half, so a point
    /// sitting exactly on the center lines goes right and bottom.
    pub fn quadrant_of(&self, point: Vec2) -> Quadrant {
        let center = self.center();
        match (point.x < center.x, point.y > center.y) {
            (true, true) => Quadrant::TopLeft,
            (false, true) => Quadrant::TopRight,
            (false, false) => Quadrant::BottomRight,
            (true, false) => Quadrant::BottomLeft,
        }
    }

    /// The rectangle of one quadrant, split at this node's midpoint on both axes.
    pub fn quadrant(&self, quadrant: Quadrant) -> NodeBounds {
        let center = self.center();
        match quadrant {
            Quadrant::TopLeft => NodeBounds { left: self.left, right: center.x, top: self.top, bottom: center.y },
            Quadrant::TopRight => NodeBounds { left: center.x, right: self.right, top: self.top, bottom: center.y },
            Quadrant::BottomRight => NodeBounds { left: center.x, right: self.right, top: center.y, bottom: self.bottom },
            Quadrant::BottomLeft => NodeBounds { left: self.left, right: center.x, top: center.y, bottom: self.bottom },
        }
    }

    /// The four corners in drawing order: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left, self.top),
            Vec2::new(self.right, self.top),
            Vec2::new(self.right, self.bottom),
            Vec2::new(self.left, self.bottom),
        ]
    }
}

/// One of the four children of a subdivided node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Quadrant {
    /// Allocation order of the children in the node table.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomRight,
        Quadrant::BottomLeft,
    ];

    /// (row, column) of the quadrant inside its parent's 2x2 split; row 0 is the top.
    pub(crate) fn cell(self) -> (isize, isize) {
        match self {
            Quadrant::TopLeft => (0, 0),
            Quadrant::TopRight => (0, 1),
            Quadrant::BottomRight => (1, 1),
            Quadrant::BottomLeft => (1, 0),
        }
    }

    pub(crate) fn from_cell(row: isize, column: isize) -> Option<Quadrant> {
        match (row, column) {
            (0, 0) => Some(Quadrant::TopLeft),
            (0, 1) => Some(Quadrant::TopRight),
            (1, 1) => Some(Quadrant::BottomRight),
            (1, 0) => Some(Quadrant::BottomLeft),
            _ => None,
        }
    }
}

/// Compass direction of a neighbor link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Left,
        Direction::TopLeft,
        Direction::Top,
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::Bottom,
        Direction::BottomLeft,
    ];

    /// (row, column) step towards the neighbor. Rows grow downwards, matching the
    /// base grid where row 0 is the top of the region.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Left => (0, -1),
            Direction::TopLeft => (-1, -1),
            Direction::Top => (-1, 0),
            Direction::TopRight => (-1, 1),
            Direction::Right => (0, 1),
            Direction::BottomRight => (1, 1),
            Direction::Bottom => (1, 0),
            Direction::BottomLeft => (1, -1),
        }
    }

    /// Inverse of [`Direction::offset`]; `(0, 0)` has no direction.
    pub fn from_offset(row_step: isize, column_step: isize) -> Option<Direction> {
        match (row_step.signum(), column_step.signum()) {
            (0, -1) => Some(Direction::Left),
            (-1, -1) => Some(Direction::TopLeft),
            (-1, 0) => Some(Direction::Top),
            (-1, 1) => Some(Direction::TopRight),
            (0, 1) => Some(Direction::Right),
            (1, 1) => Some(Direction::BottomRight),
            (1, 0) => Some(Direction::Bottom),
            (1, -1) => Some(Direction::BottomLeft),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Node-table indices of the four children of a subdivided node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Children {
    pub top_left: usize,
    pub top_right: usize,
    pub bottom_right: usize,
    pub bottom_left: usize,
}

impl Children {
    /// Four consecutive slots starting at `first`, in [`Quadrant::ALL`] order.
    pub(crate) fn contiguous(first: usize) -> Self {
        Children {
            top_left: first,
            top_right: first + 1,
            bottom_right: first + 2,
            bottom_left: first + 3,
        }
    }

    pub fn get(&self, quadrant: Quadrant) -> usize {
        match quadrant {
            Quadrant::TopLeft => self.top_left,
            Quadrant::TopRight => self.top_right,
            Quadrant::BottomRight => self.bottom_right,
            Quadrant::BottomLeft => self.bottom_left,
        }
    }

    pub fn as_array(&self) -> [usize; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }
}

/// Up to eight neighbor links, one per [`Direction`]. `None` means the node sits on the
/// edge of the region in that direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors([Option<usize>; 8]);

impl Neighbors {
    pub fn get(&self, direction: Direction) -> Option<usize> {
        self.0[direction.slot()]
    }

    pub fn set(&mut self, direction: Direction, node_index: Option<usize>) {
        self.0[direction.slot()] = node_index;
    }

    /// Number of directions that have a neighbor.
    pub fn present(&self) -> usize {
        self.0.iter().filter(|n| n.is_some()).count()
    }
}

/// One slot of the fixed node table.
///
/// A node is either a leaf holding up to `node_capacity` particle indices, or subdivided
/// with four children and no particles of its own. The particle indices themselves live in
/// the tree's shared index pool.
#[derive(Debug, Clone, Default)]
pub struct QuadTreeNode {
    pub(crate) bounds: NodeBounds,
    pub(crate) count: usize,
    pub(crate) children: Option<Children>,
    pub(crate) neighbors: Neighbors,
    pub(crate) in_use: bool,
}

impl QuadTreeNode {
    pub fn bounds(&self) -> NodeBounds {
        self.bounds
    }

    /// Particles held directly by this node; always 0 once subdivided.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_subdivided(&self) -> bool {
        self.children.is_some()
    }

    pub fn children(&self) -> Option<Children> {
        self.children
    }

    pub fn neighbor(&self, direction: Direction) -> Option<usize> {
        self.neighbors.get(direction)
    }

    pub fn neighbors(&self) -> &Neighbors {
        &self.neighbors
    }

    pub fn in_use(&self) -> bool {
        self.in_use
    }

    /// Back to an empty leaf. Bounds and neighbor links are kept.
    pub(crate) fn clear(&mut self) {
        self.count = 0;
        self.children = None;
    }
}
