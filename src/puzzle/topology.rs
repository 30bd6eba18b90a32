//! Grid adjacency, including toroidal wraparound

use crate::error::{PuzzleError, PuzzleResult};
use serde::{Deserialize, Serialize};

/// Shape of the grid the objects are laid out on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub width: usize,
    pub height: usize,
}

impl GridShape {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Square grid holding `side * side` objects
    pub fn square(side: usize) -> Self {
        Self::new(side, side)
    }

    pub fn object_count(&self) -> usize {
        self.width * self.height
    }

    /// Coordinates of an object: `x = id % width`, `y = id / width`
    pub fn position(&self, object: usize) -> (isize, isize) {
        ((object % self.width) as isize, (object / self.width) as isize)
    }

    fn object_at(&self, x: isize, y: isize) -> usize {
        y as usize * self.width + x as usize
    }

    fn contains_x(&self, x: isize) -> bool {
        x >= 0 && x < self.width as isize
    }

    fn contains_y(&self, y: isize) -> bool {
        y >= 0 && y < self.height as isize
    }
}

/// A coordinate offset from an object to one of its neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

impl TryFrom<Vec<i32>> for Offset {
    type Error = PuzzleError;

    fn try_from(components: Vec<i32>) -> PuzzleResult<Self> {
        match components.as_slice() {
            [dx, dy] => Ok(Offset::new(*dx, *dy)),
            other => Err(PuzzleError::domain(format!(
                "adjacency offset must have exactly 2 components, got {}",
                other.len()
            ))),
        }
    }
}

impl From<Offset> for Vec<i32> {
    fn from(offset: Offset) -> Self {
        vec![offset.dx, offset.dy]
    }
}

/// Which edges of the grid connect back to the opposite edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wrap {
    pub horizontal: bool,
    pub vertical: bool,
}

/// Adjacency settings: the two neighbor directions and the wrap flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub left_offset: Offset,
    pub right_offset: Offset,
    pub wrap_horizontal: bool,
    pub wrap_vertical: bool,
}

impl TopologyConfig {
    pub fn wrap(&self) -> Wrap {
        Wrap {
            horizontal: self.wrap_horizontal,
            vertical: self.wrap_vertical,
        }
    }
}

impl Default for TopologyConfig {
    // "left" is the cell above and "right" the cell to the left; the names are
    // only labels for the two configured directions.
    fn default() -> Self {
        Self {
            left_offset: Offset::new(0, -1),
            right_offset: Offset::new(-1, 0),
            wrap_horizontal: false,
            wrap_vertical: false,
        }
    }
}

/// The two configured neighbor directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

/// Map a coordinate that fell off one edge back onto the grid
fn wrap_axis(coordinate: isize, extent: usize) -> isize {
    coordinate.rem_euclid(extent as isize)
}

/// Resolve the neighbor of `object` reached through `offset`.
///
/// Returns `None` when the candidate position falls off the grid along an
/// axis that does not wrap. A candidate that is off the grid along both axes
/// only resolves when both axes wrap.
pub fn resolve_neighbor(shape: GridShape, object: usize, offset: Offset, wrap: Wrap) -> Option<usize> {
    let (x, y) = shape.position(object);
    let nx = x + offset.dx as isize;
    let ny = y + offset.dy as isize;

    let x_inside = shape.contains_x(nx);
    let y_inside = shape.contains_y(ny);

    match (x_inside, y_inside) {
        (false, false) => {
            if !(wrap.horizontal && wrap.vertical) {
                return None;
            }
            Some(shape.object_at(wrap_axis(nx, shape.width), wrap_axis(ny, shape.height)))
        }
        (false, true) => {
            if !wrap.horizontal {
                return None;
            }
            Some(shape.object_at(wrap_axis(nx, shape.width), ny))
        }
        (true, false) => {
            if !wrap.vertical {
                return None;
            }
            Some(shape.object_at(nx, wrap_axis(ny, shape.height)))
        }
        (true, true) => Some(shape.object_at(nx, ny)),
    }
}

/// Neighbor lookup for one grid under one immutable adjacency configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    shape: GridShape,
    config: TopologyConfig,
}

impl Topology {
    pub fn new(shape: GridShape, config: TopologyConfig) -> Self {
        Self { shape, config }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    pub fn left_neighbor(&self, object: usize) -> Option<usize> {
        resolve_neighbor(self.shape, object, self.config.left_offset, self.config.wrap())
    }

    pub fn right_neighbor(&self, object: usize) -> Option<usize> {
        resolve_neighbor(self.shape, object, self.config.right_offset, self.config.wrap())
    }

    pub fn neighbor(&self, object: usize, direction: Direction) -> Option<usize> {
        match direction {
            Direction::Left => self.left_neighbor(object),
            Direction::Right => self.right_neighbor(object),
        }
    }

    /// Present neighbors of `object`, left first; an object reached in both
    /// directions is listed once
    pub fn neighbors(&self, object: usize) -> Vec<usize> {
        let mut result = Vec::with_capacity(2);
        if let Some(left) = self.left_neighbor(object) {
            result.push(left);
        }
        if let Some(right) = self.right_neighbor(object) {
            if !result.contains(&right) {
                result.push(right);
            }
        }
        result
    }
}
