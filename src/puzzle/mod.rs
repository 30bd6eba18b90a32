//! Puzzle domain: attribute categories, values and grid layout

pub mod attributes;
pub mod dimensions;
pub mod topology;

pub use attributes::{
    Category, Color, Nation, Owns, Transport, Value, BITS_PER_VALUE, CODE_SPACE,
    MAX_VALUES_PER_CATEGORY,
};
pub use dimensions::Dimensions;
pub use topology::{resolve_neighbor, Direction, GridShape, Offset, Topology, TopologyConfig, Wrap};
