//! Boolean formula representation and the global conjunction

pub mod accumulator;
pub mod expr;

pub use accumulator::FormulaAccumulator;
pub use expr::{Formula, Node};
