//! Puzzle problem driver, decoded solutions and their validation

pub mod problem;
pub mod solution;
pub mod validator;

pub use problem::{PuzzleProblem, SolveReport};
pub use solution::{ObjectAssignment, Solution};
pub use validator::{SolutionValidator, ValidationResult, Violation};
