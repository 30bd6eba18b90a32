//! Attribute Grid Puzzle Solver
//!
//! Compiles a finite-domain grid puzzle (objects on a small grid, each holding
//! one value per attribute category) into a single boolean formula, lowers it
//! to CNF and counts or enumerates its models with a SAT backend.

pub mod config;
pub mod error;
pub mod formula;
pub mod puzzle;
pub mod sat;
pub mod solve;
pub mod utils;

pub use config::Settings;
pub use error::{PuzzleError, PuzzleResult};
pub use solve::{PuzzleProblem, Solution, SolveReport};

use anyhow::Result;

/// Compile and solve a puzzle in one call
pub fn solve_puzzle(settings: Settings) -> Result<SolveReport> {
    let problem = PuzzleProblem::new(settings)?;
    problem.solve()
}
