//! Attribute encoding, constraint compilation and SAT solving

pub mod cnf;
pub mod constraints;
pub mod encoder;
pub mod solver;
pub mod solver_factory;
pub mod variables;
pub mod varisat_solver;

pub use cnf::{Clause, Cnf};
pub use constraints::{
    CoOccurrence, CompileStatistics, ConstraintCompiler, ConstraintKind, ConstraintSet, FixedAssignment,
    NeighborPair,
};
pub use encoder::AttributeEncoder;
pub use solver::{SatSolver, SolverSolution, SolverStatistics};
pub use solver_factory::{ModelCount, Projection, UnifiedSatSolver};
pub use variables::VariableBank;
