//! SAT solver integration using CaDiCaL

use super::cnf::Clause;
use crate::error::{PuzzleError, PuzzleResult};
use cadical::Solver;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// SAT solver wrapper for CaDiCaL
pub struct SatSolver {
    solver: Solver,
    variable_count: usize,
    clause_count: usize,
    last_result: SolverResultType,
    solve_time: Duration,
}

/// One model returned by a backend
#[derive(Debug, Clone)]
pub struct SolverSolution {
    /// DIMACS variable -> value, for every variable the backend has seen
    pub assignment: HashMap<i32, bool>,
    pub solve_time: Duration,
}

impl SolverSolution {
    /// Value of a DIMACS variable; variables the backend never saw read as false
    pub fn value(&self, variable: i32) -> bool {
        self.assignment.get(&variable).copied().unwrap_or(false)
    }
}

/// Statistics about the solving process
#[derive(Debug, Clone)]
pub struct SolverStatistics {
    pub variable_count: usize,
    pub clause_count: usize,
    pub solve_time: Duration,
    pub result: SolverResultType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverResultType {
    NotSolved,
    Satisfiable,
    Unsatisfiable,
    Unknown,
}

impl SatSolver {
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
            last_result: SolverResultType::NotSolved,
            solve_time: Duration::ZERO,
        }
    }

    pub fn add_clauses(&mut self, clauses: &[Clause]) -> PuzzleResult<()> {
        for clause in clauses {
            self.add_clause(clause)?;
        }
        Ok(())
    }

    pub fn add_clause(&mut self, clause: &Clause) -> PuzzleResult<()> {
        if clause.is_empty() {
            return Err(PuzzleError::solver("cannot add an empty clause"));
        }

        for &literal in &clause.literals {
            let var = literal.unsigned_abs() as usize;
            if var > self.variable_count {
                self.variable_count = var;
            }
        }

        self.solver.add_clause(clause.literals.iter().copied());
        self.clause_count += 1;
        Ok(())
    }

    /// Solve and return the first model, or `None` when unsatisfiable
    pub fn solve(&mut self) -> PuzzleResult<Option<SolverSolution>> {
        let start_time = Instant::now();
        let result = self.solver.solve();
        self.solve_time += start_time.elapsed();

        match result {
            Some(true) => {
                self.last_result = SolverResultType::Satisfiable;
                Ok(Some(SolverSolution {
                    assignment: self.extract_assignment(),
                    solve_time: start_time.elapsed(),
                }))
            }
            Some(false) => {
                self.last_result = SolverResultType::Unsatisfiable;
                Ok(None)
            }
            None => {
                self.last_result = SolverResultType::Unknown;
                Err(PuzzleError::solver("CaDiCaL stopped without an answer"))
            }
        }
    }

    fn extract_assignment(&self) -> HashMap<i32, bool> {
        (1..=self.variable_count as i32)
            .filter_map(|var| self.solver.value(var).map(|value| (var, value)))
            .collect()
    }

    pub fn statistics(&self) -> SolverStatistics {
        SolverStatistics {
            variable_count: self.variable_count,
            clause_count: self.clause_count,
            solve_time: self.solve_time,
            result: self.last_result,
        }
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn clause_count(&self) -> usize {
        self.clause_count
    }
}

impl Default for SatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Solver Statistics:")?;
        writeln!(f, "  Variables: {}", self.variable_count)?;
        writeln!(f, "  Clauses: {}", self.clause_count)?;
        writeln!(f, "  Solve time: {:.3}s", self.solve_time.as_secs_f64())?;
        writeln!(f, "  Result: {:?}", self.result)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_creation() {
        let solver = SatSolver::new();
        assert_eq!(solver.variable_count(), 0);
        assert_eq!(solver.clause_count(), 0);
        assert_eq!(solver.statistics().result, SolverResultType::NotSolved);
    }

    #[test]
    fn test_simple_satisfiable() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::new(vec![1, 2])).unwrap();
        solver.add_clause(&Clause::new(vec![-1, 2])).unwrap();

        let solution = solver.solve().unwrap().expect("satisfiable");
        // x2 must be true to satisfy both clauses
        assert!(solution.value(2));
        assert_eq!(solver.statistics().result, SolverResultType::Satisfiable);
    }

    #[test]
    fn test_unsatisfiable() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::unit(1)).unwrap();
        solver.add_clause(&Clause::unit(-1)).unwrap();

        assert!(solver.solve().unwrap().is_none());
        assert_eq!(solver.statistics().result, SolverResultType::Unsatisfiable);
    }

    #[test]
    fn test_incremental_clauses() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::new(vec![1, 2])).unwrap();
        assert!(solver.solve().unwrap().is_some());

        solver.add_clause(&Clause::unit(-1)).unwrap();
        solver.add_clause(&Clause::unit(-2)).unwrap();
        assert!(solver.solve().unwrap().is_none());
    }

    #[test]
    fn test_empty_clause_error() {
        let mut solver = SatSolver::new();
        assert!(matches!(
            solver.add_clause(&Clause::new(vec![])),
            Err(PuzzleError::Solver(_))
        ));
    }

    #[test]
    fn test_variable_count_tracking() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::new(vec![1, -5, 3])).unwrap();
        assert_eq!(solver.variable_count(), 5);

        solver.add_clause(&Clause::new(vec![2, -7])).unwrap();
        assert_eq!(solver.variable_count(), 7);
        assert_eq!(solver.clause_count(), 2);
    }
}
