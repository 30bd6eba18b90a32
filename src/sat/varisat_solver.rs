//! SAT solver integration using Varisat

use super::cnf::Clause;
use super::solver::{SolverResultType, SolverSolution, SolverStatistics};
use crate::error::{PuzzleError, PuzzleResult};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use varisat::{ExtendFormula, Lit, Solver};

/// SAT solver wrapper for Varisat (pure Rust, no C++ toolchain needed)
pub struct VarisatSatSolver {
    solver: Solver<'static>,
    variable_count: usize,
    clause_count: usize,
    last_result: SolverResultType,
    solve_time: Duration,
}

impl VarisatSatSolver {
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

        let lits: Vec<Lit> = clause
            .literals
            .iter()
            .map(|&literal| Lit::from_dimacs(literal as isize))
            .collect();
        for lit in &lits {
            let var = lit.var().to_dimacs() as usize;
            if var > self.variable_count {
                self.variable_count = var;
            }
        }

        self.solver.add_clause(&lits);
        self.clause_count += 1;
        Ok(())
    }

    pub fn solve(&mut self) -> PuzzleResult<Option<SolverSolution>> {
        let start_time = Instant::now();
        let result = self.solver.solve();
        self.solve_time += start_time.elapsed();

        match result {
            Ok(true) => {
                self.last_result = SolverResultType::Satisfiable;
                let model = self
                    .solver
                    .model()
                    .ok_or_else(|| PuzzleError::solver("Varisat reported SAT without a model"))?;
                let assignment: HashMap<i32, bool> = model
                    .iter()
                    .map(|lit| (lit.var().to_dimacs() as i32, lit.is_positive()))
                    .collect();
                Ok(Some(SolverSolution {
                    assignment,
                    solve_time: start_time.elapsed(),
                }))
            }
            Ok(false) => {
                self.last_result = SolverResultType::Unsatisfiable;
                Ok(None)
            }
            Err(e) => {
                self.last_result = SolverResultType::Unknown;
                Err(PuzzleError::solver(format!("Varisat failed: {}", e)))
            }
        }
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

impl Default for VarisatSatSolver {
    fn default() -> Self {
        Self::new()
    }
}
