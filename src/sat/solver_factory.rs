//! Factory for creating SAT solver instances based on configuration, plus
//! projected model enumeration on top of any backend

use super::cnf::{Clause, Cnf};
use super::solver::{SatSolver, SolverSolution, SolverStatistics};
use super::varisat_solver::VarisatSatSolver;
use crate::config::SolverBackend;
use crate::error::PuzzleResult;
use std::fmt;

/// Unified SAT solver interface that can use different backends
pub enum UnifiedSatSolver {
    Cadical(SatSolver),
    Varisat(VarisatSatSolver),
}

/// The raw variables models are counted over.
///
/// Only the raw variables that occur in the CNF are enumerated; every other
/// raw variable is unconstrained and doubles the count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    primary_variables: usize,
    enumerated: Vec<usize>,
}

impl Projection {
    pub fn of(cnf: &Cnf) -> Self {
        Self {
            primary_variables: cnf.primary_variables(),
            enumerated: cnf.mentioned().iter().copied().collect(),
        }
    }

    pub fn primary_variables(&self) -> usize {
        self.primary_variables
    }

    /// Raw variables no clause mentions
    pub fn free_variables(&self) -> usize {
        self.primary_variables - self.enumerated.len()
    }

    fn bits_of(&self, solution: &SolverSolution) -> PuzzleResult<Vec<bool>> {
        (0..self.primary_variables)
            .map(|index| Cnf::literal_of(index).map(|variable| solution.value(variable)))
            .collect()
    }

    /// Clause excluding every model that agrees with `bits` on the enumerated variables
    fn blocking_clause(&self, bits: &[bool]) -> PuzzleResult<Clause> {
        let literals = self
            .enumerated
            .iter()
            .map(|&index| {
                let variable = Cnf::literal_of(index)?;
                Ok(if bits[index] { -variable } else { variable })
            })
            .collect::<PuzzleResult<Vec<_>>>()?;
        Ok(Clause::new(literals))
    }
}

/// Number of models over the projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelCount {
    Exact(u128),
    /// The enumeration limit was reached first
    AtLeast(u128),
}

impl ModelCount {
    pub fn value(&self) -> u128 {
        match self {
            ModelCount::Exact(n) | ModelCount::AtLeast(n) => *n,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, ModelCount::Exact(_))
    }
}

impl fmt::Display for ModelCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelCount::Exact(n) => write!(f, "{}", n),
            ModelCount::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Distinct projected models found by blocking-clause enumeration
#[derive(Debug, Clone)]
pub struct Enumeration {
    /// Raw-variable bit-vectors; unconstrained raw variables read as false
    pub models: Vec<Vec<bool>>,
    /// Whether the search proved there are no further models
    pub exhausted: bool,
    pub free_variables: usize,
}

impl Enumeration {
    pub fn count(&self) -> ModelCount {
        let found = self.models.len() as u128;
        let scaled = u32::try_from(self.free_variables)
            .ok()
            .and_then(|free| 1u128.checked_shl(free))
            .and_then(|factor| found.checked_mul(factor));

        match scaled {
            Some(n) if self.exhausted => ModelCount::Exact(n),
            Some(n) => ModelCount::AtLeast(n),
            None => ModelCount::AtLeast(u128::MAX),
        }
    }
}

impl UnifiedSatSolver {
    pub fn new(backend: SolverBackend) -> Self {
        match backend {
            SolverBackend::Cadical => UnifiedSatSolver::Cadical(SatSolver::new()),
            SolverBackend::Varisat => UnifiedSatSolver::Varisat(VarisatSatSolver::new()),
        }
    }

    pub fn add_clauses(&mut self, clauses: &[Clause]) -> PuzzleResult<()> {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.add_clauses(clauses),
            UnifiedSatSolver::Varisat(solver) => solver.add_clauses(clauses),
        }
    }

    pub fn add_clause(&mut self, clause: &Clause) -> PuzzleResult<()> {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.add_clause(clause),
            UnifiedSatSolver::Varisat(solver) => solver.add_clause(clause),
        }
    }

    /// Load every clause of a lowered formula
    pub fn load(&mut self, cnf: &Cnf) -> PuzzleResult<()> {
        self.add_clauses(cnf.clauses())
    }

    pub fn solve(&mut self) -> PuzzleResult<Option<SolverSolution>> {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.solve(),
            UnifiedSatSolver::Varisat(solver) => solver.solve(),
        }
    }

    /// One model as a raw-variable bit-vector, or `None` when unsatisfiable
    pub fn find_model(&mut self, projection: &Projection) -> PuzzleResult<Option<Vec<bool>>> {
        match self.solve()? {
            Some(solution) => Ok(Some(projection.bits_of(&solution)?)),
            None => Ok(None),
        }
    }

    /// Enumerate up to `limit` distinct projected models, then check whether
    /// any model is left.
    ///
    /// Each model found is blocked before the next call, so the solver keeps
    /// those clauses afterwards.
    pub fn enumerate(&mut self, projection: &Projection, limit: usize) -> PuzzleResult<Enumeration> {
        let mut models = Vec::new();
        let mut exhausted = false;

        while models.len() < limit {
            let Some(bits) = self.find_model(projection)? else {
                exhausted = true;
                break;
            };

            let blocking = projection.blocking_clause(&bits)?;
            models.push(bits);
            if blocking.is_empty() {
                // nothing to enumerate: the single projected model covers everything
                exhausted = true;
                break;
            }
            self.add_clause(&blocking)?;
        }

        if !exhausted {
            exhausted = self.solve()?.is_none();
        }

        Ok(Enumeration {
            models,
            exhausted,
            free_variables: projection.free_variables(),
        })
    }

    /// Projected model count, exact unless more than `limit` projected models exist
    pub fn count_models(&mut self, projection: &Projection, limit: usize) -> PuzzleResult<ModelCount> {
        Ok(self.enumerate(projection, limit)?.count())
    }

    /// Up to `max_solutions` distinct projected models
    pub fn solve_multiple(&mut self, projection: &Projection, max_solutions: usize) -> PuzzleResult<Vec<Vec<bool>>> {
        Ok(self.enumerate(projection, max_solutions)?.models)
    }

    pub fn statistics(&self) -> SolverStatistics {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.statistics(),
            UnifiedSatSolver::Varisat(solver) => solver.statistics(),
        }
    }

    pub fn variable_count(&self) -> usize {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.variable_count(),
            UnifiedSatSolver::Varisat(solver) => solver.variable_count(),
        }
    }

    pub fn clause_count(&self) -> usize {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.clause_count(),
            UnifiedSatSolver::Varisat(solver) => solver.clause_count(),
        }
    }

    pub fn backend(&self) -> SolverBackend {
        match self {
            UnifiedSatSolver::Cadical(_) => SolverBackend::Cadical,
            UnifiedSatSolver::Varisat(_) => SolverBackend::Varisat,
        }
    }
}

impl Default for UnifiedSatSolver {
    fn default() -> Self {
        UnifiedSatSolver::Cadical(SatSolver::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Formula;
    use crate::sat::cnf::lower;

    const BACKENDS: [SolverBackend; 2] = [SolverBackend::Cadical, SolverBackend::Varisat];

    fn x(i: usize) -> Formula {
        Formula::var(i)
    }

    fn loaded(backend: SolverBackend, formula: &Formula, primary: usize) -> (UnifiedSatSolver, Projection) {
        let cnf = lower(formula, primary).unwrap();
        let mut solver = UnifiedSatSolver::new(backend);
        solver.load(&cnf).unwrap();
        (solver, Projection::of(&cnf))
    }

    #[test]
    fn test_backend_selection() {
        for backend in BACKENDS {
            let solver = UnifiedSatSolver::new(backend);
            assert_eq!(solver.backend(), backend);
            assert_eq!(solver.variable_count(), 0);
            assert_eq!(solver.clause_count(), 0);
        }
    }

    #[test]
    fn test_count_exact() {
        // x0 | x1 over two variables has three models
        for backend in BACKENDS {
            let (mut solver, projection) = loaded(backend, &x(0).or(&x(1)), 2);
            assert_eq!(solver.count_models(&projection, 100).unwrap(), ModelCount::Exact(3));
        }
    }

    #[test]
    fn test_count_ignores_gate_variables() {
        // (x0 & x1) | (!x0 & !x1) needs gates but has exactly two raw models
        for backend in BACKENDS {
            let (mut solver, projection) = loaded(backend, &x(0).iff(&x(1)), 2);
            assert!(solver.variable_count() > 2);
            assert_eq!(solver.count_models(&projection, 100).unwrap(), ModelCount::Exact(2));
        }
    }

    #[test]
    fn test_free_variables_double_the_count() {
        for backend in BACKENDS {
            let (mut solver, projection) = loaded(backend, &x(0).not(), 4);
            assert_eq!(projection.free_variables(), 3);
            assert_eq!(solver.count_models(&projection, 100).unwrap(), ModelCount::Exact(8));
        }
    }

    #[test]
    fn test_count_limit() {
        for backend in BACKENDS {
            let formula = x(0).or(&x(1)).or(&x(2));
            let (mut solver, projection) = loaded(backend, &formula, 3);
            let count = solver.count_models(&projection, 4).unwrap();
            assert_eq!(count, ModelCount::AtLeast(4));
            assert!(!count.is_exact());
        }
    }

    #[test]
    fn test_limit_equal_to_count_is_exact() {
        for backend in BACKENDS {
            let (mut solver, projection) = loaded(backend, &x(0).or(&x(1)), 2);
            assert_eq!(solver.count_models(&projection, 3).unwrap(), ModelCount::Exact(3));
        }
    }

    #[test]
    fn test_unsatisfiable_counts_zero() {
        for backend in BACKENDS {
            let formula = x(0).and(&x(0).not());
            let (mut solver, projection) = loaded(backend, &formula, 1);
            assert_eq!(solver.count_models(&projection, 10).unwrap(), ModelCount::Exact(0));

            let (mut solver, projection) = loaded(backend, &Formula::bottom(), 1);
            assert!(solver.find_model(&projection).unwrap().is_none());
        }
    }

    #[test]
    fn test_find_model_bits() {
        for backend in BACKENDS {
            let formula = x(0).and(&x(1).not()).and(&x(2));
            let (mut solver, projection) = loaded(backend, &formula, 3);
            assert_eq!(solver.find_model(&projection).unwrap(), Some(vec![true, false, true]));
        }
    }

    #[test]
    fn test_solve_multiple_distinct() {
        for backend in BACKENDS {
            let (mut solver, projection) = loaded(backend, &x(0).or(&x(1)), 2);
            let models = solver.solve_multiple(&projection, 10).unwrap();
            assert_eq!(models.len(), 3);
            for (i, a) in models.iter().enumerate() {
                assert!(a[0] || a[1]);
                for b in &models[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_tautology_counts_every_assignment() {
        for backend in BACKENDS {
            let (mut solver, projection) = loaded(backend, &Formula::top(), 3);
            assert_eq!(solver.count_models(&projection, 10).unwrap(), ModelCount::Exact(8));
        }
    }

    #[test]
    fn test_count_display() {
        assert_eq!(ModelCount::Exact(4).to_string(), "4");
        assert_eq!(ModelCount::AtLeast(1000).to_string(), "at least 1000");
    }
}
