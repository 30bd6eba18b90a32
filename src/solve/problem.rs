//! Puzzle problem driver: compile, lower, solve, decode

use super::{Solution, SolutionValidator};
use crate::config::Settings;
use crate::formula::{Formula, FormulaAccumulator};
use crate::puzzle::Topology;
use crate::sat::cnf::{self, Cnf};
use crate::sat::constraints::{CompileStatistics, ConstraintCompiler};
use crate::sat::encoder::AttributeEncoder;
use crate::sat::solver::SolverStatistics;
use crate::sat::solver_factory::{ModelCount, Projection, UnifiedSatSolver};
use crate::sat::variables::VariableBank;
use anyhow::{Context, Result};
use std::time::{Duration, Instant};

/// A compiled puzzle, ready to be handed to a SAT backend
pub struct PuzzleProblem {
    settings: Settings,
    topology: Topology,
    encoder: AttributeEncoder,
    formula: Formula,
    statistics: CompileStatistics,
    compile_time: Duration,
}

/// Everything one solver run produced
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub count: ModelCount,
    pub solutions: Vec<Solution>,
    /// Decoded models that failed decoding or validation; nonzero only without the upper bound
    pub rejected: usize,
    pub solver_statistics: SolverStatistics,
    pub compile_time: Duration,
    pub solve_time: Duration,
}

impl SolveReport {
    pub fn is_satisfiable(&self) -> bool {
        self.count.value() > 0
    }
}

impl PuzzleProblem {
    /// Validate the settings and compile every constraint into the global formula
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate().context("Invalid puzzle settings")?;
        let start_time = Instant::now();

        let bank = VariableBank::new(&settings.puzzle);
        let encoder = AttributeEncoder::new(bank).context("Failed to encode attributes")?;
        let topology = Topology::new(settings.puzzle.grid, settings.topology);

        let mut accumulator = FormulaAccumulator::new();
        let statistics = ConstraintCompiler::new(&encoder, &topology)?
            .with_parallel_uniqueness(settings.solver.parallel_uniqueness)
            .compile(&settings.constraints, &mut accumulator)
            .context("Failed to compile constraints")?;

        Ok(Self {
            formula: accumulator.into_result(),
            compile_time: start_time.elapsed(),
            settings,
            topology,
            encoder,
            statistics,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn encoder(&self) -> &AttributeEncoder {
        &self.encoder
    }

    /// The global conjunction of every compiled constraint
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn compile_statistics(&self) -> &CompileStatistics {
        &self.statistics
    }

    pub fn compile_time(&self) -> Duration {
        self.compile_time
    }

    /// Tseitin-lower the global formula
    pub fn lower(&self) -> Result<Cnf> {
        cnf::lower(&self.formula, self.encoder.bank().variable_count()).context("Failed to lower formula to CNF")
    }

    pub fn validator(&self) -> SolutionValidator {
        SolutionValidator::new(
            self.topology,
            self.settings.constraints.clone(),
            self.settings.puzzle.values_per_category,
        )
    }

    /// Count models and decode up to `max_solutions` of them
    pub fn solve(&self) -> Result<SolveReport> {
        let start_time = Instant::now();
        let solver_config = &self.settings.solver;

        let cnf = self.lower()?;
        println!(
            "Lowered to CNF: {} variables ({} raw), {} clauses",
            cnf.variable_count(),
            cnf.primary_variables(),
            cnf.clause_count()
        );

        let mut solver = UnifiedSatSolver::new(solver_config.backend);
        solver.load(&cnf).context("Failed to load clauses into the solver")?;

        println!("Solving with {:?} (count limit {})...", solver_config.backend, solver_config.count_limit);
        let projection = Projection::of(&cnf);
        let enumeration = solver
            .enumerate(&projection, solver_config.count_limit)
            .context("SAT solving failed")?;
        let count = enumeration.count();
        let solve_time = start_time.elapsed();

        if enumeration.models.is_empty() {
            println!("No solutions found!");
        } else {
            println!("Model count: {} ({:.3}s)", count, solve_time.as_secs_f64());
        }

        let validator = self.validator();
        let mut solutions = Vec::new();
        let mut rejected = 0;
        for (i, bits) in enumeration.models.iter().take(solver_config.max_solutions).enumerate() {
            // without the upper bound a model may use codes that name no value
            let solution = match Solution::decode(&self.encoder, bits, solve_time) {
                Ok(solution) => solution,
                Err(e) => {
                    rejected += 1;
                    eprintln!("Solution {} cannot be decoded: {}", i + 1, e);
                    continue;
                }
            };

            let result = validator.validate(&solution);
            if result.is_valid {
                solutions.push(solution);
            } else {
                rejected += 1;
                eprintln!("Solution {} failed validation:\n{}", i + 1, result);
            }
        }

        Ok(SolveReport {
            count,
            solutions,
            rejected,
            solver_statistics: solver.statistics(),
            compile_time: self.compile_time,
            solve_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverBackend;
    use crate::puzzle::{Category, Color, Dimensions, GridShape, Nation, TopologyConfig, Value};
    use crate::sat::constraints::{ConstraintSet, FixedAssignment, NeighborPair};

    /// Two objects side by side, one category with two values
    fn two_object_settings(fixed: Vec<FixedAssignment>) -> Settings {
        let mut settings = Settings::default();
        settings.puzzle = Dimensions::new(GridShape::new(2, 1), 2, vec![Category::Color]).unwrap();
        settings.topology = TopologyConfig::default();
        settings.constraints = ConstraintSet {
            fixed,
            ..ConstraintSet::default()
        };
        settings.solver.max_solutions = 5;
        settings.solver.count_limit = 100;
        settings
    }

    fn fixed(object: usize, value: impl Into<Value>) -> FixedAssignment {
        FixedAssignment {
            object,
            value: value.into(),
        }
    }

    #[test]
    fn test_single_solution_end_to_end() {
        for backend in [SolverBackend::Cadical, SolverBackend::Varisat] {
            let mut settings = two_object_settings(vec![fixed(0, Color::Red)]);
            settings.solver.backend = backend;

            let problem = PuzzleProblem::new(settings).unwrap();
            let report = problem.solve().unwrap();

            assert_eq!(report.count, ModelCount::Exact(1));
            assert_eq!(report.solutions.len(), 1);
            assert_eq!(report.rejected, 0);

            let solution = &report.solutions[0];
            assert_eq!(solution.value_of(0, Category::Color), Some(Color::Red.into()));
            assert_eq!(solution.value_of(1, Category::Color), Some(Color::Green.into()));
        }
    }

    #[test]
    fn test_contradiction_counts_zero() {
        let settings = two_object_settings(vec![fixed(0, Color::Red), fixed(1, Color::Red)]);
        let problem = PuzzleProblem::new(settings).unwrap();
        let report = problem.solve().unwrap();

        assert_eq!(report.count, ModelCount::Exact(0));
        assert!(report.solutions.is_empty());
        assert!(!report.is_satisfiable());
    }

    #[test]
    fn test_without_fixed_both_orders_count() {
        let settings = two_object_settings(Vec::new());
        let report = PuzzleProblem::new(settings).unwrap().solve().unwrap();
        assert_eq!(report.count, ModelCount::Exact(2));
        assert_eq!(report.solutions.len(), 2);
    }

    #[test]
    fn test_without_upper_bound_unused_codes_count() {
        let mut settings = two_object_settings(vec![fixed(0, Color::Red)]);
        settings.constraints.upper_bound = false;
        let report = PuzzleProblem::new(settings).unwrap().solve().unwrap();
        // object 1 may take any of the 15 codes other than RED
        assert_eq!(report.count, ModelCount::Exact(15));
    }

    #[test]
    fn test_all_models_rejected_without_upper_bound() {
        // one value in play: every model gives some object a code past RED
        let mut settings = two_object_settings(Vec::new());
        settings.puzzle = Dimensions::new(GridShape::new(2, 1), 1, vec![Category::Color]).unwrap();
        settings.constraints.upper_bound = false;
        settings.solver.max_solutions = 3;
        settings.solver.count_limit = 300;

        let report = PuzzleProblem::new(settings).unwrap().solve().unwrap();
        assert_eq!(report.count, ModelCount::Exact(240));
        assert!(report.is_satisfiable());
        assert!(report.solutions.is_empty());
        assert_eq!(report.rejected, 3);
    }

    #[test]
    fn test_compile_statistics_for_small_puzzle() {
        let settings = two_object_settings(vec![fixed(0, Color::Red)]);
        let problem = PuzzleProblem::new(settings).unwrap();
        let stats = problem.compile_statistics();
        assert_eq!(stats.fixed, 1);
        assert_eq!(stats.uniqueness, 1);
        // codes 2..16 for each of the two objects
        assert_eq!(stats.upper_bound, 28);
    }

    #[test]
    fn test_global_formula_accepts_decoded_solution() {
        let settings = two_object_settings(vec![fixed(0, Color::Red)]);
        let problem = PuzzleProblem::new(settings).unwrap();
        let report = problem.solve().unwrap();
        let bits = report.solutions[0].to_bits(problem.encoder()).unwrap();
        assert!(problem.formula().evaluate(&bits));
    }

    #[test]
    fn test_neighbor_puzzle_on_row() {
        // RED is fixed on object 0; object 1's right neighbor is object 0
        let mut settings = Settings::default();
        settings.puzzle = Dimensions::new(GridShape::new(3, 1), 3, vec![Category::Color, Category::Nation]).unwrap();
        settings.constraints = ConstraintSet {
            fixed: vec![fixed(0, Color::Red), fixed(2, Nation::Brazilian)],
            right_neighbors: vec![NeighborPair {
                first: Nation::Tatarin.into(),
                second: Color::Red.into(),
            }],
            ..ConstraintSet::default()
        };
        settings.solver.max_solutions = 10;
        settings.solver.count_limit = 100;

        let report = PuzzleProblem::new(settings).unwrap().solve().unwrap();
        // Tatarin on object 1, Argentinian on object 0; colors of 1 and 2 swap freely
        assert_eq!(report.count, ModelCount::Exact(2));
        for solution in &report.solutions {
            assert_eq!(solution.value_of(1, Category::Nation), Some(Nation::Tatarin.into()));
            assert_eq!(solution.value_of(0, Category::Nation), Some(Nation::Argentinian.into()));
        }
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = two_object_settings(vec![fixed(0, Color::Blue)]);
        settings.solver.max_solutions = 1;
        assert!(PuzzleProblem::new(settings).is_err());
    }
}
