//! Constraint kinds and their translation into formulas

use super::encoder::AttributeEncoder;
use crate::error::{PuzzleError, PuzzleResult};
use crate::formula::{Formula, FormulaAccumulator};
use crate::puzzle::{Category, Dimensions, Direction, Topology, Value, CODE_SPACE};
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// "object holds value"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedAssignment {
    pub object: usize,
    pub value: Value,
}

/// "some single object holds all of these values"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoOccurrence(pub Vec<Value>);

/// "an object holding `first` is adjacent to an object holding `second`"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborPair {
    pub first: Value,
    pub second: Value,
}

/// Constraint kinds, in the order they are compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Fixed,
    CoOccurrence,
    Neighbor,
    DirectionalNeighbor,
    Uniqueness,
    UpperBound,
}

fn enabled() -> bool {
    true
}

/// Everything the puzzle asserts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSet {
    #[serde(default)]
    pub fixed: Vec<FixedAssignment>,
    #[serde(default)]
    pub co_occurrence: Vec<CoOccurrence>,
    /// Adjacent in either configured direction
    #[serde(default)]
    pub neighbors: Vec<NeighborPair>,
    /// `second` sits at the left neighbor of `first`
    #[serde(default)]
    pub left_neighbors: Vec<NeighborPair>,
    /// `second` sits at the right neighbor of `first`
    #[serde(default)]
    pub right_neighbors: Vec<NeighborPair>,
    /// No two objects share a value within a category
    #[serde(default = "enabled")]
    pub uniqueness: bool,
    /// Exclude the 4-bit codes beyond the value range
    #[serde(default = "enabled")]
    pub upper_bound: bool,
}

impl Default for ConstraintSet {
    fn default() -> Self {
        Self {
            fixed: Vec::new(),
            co_occurrence: Vec::new(),
            neighbors: Vec::new(),
            left_neighbors: Vec::new(),
            right_neighbors: Vec::new(),
            uniqueness: true,
            upper_bound: true,
        }
    }
}

impl ConstraintSet {
    /// Reject inconsistent constraint data before any formula is built
    pub fn validate(&self, dimensions: &Dimensions) -> PuzzleResult<()> {
        for fixed in &self.fixed {
            dimensions.check_object(fixed.object)?;
            dimensions.check_value(fixed.value)?;
        }

        for (i, group) in self.co_occurrence.iter().enumerate() {
            check_distinct_categories(&group.0)
                .map_err(|e| PuzzleError::configuration(format!("co_occurrence #{}: {}", i + 1, e)))?;
            for value in &group.0 {
                dimensions.check_value(*value)?;
            }
        }

        let pairs = self
            .neighbors
            .iter()
            .chain(&self.left_neighbors)
            .chain(&self.right_neighbors);
        for pair in pairs {
            dimensions.check_value(pair.first)?;
            dimensions.check_value(pair.second)?;
        }

        Ok(())
    }

    /// Kinds this set emits at least one formula for, in compile order
    pub fn kinds(&self) -> Vec<ConstraintKind> {
        let mut kinds = Vec::new();
        if !self.fixed.is_empty() {
            kinds.push(ConstraintKind::Fixed);
        }
        if !self.co_occurrence.is_empty() {
            kinds.push(ConstraintKind::CoOccurrence);
        }
        if !self.neighbors.is_empty() {
            kinds.push(ConstraintKind::Neighbor);
        }
        if !self.left_neighbors.is_empty() || !self.right_neighbors.is_empty() {
            kinds.push(ConstraintKind::DirectionalNeighbor);
        }
        if self.uniqueness {
            kinds.push(ConstraintKind::Uniqueness);
        }
        if self.upper_bound {
            kinds.push(ConstraintKind::UpperBound);
        }
        kinds
    }

    /// Number of sequentially compiled occurrences (before uniqueness and upper bound)
    pub fn occurrence_count(&self) -> usize {
        self.fixed.len()
            + self.co_occurrence.len()
            + self.neighbors.len()
            + self.left_neighbors.len()
            + self.right_neighbors.len()
    }
}

fn check_distinct_categories(values: &[Value]) -> Result<(), String> {
    if values.is_empty() {
        return Err("needs at least one value".to_string());
    }
    if let Some(category) = values.iter().map(|value| value.category()).duplicates().next() {
        return Err(format!(
            "category {} appears more than once in {}",
            category,
            values.iter().join(", ")
        ));
    }
    Ok(())
}

/// One pairwise all-different task: `first < second` within `category`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniquenessTask {
    pub category: Category,
    pub first: usize,
    pub second: usize,
}

/// "at least one bit differs": OR over bit positions of NOT(a <=> b)
pub fn not_equal(a: &[Formula], b: &[Formula]) -> PuzzleResult<Formula> {
    if a.len() != b.len() {
        return Err(PuzzleError::domain(format!(
            "cannot compare bundles of {} and {} bits",
            a.len(),
            b.len()
        )));
    }
    Ok(Formula::any(a.iter().zip(b).map(|(x, y)| x.iff(y).not())))
}

/// Translates constraints into formulas using the attribute encoding and the
/// grid topology
pub struct ConstraintCompiler<'a> {
    encoder: &'a AttributeEncoder,
    topology: &'a Topology,
    parallel_uniqueness: bool,
}

impl<'a> ConstraintCompiler<'a> {
    pub fn new(encoder: &'a AttributeEncoder, topology: &'a Topology) -> PuzzleResult<Self> {
        if encoder.dimensions().grid != topology.shape() {
            return Err(PuzzleError::configuration(format!(
                "topology grid {:?} does not match puzzle grid {:?}",
                topology.shape(),
                encoder.dimensions().grid
            )));
        }
        Ok(Self {
            encoder,
            topology,
            parallel_uniqueness: true,
        })
    }

    /// Run the uniqueness tasks on the rayon pool (default) or one by one
    pub fn with_parallel_uniqueness(mut self, parallel: bool) -> Self {
        self.parallel_uniqueness = parallel;
        self
    }

    fn dimensions(&self) -> &Dimensions {
        self.encoder.dimensions()
    }

    fn objects(&self) -> std::ops::Range<usize> {
        0..self.dimensions().object_count()
    }

    pub fn fixed_assignment(&self, object: usize, value: Value) -> PuzzleResult<Formula> {
        Ok(self.encoder.attribute(object, value)?.clone())
    }

    pub fn co_occurrence(&self, values: &[Value]) -> PuzzleResult<Formula> {
        check_distinct_categories(values).map_err(PuzzleError::configuration)?;

        let per_object = self
            .objects()
            .map(|object| {
                let holds_all = values
                    .iter()
                    .map(|&value| self.encoder.attribute(object, value).cloned())
                    .collect::<PuzzleResult<Vec<_>>>()?;
                Ok(Formula::all(holds_all))
            })
            .collect::<PuzzleResult<Vec<_>>>()?;

        Ok(Formula::any(per_object))
    }

    pub fn neighbor_relation(&self, first: Value, second: Value) -> PuzzleResult<Formula> {
        let mut alternatives = Vec::new();
        for object in self.objects() {
            for neighbor in self.topology.neighbors(object) {
                alternatives.push(self.adjacent_pair(object, neighbor, first, second)?);
            }
        }
        Ok(Formula::any(alternatives))
    }

    pub fn directional_neighbor(&self, direction: Direction, first: Value, second: Value) -> PuzzleResult<Formula> {
        let mut alternatives = Vec::new();
        for object in self.objects() {
            if let Some(neighbor) = self.topology.neighbor(object, direction) {
                alternatives.push(self.adjacent_pair(object, neighbor, first, second)?);
            }
        }
        Ok(Formula::any(alternatives))
    }

    fn adjacent_pair(&self, object: usize, neighbor: usize, first: Value, second: Value) -> PuzzleResult<Formula> {
        let here = self.encoder.attribute(object, first)?;
        let there = self.encoder.attribute(neighbor, second)?;
        Ok(here.and(there))
    }

    /// Every (category, object pair) the all-different constraint covers
    pub fn uniqueness_tasks(&self) -> Vec<UniquenessTask> {
        let objects = self.dimensions().object_count();
        self.dimensions()
            .categories
            .iter()
            .flat_map(|&category| {
                (0..objects)
                    .tuple_combinations()
                    .map(move |(first, second)| UniquenessTask { category, first, second })
            })
            .collect()
    }

    pub fn uniqueness(&self, task: UniquenessTask) -> PuzzleResult<Formula> {
        let a = self.encoder.category_variables(task.first, task.category)?;
        let b = self.encoder.category_variables(task.second, task.category)?;
        not_equal(a, b)
    }

    /// Fan the uniqueness tasks out and fold each result through the lock
    pub fn compile_uniqueness(&self, accumulator: &FormulaAccumulator) -> PuzzleResult<usize> {
        let tasks = self.uniqueness_tasks();
        let emit = |task: &UniquenessTask| -> PuzzleResult<()> {
            let formula = self.uniqueness(*task)?;
            accumulator.append_synchronized(&formula);
            Ok(())
        };

        if self.parallel_uniqueness {
            tasks.par_iter().try_for_each(emit)?;
        } else {
            tasks.iter().try_for_each(emit)?;
        }
        Ok(tasks.len())
    }

    /// NOT(code) for every object, category and code in `values..16`
    pub fn upper_bound(&self) -> PuzzleResult<Vec<Formula>> {
        let dimensions = self.dimensions();
        let first_unused = dimensions.values_per_category as u8;
        let mut formulas = Vec::new();

        for object in self.objects() {
            for &category in &dimensions.categories {
                let vars = self.encoder.category_variables(object, category)?;
                for code in first_unused..CODE_SPACE {
                    formulas.push(self.encoder.encode_any_code(code, vars)?.not());
                }
            }
        }
        Ok(formulas)
    }

    /// Compile the whole constraint set into `accumulator`
    pub fn compile(&self, constraints: &ConstraintSet, accumulator: &mut FormulaAccumulator) -> PuzzleResult<CompileStatistics> {
        constraints.validate(self.dimensions())?;
        let mut stats = CompileStatistics::default();

        for fixed in &constraints.fixed {
            accumulator.append(&self.fixed_assignment(fixed.object, fixed.value)?);
            stats.record(ConstraintKind::Fixed, 1);
        }

        for group in &constraints.co_occurrence {
            accumulator.append(&self.co_occurrence(&group.0)?);
            stats.record(ConstraintKind::CoOccurrence, 1);
        }

        for pair in &constraints.neighbors {
            accumulator.append(&self.neighbor_relation(pair.first, pair.second)?);
            stats.record(ConstraintKind::Neighbor, 1);
        }

        let directional = constraints
            .left_neighbors
            .iter()
            .map(|pair| (Direction::Left, pair))
            .chain(constraints.right_neighbors.iter().map(|pair| (Direction::Right, pair)));
        for (direction, pair) in directional {
            accumulator.append(&self.directional_neighbor(direction, pair.first, pair.second)?);
            stats.record(ConstraintKind::DirectionalNeighbor, 1);
        }

        if constraints.uniqueness {
            let count = self.compile_uniqueness(accumulator)?;
            stats.record(ConstraintKind::Uniqueness, count);
        }

        if constraints.upper_bound {
            let formulas = self.upper_bound()?;
            accumulator.append_all(&formulas);
            stats.record(ConstraintKind::UpperBound, formulas.len());
        }

        Ok(stats)
    }
}

/// How many formulas each constraint kind contributed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileStatistics {
    pub fixed: usize,
    pub co_occurrence: usize,
    pub neighbor: usize,
    pub directional_neighbor: usize,
    pub uniqueness: usize,
    pub upper_bound: usize,
}

impl CompileStatistics {
    fn record(&mut self, kind: ConstraintKind, count: usize) {
        let slot = match kind {
            ConstraintKind::Fixed => &mut self.fixed,
            ConstraintKind::CoOccurrence => &mut self.co_occurrence,
            ConstraintKind::Neighbor => &mut self.neighbor,
            ConstraintKind::DirectionalNeighbor => &mut self.directional_neighbor,
            ConstraintKind::Uniqueness => &mut self.uniqueness,
            ConstraintKind::UpperBound => &mut self.upper_bound,
        };
        *slot += count;
    }

    pub fn total(&self) -> usize {
        self.fixed
            + self.co_occurrence
            + self.neighbor
            + self.directional_neighbor
            + self.uniqueness
            + self.upper_bound
    }
}

impl std::fmt::Display for CompileStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Constraint Statistics:")?;
        writeln!(f, "  Fixed assignments: {}", self.fixed)?;
        writeln!(f, "  Co-occurrences: {}", self.co_occurrence)?;
        writeln!(f, "  Neighbor relations: {}", self.neighbor)?;
        writeln!(f, "  Directional neighbors: {}", self.directional_neighbor)?;
        writeln!(f, "  Uniqueness pairs: {}", self.uniqueness)?;
        writeln!(f, "  Upper bound exclusions: {}", self.upper_bound)?;
        writeln!(f, "  Total formulas: {}", self.total())?;
        Ok(())
    }
}
