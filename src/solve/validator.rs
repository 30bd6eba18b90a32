//! Re-checks decoded solutions against the constraint set, independently of
//! the formula that produced them

use super::solution::Solution;
use crate::puzzle::{Direction, Topology, Value};
use crate::sat::constraints::{ConstraintKind, ConstraintSet, NeighborPair};
use itertools::Itertools;
use std::fmt;

pub struct SolutionValidator {
    topology: Topology,
    constraints: ConstraintSet,
    values_per_category: usize,
}

/// Result of solution validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub violations: Vec<Violation>,
    pub constraints_checked: usize,
}

/// One constraint the solution does not satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ConstraintKind,
    pub description: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.description)
    }
}

impl SolutionValidator {
    pub fn new(topology: Topology, constraints: ConstraintSet, values_per_category: usize) -> Self {
        Self {
            topology,
            constraints,
            values_per_category,
        }
    }

    pub fn validate(&self, solution: &Solution) -> ValidationResult {
        let mut violations = Vec::new();
        let mut checked = 0;

        if solution.grid != self.topology.shape() {
            violations.push(Violation {
                kind: ConstraintKind::Fixed,
                description: format!(
                    "solution grid {:?} does not match puzzle grid {:?}",
                    solution.grid,
                    self.topology.shape()
                ),
            });
            return ValidationResult {
                is_valid: false,
                violations,
                constraints_checked: 0,
            };
        }

        for fixed in &self.constraints.fixed {
            checked += 1;
            let actual = solution.value_of(fixed.object, fixed.value.category());
            if actual != Some(fixed.value) {
                violations.push(Violation {
                    kind: ConstraintKind::Fixed,
                    description: format!(
                        "object {} should hold {} but holds {}",
                        fixed.object,
                        fixed.value,
                        actual.map_or_else(|| "nothing".to_string(), |value| value.to_string())
                    ),
                });
            }
        }

        for group in &self.constraints.co_occurrence {
            checked += 1;
            let together = solution
                .objects
                .iter()
                .any(|assignment| group.0.iter().all(|&value| assignment.holds(value)));
            if !together {
                violations.push(Violation {
                    kind: ConstraintKind::CoOccurrence,
                    description: format!("no object holds all of {}", group.0.iter().join(", ")),
                });
            }
        }

        for pair in &self.constraints.neighbors {
            checked += 1;
            if !self.adjacent(solution, pair, None) {
                violations.push(Violation {
                    kind: ConstraintKind::Neighbor,
                    description: format!("no holder of {} has a neighbor holding {}", pair.first, pair.second),
                });
            }
        }

        let directional = self
            .constraints
            .left_neighbors
            .iter()
            .map(|pair| (Direction::Left, pair))
            .chain(self.constraints.right_neighbors.iter().map(|pair| (Direction::Right, pair)));
        for (direction, pair) in directional {
            checked += 1;
            if !self.adjacent(solution, pair, Some(direction)) {
                violations.push(Violation {
                    kind: ConstraintKind::DirectionalNeighbor,
                    description: format!(
                        "no holder of {} has a {:?} neighbor holding {}",
                        pair.first, direction, pair.second
                    ),
                });
            }
        }

        if self.constraints.uniqueness {
            for (slot, category) in solution.categories.iter().enumerate() {
                checked += 1;
                let repeated: Vec<Value> = solution
                    .objects
                    .iter()
                    .filter_map(|assignment| assignment.values.get(slot).copied())
                    .duplicates()
                    .collect();
                if !repeated.is_empty() {
                    violations.push(Violation {
                        kind: ConstraintKind::Uniqueness,
                        description: format!(
                            "{} values held by more than one object: {}",
                            category,
                            repeated.iter().join(", ")
                        ),
                    });
                }
            }
        }

        if self.constraints.upper_bound {
            checked += 1;
            for assignment in &solution.objects {
                for value in &assignment.values {
                    if value.code() as usize >= self.values_per_category {
                        violations.push(Violation {
                            kind: ConstraintKind::UpperBound,
                            description: format!(
                                "object {} holds {}, outside the first {} values",
                                assignment.object, value, self.values_per_category
                            ),
                        });
                    }
                }
            }
        }

        ValidationResult {
            is_valid: violations.is_empty(),
            violations,
            constraints_checked: checked,
        }
    }

    fn adjacent(&self, solution: &Solution, pair: &NeighborPair, direction: Option<Direction>) -> bool {
        solution.holders(pair.first).into_iter().any(|object| {
            let neighbors = match direction {
                Some(direction) => self.topology.neighbor(object, direction).into_iter().collect(),
                None => self.topology.neighbors(object),
            };
            neighbors.into_iter().any(|neighbor| {
                solution
                    .object(neighbor)
                    .is_some_and(|assignment| assignment.holds(pair.second))
            })
        })
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation Result:")?;
        writeln!(f, "  Valid: {}", self.is_valid)?;
        writeln!(f, "  Constraints checked: {}", self.constraints_checked)?;
        for violation in &self.violations {
            writeln!(f, "  - {}", violation)?;
        }
        Ok(())
    }
}
