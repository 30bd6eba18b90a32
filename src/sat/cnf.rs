//! Tseitin lowering of formulas into clauses for the SAT backends

use crate::error::{PuzzleError, PuzzleResult};
use crate::formula::{Formula, Node};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

/// A disjunction of DIMACS literals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub literals: Vec<i32>, // Positive for variable, negative for negation
}

impl Clause {
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    pub fn unit(literal: i32) -> Self {
        Self { literals: vec![literal] }
    }

    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self { literals: vec![lit1, lit2] }
    }

    /// An empty clause can never be satisfied
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_satisfied_by(&self, value_of: impl Fn(i32) -> bool) -> bool {
        self.literals
            .iter()
            .any(|&literal| value_of(literal.abs()) == (literal > 0))
    }
}

/// Clause form of one formula.
///
/// Raw variable `i` is DIMACS variable `i + 1`; the gate variables introduced
/// by the lowering come after all raw variables.
#[derive(Debug, Clone)]
pub struct Cnf {
    clauses: Vec<Clause>,
    primary_variables: usize,
    variable_count: usize,
    mentioned: BTreeSet<usize>,
}

impl Cnf {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// Number of raw variables the formula was lowered against
    pub fn primary_variables(&self) -> usize {
        self.primary_variables
    }

    /// Raw plus gate variables
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Raw variables that occur in the formula
    pub fn mentioned(&self) -> &BTreeSet<usize> {
        &self.mentioned
    }

    /// DIMACS literal of raw variable `index`
    pub fn literal_of(index: usize) -> PuzzleResult<i32> {
        i32::try_from(index + 1)
            .map_err(|_| PuzzleError::domain(format!("variable {} does not fit a DIMACS literal", index)))
    }

    /// Render in DIMACS CNF format
    pub fn to_dimacs(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "c raw variables: {}", self.primary_variables);
        let _ = writeln!(out, "p cnf {} {}", self.variable_count, self.clauses.len());
        for clause in &self.clauses {
            for literal in &clause.literals {
                let _ = write!(out, "{} ", literal);
            }
            let _ = writeln!(out, "0");
        }
        out
    }
}

/// Lower `formula` over `primary_variables` raw variables into an
/// equisatisfiable clause set whose models agree on the raw variables
pub fn lower(formula: &Formula, primary_variables: usize) -> PuzzleResult<Cnf> {
    let mut lowering = Lowering::new(primary_variables)?;
    lowering.assert(formula)?;

    Ok(Cnf {
        clauses: lowering.clauses,
        primary_variables,
        variable_count: lowering.next_variable as usize - 1,
        mentioned: formula.variables(),
    })
}

struct Lowering {
    primary_variables: usize,
    next_variable: i32,
    // node_id -> gate literal
    gates: HashMap<usize, i32>,
    true_literal: Option<i32>,
    clauses: Vec<Clause>,
}

impl Lowering {
    fn new(primary_variables: usize) -> PuzzleResult<Self> {
        Ok(Self {
            primary_variables,
            next_variable: Cnf::literal_of(primary_variables)?,
            gates: HashMap::new(),
            true_literal: None,
            clauses: Vec::new(),
        })
    }

    fn fresh(&mut self) -> PuzzleResult<i32> {
        let variable = self.next_variable;
        self.next_variable = variable
            .checked_add(1)
            .ok_or_else(|| PuzzleError::domain("ran out of DIMACS variables"))?;
        Ok(variable)
    }

    /// A variable forced to TRUE, allocated on first use
    fn constant(&mut self, value: bool) -> PuzzleResult<i32> {
        let literal = match self.true_literal {
            Some(literal) => literal,
            None => {
                let literal = self.fresh()?;
                self.clauses.push(Clause::unit(literal));
                self.true_literal = Some(literal);
                literal
            }
        };
        Ok(if value { literal } else { -literal })
    }

    /// Top-level conjuncts become clauses of their own instead of gates
    fn assert(&mut self, formula: &Formula) -> PuzzleResult<()> {
        match formula.node() {
            Node::Const(true) => Ok(()),
            Node::And(items) => items.iter().try_for_each(|item| self.assert(item)),
            Node::Or(items) => {
                let literals = items
                    .iter()
                    .map(|item| self.literal(item))
                    .collect::<PuzzleResult<Vec<_>>>()?;
                self.clauses.push(Clause::new(literals));
                Ok(())
            }
            _ => {
                let literal = self.literal(formula)?;
                self.clauses.push(Clause::unit(literal));
                Ok(())
            }
        }
    }

    fn literal(&mut self, formula: &Formula) -> PuzzleResult<i32> {
        match formula.node() {
            Node::Const(value) => self.constant(*value),
            Node::Var(index) => {
                if *index >= self.primary_variables {
                    return Err(PuzzleError::domain(format!(
                        "variable {} out of bounds (variables: {})",
                        index, self.primary_variables
                    )));
                }
                Cnf::literal_of(*index)
            }
            Node::Not(inner) => Ok(-self.literal(inner)?),
            Node::And(items) | Node::Or(items) => {
                if let Some(&gate) = self.gates.get(&formula.node_id()) {
                    return Ok(gate);
                }
                let children = items
                    .iter()
                    .map(|item| self.literal(item))
                    .collect::<PuzzleResult<Vec<_>>>()?;
                let gate = self.fresh()?;

                if matches!(formula.node(), Node::And(_)) {
                    // gate -> child, (all children) -> gate
                    let mut closing = vec![gate];
                    for &child in &children {
                        self.clauses.push(Clause::binary(-gate, child));
                        closing.push(-child);
                    }
                    self.clauses.push(Clause::new(closing));
                } else {
                    // child -> gate, gate -> (some child)
                    let mut opening = vec![-gate];
                    for &child in &children {
                        self.clauses.push(Clause::binary(gate, -child));
                        opening.push(child);
                    }
                    self.clauses.push(Clause::new(opening));
                }

                self.gates.insert(formula.node_id(), gate);
                Ok(gate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(i: usize) -> Formula {
        Formula::var(i)
    }

    /// Whether some assignment of the gate variables extends `primary` to a model
    fn extends_to_model(cnf: &Cnf, primary: &[bool]) -> bool {
        let gates = cnf.variable_count() - cnf.primary_variables();
        assert!(gates <= 16, "too many gate variables to enumerate");
        (0..1u32 << gates).any(|mask| {
            cnf.clauses().iter().all(|clause| {
                clause.is_satisfied_by(|variable| {
                    let index = variable as usize - 1;
                    if index < primary.len() {
                        primary[index]
                    } else {
                        mask >> (index - primary.len()) & 1 == 1
                    }
                })
            })
        })
    }

    fn assert_equisatisfiable(formula: &Formula, primary_variables: usize) {
        let cnf = lower(formula, primary_variables).unwrap();
        for mask in 0..1u32 << primary_variables {
            let primary: Vec<bool> = (0..primary_variables).map(|i| mask >> i & 1 == 1).collect();
            assert_eq!(
                extends_to_model(&cnf, &primary),
                formula.evaluate(&primary),
                "mismatch for {} under {:?}",
                formula,
                primary
            );
        }
    }

    #[test]
    fn test_lowering_preserves_models() {
        let formulas = [
            x(0).and(&x(1).not()),
            x(0).or(&x(1)).and(&x(2).or(&x(0).not())),
            x(0).iff(&x(1)).not().or(&x(2).iff(&x(3)).not()),
            x(0).and(&x(1)).or(&x(2).and(&x(3))).not(),
        ];
        for formula in &formulas {
            assert_equisatisfiable(formula, 4);
        }
    }

    #[test]
    fn test_constants() {
        let cnf = lower(&Formula::top(), 2).unwrap();
        assert_eq!(cnf.clause_count(), 0);
        assert!(extends_to_model(&cnf, &[false, true]));

        let cnf = lower(&Formula::bottom(), 2).unwrap();
        assert!(!extends_to_model(&cnf, &[false, false]));
        assert!(!extends_to_model(&cnf, &[true, true]));
    }

    #[test]
    fn test_top_level_conjunction_needs_no_gates() {
        let formula = x(0).or(&x(1)).and(&x(2).not());
        let cnf = lower(&formula, 3).unwrap();
        assert_eq!(cnf.variable_count(), 3);
        assert_eq!(cnf.clauses(), &[Clause::unit(-3), Clause::new(vec![1, 2])]);
    }

    #[test]
    fn test_shared_subformulas_get_one_gate() {
        let shared = x(0).and(&x(1));
        let formula = shared.or(&x(2)).and(&shared.or(&x(3)));
        let cnf = lower(&formula, 4).unwrap();
        // one gate for the shared conjunction
        assert_eq!(cnf.variable_count(), 5);
    }

    #[test]
    fn test_out_of_range_variable() {
        assert!(matches!(lower(&x(5), 3), Err(PuzzleError::Domain(_))));
    }

    #[test]
    fn test_mentioned_variables() {
        let cnf = lower(&x(0).and(&x(3)), 6).unwrap();
        assert_eq!(cnf.mentioned().iter().copied().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_dimacs_output() {
        let cnf = lower(&x(0).or(&x(1).not()), 2).unwrap();
        let dimacs = cnf.to_dimacs();
        assert!(dimacs.contains("p cnf 2 1"));
        assert!(dimacs.lines().any(|line| line == "1 -2 0" || line == "-2 1 0"));
    }
}
