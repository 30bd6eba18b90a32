//! Immutable boolean formulas with shared sub-terms

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// Handle to a boolean formula.
///
/// Cloning is cheap (reference counted) and sub-formulas are shared between
/// every formula built from them. Handles are `Send + Sync`, so formulas can
/// be built from parallel tasks.
///
/// The smart constructors keep formulas in a normal form: constants are
/// folded, nested conjunctions/disjunctions are flattened, and their operands
/// are sorted and de-duplicated. Two conjunctions of the same operands are
/// therefore equal no matter the order they were combined in.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Formula(Arc<Node>);

/// One node of a formula
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Node {
    Const(bool),
    Var(usize),
    Not(Formula),
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

impl Formula {
    fn from_node(node: Node) -> Self {
        Formula(Arc::new(node))
    }

    pub fn constant(value: bool) -> Self {
        Self::from_node(Node::Const(value))
    }

    /// The constant TRUE (identity of AND)
    pub fn top() -> Self {
        Self::constant(true)
    }

    /// The constant FALSE (identity of OR)
    pub fn bottom() -> Self {
        Self::constant(false)
    }

    /// The raw variable with the given index
    pub fn var(index: usize) -> Self {
        Self::from_node(Node::Var(index))
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn is_true(&self) -> bool {
        matches!(self.node(), Node::Const(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self.node(), Node::Const(false))
    }

    /// Stable identity of this handle's node, shared by all its clones
    pub fn node_id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn not(&self) -> Formula {
        match self.node() {
            Node::Const(value) => Formula::constant(!value),
            Node::Not(inner) => inner.clone(),
            _ => Formula::from_node(Node::Not(self.clone())),
        }
    }

    pub fn and(&self, other: &Formula) -> Formula {
        Formula::all([self.clone(), other.clone()])
    }

    pub fn or(&self, other: &Formula) -> Formula {
        Formula::any([self.clone(), other.clone()])
    }

    /// `(a AND b) OR (NOT a AND NOT b)`
    pub fn iff(&self, other: &Formula) -> Formula {
        self.and(other).or(&self.not().and(&other.not()))
    }

    /// Conjunction of all operands; TRUE when there are none
    pub fn all(operands: impl IntoIterator<Item = Formula>) -> Formula {
        Formula::combine(operands, true)
    }

    /// Disjunction of all operands; FALSE when there are none
    pub fn any(operands: impl IntoIterator<Item = Formula>) -> Formula {
        Formula::combine(operands, false)
    }

    fn combine(operands: impl IntoIterator<Item = Formula>, conjunction: bool) -> Formula {
        // FALSE absorbs a conjunction, TRUE absorbs a disjunction
        let absorbing = !conjunction;
        let mut children = Vec::new();

        for operand in operands {
            if let Node::Const(value) = operand.node() {
                if *value == absorbing {
                    return Formula::constant(absorbing);
                }
                continue;
            }

            let nested = match (operand.node(), conjunction) {
                (Node::And(items), true) | (Node::Or(items), false) => Some(items.clone()),
                _ => None,
            };
            match nested {
                Some(items) => children.extend(items),
                None => children.push(operand),
            }
        }

        children.sort();
        children.dedup();

        match children.len() {
            0 => Formula::constant(conjunction),
            1 => children.remove(0),
            _ if conjunction => Formula::from_node(Node::And(children)),
            _ => Formula::from_node(Node::Or(children)),
        }
    }

    /// Evaluate under a full assignment indexed by variable; missing variables read as false
    pub fn evaluate(&self, assignment: &[bool]) -> bool {
        match self.node() {
            Node::Const(value) => *value,
            Node::Var(index) => assignment.get(*index).copied().unwrap_or(false),
            Node::Not(inner) => !inner.evaluate(assignment),
            Node::And(items) => items.iter().all(|item| item.evaluate(assignment)),
            Node::Or(items) => items.iter().any(|item| item.evaluate(assignment)),
        }
    }

    /// Indices of the variables the formula mentions
    pub fn variables(&self) -> BTreeSet<usize> {
        let mut result = BTreeSet::new();
        let mut seen = HashSet::new();
        self.collect_variables(&mut result, &mut seen);
        result
    }

    fn collect_variables(&self, result: &mut BTreeSet<usize>, seen: &mut HashSet<usize>) {
        if !seen.insert(self.node_id()) {
            return;
        }
        match self.node() {
            Node::Const(_) => {}
            Node::Var(index) => {
                result.insert(*index);
            }
            Node::Not(inner) => inner.collect_variables(result, seen),
            Node::And(items) | Node::Or(items) => {
                for item in items {
                    item.collect_variables(result, seen);
                }
            }
        }
    }

    /// Number of distinct nodes, counting shared sub-formulas once
    pub fn node_count(&self) -> usize {
        let mut seen = HashSet::new();
        let mut stack = vec![self];
        while let Some(formula) = stack.pop() {
            if !seen.insert(formula.node_id()) {
                continue;
            }
            match formula.node() {
                Node::Const(_) | Node::Var(_) => {}
                Node::Not(inner) => stack.push(inner),
                Node::And(items) | Node::Or(items) => stack.extend(items.iter()),
            }
        }
        seen.len()
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Const(true) => write!(f, "T"),
            Node::Const(false) => write!(f, "F"),
            Node::Var(index) => write!(f, "x{}", index),
            Node::Not(inner) => write!(f, "!{}", inner),
            Node::And(items) | Node::Or(items) => {
                let separator = if matches!(self.node(), Node::And(_)) { " & " } else { " | " };
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", separator)?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
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

    #[test]
    fn test_constant_folding() {
        assert_eq!(x(0).and(&Formula::top()), x(0));
        assert!(x(0).and(&Formula::bottom()).is_false());
        assert_eq!(x(0).or(&Formula::bottom()), x(0));
        assert!(x(0).or(&Formula::top()).is_true());
        assert!(Formula::all(Vec::new()).is_true());
        assert!(Formula::any(Vec::new()).is_false());
    }

    #[test]
    fn test_double_negation() {
        assert_eq!(x(3).not().not(), x(3));
        assert!(Formula::top().not().is_false());
    }

    #[test]
    fn test_conjunction_is_order_independent() {
        let a = x(0).or(&x(1));
        let b = x(2).not();
        let c = x(3);

        let left = Formula::top().and(&a).and(&b).and(&c);
        let right = Formula::top().and(&c).and(&b).and(&a);
        assert_eq!(left, right);
        assert_eq!(left.to_string(), right.to_string());
    }

    #[test]
    fn test_duplicates_collapse() {
        let a = x(0).and(&x(1));
        assert_eq!(a.and(&a), a);
        assert_eq!(x(4).or(&x(4)), x(4));
    }

    #[test]
    fn test_evaluate() {
        let f = x(0).and(&x(1).not()).or(&x(2));
        assert!(f.evaluate(&[true, false, false]));
        assert!(!f.evaluate(&[true, true, false]));
        assert!(f.evaluate(&[false, true, true]));
        // short assignment reads missing variables as false
        assert!(f.evaluate(&[true]));
    }

    #[test]
    fn test_iff_truth_table() {
        let f = x(0).iff(&x(1));
        assert!(f.evaluate(&[false, false]));
        assert!(!f.evaluate(&[false, true]));
        assert!(!f.evaluate(&[true, false]));
        assert!(f.evaluate(&[true, true]));
    }

    #[test]
    fn test_variables_and_sharing() {
        let shared = x(1).and(&x(2));
        let f = shared.or(&x(5)).and(&shared.not());
        assert_eq!(f.variables().into_iter().collect::<Vec<_>>(), vec![1, 2, 5]);
        assert!(f.node_count() < 12);
    }

    #[test]
    fn test_formulas_cross_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Formula>();

        let base = x(0);
        let handles: Vec<_> = (1..4)
            .map(|i| {
                let base = base.clone();
                std::thread::spawn(move || base.and(&x(i)))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().variables().contains(&0));
        }
    }
}
