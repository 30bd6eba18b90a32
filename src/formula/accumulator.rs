//! The running global conjunction that every constraint is folded into

use super::expr::Formula;
use std::iter;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Folded {
    formula: Formula,
    appended: usize,
}

impl Folded {
    fn push(&mut self, formula: &Formula) {
        self.formula = self.formula.and(formula);
        self.appended += 1;
    }

    // one normalization pass for the whole batch instead of one per formula
    fn push_all(&mut self, formulas: &[Formula]) {
        let current = std::mem::replace(&mut self.formula, Formula::top());
        self.formula = Formula::all(iter::once(current).chain(formulas.iter().cloned()));
        self.appended += formulas.len();
    }
}

/// Owns the global formula; starts at TRUE and only ever grows by AND.
///
/// `append` takes `&mut self`, so the borrow checker guarantees no parallel
/// writer exists while it runs. `append_synchronized` takes `&self` and can
/// be shared across rayon tasks. Reading the result again needs `&mut self`
/// (or ownership), which means every parallel task has been joined.
#[derive(Debug)]
pub struct FormulaAccumulator {
    state: Mutex<Folded>,
}

impl FormulaAccumulator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Folded {
                formula: Formula::top(),
                appended: 0,
            }),
        }
    }

    /// Append from sequential code
    pub fn append(&mut self, formula: &Formula) {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push(formula);
    }

    /// Append a batch from sequential code; same result as appending one by one
    pub fn append_all(&mut self, formulas: &[Formula]) {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push_all(formulas);
    }

    /// Append from any thread; writers are serialized by the lock
    pub fn append_synchronized(&self, formula: &Formula) {
        self.lock().push(formula);
    }

    /// Number of formulas folded in so far
    pub fn appended(&mut self) -> usize {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner).appended
    }

    pub fn result(&mut self) -> Formula {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .formula
            .clone()
    }

    pub fn into_result(self) -> Formula {
        self.state.into_inner().unwrap_or_else(PoisonError::into_inner).formula
    }

    // A panicking writer cannot leave a half-updated formula behind: the fold
    // assigns a complete new formula, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Folded> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FormulaAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
