//! Raw boolean variable bank for the attribute encoding

use crate::error::{PuzzleError, PuzzleResult};
use crate::formula::Formula;
use crate::puzzle::{Category, Dimensions, BITS_PER_VALUE};

/// Position of one raw variable in the encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableKey {
    pub object: usize,
    pub slot: usize,
    pub bit: usize,
}

/// All raw variables, bundled by object, category slot and bit.
///
/// Variable `index` is `(object * categories + slot) * 4 + bit`, bit 0 being
/// the most significant bit of the value code.
#[derive(Debug, Clone)]
pub struct VariableBank {
    dimensions: Dimensions,
    bundles: Vec<Vec<Vec<Formula>>>,
}

impl VariableBank {
    /// Allocate one variable per (object, category, bit)
    pub fn new(dimensions: &Dimensions) -> Self {
        let bundles = (0..dimensions.object_count())
            .map(|object| {
                (0..dimensions.category_count())
                    .map(|slot| {
                        let base = dimensions.base_variable(object, slot);
                        (0..BITS_PER_VALUE).map(|bit| Formula::var(base + bit)).collect()
                    })
                    .collect()
            })
            .collect();

        Self {
            dimensions: dimensions.clone(),
            bundles,
        }
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// The four variables of `(object, category)`
    pub fn bundle(&self, object: usize, category: Category) -> PuzzleResult<&[Formula]> {
        self.dimensions.check_object(object)?;
        let slot = self.dimensions.category_slot(category)?;
        Ok(&self.bundles[object][slot])
    }

    pub(crate) fn bundle_by_slot(&self, object: usize, slot: usize) -> &[Formula] {
        &self.bundles[object][slot]
    }

    /// Index of the variable at `(object, category, bit)`
    pub fn index_of(&self, object: usize, category: Category, bit: usize) -> PuzzleResult<usize> {
        self.dimensions.check_object(object)?;
        let slot = self.dimensions.category_slot(category)?;
        if bit >= BITS_PER_VALUE {
            return Err(PuzzleError::domain(format!(
                "bit {} out of bounds (bits per value: {})",
                bit, BITS_PER_VALUE
            )));
        }
        Ok(self.dimensions.base_variable(object, slot) + bit)
    }

    /// Inverse of `index_of`
    pub fn key_of(&self, index: usize) -> PuzzleResult<VariableKey> {
        if index >= self.variable_count() {
            return Err(PuzzleError::domain(format!(
                "variable {} out of bounds (variables: {})",
                index,
                self.variable_count()
            )));
        }
        let cell = index / BITS_PER_VALUE;
        Ok(VariableKey {
            object: cell / self.dimensions.category_count(),
            slot: cell % self.dimensions.category_count(),
            bit: index % BITS_PER_VALUE,
        })
    }

    pub fn variable_count(&self) -> usize {
        self.dimensions.variable_count()
    }

    pub fn statistics(&self) -> VariableStatistics {
        VariableStatistics {
            total_variables: self.variable_count(),
            objects: self.dimensions.object_count(),
            categories: self.dimensions.category_count(),
            bits_per_value: BITS_PER_VALUE,
        }
    }
}

/// Statistics about variable usage
#[derive(Debug, Clone)]
pub struct VariableStatistics {
    pub total_variables: usize,
    pub objects: usize,
    pub categories: usize,
    pub bits_per_value: usize,
}

impl std::fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(
            f,
            "  Layout: {} objects x {} categories x {} bits",
            self.objects, self.categories, self.bits_per_value
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Node;
    use crate::puzzle::GridShape;

    #[test]
    fn test_bank_layout() {
        let bank = VariableBank::new(&Dimensions::default());
        assert_eq!(bank.variable_count(), 144);

        let bundle = bank.bundle(1, Category::Nation).unwrap();
        assert_eq!(bundle.len(), 4);
        assert!(matches!(bundle[0].node(), Node::Var(20)));
        assert!(matches!(bundle[3].node(), Node::Var(23)));
    }

    #[test]
    fn test_index_round_trip() {
        let bank = VariableBank::new(&Dimensions::default());
        let index = bank.index_of(7, Category::Owns, 2).unwrap();
        assert_eq!(index, (7 * 4 + 3) * 4 + 2);

        let key = bank.key_of(index).unwrap();
        assert_eq!(key, VariableKey { object: 7, slot: 3, bit: 2 });
    }

    #[test]
    fn test_bounds() {
        let dimensions = Dimensions::new(GridShape::new(2, 1), 2, vec![Category::Color]).unwrap();
        let bank = VariableBank::new(&dimensions);

        assert_eq!(bank.variable_count(), 8);
        assert!(bank.bundle(2, Category::Color).is_err());
        assert!(bank.bundle(0, Category::Nation).is_err());
        assert!(bank.index_of(0, Category::Color, 4).is_err());
        assert!(bank.key_of(8).is_err());
    }

    #[test]
    fn test_statistics() {
        let bank = VariableBank::new(&Dimensions::default());
        let stats = bank.statistics();
        assert_eq!(stats.total_variables, 144);
        assert!(stats.to_string().contains("9 objects x 4 categories x 4 bits"));
    }
}
