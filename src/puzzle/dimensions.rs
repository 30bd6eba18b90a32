//! Puzzle size: grid, active categories and values per category

use super::attributes::{Category, Value, BITS_PER_VALUE, MAX_VALUES_PER_CATEGORY};
use super::topology::GridShape;
use crate::error::{PuzzleError, PuzzleResult};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub grid: GridShape,
    /// Only the first `values_per_category` named values of each category are in play
    pub values_per_category: usize,
    /// Active categories; the position in this list is the category's variable slot
    pub categories: Vec<Category>,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            grid: GridShape::square(3),
            values_per_category: MAX_VALUES_PER_CATEGORY,
            categories: vec![
                Category::Color,
                Category::Nation,
                Category::Transport,
                Category::Owns,
            ],
        }
    }
}

impl Dimensions {
    pub fn new(grid: GridShape, values_per_category: usize, categories: Vec<Category>) -> PuzzleResult<Self> {
        let dimensions = Self {
            grid,
            values_per_category,
            categories,
        };
        dimensions.validate()?;
        Ok(dimensions)
    }

    pub fn object_count(&self) -> usize {
        self.grid.object_count()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Total number of raw boolean variables
    pub fn variable_count(&self) -> usize {
        self.object_count() * self.category_count() * BITS_PER_VALUE
    }

    /// Index of the first of the four bits for `(object, slot)`
    pub fn base_variable(&self, object: usize, slot: usize) -> usize {
        (object * self.category_count() + slot) * BITS_PER_VALUE
    }

    /// Variable slot of an active category
    pub fn category_slot(&self, category: Category) -> PuzzleResult<usize> {
        self.categories
            .iter()
            .position(|&active| active == category)
            .ok_or_else(|| {
                PuzzleError::configuration(format!("category {} is not active in this puzzle", category))
            })
    }

    pub fn check_object(&self, object: usize) -> PuzzleResult<()> {
        if object >= self.object_count() {
            return Err(PuzzleError::domain(format!(
                "object {} out of bounds (objects: {})",
                object,
                self.object_count()
            )));
        }
        Ok(())
    }

    /// Check that a value belongs to an active category and lies in the puzzle's range
    pub fn check_value(&self, value: Value) -> PuzzleResult<usize> {
        let slot = self.category_slot(value.category())?;
        if value.code() as usize >= self.values_per_category {
            return Err(PuzzleError::domain(format!(
                "value {} (code {}) is outside the puzzle's range 0..{}",
                value,
                value.code(),
                self.values_per_category
            )));
        }
        Ok(slot)
    }

    pub fn validate(&self) -> PuzzleResult<()> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(PuzzleError::configuration(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }
        if self.values_per_category == 0 || self.values_per_category > MAX_VALUES_PER_CATEGORY {
            return Err(PuzzleError::configuration(format!(
                "values_per_category must be in 1..={}, got {}",
                MAX_VALUES_PER_CATEGORY, self.values_per_category
            )));
        }
        if self.categories.is_empty() {
            return Err(PuzzleError::configuration("at least one category must be active"));
        }
        if let Some(duplicate) = self.categories.iter().duplicates().next() {
            return Err(PuzzleError::configuration(format!(
                "category {} is listed more than once",
                duplicate
            )));
        }
        Ok(())
    }
}
