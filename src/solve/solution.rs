//! Decoded puzzle solutions

use crate::error::{PuzzleError, PuzzleResult};
use crate::puzzle::{Category, GridShape, Value};
use crate::sat::encoder::AttributeEncoder;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// The values held by one object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectAssignment {
    pub object: usize,
    pub x: usize,
    pub y: usize,
    /// One value per active category, in category order
    pub values: Vec<Value>,
}

impl ObjectAssignment {
    pub fn value_of(&self, category: Category) -> Option<Value> {
        self.values.iter().copied().find(|value| value.category() == category)
    }

    pub fn holds(&self, value: Value) -> bool {
        self.values.contains(&value)
    }
}

/// One satisfying assignment, decoded to named values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub grid: GridShape,
    pub categories: Vec<Category>,
    pub objects: Vec<ObjectAssignment>,
    /// Time the backend spent before this solution was available
    #[serde(skip)]
    pub solve_time: Duration,
}

impl Solution {
    /// Decode a raw-variable bit-vector
    pub fn decode(encoder: &AttributeEncoder, bits: &[bool], solve_time: Duration) -> PuzzleResult<Self> {
        let dimensions = encoder.dimensions();
        if bits.len() != dimensions.variable_count() {
            return Err(PuzzleError::domain(format!(
                "expected {} bits, got {}",
                dimensions.variable_count(),
                bits.len()
            )));
        }

        let objects = (0..dimensions.object_count())
            .map(|object| {
                let values = dimensions
                    .categories
                    .iter()
                    .map(|&category| encoder.decode_value(bits, object, category))
                    .collect::<PuzzleResult<Vec<_>>>()?;
                let (x, y) = dimensions.grid.position(object);
                Ok(ObjectAssignment {
                    object,
                    x: x as usize,
                    y: y as usize,
                    values,
                })
            })
            .collect::<PuzzleResult<Vec<_>>>()?;

        Ok(Self {
            grid: dimensions.grid,
            categories: dimensions.categories.clone(),
            objects,
            solve_time,
        })
    }

    pub fn object(&self, object: usize) -> Option<&ObjectAssignment> {
        self.objects.get(object)
    }

    pub fn value_of(&self, object: usize, category: Category) -> Option<Value> {
        self.object(object)?.value_of(category)
    }

    /// Objects holding `value`
    pub fn holders(&self, value: Value) -> Vec<usize> {
        self.objects
            .iter()
            .filter(|assignment| assignment.holds(value))
            .map(|assignment| assignment.object)
            .collect()
    }

    /// Re-encode into the raw-variable bit-vector it was decoded from
    pub fn to_bits(&self, encoder: &AttributeEncoder) -> PuzzleResult<Vec<bool>> {
        let mut bits = vec![false; encoder.dimensions().variable_count()];
        for assignment in &self.objects {
            for &value in &assignment.values {
                let base = encoder.bank().index_of(assignment.object, value.category(), 0)?;
                for (offset, bit) in bits[base..base + 4].iter_mut().enumerate() {
                    *bit = (value.code() >> (3 - offset)) & 1 == 1;
                }
            }
        }
        Ok(bits)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = self.to_json().context("Failed to serialize solution")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write solution: {}", path.display()))?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read solution: {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to parse solution: {}", path.display()))
    }
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.grid == other.grid && self.categories == other.categories && self.objects == other.objects
    }
}

impl Eq for Solution {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{Color, Dimensions, Nation};
    use crate::sat::variables::VariableBank;
    use tempfile::TempDir;

    fn small_encoder() -> AttributeEncoder {
        let dimensions =
            Dimensions::new(GridShape::new(2, 1), 3, vec![Category::Color, Category::Nation]).unwrap();
        AttributeEncoder::new(VariableBank::new(&dimensions)).unwrap()
    }

    fn sample_solution(encoder: &AttributeEncoder) -> Solution {
        // object 0: GREEN (1 = 0001), ARGENTINIAN (2 = 0010)
        // object 1: RED (0), BRAZILIAN (1 = 0001)
        let mut bits = vec![false; 16];
        bits[3] = true;
        bits[6] = true;
        bits[15] = true;
        Solution::decode(encoder, &bits, Duration::ZERO).unwrap()
    }

    #[test]
    fn test_decode_named_values() {
        let encoder = small_encoder();
        let solution = sample_solution(&encoder);

        assert_eq!(solution.value_of(0, Category::Color), Some(Color::Green.into()));
        assert_eq!(solution.value_of(0, Category::Nation), Some(Nation::Argentinian.into()));
        assert_eq!(solution.value_of(1, Category::Color), Some(Color::Red.into()));
        assert_eq!(solution.value_of(1, Category::Nation), Some(Nation::Brazilian.into()));
        assert_eq!(solution.object(1).unwrap().x, 1);
        assert_eq!(solution.holders(Color::Red.into()), vec![1]);
    }

    #[test]
    fn test_decode_rejects_out_of_range_codes() {
        let encoder = small_encoder();
        let mut bits = vec![false; 16];
        // code 3 with values_per_category = 3
        bits[2] = true;
        bits[3] = true;
        assert!(Solution::decode(&encoder, &bits, Duration::ZERO).is_err());
        assert!(Solution::decode(&encoder, &bits[..8], Duration::ZERO).is_err());
    }

    #[test]
    fn test_bits_round_trip() {
        let encoder = small_encoder();
        let solution = sample_solution(&encoder);
        let bits = solution.to_bits(&encoder).unwrap();
        assert_eq!(Solution::decode(&encoder, &bits, Duration::ZERO).unwrap(), solution);
    }

    #[test]
    fn test_json_file_round_trip() {
        let encoder = small_encoder();
        let solution = sample_solution(&encoder);

        let json = solution.to_json().unwrap();
        assert!(json.contains("ARGENTINIAN"));

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("solutions").join("solution_001.json");
        solution.save_to_file(&path).unwrap();
        assert_eq!(Solution::load_from_file(&path).unwrap(), solution);
    }
}
