//! Binary encoding of attribute values onto the variable bank

use super::variables::VariableBank;
use crate::error::{PuzzleError, PuzzleResult};
use crate::formula::Formula;
use crate::puzzle::{Category, Dimensions, Value, BITS_PER_VALUE, CODE_SPACE};

/// Precomputed attribute formulas.
///
/// `attribute(o, v)` is the formula "object `o` holds value `v`": the
/// conjunction of the four bits of the slot, each taken plain or negated
/// according to the value's code (most significant bit first). All
/// `objects * categories * values` formulas are built once, up front.
#[derive(Debug, Clone)]
pub struct AttributeEncoder {
    bank: VariableBank,
    // formulas[object][slot][code]
    formulas: Vec<Vec<Vec<Formula>>>,
}

impl AttributeEncoder {
    pub fn new(bank: VariableBank) -> PuzzleResult<Self> {
        let dimensions = bank.dimensions().clone();
        let mut formulas = Vec::with_capacity(dimensions.object_count());

        for object in 0..dimensions.object_count() {
            let mut per_slot = Vec::with_capacity(dimensions.category_count());
            for slot in 0..dimensions.category_count() {
                let vars = bank.bundle_by_slot(object, slot);
                let per_code = (0..dimensions.values_per_category as u8)
                    .map(|code| encode_checked(code, vars, dimensions.values_per_category))
                    .collect::<PuzzleResult<Vec<_>>>()?;
                per_slot.push(per_code);
            }
            formulas.push(per_slot);
        }

        Ok(Self { bank, formulas })
    }

    pub fn dimensions(&self) -> &Dimensions {
        self.bank.dimensions()
    }

    pub fn bank(&self) -> &VariableBank {
        &self.bank
    }

    /// "object holds value"; the category comes from the value's own tag
    pub fn attribute(&self, object: usize, value: Value) -> PuzzleResult<&Formula> {
        let dimensions = self.dimensions();
        dimensions.check_object(object)?;
        let slot = dimensions.check_value(value)?;
        Ok(&self.formulas[object][slot][value.code() as usize])
    }

    /// The raw four-variable bundle for `(object, category)`
    pub fn category_variables(&self, object: usize, category: Category) -> PuzzleResult<&[Formula]> {
        self.bank.bundle(object, category)
    }

    /// Encode a code restricted to the puzzle's value range
    pub fn encode(&self, code: u8, vars: &[Formula]) -> PuzzleResult<Formula> {
        encode_checked(code, vars, self.dimensions().values_per_category)
    }

    /// Encode any code representable in four bits, including unused ones
    pub fn encode_any_code(&self, code: u8, vars: &[Formula]) -> PuzzleResult<Formula> {
        encode_bits(code, vars)
    }

    /// Decode four bits (most significant first) into a code of the puzzle's range
    pub fn decode(&self, bits: &[bool]) -> PuzzleResult<u8> {
        let code = decode_bits(bits)?;
        if code as usize >= self.dimensions().values_per_category {
            return Err(PuzzleError::domain(format!(
                "decoded code {} is outside the value range 0..{}",
                code,
                self.dimensions().values_per_category
            )));
        }
        Ok(code)
    }

    /// Decode four bits into any code in `0..16`
    pub fn decode_any_code(&self, bits: &[bool]) -> PuzzleResult<u8> {
        decode_bits(bits)
    }

    /// Decode the value a full assignment gives to `(object, category)`
    pub fn decode_value(&self, assignment: &[bool], object: usize, category: Category) -> PuzzleResult<Value> {
        let base = self.bank.index_of(object, category, 0)?;
        let bits = assignment.get(base..base + BITS_PER_VALUE).ok_or_else(|| {
            PuzzleError::domain(format!(
                "assignment of length {} does not cover variables {}..{}",
                assignment.len(),
                base,
                base + BITS_PER_VALUE
            ))
        })?;
        Value::new(category, self.decode(bits)?)
    }
}

fn encode_checked(code: u8, vars: &[Formula], values_per_category: usize) -> PuzzleResult<Formula> {
    if code as usize >= values_per_category {
        return Err(PuzzleError::domain(format!(
            "code {} is outside the value range 0..{}",
            code, values_per_category
        )));
    }
    encode_bits(code, vars)
}

fn encode_bits(code: u8, vars: &[Formula]) -> PuzzleResult<Formula> {
    check_width(vars.len())?;
    if code >= CODE_SPACE {
        return Err(PuzzleError::domain(format!(
            "code {} does not fit in {} bits",
            code, BITS_PER_VALUE
        )));
    }

    let literals = vars.iter().enumerate().map(|(position, var)| {
        if bit_at(code, position) {
            var.clone()
        } else {
            var.not()
        }
    });
    Ok(Formula::all(literals))
}

fn decode_bits(bits: &[bool]) -> PuzzleResult<u8> {
    check_width(bits.len())?;
    Ok(bits.iter().fold(0u8, |code, &bit| (code << 1) | bit as u8))
}

/// Bit of `code` stored at `position`; position 0 holds the most significant bit
fn bit_at(code: u8, position: usize) -> bool {
    (code >> (BITS_PER_VALUE - 1 - position)) & 1 == 1
}

fn check_width(width: usize) -> PuzzleResult<()> {
    if width != BITS_PER_VALUE {
        return Err(PuzzleError::domain(format!(
            "a value occupies {} bits, got a bundle of {}",
            BITS_PER_VALUE, width
        )));
    }
    Ok(())
}
