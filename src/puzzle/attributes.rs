//! Attribute categories and their enumerated values

use crate::error::{PuzzleError, PuzzleResult};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString, FromRepr, IntoStaticStr, VariantArray};

/// Width of the binary field that stores one value code
pub const BITS_PER_VALUE: usize = 4;

/// Number of codes representable in `BITS_PER_VALUE` bits
pub const CODE_SPACE: u8 = 1 << BITS_PER_VALUE;

/// Upper bound on named values in any category
pub const MAX_VALUES_PER_CATEGORY: usize = 9;

/// The closed set of attribute kinds an object carries
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString, VariantArray,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Color,
    Nation,
    Transport,
    Owns,
}

impl Category {
    /// Number of named values the category owns
    pub fn value_count(self) -> usize {
        match self {
            Category::Color => Color::VARIANTS.len(),
            Category::Nation => Nation::VARIANTS.len(),
            Category::Transport => Transport::VARIANTS.len(),
            Category::Owns => Owns::VARIANTS.len(),
        }
    }

    /// Name of the value with the given code, if the code is a named value
    pub fn value_name(self, code: u8) -> Option<&'static str> {
        Value::new(self, code).ok().map(Value::name)
    }

    /// All named values of the category in code order
    pub fn values(self) -> Vec<Value> {
        (0..self.value_count() as u8)
            .filter_map(|code| Value::new(self, code).ok())
            .collect()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString, VariantArray, FromRepr, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    White,
    Purple,
    Brown,
    Aqua,
    Beige,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString, VariantArray, FromRepr, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Nation {
    Tatarin,
    Brazilian,
    Argentinian,
    German,
    Chinese,
    Russian,
    Arabic,
    Australian,
    Kazakh,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString, VariantArray, FromRepr, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Transport {
    Car,
    Helicopter,
    Plane,
    Bus,
    Train,
    Boat,
    Bike,
    Scooter,
    Trolleybus,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString, VariantArray, FromRepr, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Owns {
    Drone,
    Plane,
    Car,
    Hamster,
    Fish,
    Ball,
    Bird,
    Lion,
    Elephant,
}

/// A category value tagged with the category that owns it.
///
/// The tag travels with the value, so a value can never be paired with a
/// category it does not belong to. In YAML a value is written as a
/// single-key map, e.g. `{ nation: GERMAN }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Color(Color),
    Nation(Nation),
    Transport(Transport),
    Owns(Owns),
}

impl Value {
    /// Build a value from its category and numeric code
    pub fn new(category: Category, code: u8) -> PuzzleResult<Self> {
        let value = match category {
            Category::Color => Color::from_repr(code).map(Value::Color),
            Category::Nation => Nation::from_repr(code).map(Value::Nation),
            Category::Transport => Transport::from_repr(code).map(Value::Transport),
            Category::Owns => Owns::from_repr(code).map(Value::Owns),
        };
        value.ok_or_else(|| {
            PuzzleError::domain(format!(
                "code {} is not a {} value (valid codes: 0..{})",
                code,
                category,
                category.value_count()
            ))
        })
    }

    /// Build a value from its category and upper-case name, e.g. `GERMAN`
    pub fn from_name(category: Category, name: &str) -> PuzzleResult<Self> {
        let value = match category {
            Category::Color => Color::from_str(name).ok().map(Value::Color),
            Category::Nation => Nation::from_str(name).ok().map(Value::Nation),
            Category::Transport => Transport::from_str(name).ok().map(Value::Transport),
            Category::Owns => Owns::from_str(name).ok().map(Value::Owns),
        };
        value.ok_or_else(|| PuzzleError::domain(format!("{} is not a {} value", name, category)))
    }

    pub fn category(self) -> Category {
        match self {
            Value::Color(_) => Category::Color,
            Value::Nation(_) => Category::Nation,
            Value::Transport(_) => Category::Transport,
            Value::Owns(_) => Category::Owns,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Value::Color(v) => v as u8,
            Value::Nation(v) => v as u8,
            Value::Transport(v) => v as u8,
            Value::Owns(v) => v as u8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Value::Color(v) => v.into(),
            Value::Nation(v) => v.into(),
            Value::Transport(v) => v.into(),
            Value::Owns(v) => v.into(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.category(), self.name())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.category(), self.name())?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a single-entry map such as { nation: GERMAN }")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let (category, name): (Category, String) = map
            .next_entry()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        if map.next_key::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(2, &self));
        }
        Value::from_name(category, &name).map_err(de::Error::custom)
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Value::Color(value)
    }
}

impl From<Nation> for Value {
    fn from(value: Nation) -> Self {
        Value::Nation(value)
    }
}

impl From<Transport> for Value {
    fn from(value: Transport) -> Self {
        Value::Transport(value)
    }
}

impl From<Owns> for Value {
    fn from(value: Owns) -> Self {
        Value::Owns(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_carries_its_category() {
        let value = Value::from(Nation::German);
        assert_eq!(value.category(), Category::Nation);
        assert_eq!(value.code(), 3);
        assert_eq!(value.name(), "GERMAN");
        assert_eq!(value.to_string(), "nation=GERMAN");
    }

    #[test]
    fn test_value_from_code() {
        assert_eq!(Value::new(Category::Owns, 4).unwrap(), Value::Owns(Owns::Fish));
        assert_eq!(Value::new(Category::Color, 0).unwrap(), Value::Color(Color::Red));
        assert!(matches!(Value::new(Category::Color, 9), Err(PuzzleError::Domain(_))));
        assert!(Value::new(Category::Transport, 15).is_err());
    }

    #[test]
    fn test_every_category_has_nine_values() {
        for category in Category::VARIANTS {
            assert_eq!(category.value_count(), MAX_VALUES_PER_CATEGORY);
            let values = category.values();
            assert_eq!(values.len(), MAX_VALUES_PER_CATEGORY);
            for (code, value) in values.iter().enumerate() {
                assert_eq!(value.code() as usize, code);
                assert_eq!(value.category(), *category);
            }
        }
    }

    #[test]
    fn test_names_parse_back() {
        assert_eq!(Category::from_str("transport").unwrap(), Category::Transport);
        assert_eq!(Owns::from_str("ELEPHANT").unwrap(), Owns::Elephant);
        assert_eq!(Category::Color.value_name(2), Some("BLUE"));
        assert_eq!(Category::Color.value_name(12), None);
    }

    #[test]
    fn test_value_yaml_form() {
        let value: Value = serde_yaml::from_str("nation: CHINESE").unwrap();
        assert_eq!(value, Value::Nation(Nation::Chinese));

        let value: Value = serde_yaml::from_str("{ transport: TROLLEYBUS }").unwrap();
        assert_eq!(value, Value::Transport(Transport::Trolleybus));

        let text = serde_yaml::to_string(&Value::Owns(Owns::Lion)).unwrap();
        assert_eq!(text.trim(), "owns: LION");
        assert!(!text.contains('!'));
        let back: Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, Value::Owns(Owns::Lion));
    }

    #[test]
    fn test_value_yaml_rejects_bad_maps() {
        // name from another category
        assert!(serde_yaml::from_str::<Value>("nation: RED").is_err());
        assert!(serde_yaml::from_str::<Value>("planet: MARS").is_err());
        assert!(serde_yaml::from_str::<Value>("{ nation: GERMAN, color: RED }").is_err());
        assert!(serde_yaml::from_str::<Value>("{}").is_err());
    }

    #[test]
    fn test_value_json_form() {
        let json = serde_json::to_string(&Value::Color(Color::Aqua)).unwrap();
        assert_eq!(json, r#"{"color":"AQUA"}"#);
        assert_eq!(serde_json::from_str::<Value>(&json).unwrap(), Value::Color(Color::Aqua));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Value::from_name(Category::Owns, "FISH").unwrap(), Value::Owns(Owns::Fish));
        assert!(matches!(Value::from_name(Category::Owns, "fish"), Err(PuzzleError::Domain(_))));
    }

    #[test]
    fn test_code_space_covers_named_values() {
        assert!(MAX_VALUES_PER_CATEGORY <= CODE_SPACE as usize);
        assert_eq!(CODE_SPACE, 16);
    }
}
