//! Tagged evaluator results and the coordinate bindings they are computed from.

use core::fmt;

use num_complex::Complex64;

/// Result of evaluating an expression at one point.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A single real number.
    Number(f64),
    /// A complex number.
    Complex(Complex64),
    /// A boolean, e.g. from a comparison.
    Boolean(bool),
    /// A 3D vector.
    Vector([f64; 3]),
    /// Free-form text.
    Text(String),
    /// No value at all.
    Null,
}

impl FieldValue {
    /// Returns the variant name. Used in error messages.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Number,
            Self::Complex(_) => ValueKind::Complex,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Vector(_) => ValueKind::Vector,
            Self::Text(_) => ValueKind::Text,
            Self::Null => ValueKind::Null,
        }
    }

    /// Truthiness used when a non-numeric result has to become 0 or 1.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(value) => *value != 0.0 && !value.is_nan(),
            Self::Complex(value) => value.re != 0.0 || value.im != 0.0,
            Self::Boolean(state) => *state,
            Self::Vector(_) => true,
            Self::Text(text) => !text.is_empty(),
            Self::Null => false,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Complex64> for FieldValue {
    fn from(value: Complex64) -> Self {
        Self::Complex(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Describes the kind of a [`FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Complex,
    Boolean,
    Vector,
    Text,
    Null,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Number => "Number",
            Self::Complex => "Complex",
            Self::Boolean => "Boolean",
            Self::Vector => "Vector",
            Self::Text => "Text",
            Self::Null => "Null",
        };
        f.write_str(name)
    }
}

/// Name → number bindings handed to an expression for one evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings<'a> {
    entries: Vec<(&'a str, f64)>,
}

impl<'a> Bindings<'a> {
    /// Binds each name to the value at the same position.
    #[must_use]
    pub fn from_pairs(names: &[&'a str], values: &[f64]) -> Self {
        Self {
            entries: names.iter().copied().zip(values.iter().copied()).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Bindings, FieldValue, ValueKind};
    use num_complex::Complex64;

    #[test]
    fn bindings_pair_names_with_values() {
        let bindings = Bindings::from_pairs(&["x", "y", "z"], &[1.0, 2.0]);
        assert_eq!(bindings.get("x"), Some(1.0));
        assert_eq!(bindings.get("y"), Some(2.0));
        assert_eq!(bindings.get("z"), None);
        assert_eq!(Bindings::default().get("x"), None);
    }

    #[test]
    fn truthiness_matches_loose_coercion() {
        assert!(FieldValue::Boolean(true).is_truthy());
        assert!(!FieldValue::Boolean(false).is_truthy());
        assert!(FieldValue::Vector([0.0, 0.0, 0.0]).is_truthy());
        assert!(!FieldValue::Text(String::new()).is_truthy());
        assert!(!FieldValue::Null.is_truthy());
        assert!(FieldValue::Complex(Complex64::new(0.0, 1.0)).is_truthy());
    }

    #[test]
    fn kind_names_are_readable() {
        assert_eq!(FieldValue::Number(1.0).kind(), ValueKind::Number);
        assert_eq!(ValueKind::Complex.to_string(), "Complex");
    }
}
