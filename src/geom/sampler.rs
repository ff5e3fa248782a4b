//! Scalar field sampling with explicit undefined results.
//!
//! The sampler is the only place that talks to the evaluator during a grid
//! scan. Evaluation faults and non-finite results become
//! [`FieldSample::Undefined`] so a single bad point never aborts a scan.

use num_complex::Complex64;

use crate::expr::{Bindings, Expression, ExpressionError, FieldValue};

/// How non-numeric evaluator results are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleMode {
    /// Height-field sampling: complex values reduce to their magnitude,
    /// booleans and other kinds coerce to 0 or 1.
    #[default]
    Lenient,
    /// Implicit-surface sampling: only plain numbers are defined.
    Strict,
}

/// One evaluated point of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldSample {
    Defined {
        value: f64,
        /// Present when the evaluator produced a complex number; `value` is
        /// then its magnitude.
        complex: Option<Complex64>,
    },
    Undefined,
}

impl FieldSample {
    #[must_use]
    pub const fn real(value: f64) -> Self {
        Self::Defined {
            value,
            complex: None,
        }
    }

    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Defined { value, .. } => Some(*value),
            Self::Undefined => None,
        }
    }

    /// The scalar, or NaN for undefined samples.
    #[must_use]
    pub fn value_or_nan(&self) -> f64 {
        self.value().unwrap_or(f64::NAN)
    }

    #[must_use]
    pub fn complex(&self) -> Option<Complex64> {
        match self {
            Self::Defined { complex, .. } => *complex,
            Self::Undefined => None,
        }
    }

    #[must_use]
    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined { .. })
    }
}

/// A coordinate tuple together with the field sample taken there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSample {
    pub coordinates: [f64; 3],
    pub sample: FieldSample,
}

/// Evaluates an [`Expression`] at coordinates named after a space's dimensions.
pub struct FieldSampler<'n, E> {
    expression: E,
    names: [&'n str; 3],
    mode: SampleMode,
}

impl<'n, E: Expression> FieldSampler<'n, E> {
    pub fn new(expression: E, names: [&'n str; 3], mode: SampleMode) -> Self {
        Self {
            expression,
            names,
            mode,
        }
    }

    /// Samples with the leading `coordinates.len()` dimension names bound.
    pub fn sample_at(&self, coordinates: &[f64]) -> FieldSample {
        let count = coordinates.len().min(self.names.len());
        let bindings = Bindings::from_pairs(&self.names[..count], &coordinates[..count]);
        self.sample(&bindings)
    }

    /// Like [`FieldSampler::try_sample`], with every error folded into
    /// [`FieldSample::Undefined`].
    pub fn sample(&self, bindings: &Bindings<'_>) -> FieldSample {
        self.try_sample(bindings).unwrap_or(FieldSample::Undefined)
    }

    /// Evaluates once and keeps the reason a sample could not be used.
    ///
    /// Non-finite numbers are still `Ok(Undefined)`; in strict mode a value of
    /// any kind other than a plain number is `UnsupportedType`.
    pub fn try_sample(&self, bindings: &Bindings<'_>) -> Result<FieldSample, ExpressionError> {
        let value = self.expression.evaluate(bindings)?;
        interpret(&value, self.mode)
    }
}

fn interpret(value: &FieldValue, mode: SampleMode) -> Result<FieldSample, ExpressionError> {
    let sample = match (value, mode) {
        (FieldValue::Number(number), _) => finite(*number, None),
        (FieldValue::Complex(c), SampleMode::Lenient) => {
            if c.re.is_finite() && c.im.is_finite() {
                finite(c.norm(), Some(*c))
            } else {
                FieldSample::Undefined
            }
        }
        (other, SampleMode::Lenient) => {
            FieldSample::real(if other.is_truthy() { 1.0 } else { 0.0 })
        }
        (other, SampleMode::Strict) => {
            return Err(ExpressionError::UnsupportedType(other.kind().to_string()));
        }
    };
    Ok(sample)
}

fn finite(value: f64, complex: Option<Complex64>) -> FieldSample {
    if value.is_finite() {
        FieldSample::Defined { value, complex }
    } else {
        FieldSample::Undefined
    }
}
