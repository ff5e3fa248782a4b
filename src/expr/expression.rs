//! Expression adaptors that turn coordinate bindings into field values.
//!
//! The sampling core only depends on the [`Expression`] trait. This module
//! ships a `meval`-backed implementation for textual formulas and closure
//! adaptors for callers (and tests) that already hold a Rust function.

use std::fmt;

use meval::{Context, ContextProvider, Expr};
use num_complex::Complex64;

use super::value::{Bindings, FieldValue};

/// Failure while parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    #[error("expression could not be parsed: {0}")]
    Parse(String),
    #[error("expression could not be evaluated: {0}")]
    Evaluate(String),
    #[error("expression does not support type `{0}`")]
    UnsupportedType(String),
}

/// A scalar (or complex) field that can be evaluated at bound coordinates.
pub trait Expression {
    fn evaluate(&self, bindings: &Bindings<'_>) -> Result<FieldValue, ExpressionError>;
}

impl<E: Expression + ?Sized> Expression for &E {
    fn evaluate(&self, bindings: &Bindings<'_>) -> Result<FieldValue, ExpressionError> {
        (**self).evaluate(bindings)
    }
}

impl<E: Expression + ?Sized> Expression for Box<E> {
    fn evaluate(&self, bindings: &Bindings<'_>) -> Result<FieldValue, ExpressionError> {
        (**self).evaluate(bindings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// meval
// ─────────────────────────────────────────────────────────────────────────────

enum Parts {
    Real(Expr),
    Complex { re: Expr, im: Expr },
}

/// Textual formula parsed once and evaluated with `meval`.
pub struct MevalExpression {
    source: String,
    parts: Parts,
    context: Context<'static>,
}

impl MevalExpression {
    /// Parses a real-valued formula.
    ///
    /// An implicit equation such as `x^2 + y^2 = 1` is rewritten to
    /// `(x^2 + y^2) - (1)` so its zero level set is the solution set.
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        let normalized = normalize_expression(source);
        if normalized.is_empty() {
            return Err(ExpressionError::Parse("expression is empty".to_owned()));
        }
        let expr = parse_expr(&normalized)?;
        Ok(Self {
            source: normalized,
            parts: Parts::Real(expr),
            context: build_context(),
        })
    }

    /// Parses a complex-valued field given as separate real and imaginary parts.
    pub fn parse_complex(real: &str, imaginary: &str) -> Result<Self, ExpressionError> {
        let re_source = normalize_expression(real);
        let im_source = normalize_expression(imaginary);
        if re_source.is_empty() || im_source.is_empty() {
            return Err(ExpressionError::Parse(
                "complex expression needs a real and an imaginary part".to_owned(),
            ));
        }
        let re = parse_expr(&re_source)?;
        let im = parse_expr(&im_source)?;
        Ok(Self {
            source: format!("({re_source}) + i*({im_source})"),
            parts: Parts::Complex { re, im },
            context: build_context(),
        })
    }

    /// Parses either form: `real; imaginary` yields a complex field, anything
    /// else goes through [`MevalExpression::parse`].
    pub fn parse_field(source: &str) -> Result<Self, ExpressionError> {
        let trimmed = source.trim().trim_end_matches(';');
        match trimmed.split_once(';') {
            Some((real, imaginary)) => Self::parse_complex(real, imaginary),
            None => Self::parse(trimmed),
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_complex(&self) -> bool {
        matches!(self.parts, Parts::Complex { .. })
    }

    fn eval_part(&self, expr: &Expr, bindings: &Bindings<'_>) -> Result<f64, ExpressionError> {
        let provider = BindingsProvider(bindings);
        expr.eval_with_context((&provider, &self.context))
            .map_err(|error| ExpressionError::Evaluate(error.to_string()))
    }
}

impl fmt::Debug for MevalExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MevalExpression")
            .field("source", &self.source)
            .field("complex", &self.is_complex())
            .finish_non_exhaustive()
    }
}

impl Expression for MevalExpression {
    fn evaluate(&self, bindings: &Bindings<'_>) -> Result<FieldValue, ExpressionError> {
        match &self.parts {
            Parts::Real(expr) => self.eval_part(expr, bindings).map(FieldValue::Number),
            Parts::Complex { re, im } => {
                let re = self.eval_part(re, bindings)?;
                let im = self.eval_part(im, bindings)?;
                Ok(FieldValue::Complex(Complex64::new(re, im)))
            }
        }
    }
}

struct BindingsProvider<'b, 'a>(&'b Bindings<'a>);

impl ContextProvider for BindingsProvider<'_, '_> {
    fn get_var(&self, name: &str) -> Option<f64> {
        self.0.get(name)
    }
}

fn parse_expr(source: &str) -> Result<Expr, ExpressionError> {
    source
        .parse::<Expr>()
        .map_err(|error| ExpressionError::Parse(error.to_string()))
}

fn normalize_expression(source: &str) -> String {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut normalized = trimmed.to_owned();
    while normalized.ends_with(';') {
        normalized.pop();
        normalized = normalized.trim_end().to_owned();
    }

    match split_equation(&normalized) {
        Some((lhs, rhs)) => format!("({}) - ({})", lhs.trim(), rhs.trim()),
        None => normalized,
    }
}

/// Splits `lhs = rhs` on a single bare `=`; comparison operators are left alone.
fn split_equation(source: &str) -> Option<(&str, &str)> {
    let bytes = source.as_bytes();
    let mut split_at = None;
    for (index, byte) in bytes.iter().enumerate() {
        if *byte != b'=' {
            continue;
        }
        let prev = index.checked_sub(1).map(|i| bytes[i]);
        let next = bytes.get(index + 1).copied();
        let part_of_operator = matches!(prev, Some(b'=' | b'!' | b'<' | b'>'))
            || matches!(next, Some(b'='));
        if part_of_operator {
            continue;
        }
        if split_at.is_some() {
            return None;
        }
        split_at = Some(index);
    }
    let index = split_at?;
    let (lhs, rhs) = (&source[..index], &source[index + 1..]);
    if lhs.trim().is_empty() || rhs.trim().is_empty() {
        return None;
    }
    Some((lhs, rhs))
}

fn build_context() -> Context<'static> {
    let mut context = Context::new();
    context.func3("clamp", clamp);
    context.func3("lerp", lerp);
    context.func("deg", |value| value.to_degrees());
    context.func("rad", |value| value.to_radians());
    context.func("frac", |value| value.fract());
    context.func2("mod", modulo);
    context.func2("modulo", modulo);
    context.func("sign", f64::signum);
    context.func("sgn", f64::signum);
    context.func("sec", |value| 1.0 / value.cos());
    context.func("csc", |value| 1.0 / value.sin());
    context.func("cot", |value| 1.0 / value.tan());
    context.func2("and", |a, b| {
        if to_boolean(a) && to_boolean(b) {
            1.0
        } else {
            0.0
        }
    });
    context.func2("or", |a, b| {
        if to_boolean(a) || to_boolean(b) {
            1.0
        } else {
            0.0
        }
    });
    context.func2("xor", |a, b| {
        if to_boolean(a) ^ to_boolean(b) {
            1.0
        } else {
            0.0
        }
    });
    context.func("not", |value| if to_boolean(value) { 0.0 } else { 1.0 });
    context.funcn("if", conditional, 2..4);
    context.funcn("select", conditional, 2..4);
    context
}

fn to_boolean(value: f64) -> bool {
    value != 0.0
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    let lower = min.min(max);
    let upper = min.max(max);
    if value <= lower {
        lower
    } else if value >= upper {
        upper
    } else {
        value
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn modulo(dividend: f64, divisor: f64) -> f64 {
    if divisor == 0.0 {
        return f64::NAN;
    }
    let remainder = dividend % divisor;
    if remainder == 0.0 {
        0.0
    } else if (divisor > 0.0 && remainder < 0.0) || (divisor < 0.0 && remainder > 0.0) {
        remainder + divisor
    } else {
        remainder
    }
}

fn conditional(args: &[f64]) -> f64 {
    let condition = to_boolean(args[0]);
    let truthy = args[1];
    // Two-argument form leaves the false branch undefined.
    let falsy = if args.len() == 3 { args[2] } else { f64::NAN };
    if condition { truthy } else { falsy }
}

// ─────────────────────────────────────────────────────────────────────────────
// Closure adaptors
// ─────────────────────────────────────────────────────────────────────────────

/// Real-valued field backed by a closure over the bindings.
pub struct FnExpression<F> {
    function: F,
}

impl<F> FnExpression<F>
where
    F: Fn(&Bindings<'_>) -> f64,
{
    pub fn new(function: F) -> Self {
        Self { function }
    }
}

impl<F> Expression for FnExpression<F>
where
    F: Fn(&Bindings<'_>) -> f64,
{
    fn evaluate(&self, bindings: &Bindings<'_>) -> Result<FieldValue, ExpressionError> {
        Ok(FieldValue::Number((self.function)(bindings)))
    }
}

/// Complex-valued field `w = f(z)` on the complex plane.
///
/// `z` is assembled from the `re` and `im` bindings of the complex plane.
pub struct ComplexFnExpression<F> {
    function: F,
}

impl<F> ComplexFnExpression<F>
where
    F: Fn(Complex64) -> Complex64,
{
    pub fn new(function: F) -> Self {
        Self { function }
    }
}

impl<F> Expression for ComplexFnExpression<F>
where
    F: Fn(Complex64) -> Complex64,
{
    fn evaluate(&self, bindings: &Bindings<'_>) -> Result<FieldValue, ExpressionError> {
        let bound = |name: &str| {
            bindings
                .get(name)
                .ok_or_else(|| ExpressionError::Evaluate(format!("unbound variable `{name}`")))
        };
        let re = bound("re")?;
        let im = bound("im")?;
        Ok(FieldValue::Complex((self.function)(Complex64::new(re, im))))
    }
}
