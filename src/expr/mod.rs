//! Boundary to the expression evaluator: tagged results, bindings and the
//! [`Expression`] trait the samplers are generic over.

pub mod expression;
pub mod value;

pub use expression::{
    ComplexFnExpression, Expression, ExpressionError, FnExpression, MevalExpression,
};
pub use value::{Bindings, FieldValue, ValueKind};
