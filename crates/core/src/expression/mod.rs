//! Typed condition, key-condition, update and projection expressions.

mod ast;
mod eval;
mod path;
mod render;

use thiserror::Error;

pub use ast::{
    CompareOp, Condition, KeyCondition, Operand, Projection, SortKeyCondition, UpdateAction,
};
pub use eval::{apply_update, check_between_bounds, evaluate, project, resolve};
pub use path::{Path, PathSegment, SizeOf};
pub use render::ExpressionAttributes;

/// Errors raised while building or applying expressions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("invalid document path '{0}'")]
    InvalidPath(String),
    #[error("the document path '{0}' is invalid for update")]
    InvalidUpdatePath(String),
    #[error("the BETWEEN operator requires upper bound to be greater than or equal to lower bound")]
    ReversedBetweenBounds,
    #[error("the BETWEEN operator requires same data type for lower and upper bounds")]
    MismatchedBetweenBounds,
}
