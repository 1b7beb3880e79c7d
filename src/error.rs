use thiserror::Error;

use crate::query::ConditionOperator;

/// Convenience result type for filter compilation and execution.
pub type FilterResult<T> = Result<T, FilterError>;

/// Error type returned when a filter tree cannot be turned into a predicate.
///
/// Every variant except [`FilterError::ThreadPool`] and [`FilterError::InvalidOptions`] is
/// raised while compiling the filter, before any record is evaluated, so a malformed filter
/// never yields a partially filtered result.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A condition references a field that the record schema does not declare.
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// A condition uses an operator that cannot be evaluated against in-memory records.
    #[error("unsupported operator {operator:?} on field '{field}'")]
    UnsupportedOperator {
        field: String,
        operator: ConditionOperator,
    },

    /// An operand (or the operator itself) is incompatible with the field's declared type.
    #[error("type mismatch on field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// The number of operand values does not fit the operator's arity.
    #[error("operator {operator:?} on field '{field}' takes {expected} operand(s), got {actual}")]
    OperandCount {
        field: String,
        operator: ConditionOperator,
        expected: &'static str,
        actual: usize,
    },

    /// A nested filter group has no conditions and no child groups.
    #[error("empty nested filter group at depth {depth}")]
    EmptyGroup { depth: usize },

    /// A `Like` pattern could not be compiled.
    #[error("invalid like pattern '{pattern}' on field '{field}': {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Execution options are out of range (e.g. a zero chunk size).
    #[error("invalid execution options: {0}")]
    InvalidOptions(String),

    /// The worker pool for parallel execution could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
