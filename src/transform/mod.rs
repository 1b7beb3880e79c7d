//! Filter tree to predicate transformation.
//!
//! [`ExpressionTransformer`] walks a [`FilterGroup`] recursively, resolves every condition
//! against a [`Schema`], validates operator arity and operand types, and produces a
//! [`Predicate`]. All validation happens here, so evaluation itself cannot fail.
//!
//! ```rust
//! use entity_filter::query::{ConditionOperator, FilterGroup};
//! use entity_filter::transform::ExpressionTransformer;
//! use entity_filter::types::{DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("name", DataType::Utf8),
//!     Field::new("numberofemployees", DataType::Int64),
//! ]);
//! let filter = FilterGroup::default()
//!     .with_condition("name", ConditionOperator::BeginsWith, ["Contoso"])
//!     // Text operands are coerced to the field type.
//!     .with_condition("numberofemployees", ConditionOperator::GreaterEqual, ["50"]);
//!
//! let predicate = ExpressionTransformer::new(&schema).transform(&filter)?;
//! assert!(predicate.matches(&vec![Value::from("Contoso Ltd"), Value::Int64(120)]));
//! assert!(!predicate.matches(&vec![Value::from("Contoso Ltd"), Value::Int64(12)]));
//! # Ok::<(), entity_filter::FilterError>(())
//! ```

mod coercion;
mod like;
mod predicate;

use tracing::{debug, trace};

use crate::error::{FilterError, FilterResult};
use crate::query::{Condition, ConditionOperator, FilterGroup, LogicalOperator};
use crate::types::{DataType, Field, Schema, Value};

use coercion::{coerce_operand, fold_operand};

pub use like::LikePattern;
pub use predicate::{CompareOp, FieldTest, Predicate, Test};

/// How nested groups without conditions or child groups are compiled.
///
/// The root group is not affected: an empty root means "no filtering" and is short-circuited
/// by [`crate::processing::EntityFilter`] before transformation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyGroupPolicy {
    /// Empty `And` is true, empty `Or` is false.
    #[default]
    BooleanIdentity,
    /// Fail with [`FilterError::EmptyGroup`].
    Reject,
}

/// Options controlling filter compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    pub empty_nested_groups: EmptyGroupPolicy,
    /// Parse text operands into non-text field types (`"42"` for an `Int64` field).
    pub coerce_text_operands: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            empty_nested_groups: EmptyGroupPolicy::BooleanIdentity,
            coerce_text_operands: true,
        }
    }
}

/// Compiles filter trees against one schema.
#[derive(Debug, Clone)]
pub struct ExpressionTransformer<'s> {
    schema: &'s Schema,
    options: FilterOptions,
}

impl<'s> ExpressionTransformer<'s> {
    /// Create a transformer with default options.
    pub fn new(schema: &'s Schema) -> Self {
        Self::with_options(schema, FilterOptions::default())
    }

    /// Create a transformer with explicit options.
    pub fn with_options(schema: &'s Schema, options: FilterOptions) -> Self {
        Self { schema, options }
    }

    /// Compile `group` into a predicate.
    ///
    /// Fails with [`FilterError::UnknownField`], [`FilterError::UnsupportedOperator`],
    /// [`FilterError::OperandCount`], [`FilterError::TypeMismatch`],
    /// [`FilterError::InvalidPattern`] or [`FilterError::EmptyGroup`]; the first error found in
    /// child order is returned.
    pub fn transform(&self, group: &FilterGroup) -> FilterResult<Predicate> {
        let predicate = self.transform_group(group, 0)?;
        debug!(
            leaves = predicate.leaf_count(),
            predicate = %predicate,
            "compiled filter expression"
        );
        Ok(predicate)
    }

    fn transform_group(&self, group: &FilterGroup, depth: usize) -> FilterResult<Predicate> {
        if depth > 0
            && group.is_empty()
            && self.options.empty_nested_groups == EmptyGroupPolicy::Reject
        {
            return Err(FilterError::EmptyGroup { depth });
        }

        let children = group
            .conditions
            .iter()
            .map(|condition| self.transform_condition(condition))
            .chain(
                group
                    .filters
                    .iter()
                    .map(|nested| self.transform_group(nested, depth + 1)),
            )
            .collect::<FilterResult<Vec<_>>>()?;

        trace!(
            depth,
            operator = ?group.filter_operator,
            children = children.len(),
            "transformed filter group"
        );

        Ok(match group.filter_operator {
            LogicalOperator::And => Predicate::And(children),
            LogicalOperator::Or => Predicate::Or(children),
        })
    }

    fn transform_condition(&self, condition: &Condition) -> FilterResult<Predicate> {
        let name = &condition.attribute_name;
        let (index, field) = self
            .schema
            .resolve(name)
            .ok_or_else(|| FilterError::UnknownField {
                field: name.clone(),
            })?;

        let arity = condition
            .operator
            .arity()
            .ok_or_else(|| FilterError::UnsupportedOperator {
                field: name.clone(),
                operator: condition.operator,
            })?;
        if !arity.accepts(condition.values.len()) {
            return Err(FilterError::OperandCount {
                field: name.clone(),
                operator: condition.operator,
                expected: arity.describe(),
                actual: condition.values.len(),
            });
        }

        let (operator, negated) = condition.operator.positive();
        check_applicable(field, condition.operator, operator)?;

        let operands = condition
            .values
            .iter()
            .map(|value| {
                coerce_operand(field, value, self.options.coerce_text_operands)
                    .map(|coerced| fold_operand(coerced, field.collation))
            })
            .collect::<FilterResult<Vec<_>>>()?;

        let test = build_test(field, condition.operator, operator, &operands)?;
        let leaf = Predicate::Field(FieldTest {
            field: name.clone(),
            index,
            collation: field.collation,
            test,
        });

        Ok(if negated {
            Predicate::Not(Box::new(leaf))
        } else {
            leaf
        })
    }
}

// Rejects operators that have no meaning for the field's declared type.
fn check_applicable(
    field: &Field,
    declared: ConditionOperator,
    positive: ConditionOperator,
) -> FilterResult<()> {
    use ConditionOperator::*;

    let required = match positive {
        GreaterThan | GreaterEqual | LessThan | LessEqual | Between
            if !field.data_type.is_ordered() =>
        {
            Some("an ordered field")
        }
        Like | BeginsWith | EndsWith | Contains if field.data_type != DataType::Utf8 => {
            Some("a Utf8 field")
        }
        _ => None,
    };

    match required {
        Some(required) => Err(FilterError::TypeMismatch {
            field: field.name.clone(),
            expected: format!("{required} for {declared:?}"),
            actual: format!("{} field", field.data_type),
        }),
        None => Ok(()),
    }
}

fn build_test(
    field: &Field,
    declared: ConditionOperator,
    positive: ConditionOperator,
    operands: &[Value],
) -> FilterResult<Test> {
    use ConditionOperator::*;

    let test = match (positive, operands) {
        (Null, []) => Test::Null,
        (Equal, [v]) => Test::Equal(v.clone()),
        (GreaterThan, [v]) => Test::Compare(CompareOp::GreaterThan, v.clone()),
        (GreaterEqual, [v]) => Test::Compare(CompareOp::GreaterEqual, v.clone()),
        (LessThan, [v]) => Test::Compare(CompareOp::LessThan, v.clone()),
        (LessEqual, [v]) => Test::Compare(CompareOp::LessEqual, v.clone()),
        (Between, [low, high]) => Test::Between(low.clone(), high.clone()),
        (In, [_, ..]) => Test::In(operands.to_vec()),
        (BeginsWith, [Value::Utf8(s)]) => Test::BeginsWith(s.clone()),
        (EndsWith, [Value::Utf8(s)]) => Test::EndsWith(s.clone()),
        (Contains, [Value::Utf8(s)]) => Test::Contains(s.clone()),
        (Like, [Value::Utf8(pattern)]) => {
            let compiled = LikePattern::new(pattern, field.collation).map_err(|source| {
                FilterError::InvalidPattern {
                    field: field.name.clone(),
                    pattern: pattern.clone(),
                    source,
                }
            })?;
            Test::Like(compiled)
        }
        // Arity and applicability are checked before operands are built.
        _ => {
            return Err(FilterError::UnsupportedOperator {
                field: field.name.clone(),
                operator: declared,
            });
        }
    };
    Ok(test)
}
