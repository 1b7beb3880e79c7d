//! Filter tree model.
//!
//! A [`FilterGroup`] combines [`Condition`]s and nested groups with a
//! [`LogicalOperator`]. Trees are built by the caller (or an external query-construction
//! layer) and are read-only inputs to [`crate::transform::ExpressionTransformer`].
//!
//! ```rust
//! use entity_filter::query::{Condition, ConditionOperator, FilterGroup, LogicalOperator};
//!
//! let contactable = FilterGroup::new(LogicalOperator::Or)
//!     .with_filter(
//!         FilterGroup::new(LogicalOperator::And)
//!             .with_condition("donotphone", ConditionOperator::Equal, [false])
//!             .with(Condition::unary("telephone1", ConditionOperator::NotNull)),
//!     )
//!     .with_filter(
//!         FilterGroup::new(LogicalOperator::And)
//!             .with_condition("donotemail", ConditionOperator::Equal, [false])
//!             .with(Condition::unary("emailaddress1", ConditionOperator::NotNull)),
//!     );
//!
//! let criteria = FilterGroup::default()
//!     .with_condition("name", ConditionOperator::EndsWith, ["LLC"])
//!     .with_filter(contactable);
//!
//! assert!(!criteria.is_empty());
//! assert_eq!(criteria.condition_count(), 5);
//! ```

mod operator;

use serde::{Deserialize, Serialize};

use crate::types::Value;

pub use operator::{Arity, ConditionOperator};

/// Logical operator joining the children of a [`FilterGroup`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperator {
    /// Every child must match.
    #[default]
    And,
    /// At least one child must match.
    Or,
}

/// A single field-operator-operand test; the leaf of a filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Name of the record field the condition reads.
    pub attribute_name: String,
    /// Test applied to the field value.
    pub operator: ConditionOperator,
    /// Operand values; how many depends on the operator's [`Arity`].
    #[serde(default)]
    pub values: Vec<Value>,
}

impl Condition {
    /// Create a condition with operand values.
    pub fn new<I, V>(
        attribute_name: impl Into<String>,
        operator: ConditionOperator,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            attribute_name: attribute_name.into(),
            operator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a condition that takes no operands (e.g. `Null` / `NotNull`).
    pub fn unary(attribute_name: impl Into<String>, operator: ConditionOperator) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            operator,
            values: Vec::new(),
        }
    }
}

/// An internal node of a filter tree.
///
/// Children are evaluated conditions first, then nested groups, each in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    /// How the children are combined.
    #[serde(default)]
    pub filter_operator: LogicalOperator,
    /// Leaf conditions.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Nested groups.
    #[serde(default)]
    pub filters: Vec<FilterGroup>,
}

impl FilterGroup {
    /// Create an empty group with the given operator.
    pub fn new(filter_operator: LogicalOperator) -> Self {
        Self {
            filter_operator,
            conditions: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// `true` when the group has no direct conditions and no direct nested groups.
    ///
    /// An empty root group means "no filtering requested".
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.filters.is_empty()
    }

    /// Append a condition built from its parts.
    pub fn add_condition<I, V>(
        &mut self,
        attribute_name: impl Into<String>,
        operator: ConditionOperator,
        values: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.conditions
            .push(Condition::new(attribute_name, operator, values));
        self
    }

    /// Append an already built condition.
    pub fn add(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    /// Append a nested group.
    pub fn add_filter(&mut self, filter: FilterGroup) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Builder-style [`Self::add_condition`].
    pub fn with_condition<I, V>(
        mut self,
        attribute_name: impl Into<String>,
        operator: ConditionOperator,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.add_condition(attribute_name, operator, values);
        self
    }

    /// Builder-style [`Self::add`].
    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Builder-style [`Self::add_filter`].
    pub fn with_filter(mut self, filter: FilterGroup) -> Self {
        self.filters.push(filter);
        self
    }

    /// Total number of conditions in this group and all nested groups.
    pub fn condition_count(&self) -> usize {
        self.conditions.len()
            + self
                .filters
                .iter()
                .map(FilterGroup::condition_count)
                .sum::<usize>()
    }

    /// Nesting depth of the tree; a group without nested groups has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.filters.iter().map(FilterGroup::depth).max().unwrap_or(0)
    }
}
