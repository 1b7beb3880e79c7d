//! `entity-filter` evaluates declarative filter trees against in-memory records.
//!
//! A filter is a [`query::FilterGroup`]: a logical operator (`And`/`Or`), a list of
//! [`query::Condition`]s and nested groups. Conditions name a field, a
//! [`query::ConditionOperator`] and operand values. Filters are compiled once against a
//! [`types::Schema`] into a [`transform::Predicate`], which is then applied record by record.
//!
//! The primary entrypoint is [`processing::filter_by`], which filters statically typed
//! [`types::Entity`] values and returns the matches in their original order.
//!
//! ## Semantics at a glance
//!
//! - An empty root group (no conditions, no nested groups) returns the input unchanged.
//! - `Null` values and empty strings are both treated as null. Every positive test
//!   (`Equal`, `GreaterThan`, `Like`, `In`, ...) is false on a null field; negated operators are
//!   the exact complement of their positive form.
//! - Text comparisons use the field's [`types::Collation`] (ordinal unless configured).
//! - Unknown fields, unsupported operators, wrong operand counts and operands that cannot be
//!   coerced to the field type are reported as [`FilterError`]s before any record is read.
//!
//! ## Quick example: filter entities
//!
//! ```rust
//! use std::sync::LazyLock;
//!
//! use entity_filter::processing::filter_by;
//! use entity_filter::query::{ConditionOperator, FilterGroup, LogicalOperator};
//! use entity_filter::types::{DataType, Entity, Field, Record, Schema, ValueRef};
//!
//! #[derive(Debug, Clone)]
//! struct Account {
//!     name: String,
//!     telephone: Option<String>,
//! }
//!
//! static ACCOUNT: LazyLock<Schema> = LazyLock::new(|| {
//!     Schema::new(vec![
//!         Field::new("name", DataType::Utf8),
//!         Field::new("telephone1", DataType::Utf8),
//!     ])
//! });
//!
//! impl Record for Account {
//!     fn value_at(&self, index: usize) -> ValueRef<'_> {
//!         match index {
//!             0 => self.name.as_str().into(),
//!             1 => self.telephone.as_deref().into(),
//!             _ => ValueRef::Null,
//!         }
//!     }
//! }
//!
//! impl Entity for Account {
//!     fn schema() -> &'static Schema {
//!         &ACCOUNT
//!     }
//! }
//!
//! let accounts = vec![
//!     Account { name: "Fabrikam LLC".into(), telephone: Some("555-0100".into()) },
//!     Account { name: "Contoso Ltd".into(), telephone: None },
//!     Account { name: "Northwind LLC".into(), telephone: None },
//! ];
//!
//! let filter = FilterGroup::new(LogicalOperator::And)
//!     .with_condition("name", ConditionOperator::EndsWith, ["LLC"])
//!     .with_filter(
//!         FilterGroup::new(LogicalOperator::Or)
//!             .with_condition("telephone1", ConditionOperator::Like, ["555-%"]),
//!     );
//!
//! let matched = filter_by(&accounts, &filter)?;
//! assert_eq!(matched.len(), 1);
//! assert_eq!(matched[0].name, "Fabrikam LLC");
//! # Ok::<(), entity_filter::FilterError>(())
//! ```
//!
//! ## Modules
//!
//! - [`query`]: the filter tree model
//! - [`transform`]: filter tree to predicate compilation
//! - [`processing`]: sequential filtering of entities, rows and datasets
//! - [`execution`]: parallel filtering with metrics and observer hooks
//! - [`types`]: schema, values and the record abstraction
//! - [`error`]: error types used across compilation and execution

pub mod error;
pub mod execution;
pub mod processing;
pub mod query;
pub mod transform;
pub mod types;

pub use error::{FilterError, FilterResult};
