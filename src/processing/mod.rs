//! In-memory filtering.
//!
//! The processing layer applies filter trees to already materialized records: statically
//! typed [`crate::types::Entity`] values, plain `Vec<Value>` rows read through a
//! [`crate::types::Schema`], or a whole [`crate::types::DataSet`].
//!
//! - [`filter_by()`]: filter entities with default options
//! - [`EntityFilter`]: configurable engine that also exposes the compiled predicate
//!
//! ## Example
//!
//! ```rust
//! use entity_filter::processing::EntityFilter;
//! use entity_filter::query::{ConditionOperator, FilterGroup};
//! use entity_filter::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("id", DataType::Int64),
//!     Field::new("active", DataType::Bool),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Int64(1), Value::Bool(true)],
//!         vec![Value::Int64(2), Value::Bool(false)],
//!         vec![Value::Int64(3), Value::Bool(true)],
//!     ],
//! );
//!
//! let active = FilterGroup::default().with_condition("active", ConditionOperator::Equal, [true]);
//! let out = EntityFilter::default().filter_dataset(&ds, &active)?;
//! assert_eq!(out.row_count(), 2);
//!
//! // No criteria: nothing is filtered out.
//! let all = EntityFilter::default().filter_dataset(&ds, &FilterGroup::default())?;
//! assert_eq!(all.row_count(), 3);
//! # Ok::<(), entity_filter::FilterError>(())
//! ```

pub mod filter;

pub use filter::{EntityFilter, filter_by};
