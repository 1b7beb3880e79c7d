//! Filter tree evaluation over in-memory record sequences.

use tracing::debug;

use crate::error::FilterResult;
use crate::query::FilterGroup;
use crate::transform::{ExpressionTransformer, FilterOptions, Predicate};
use crate::types::{DataSet, Entity, Record, Schema};

/// Applies filter trees to record sequences.
///
/// An empty root [`FilterGroup`] (no conditions and no nested groups) means "no filtering
/// requested": the input is returned unchanged. Otherwise the filter is compiled once and the
/// records it matches are returned in their original order. Compilation errors are returned
/// before any record is evaluated.
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    options: FilterOptions,
}

impl EntityFilter {
    /// Create an engine with explicit compilation options.
    pub fn new(options: FilterOptions) -> Self {
        Self { options }
    }

    /// Compilation options used by this engine.
    pub fn options(&self) -> FilterOptions {
        self.options
    }

    /// Compile `filter` against `schema`.
    ///
    /// Returns `Ok(None)` when the filter has no criteria. Callers filtering many record sets
    /// with the same filter can keep the returned predicate and reuse it.
    pub fn compile(
        &self,
        schema: &Schema,
        filter: &FilterGroup,
    ) -> FilterResult<Option<Predicate>> {
        if filter.is_empty() {
            debug!("filter has no criteria; records are returned unchanged");
            return Ok(None);
        }
        ExpressionTransformer::with_options(schema, self.options)
            .transform(filter)
            .map(Some)
    }

    /// Filter statically typed entities using their own schema.
    pub fn filter_by<E>(&self, records: &[E], filter: &FilterGroup) -> FilterResult<Vec<E>>
    where
        E: Entity + Clone,
    {
        self.filter_records(records, E::schema(), filter)
    }

    /// Filter records read through `schema`.
    pub fn filter_records<R>(
        &self,
        records: &[R],
        schema: &Schema,
        filter: &FilterGroup,
    ) -> FilterResult<Vec<R>>
    where
        R: Record + Clone,
    {
        let Some(predicate) = self.compile(schema, filter)? else {
            return Ok(records.to_vec());
        };

        let out: Vec<R> = records
            .iter()
            .filter(|record| predicate.matches(*record))
            .cloned()
            .collect();
        debug!(input = records.len(), matched = out.len(), "filtered records");
        Ok(out)
    }

    /// Filter the rows of a dataset, keeping its schema.
    pub fn filter_dataset(&self, dataset: &DataSet, filter: &FilterGroup) -> FilterResult<DataSet> {
        let Some(predicate) = self.compile(&dataset.schema, filter)? else {
            return Ok(dataset.clone());
        };

        let out = dataset.filter_rows(|row| predicate.matches(row));
        debug!(
            input = dataset.row_count(),
            matched = out.row_count(),
            "filtered dataset"
        );
        Ok(out)
    }
}

/// Returns the entities matched by `filter`, in their original order.
///
/// This is a convenience wrapper around [`EntityFilter::filter_by`] with default options.
pub fn filter_by<E>(records: &[E], filter: &FilterGroup) -> FilterResult<Vec<E>>
where
    E: Entity + Clone,
{
    EntityFilter::default().filter_by(records, filter)
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::{EntityFilter, filter_by};
    use crate::error::FilterError;
    use crate::query::{Condition, ConditionOperator, FilterGroup, LogicalOperator};
    use crate::transform::{EmptyGroupPolicy, FilterOptions};
    use crate::types::{DataSet, DataType, Entity, Field, Record, Schema, Value, ValueRef};

    #[derive(Debug, Clone, PartialEq)]
    struct Contact {
        id: i64,
        lastname: String,
        email: Option<String>,
    }

    static CONTACT_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
        Schema::new(vec![
            Field::new("contactid", DataType::Int64),
            Field::new("lastname", DataType::Utf8),
            Field::new("emailaddress1", DataType::Utf8),
        ])
    });

    impl Record for Contact {
        fn value_at(&self, index: usize) -> ValueRef<'_> {
            match index {
                0 => self.id.into(),
                1 => self.lastname.as_str().into(),
                2 => self.email.as_deref().into(),
                _ => ValueRef::Null,
            }
        }
    }

    impl Entity for Contact {
        fn schema() -> &'static Schema {
            &CONTACT_SCHEMA
        }
    }

    fn contacts() -> Vec<Contact> {
        [
            (1, "Smith", Some("smith@example.com")),
            (2, "Jones", None),
            (3, "Smithers", Some("")),
            (4, "Brown", Some("brown@example.com")),
        ]
        .into_iter()
        .map(|(id, lastname, email)| Contact {
            id,
            lastname: lastname.to_string(),
            email: email.map(str::to_string),
        })
        .collect()
    }

    fn ids(records: &[Contact]) -> Vec<i64> {
        records.iter().map(|c| c.id).collect()
    }

    #[test]
    fn empty_filter_returns_input_unchanged() {
        let records = contacts();
        let out = filter_by(&records, &FilterGroup::default()).unwrap();
        assert_eq!(out, records);

        let or_root = FilterGroup::new(LogicalOperator::Or);
        assert_eq!(filter_by(&records, &or_root).unwrap(), records);
    }

    #[test]
    fn matching_records_keep_input_order() {
        let records = contacts();
        let filter = FilterGroup::new(LogicalOperator::Or)
            .with_condition("lastname", ConditionOperator::BeginsWith, ["Smith"])
            .with_condition("contactid", ConditionOperator::Equal, [4i64]);

        let out = filter_by(&records, &filter).unwrap();
        assert_eq!(ids(&out), vec![1, 3, 4]);
        // Original unchanged
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn empty_text_counts_as_null() {
        let records = contacts();
        let not_null = FilterGroup::default().with(Condition::unary(
            "emailaddress1",
            ConditionOperator::NotNull,
        ));
        let null = FilterGroup::default().with(Condition::unary(
            "emailaddress1",
            ConditionOperator::Null,
        ));

        assert_eq!(ids(&filter_by(&records, &not_null).unwrap()), vec![1, 4]);
        assert_eq!(ids(&filter_by(&records, &null).unwrap()), vec![2, 3]);
    }

    #[test]
    fn no_matches_is_a_successful_empty_result() {
        let records = contacts();
        let filter = FilterGroup::default().with_condition(
            "lastname",
            ConditionOperator::Equal,
            ["Nobody"],
        );
        assert!(filter_by(&records, &filter).unwrap().is_empty());
    }

    #[test]
    fn compile_errors_propagate_without_partial_results() {
        let records = contacts();
        let filter = FilterGroup::default()
            .with_condition("lastname", ConditionOperator::Equal, ["Smith"])
            .with_condition("birthdate", ConditionOperator::Null, Vec::<Value>::new());

        let err = filter_by(&records, &filter).unwrap_err();
        assert!(matches!(err, FilterError::UnknownField { ref field } if field == "birthdate"));
    }

    #[test]
    fn compile_errors_surface_even_without_records() {
        let filter = FilterGroup::default().with_condition(
            "contactid",
            ConditionOperator::GreaterThan,
            ["not a number"],
        );
        let err = filter_by::<Contact>(&[], &filter).unwrap_err();
        assert!(matches!(err, FilterError::TypeMismatch { .. }));
    }

    #[test]
    fn compiled_predicate_is_reusable() {
        let engine = EntityFilter::default();
        let filter = FilterGroup::default().with_condition(
            "contactid",
            ConditionOperator::In,
            [2i64, 3],
        );
        let predicate = engine
            .compile(Contact::schema(), &filter)
            .unwrap()
            .expect("filter has criteria");

        let first = contacts();
        let second: Vec<Contact> = contacts().into_iter().rev().collect();
        assert_eq!(first.iter().filter(|c| predicate.matches(*c)).count(), 2);
        assert_eq!(second.iter().filter(|c| predicate.matches(*c)).count(), 2);

        assert!(engine
            .compile(Contact::schema(), &FilterGroup::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn dataset_rows_are_filtered_with_their_schema() {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("score", DataType::Float64),
        ]);
        let ds = DataSet::new(
            schema,
            vec![
                vec![Value::Int64(1), Value::Float64(10.0)],
                vec![Value::Int64(2), Value::Null],
                vec![Value::Int64(3), Value::Float64(5.5)],
            ],
        );

        let filter = FilterGroup::default().with_condition(
            "score",
            ConditionOperator::LessThan,
            [6i64],
        );
        let out = ds.filter_by(&filter).unwrap();
        assert_eq!(out.schema, ds.schema);
        assert_eq!(out.rows, vec![vec![Value::Int64(3), Value::Float64(5.5)]]);

        assert_eq!(ds.filter_by(&FilterGroup::default()).unwrap(), ds);
    }

    #[test]
    fn plain_value_rows_can_be_filtered_against_an_external_schema() {
        let schema = Schema::new(vec![Field::new("code", DataType::OptionSet)]);
        let rows = vec![
            vec![Value::OptionSet(1)],
            vec![Value::OptionSet(2)],
            vec![Value::Null],
        ];
        let filter = FilterGroup::default().with_condition(
            "code",
            ConditionOperator::NotIn,
            [Value::OptionSet(1)],
        );

        let out = EntityFilter::default()
            .filter_records(&rows, &schema, &filter)
            .unwrap();
        assert_eq!(out, vec![vec![Value::OptionSet(2)], vec![Value::Null]]);
    }

    #[test]
    fn configured_options_apply_to_compilation() {
        let options = FilterOptions {
            empty_nested_groups: EmptyGroupPolicy::Reject,
            coerce_text_operands: false,
        };
        let engine = EntityFilter::new(options);
        assert_eq!(engine.options(), options);
        assert_eq!(EntityFilter::default().options(), FilterOptions::default());

        let text_id = FilterGroup::default().with_condition(
            "contactid",
            ConditionOperator::Equal,
            ["1"],
        );
        assert!(matches!(
            engine.filter_by(&contacts(), &text_id),
            Err(FilterError::TypeMismatch { .. })
        ));
        let coerced = EntityFilter::default()
            .filter_by(&contacts(), &text_id)
            .unwrap();
        assert_eq!(ids(&coerced), vec![1]);

        let empty_nested = FilterGroup::default().with_filter(FilterGroup::default());
        assert!(matches!(
            engine.filter_by(&contacts(), &empty_nested),
            Err(FilterError::EmptyGroup { depth: 1 })
        ));
    }
}
