//! Core data model types for filtering.
//!
//! Records are opaque to the filter engine: it only needs a [`Schema`] describing named,
//! typed fields and a way to read a field by its schema position (the [`Record`] trait).
//! Statically typed records additionally implement [`Entity`] to expose their schema.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FilterResult;
use crate::processing::EntityFilter;
use crate::query::FilterGroup;

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Point in time, normalized to UTC.
    DateTime,
    /// 128-bit unique identifier.
    Guid,
    /// Integer-coded choice from a fixed list of options.
    OptionSet,
}

impl DataType {
    /// Whether values of this type have a meaningful total order for range operators.
    pub fn is_ordered(self) -> bool {
        !matches!(self, DataType::Bool | DataType::Guid)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How textual values of a field are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collation {
    /// Case-sensitive ordinal comparison.
    #[default]
    Ordinal,
    /// Comparison after Unicode lower-case folding of both sides.
    CaseInsensitive,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field/attribute name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
    /// Collation applied to text comparisons; ignored for non-text fields.
    #[serde(default)]
    pub collation: Collation,
}

impl Field {
    /// Create a new field with ordinal collation.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            collation: Collation::Ordinal,
        }
    }

    /// Override the collation used for text comparisons on this field.
    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }
}

/// A list of fields describing the shape of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the position and definition of a field by name, if present.
    pub fn resolve(&self, name: &str) -> Option<(usize, &Field)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }
}

/// A single owned, typed value: a dataset cell or a condition operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// UTC timestamp.
    DateTime(DateTime<Utc>),
    /// Unique identifier.
    Guid(Uuid),
    /// Option set code.
    OptionSet(i32),
}

impl Value {
    /// Borrowed view of this value.
    pub fn as_value_ref(&self) -> ValueRef<'_> {
        match self {
            Value::Null => ValueRef::Null,
            Value::Int64(v) => ValueRef::Int64(*v),
            Value::Float64(v) => ValueRef::Float64(*v),
            Value::Bool(v) => ValueRef::Bool(*v),
            Value::Utf8(v) => ValueRef::Utf8(v),
            Value::DateTime(v) => ValueRef::DateTime(*v),
            Value::Guid(v) => ValueRef::Guid(*v),
            Value::OptionSet(v) => ValueRef::OptionSet(*v),
        }
    }

    /// Name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        self.as_value_ref().type_name()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(v) => write!(f, "{v:?}"),
            Value::DateTime(v) => f.write_str(&v.to_rfc3339()),
            Value::Guid(v) => write!(f, "{v}"),
            Value::OptionSet(v) => write!(f, "option({v})"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Guid(v)
    }
}

/// Borrowed view of a field value, as read from a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    Null,
    Int64(i64),
    Float64(f64),
    Bool(bool),
    Utf8(&'a str),
    DateTime(DateTime<Utc>),
    Guid(Uuid),
    OptionSet(i32),
}

impl ValueRef<'_> {
    /// Name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueRef::Null => "Null",
            ValueRef::Int64(_) => "Int64",
            ValueRef::Float64(_) => "Float64",
            ValueRef::Bool(_) => "Bool",
            ValueRef::Utf8(_) => "Utf8",
            ValueRef::DateTime(_) => "DateTime",
            ValueRef::Guid(_) => "Guid",
            ValueRef::OptionSet(_) => "OptionSet",
        }
    }

    /// Owned copy of this value.
    pub fn to_value(&self) -> Value {
        match *self {
            ValueRef::Null => Value::Null,
            ValueRef::Int64(v) => Value::Int64(v),
            ValueRef::Float64(v) => Value::Float64(v),
            ValueRef::Bool(v) => Value::Bool(v),
            ValueRef::Utf8(v) => Value::Utf8(v.to_string()),
            ValueRef::DateTime(v) => Value::DateTime(v),
            ValueRef::Guid(v) => Value::Guid(v),
            ValueRef::OptionSet(v) => Value::OptionSet(v),
        }
    }
}

impl<'a> From<&'a Value> for ValueRef<'a> {
    fn from(v: &'a Value) -> Self {
        v.as_value_ref()
    }
}

impl From<i64> for ValueRef<'_> {
    fn from(v: i64) -> Self {
        ValueRef::Int64(v)
    }
}

impl From<f64> for ValueRef<'_> {
    fn from(v: f64) -> Self {
        ValueRef::Float64(v)
    }
}

impl From<bool> for ValueRef<'_> {
    fn from(v: bool) -> Self {
        ValueRef::Bool(v)
    }
}

impl<'a> From<&'a str> for ValueRef<'a> {
    fn from(v: &'a str) -> Self {
        ValueRef::Utf8(v)
    }
}

impl From<DateTime<Utc>> for ValueRef<'_> {
    fn from(v: DateTime<Utc>) -> Self {
        ValueRef::DateTime(v)
    }
}

impl From<Uuid> for ValueRef<'_> {
    fn from(v: Uuid) -> Self {
        ValueRef::Guid(v)
    }
}

impl<'a, T> From<Option<T>> for ValueRef<'a>
where
    T: Into<ValueRef<'a>>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(ValueRef::Null, Into::into)
    }
}

/// A record whose fields can be read by schema position.
///
/// `index` is the position of the field in the [`Schema`] the record is filtered with.
/// Positions the record does not know about should read as [`ValueRef::Null`].
pub trait Record {
    fn value_at(&self, index: usize) -> ValueRef<'_>;
}

impl Record for [Value] {
    fn value_at(&self, index: usize) -> ValueRef<'_> {
        self.get(index).map_or(ValueRef::Null, Value::as_value_ref)
    }
}

impl Record for Vec<Value> {
    fn value_at(&self, index: usize) -> ValueRef<'_> {
        self.as_slice().value_at(index)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn value_at(&self, index: usize) -> ValueRef<'_> {
        (**self).value_at(index)
    }
}

/// A statically typed record that knows its own schema.
///
/// This is the per-type field accessor mapping a schema layer (hand-written or generated)
/// registers once for each record type.
pub trait Entity: Record {
    fn schema() -> &'static Schema;
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema and row order.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Create a new dataset containing only rows matched by `filter`.
    ///
    /// An empty filter group returns a copy of the whole dataset. See
    /// [`EntityFilter::filter_dataset`].
    pub fn filter_by(&self, filter: &FilterGroup) -> FilterResult<Self> {
        EntityFilter::default().filter_dataset(self, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::{Collation, DataSet, DataType, Field, Record, Schema, Value, ValueRef};

    fn sample_dataset() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("active", DataType::Bool),
            Field::new("name", DataType::Utf8).with_collation(Collation::CaseInsensitive),
        ]);

        let rows = vec![
            vec![Value::Int64(1), Value::Bool(true), Value::Utf8("a".to_string())],
            vec![Value::Int64(2), Value::Bool(false), Value::Utf8("b".to_string())],
            vec![Value::Int64(3), Value::Bool(true), Value::Null],
        ];

        DataSet::new(schema, rows)
    }

    #[test]
    fn schema_lookup_by_name() {
        let ds = sample_dataset();
        assert_eq!(ds.schema.index_of("id"), Some(0));
        assert_eq!(ds.schema.index_of("missing"), None);

        let (idx, field) = ds.schema.resolve("name").unwrap();
        assert_eq!(idx, 2);
        assert_eq!(field.data_type, DataType::Utf8);
        assert_eq!(field.collation, Collation::CaseInsensitive);
        assert_eq!(
            ds.schema.field_names().collect::<Vec<_>>(),
            vec!["id", "active", "name"]
        );
    }

    #[test]
    fn value_rows_read_as_records() {
        let ds = sample_dataset();
        let row = &ds.rows[0];
        assert_eq!(row.value_at(0), ValueRef::Int64(1));
        assert_eq!(row.value_at(2), ValueRef::Utf8("a"));
        // Out-of-range positions read as null rather than panicking.
        assert_eq!(row.value_at(42), ValueRef::Null);
        assert_eq!(ds.rows[2].as_slice().value_at(2), ValueRef::Null);
    }

    #[test]
    fn optional_values_convert_to_null() {
        let missing: Option<&str> = None;
        assert_eq!(ValueRef::from(missing), ValueRef::Null);
        assert_eq!(ValueRef::from(Some("fax")), ValueRef::Utf8("fax"));
        assert_eq!(ValueRef::from(Some(7i64)).to_value(), Value::Int64(7));
    }

    #[test]
    fn filter_rows_keeps_order_and_leaves_original_unchanged() {
        let ds = sample_dataset();
        let out = ds.filter_rows(|row| matches!(row.value_at(1), ValueRef::Bool(true)));

        assert_eq!(out.schema, ds.schema);
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.rows[0][0], Value::Int64(1));
        assert_eq!(out.rows[1][0], Value::Int64(3));
        assert_eq!(ds.row_count(), 3);
    }

    #[test]
    fn ordered_types_exclude_bool_and_guid() {
        assert!(DataType::Int64.is_ordered());
        assert!(DataType::DateTime.is_ordered());
        assert!(DataType::Utf8.is_ordered());
        assert!(!DataType::Bool.is_ordered());
        assert!(!DataType::Guid.is_ordered());
    }
}
