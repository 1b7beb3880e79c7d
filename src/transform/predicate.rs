//! Compiled predicates.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use crate::types::{Collation, Record, Value, ValueRef};

use super::coercion::fold_text;
use super::like::LikePattern;

/// A filter tree compiled against a schema.
///
/// The predicate is immutable, `Send + Sync` and can be reused across any number of record
/// sets filtered with the same schema. Children are evaluated in order and evaluation stops
/// at the first child that decides the result.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// True when every child is true; an empty `And` is true.
    And(Vec<Predicate>),
    /// True when any child is true; an empty `Or` is false.
    Or(Vec<Predicate>),
    /// Logical complement.
    Not(Box<Predicate>),
    /// A single field test.
    Field(FieldTest),
}

impl Predicate {
    /// Evaluate the predicate against one record.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            Predicate::And(children) => children.iter().all(|child| child.matches(record)),
            Predicate::Or(children) => children.iter().any(|child| child.matches(record)),
            Predicate::Not(inner) => !inner.matches(record),
            Predicate::Field(test) => test.matches(record),
        }
    }

    /// Number of field tests in the predicate.
    pub fn leaf_count(&self) -> usize {
        match self {
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().map(Predicate::leaf_count).sum()
            }
            Predicate::Not(inner) => inner.leaf_count(),
            Predicate::Field(_) => 1,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::And(children) if children.is_empty() => f.write_str("TRUE"),
            Predicate::Or(children) if children.is_empty() => f.write_str("FALSE"),
            Predicate::And(children) | Predicate::Or(children) => {
                let joiner = if matches!(self, Predicate::And(_)) {
                    " AND "
                } else {
                    " OR "
                };
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
            Predicate::Not(inner) => write!(f, "NOT {inner}"),
            Predicate::Field(test) => write!(f, "{test}"),
        }
    }
}

/// Comparison used by range tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
}

impl CompareOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::GreaterThan => ordering.is_gt(),
            CompareOp::GreaterEqual => ordering.is_ge(),
            CompareOp::LessThan => ordering.is_lt(),
            CompareOp::LessEqual => ordering.is_le(),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            CompareOp::GreaterThan => ">",
            CompareOp::GreaterEqual => ">=",
            CompareOp::LessThan => "<",
            CompareOp::LessEqual => "<=",
        }
    }
}

/// Test applied to a single field value.
///
/// Operands are already coerced to the field type and, for case-insensitive text fields,
/// folded to lower case.
#[derive(Debug, Clone)]
pub enum Test {
    /// Field is null or an empty string. Every other test treats an empty string as a value.
    Null,
    Equal(Value),
    Compare(CompareOp, Value),
    /// Inclusive range.
    Between(Value, Value),
    In(Vec<Value>),
    BeginsWith(String),
    EndsWith(String),
    Contains(String),
    Like(LikePattern),
}

/// A [`Test`] bound to a resolved schema position.
#[derive(Debug, Clone)]
pub struct FieldTest {
    pub(crate) field: String,
    pub(crate) index: usize,
    pub(crate) collation: Collation,
    pub(crate) test: Test,
}

impl FieldTest {
    /// Name of the tested field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The test applied to the field.
    pub fn test(&self) -> &Test {
        &self.test
    }

    fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        let actual = record.value_at(self.index);
        match &self.test {
            Test::Null => is_null(actual),
            _ if matches!(actual, ValueRef::Null) => false,
            Test::Equal(operand) => self.compare(actual, operand) == Some(Ordering::Equal),
            Test::Compare(op, operand) => self
                .compare(actual, operand)
                .is_some_and(|ordering| op.holds(ordering)),
            Test::Between(low, high) => {
                self.compare(actual, low).is_some_and(Ordering::is_ge)
                    && self.compare(actual, high).is_some_and(Ordering::is_le)
            }
            Test::In(set) => set
                .iter()
                .any(|operand| self.compare(actual, operand) == Some(Ordering::Equal)),
            Test::BeginsWith(needle) => self
                .text(actual)
                .is_some_and(|text| text.starts_with(needle.as_str())),
            Test::EndsWith(needle) => self
                .text(actual)
                .is_some_and(|text| text.ends_with(needle.as_str())),
            Test::Contains(needle) => self
                .text(actual)
                .is_some_and(|text| text.contains(needle.as_str())),
            Test::Like(pattern) => match actual {
                ValueRef::Utf8(text) => pattern.is_match(text),
                _ => false,
            },
        }
    }

    // None when the field holds a value of another type than the operand. Operands are
    // already coerced to the declared type, so this only happens when a record drifts from
    // its schema.
    fn compare(&self, actual: ValueRef<'_>, operand: &Value) -> Option<Ordering> {
        match (actual, operand) {
            (ValueRef::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
            (ValueRef::Float64(a), Value::Float64(b)) => Some(a.total_cmp(b)),
            (ValueRef::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (ValueRef::Utf8(a), Value::Utf8(b)) => Some(match self.collation {
                Collation::Ordinal => a.cmp(b.as_str()),
                Collation::CaseInsensitive => fold_text(a).as_str().cmp(b.as_str()),
            }),
            (ValueRef::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (ValueRef::Guid(a), Value::Guid(b)) => Some(a.cmp(b)),
            (ValueRef::OptionSet(a), Value::OptionSet(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    fn text<'a>(&self, actual: ValueRef<'a>) -> Option<Cow<'a, str>> {
        match (actual, self.collation) {
            (ValueRef::Utf8(text), Collation::Ordinal) => Some(Cow::Borrowed(text)),
            (ValueRef::Utf8(text), Collation::CaseInsensitive) => {
                Some(Cow::Owned(fold_text(text)))
            }
            _ => None,
        }
    }
}

// Empty text is null only for `Null`/`NotNull`; every other test compares it as a value.
fn is_null(value: ValueRef<'_>) -> bool {
    matches!(value, ValueRef::Null | ValueRef::Utf8(""))
}

impl fmt::Display for FieldTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.field;
        match &self.test {
            Test::Null => write!(f, "{name} IS NULL"),
            Test::Equal(v) => write!(f, "{name} = {v}"),
            Test::Compare(op, v) => write!(f, "{name} {} {v}", op.symbol()),
            Test::Between(low, high) => write!(f, "{name} BETWEEN {low} AND {high}"),
            Test::In(set) => {
                write!(f, "{name} IN (")?;
                for (i, v) in set.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
            Test::BeginsWith(s) => write!(f, "{name} BEGINS WITH {s:?}"),
            Test::EndsWith(s) => write!(f, "{name} ENDS WITH {s:?}"),
            Test::Contains(s) => write!(f, "{name} CONTAINS {s:?}"),
            Test::Like(p) => write!(f, "{name} LIKE {p}"),
        }
    }
}
