use serde::{Deserialize, Serialize};

/// Test applied by a [`super::Condition`] to a field value.
///
/// The context-dependent operators at the end of the list (relative dates, current user,
/// hierarchy) are accepted by the model so that filter trees round-trip, but they cannot be
/// evaluated against detached in-memory records and are rejected at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    In,
    NotIn,
    Between,
    NotBetween,
    Null,
    NotNull,
    Like,
    NotLike,
    BeginsWith,
    DoesNotBeginWith,
    EndsWith,
    DoesNotEndWith,
    Contains,
    DoesNotContain,

    Today,
    Yesterday,
    Tomorrow,
    LastXDays,
    NextXDays,
    EqualUserId,
    NotEqualUserId,
    Under,
    Above,
}

/// Number of operand values an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Nullary,
    Unary,
    Binary,
    /// A non-empty set.
    AtLeastOne,
}

impl Arity {
    /// Whether `count` operands satisfy this arity.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Nullary => count == 0,
            Arity::Unary => count == 1,
            Arity::Binary => count == 2,
            Arity::AtLeastOne => count >= 1,
        }
    }

    pub(crate) fn describe(self) -> &'static str {
        match self {
            Arity::Nullary => "no",
            Arity::Unary => "exactly 1",
            Arity::Binary => "exactly 2",
            Arity::AtLeastOne => "at least 1",
        }
    }
}

impl ConditionOperator {
    /// Operand arity, or `None` if the operator cannot be evaluated in memory.
    pub fn arity(self) -> Option<Arity> {
        use ConditionOperator::*;
        match self {
            Null | NotNull => Some(Arity::Nullary),
            Equal | NotEqual | GreaterThan | GreaterEqual | LessThan | LessEqual | Like
            | NotLike | BeginsWith | DoesNotBeginWith | EndsWith | DoesNotEndWith | Contains
            | DoesNotContain => Some(Arity::Unary),
            Between | NotBetween => Some(Arity::Binary),
            In | NotIn => Some(Arity::AtLeastOne),
            Today | Yesterday | Tomorrow | LastXDays | NextXDays | EqualUserId
            | NotEqualUserId | Under | Above => None,
        }
    }

    /// Whether the operator can be compiled into a predicate.
    pub fn is_supported(self) -> bool {
        self.arity().is_some()
    }

    /// Splits a negated operator into its positive counterpart and a negation flag.
    ///
    /// `NotEqual` becomes `(Equal, true)`; positive operators map to themselves with `false`.
    pub fn positive(self) -> (ConditionOperator, bool) {
        use ConditionOperator::*;
        match self {
            NotEqual => (Equal, true),
            NotIn => (In, true),
            NotBetween => (Between, true),
            NotNull => (Null, true),
            NotLike => (Like, true),
            DoesNotBeginWith => (BeginsWith, true),
            DoesNotEndWith => (EndsWith, true),
            DoesNotContain => (Contains, true),
            other => (other, false),
        }
    }

    /// The operator matching exactly the records this one rejects.
    ///
    /// Ordering operators have no complement: `GreaterThan` and `LessEqual` both reject
    /// null fields.
    pub fn complement(self) -> Option<ConditionOperator> {
        use ConditionOperator::*;
        let (positive, negated) = self.positive();
        if negated {
            return Some(positive);
        }
        Some(match positive {
            Equal => NotEqual,
            In => NotIn,
            Between => NotBetween,
            Null => NotNull,
            Like => NotLike,
            BeginsWith => DoesNotBeginWith,
            EndsWith => DoesNotEndWith,
            Contains => DoesNotContain,
            _ => return None,
        })
    }
}
