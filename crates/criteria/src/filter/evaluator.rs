//! Filter evaluation against in-memory objects.
//!
//! This module provides the [`FilterEvaluator`] for matching a parsed or
//! constructed [`Filter`] directly against any object that implements
//! [`FieldAccessor`], without a backing store.
//!
//! # Example
//!
//! ```
//! use criteria_rs::filter::{FilterEvaluator, FilterParser};
//! use serde_json::json;
//!
//! let filter = FilterParser::parse("[Name] == \"Alice\" AND [Tags] CONTAINS \"admin\"").unwrap();
//! let person = json!({ "Name": "alice", "Tags": ["staff", "Admins"] });
//!
//! let evaluator = FilterEvaluator::new(&filter);
//! assert!(evaluator.matches(&person).unwrap());
//! ```

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use super::ast::{Condition, Connective, FieldPath, Filter, Operand, Operator, Predicate, TargetKind};
use super::error::{FilterError, FilterResult};
use super::value::{Decimal, Number, Value};

/// The value(s) an object holds at a field path.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A single scalar value.
    Single(Value),
    /// A collection; conditions match if any element matches.
    Many(Vec<Value>),
    /// A value the matcher cannot compare, such as a nested object.
    Unsupported,
}

impl FieldValue {
    /// Creates a single-valued field.
    pub fn single(value: impl Into<Value>) -> Self {
        FieldValue::Single(value.into())
    }

    /// Creates a collection-valued field.
    pub fn many<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        FieldValue::Many(values.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Single(value)
    }
}

/// Read access to the fields of an object being matched.
pub trait FieldAccessor {
    /// Returns the value(s) at `path`, or `None` if the object has no such field.
    fn field(&self, path: &FieldPath) -> Option<FieldValue>;
}

impl<T: FieldAccessor + ?Sized> FieldAccessor for &T {
    fn field(&self, path: &FieldPath) -> Option<FieldValue> {
        (**self).field(path)
    }
}

/// Maps keyed by the dotted field path.
impl FieldAccessor for HashMap<String, FieldValue> {
    fn field(&self, path: &FieldPath) -> Option<FieldValue> {
        self.get(&path.to_string()).cloned()
    }
}

impl FieldAccessor for BTreeMap<String, FieldValue> {
    fn field(&self, path: &FieldPath) -> Option<FieldValue> {
        self.get(&path.to_string()).cloned()
    }
}

/// JSON documents: each path segment selects a member of a nested object.
///
/// Arrays are collections. Objects, and arrays holding objects or arrays,
/// are unsupported.
impl FieldAccessor for serde_json::Value {
    fn field(&self, path: &FieldPath) -> Option<FieldValue> {
        let mut current = self;
        for segment in path.segments() {
            current = current.as_object()?.get(segment)?;
        }

        let value = match current {
            serde_json::Value::Array(elements) => elements
                .iter()
                .map(json_scalar)
                .collect::<Option<Vec<_>>>()
                .map_or(FieldValue::Unsupported, FieldValue::Many),
            other => json_scalar(other).map_or(FieldValue::Unsupported, FieldValue::Single),
        };
        Some(value)
    }
}

/// Converts a JSON scalar; returns `None` for arrays and objects.
fn json_scalar(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::Null => Some(Value::Null),
        serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            let number = if let Some(v) = n.as_u64() {
                Number::U64(v)
            } else if let Some(v) = n.as_i64() {
                Number::I64(v)
            } else {
                Number::F64(n.as_f64()?)
            };
            Some(Value::Number(number))
        }
        serde_json::Value::String(s) => Some(Value::Text(s.clone())),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
    }
}

/// Evaluates a filter against objects.
///
/// A chain is read left to right as a disjunction of AND-runs: `a AND b OR c`
/// matches when both `a` and `b` match, or when `c` does. Evaluation stops
/// at the first run that matches and skips the rest of a run after the first
/// condition that fails, so a missing field in a skipped clause is not
/// reported.
#[derive(Debug)]
pub struct FilterEvaluator<'a> {
    filter: &'a Filter,
}

impl<'a> FilterEvaluator<'a> {
    /// Creates a new filter evaluator.
    pub fn new(filter: &'a Filter) -> Self {
        Self { filter }
    }

    /// Returns true if the object matches the filter.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::FieldNotFound` if a referenced field does not
    /// exist on the object, or `FilterError::UnsupportedFieldKind` if it
    /// holds a value that cannot be compared.
    pub fn matches<A: FieldAccessor + ?Sized>(&self, object: &A) -> FilterResult<bool> {
        evaluate_chain(self.filter, object)
    }

    /// Filters a slice of objects, returning only those that match.
    ///
    /// # Errors
    ///
    /// Returns the first evaluation error encountered.
    pub fn filter_items<'b, A: FieldAccessor>(&self, items: &'b [A]) -> FilterResult<Vec<&'b A>> {
        let mut matched = Vec::new();
        for item in items {
            if self.matches(item)? {
                matched.push(item);
            }
        }
        Ok(matched)
    }
}

/// Returns true if `object` matches `filter`.
///
/// # Errors
///
/// See [`FilterEvaluator::matches`].
pub fn matches<A: FieldAccessor + ?Sized>(filter: &Filter, object: &A) -> FilterResult<bool> {
    FilterEvaluator::new(filter).matches(object)
}

fn evaluate_chain<A: FieldAccessor + ?Sized>(filter: &Filter, object: &A) -> FilterResult<bool> {
    // The empty chain leaves `run` at true, matching everything
    let mut run = true;
    for clause in filter {
        if clause.connective() == Connective::Or {
            if run {
                return Ok(true);
            }
            run = true;
        }
        if run {
            run = match clause.predicate() {
                Predicate::Condition(condition) => evaluate_condition(condition, object)?,
                Predicate::Group(group) => evaluate_chain(group, object)?,
            };
        }
    }
    Ok(run)
}

fn evaluate_condition<A: FieldAccessor + ?Sized>(
    condition: &Condition,
    object: &A,
) -> FilterResult<bool> {
    let left = resolve(object, condition.field())?;
    let operator = condition.operator();
    let kind = condition.target_kind();

    let matched = match condition.operand() {
        Operand::Field(other) => {
            let right = resolve(object, other)?;
            left.iter()
                .any(|l| right.iter().any(|r| compare_values(l, r, operator, kind)))
        }
        literal => {
            let right = literal_value(literal);
            left.iter().any(|l| compare_values(l, &right, operator, kind))
        }
    };

    trace!(field = %condition.field(), %operator, matched, "evaluated condition");
    Ok(matched)
}

/// Resolves a field to the list of values to test; a single value is a list of one.
fn resolve<A: FieldAccessor + ?Sized>(object: &A, path: &FieldPath) -> FilterResult<Vec<Value>> {
    match object.field(path) {
        Some(FieldValue::Single(value)) => Ok(vec![value]),
        Some(FieldValue::Many(values)) => Ok(values),
        Some(FieldValue::Unsupported) => Err(FilterError::unsupported_field_kind(path.to_string())),
        None => Err(FilterError::field_not_found(path.to_string())),
    }
}

fn literal_value(operand: &Operand) -> Value {
    match operand {
        Operand::Null | Operand::Field(_) => Value::Null,
        Operand::Bool(b) => Value::Bool(*b),
        Operand::Uuid(u) => Value::Uuid(*u),
        Operand::Number(n) => Value::Number(n.clone()),
        Operand::Text(s) => Value::Text(s.clone()),
    }
}

/// Compares two scalar values through their text forms.
fn compare_values(left: &Value, right: &Value, operator: Operator, kind: TargetKind) -> bool {
    let left = left.as_text();
    let right = right.as_text();

    match operator {
        Operator::Equal => text_equals(left.as_deref(), right.as_deref()),
        Operator::NotEqual => !text_equals(left.as_deref(), right.as_deref()),
        Operator::Contains => substring_test(left, right, |l, r| l.contains(r)),
        Operator::StartsWith => substring_test(left, right, |l, r| l.starts_with(r)),
        Operator::EndsWith => substring_test(left, right, |l, r| l.ends_with(r)),
        Operator::LessThan
        | Operator::LessThanOrEqual
        | Operator::GreaterThan
        | Operator::GreaterThanOrEqual => {
            let (left, right) = if kind == TargetKind::OtherBool {
                (left.map(bool_as_digit), right.map(bool_as_digit))
            } else {
                (left, right)
            };
            let ordering = compare_ordered(left.as_deref(), right.as_deref());
            match operator {
                Operator::LessThan => ordering == Ordering::Less,
                Operator::LessThanOrEqual => ordering != Ordering::Greater,
                Operator::GreaterThan => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }
        }
    }
}

/// Case-insensitive equality; null and empty only equal themselves.
fn text_equals(left: Option<&str>, right: Option<&str>) -> bool {
    match (left, right) {
        (Some(l), Some(r)) if !l.is_empty() && !r.is_empty() => {
            l == r || l.to_lowercase() == r.to_lowercase()
        }
        _ => left == right,
    }
}

fn substring_test(
    left: Option<Cow<'_, str>>,
    right: Option<Cow<'_, str>>,
    test: impl Fn(&str, &str) -> bool,
) -> bool {
    match (left, right) {
        (Some(l), Some(r)) => test(&l.to_lowercase(), &r.to_lowercase()),
        _ => false,
    }
}

fn bool_as_digit(text: Cow<'_, str>) -> Cow<'_, str> {
    if text.eq_ignore_ascii_case("true") {
        Cow::Borrowed("1")
    } else if text.eq_ignore_ascii_case("false") {
        Cow::Borrowed("0")
    } else {
        text
    }
}

/// Orders two text forms: as unsigned integers if both parse, else as
/// decimals, else ordinally. Null sorts before everything.
fn compare_ordered(left: Option<&str>, right: Option<&str>) -> Ordering {
    let (l, r) = match (left, right) {
        (Some(l), Some(r)) => (l, r),
        _ => return left.cmp(&right),
    };

    if let (Ok(l), Ok(r)) = (l.parse::<u64>(), r.parse::<u64>()) {
        return l.cmp(&r);
    }
    if let (Ok(l), Ok(r)) = (l.parse::<Decimal>(), r.parse::<Decimal>()) {
        return l.cmp_value(&r);
    }
    l.cmp(r)
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
