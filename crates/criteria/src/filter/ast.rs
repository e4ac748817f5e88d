//! Abstract Syntax Tree (AST) for filter expressions.
//!
//! A [`Filter`] is a flat chain of [`Clause`]s. Each clause is either a single
//! [`Condition`] or a parenthesized sub-group, and carries the [`Connective`]
//! that joins it to the clause before it. The empty chain matches everything.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{FilterError, FilterResult};
use super::value::{Decimal, Number, Principal};

// ==================== Vocabulary ====================

/// A relational operator comparing a field to an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Contains,
    StartsWith,
    EndsWith,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Operator {
    /// Every operator, in the order keywords are listed in the grammar.
    pub const ALL: [Operator; 9] = [
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterThanOrEqual,
        Operator::LessThanOrEqual,
        Operator::GreaterThan,
        Operator::LessThan,
    ];

    /// Returns the keyword used for this operator in the textual grammar.
    pub fn keyword(self) -> &'static str {
        match self {
            Operator::Contains => "CONTAINS",
            Operator::StartsWith => "STARTSWITH",
            Operator::EndsWith => "ENDSWITH",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
        }
    }

    /// Looks up an operator by keyword, ignoring ASCII case.
    pub fn from_keyword(word: &str) -> Option<Operator> {
        Self::ALL
            .into_iter()
            .find(|op| op.keyword().eq_ignore_ascii_case(word))
    }

    /// Returns true for `==` and `!=`.
    pub fn is_equality(self) -> bool {
        matches!(self, Operator::Equal | Operator::NotEqual)
    }

    /// Returns true for `<`, `<=`, `>`, and `>=`.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::LessThan
                | Operator::LessThanOrEqual
                | Operator::GreaterThan
                | Operator::GreaterThanOrEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The logical join between a clause and the clause before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connective {
    /// First clause of a chain.
    #[default]
    None,
    And,
    Or,
}

impl Connective {
    /// Returns the keyword used in the textual grammar (empty for `None`).
    pub fn keyword(self) -> &'static str {
        match self {
            Connective::None => "",
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }

    /// Looks up `AND` or `OR`, ignoring ASCII case.
    pub fn from_keyword(word: &str) -> Option<Connective> {
        if word.eq_ignore_ascii_case("AND") {
            Some(Connective::And)
        } else if word.eq_ignore_ascii_case("OR") {
            Some(Connective::Or)
        } else {
            None
        }
    }
}

/// How the right-hand side of a condition is to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    OtherField,
    OtherBool,
    OtherUuid,
    OtherNumeric,
    OtherText,
}

// ==================== Field Paths ====================

/// Separator between path segments in the textual form.
const PATH_SEPARATOR: char = '.';

/// A path to a (possibly nested) field, such as `Owner.Name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a dotted path.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidFilter` if the path is empty, has an empty
    /// segment, or contains `]`.
    pub fn parse(path: &str) -> FilterResult<Self> {
        Self::from_segments(path.split(PATH_SEPARATOR))
    }

    /// Builds a path from individual segments.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidFilter` if there are no segments, or a
    /// segment is empty or contains `.` or `]`.
    pub fn from_segments<I, S>(segments: I) -> FilterResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(FilterError::invalid("field path is empty"));
        }
        for segment in &segments {
            if segment.is_empty() {
                return Err(FilterError::invalid("field path has an empty segment"));
            }
            if segment.contains(PATH_SEPARATOR) || segment.contains(']') {
                return Err(FilterError::invalid(format!(
                    "field path segment '{segment}' contains a reserved character"
                )));
            }
        }
        Ok(Self { segments })
    }

    /// Returns the individual segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(value: FieldPath) -> Self {
        value.to_string()
    }
}

// ==================== Operands ====================

/// The right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Null; only valid with `==` and `!=`.
    Null,
    /// Another field of the same object.
    Field(FieldPath),
    Bool(bool),
    Uuid(Uuid),
    Number(Number),
    Text(String),
}

impl Operand {
    /// Returns the target kind implied by this operand.
    pub fn target_kind(&self) -> TargetKind {
        match self {
            Operand::Field(_) => TargetKind::OtherField,
            Operand::Bool(_) => TargetKind::OtherBool,
            Operand::Uuid(_) => TargetKind::OtherUuid,
            Operand::Number(_) => TargetKind::OtherNumeric,
            Operand::Null | Operand::Text(_) => TargetKind::OtherText,
        }
    }

    /// Returns true if this is the null operand.
    pub fn is_null(&self) -> bool {
        matches!(self, Operand::Null)
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Operand::Bool(value)
    }
}

impl From<Uuid> for Operand {
    fn from(value: Uuid) -> Self {
        Operand::Uuid(value)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Text(value.to_string())
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Text(value)
    }
}

impl From<&Principal> for Operand {
    fn from(value: &Principal) -> Self {
        Operand::Text(value.name.clone())
    }
}

impl From<Number> for Operand {
    fn from(value: Number) -> Self {
        Operand::Number(value)
    }
}

macro_rules! operand_from_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Self {
                    Operand::Number(value.into())
                }
            }
        )*
    };
}

operand_from_number!(u8, i8, u16, i16, u32, i32, u64, i64, Decimal, f32, f64);

impl<T: Into<Operand>> From<Option<T>> for Operand {
    fn from(value: Option<T>) -> Self {
        value.map_or(Operand::Null, Into::into)
    }
}

// ==================== Conditions ====================

/// A single comparison: `[field] operator operand`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCondition")]
pub struct Condition {
    field: FieldPath,
    operator: Operator,
    operand: Operand,
}

#[derive(Deserialize)]
struct RawCondition {
    field: FieldPath,
    operator: Operator,
    operand: Operand,
}

impl TryFrom<RawCondition> for Condition {
    type Error = FilterError;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        Condition::new(raw.field, raw.operator, raw.operand)
    }
}

impl Condition {
    /// Creates a condition.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidFilter` if the operand is null and the
    /// operator is anything other than `==` or `!=`.
    pub fn new(field: FieldPath, operator: Operator, operand: Operand) -> FilterResult<Self> {
        if operand.is_null() && !operator.is_equality() {
            return Err(FilterError::invalid(format!(
                "null can only be compared with == or !=, not {operator}"
            )));
        }
        Ok(Self {
            field,
            operator,
            operand,
        })
    }

    /// The field on the left-hand side.
    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// The target kind implied by the operand.
    pub fn target_kind(&self) -> TargetKind {
        self.operand.target_kind()
    }

    /// Returns true for `== NULL` and `!= NULL` conditions.
    pub fn is_null_comparison(&self) -> bool {
        self.operand.is_null()
    }
}

// ==================== Filter Chains ====================

/// What a clause tests: a single condition or a nested group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Condition(Condition),
    Group(Filter),
}

/// One element of a filter chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub(crate) connective: Connective,
    pub(crate) predicate: Predicate,
}

impl Clause {
    /// How this clause joins the clause before it.
    pub fn connective(&self) -> Connective {
        self.connective
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Returns the condition if this clause is a leaf.
    pub fn as_condition(&self) -> Option<&Condition> {
        match &self.predicate {
            Predicate::Condition(condition) => Some(condition),
            Predicate::Group(_) => None,
        }
    }

    /// Returns the nested filter if this clause is a sub-group.
    pub fn as_group(&self) -> Option<&Filter> {
        match &self.predicate {
            Predicate::Group(group) => Some(group),
            Predicate::Condition(_) => None,
        }
    }

    /// Returns true if this clause is a parenthesized sub-group.
    pub fn is_group(&self) -> bool {
        matches!(self.predicate, Predicate::Group(_))
    }
}

/// A filter expression: a chain of clauses joined by AND/OR.
///
/// Filters are values. Every combinator borrows its inputs and returns a new
/// filter, so a filter handed to another layer never changes underneath it.
///
/// # Example
///
/// ```
/// use criteria_rs::filter::{Filter, Operator};
///
/// let adults = Filter::condition("Age", Operator::GreaterThanOrEqual, 18).unwrap();
/// let named = Filter::condition("Name", Operator::StartsWith, "A").unwrap();
/// let filter = adults.and(&named);
///
/// assert_eq!(filter.to_string(), "[Age] >= 18 AND [Name] STARTSWITH \"A\"");
/// assert_eq!(adults.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Clause>", into = "Vec<Clause>")]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// Returns the empty filter, which matches everything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a single-condition filter comparing `field` to a literal.
    ///
    /// The operand type follows the Rust type of `value`: integers keep their
    /// width, `&str`/`String` become text, `Option::None` becomes null.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidFilter` if the field path is malformed or
    /// a null operand is used with an operator other than `==`/`!=`.
    pub fn condition(
        field: &str,
        operator: Operator,
        value: impl Into<Operand>,
    ) -> FilterResult<Self> {
        let condition = Condition::new(FieldPath::parse(field)?, operator, value.into())?;
        Ok(Self::from_condition(condition))
    }

    /// Creates a single-condition filter comparing two fields of the same object.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidFilter` if either field path is malformed.
    pub fn field_comparison(field: &str, operator: Operator, other: &str) -> FilterResult<Self> {
        let operand = Operand::Field(FieldPath::parse(other)?);
        let condition = Condition::new(FieldPath::parse(field)?, operator, operand)?;
        Ok(Self::from_condition(condition))
    }

    /// Creates a `== NULL` or `!= NULL` condition.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidFilter` if the field path is malformed or
    /// `operator` is not `==`/`!=`.
    pub fn null_comparison(field: &str, operator: Operator) -> FilterResult<Self> {
        Self::condition(field, operator, Operand::Null)
    }

    /// Wraps a condition as a one-clause filter.
    pub fn from_condition(condition: Condition) -> Self {
        Self {
            clauses: vec![Clause {
                connective: Connective::None,
                predicate: Predicate::Condition(condition),
            }],
        }
    }

    /// Builds a chain from clauses, resetting the first connective to `None`.
    ///
    /// Empty groups are dropped and any later clause without a connective is
    /// joined with AND.
    pub(crate) fn from_clauses(clauses: Vec<Clause>) -> Self {
        let clauses = clauses
            .into_iter()
            .filter(|clause| !clause.as_group().is_some_and(Filter::is_empty))
            .enumerate()
            .map(|(i, mut clause)| {
                clause.connective = match (i, clause.connective) {
                    (0, _) => Connective::None,
                    (_, Connective::None) => Connective::And,
                    (_, connective) => connective,
                };
                clause
            })
            .collect();
        Self { clauses }
    }

    /// Returns true if this filter has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns the number of top-level clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Returns the top-level clauses in chain order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.clauses.iter()
    }

    /// Returns a chain of `self` followed by `other`, joined with AND.
    ///
    /// The clauses of `other` are appended as they are, so `a OR b` followed
    /// by `c` reads `a OR b AND c`. Use [`Filter::grouped`] on either side to
    /// keep it together. An empty filter on either side is the identity.
    pub fn and(&self, other: &Filter) -> Filter {
        self.join(other, Connective::And)
    }

    /// Returns a chain of `self` followed by `other`, joined with OR.
    ///
    /// An empty filter on either side is the identity.
    pub fn or(&self, other: &Filter) -> Filter {
        self.join(other, Connective::Or)
    }

    /// Merges two independently built fragments with AND, skipping empty ones.
    pub fn concat(a: &Filter, b: &Filter) -> Filter {
        a.and(b)
    }

    /// Returns a deep copy of this filter.
    pub fn copy(&self) -> Filter {
        self.clone()
    }

    /// Wraps the whole chain as a single parenthesized group.
    ///
    /// Grouping the empty filter yields the empty filter.
    pub fn grouped(&self) -> Filter {
        if self.is_empty() {
            return Filter::empty();
        }
        Self {
            clauses: vec![Clause {
                connective: Connective::None,
                predicate: Predicate::Group(self.clone()),
            }],
        }
    }

    fn join(&self, other: &Filter, connective: Connective) -> Filter {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let mut clauses = Vec::with_capacity(self.len() + other.len());
        clauses.extend(self.clauses.iter().cloned());
        clauses.extend(other.clauses.iter().cloned().enumerate().map(|(i, mut clause)| {
            if i == 0 {
                clause.connective = connective;
            }
            clause
        }));
        Self { clauses }
    }

    /// Counts leaf conditions at every nesting level.
    pub fn condition_count(&self) -> usize {
        self.clauses
            .iter()
            .map(|clause| match &clause.predicate {
                Predicate::Condition(_) => 1,
                Predicate::Group(group) => group.condition_count(),
            })
            .sum()
    }
}

impl<'a> IntoIterator for &'a Filter {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}

impl TryFrom<Vec<Clause>> for Filter {
    type Error = FilterError;

    fn try_from(clauses: Vec<Clause>) -> Result<Self, Self::Error> {
        for (i, clause) in clauses.iter().enumerate() {
            match (i, clause.connective) {
                (0, Connective::None) => {}
                (0, _) => {
                    return Err(FilterError::invalid(
                        "the first clause of a chain cannot have a connective",
                    ))
                }
                (_, Connective::None) => {
                    return Err(FilterError::invalid(
                        "only the first clause of a chain may omit its connective",
                    ))
                }
                _ => {}
            }
            if clause.as_group().is_some_and(Filter::is_empty) {
                return Err(FilterError::invalid("a group cannot be empty"));
            }
        }
        Ok(Self { clauses })
    }
}

impl From<Filter> for Vec<Clause> {
    fn from(filter: Filter) -> Self {
        filter.clauses
    }
}

impl From<Condition> for Filter {
    fn from(condition: Condition) -> Self {
        Filter::from_condition(condition)
    }
}
