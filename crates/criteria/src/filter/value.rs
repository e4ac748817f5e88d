//! Literal values used as operands and as evaluated field contents.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Most integer digits a [`Decimal`] accepts before a literal falls through to floating point.
const MAX_DECIMAL_INTEGER_DIGITS: usize = 28;

/// A base-10 fixed-point number kept exactly as written.
///
/// Only the sign, integer digits, and fraction digits are stored, so `1.50`
/// serializes back as `1.50`. Numeric ordering is available through
/// [`Decimal::cmp_value`]; derived equality is representational.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Decimal {
    negative: bool,
    /// Integer digits without leading zeros; `"0"` for zero.
    integer: String,
    /// Fraction digits as written, possibly empty.
    fraction: String,
}

impl Decimal {
    /// Creates a decimal from a mantissa and a scale, so `Decimal::new(12345, 2)` is `123.45`.
    pub fn new(mantissa: i64, scale: u32) -> Self {
        let digits = mantissa.unsigned_abs().to_string();
        let scale = scale as usize;
        let (integer, fraction) = if digits.len() > scale {
            let split = digits.len() - scale;
            (digits[..split].to_string(), digits[split..].to_string())
        } else {
            ("0".to_string(), format!("{digits:0>scale$}"))
        };
        Self::from_parts(mantissa < 0, &integer, fraction)
    }

    fn from_parts(negative: bool, integer: &str, fraction: String) -> Self {
        let integer = integer.trim_start_matches('0');
        let integer = if integer.is_empty() { "0" } else { integer }.to_string();
        let is_zero = integer == "0" && fraction.bytes().all(|b| b == b'0');
        Self {
            negative: negative && !is_zero,
            integer,
            fraction,
        }
    }

    /// Returns true if the value is below zero.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Compares two decimals by numeric value.
    pub fn cmp_value(&self, other: &Decimal) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
        }
    }

    fn cmp_magnitude(&self, other: &Decimal) -> Ordering {
        self.integer
            .len()
            .cmp(&other.integer.len())
            .then_with(|| self.integer.cmp(&other.integer))
            .then_with(|| {
                let width = self.fraction.len().max(other.fraction.len());
                let left = format!("{:0<width$}", self.fraction);
                let right = format!("{:0<width$}", other.fraction);
                left.cmp(&right)
            })
    }

    /// Converts to the nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }
}

/// Error returned when text is not a plain decimal literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDecimalError(String);

impl fmt::Display for ParseDecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid decimal literal '{}'", self.0)
    }
}

impl std::error::Error for ParseDecimalError {}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseDecimalError(s.to_string());
        let (negative, unsigned) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if integer.is_empty() && fraction.is_empty() {
            return Err(err());
        }
        if !all_digits(integer) || !all_digits(fraction) {
            return Err(err());
        }
        if integer.trim_start_matches('0').len() > MAX_DECIMAL_INTEGER_DIGITS {
            return Err(err());
        }
        Ok(Self::from_parts(negative, integer, fraction.to_string()))
    }
}

impl TryFrom<String> for Decimal {
    type Error = ParseDecimalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Decimal> for String {
    fn from(value: Decimal) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str(&self.integer)?;
        if !self.fraction.is_empty() {
            write!(f, ".{}", self.fraction)?;
        }
        Ok(())
    }
}

/// The declared type of a numeric operand.
///
/// The width is kept so a filter serializes back the way it was built; it
/// never affects how values compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    Decimal,
    F32,
    F64,
}

/// A numeric literal that remembers its declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Number {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    Decimal(Decimal),
    F32(f32),
    F64(f64),
}

impl Number {
    /// Parses `text` as the narrowest numeric type that accepts it.
    ///
    /// Types are tried in widening order: unsigned before signed at each
    /// integer width, then decimal, then single and double precision floats.
    /// A float type is only chosen when its rendering denotes the same value
    /// as `text`, so out-of-range literals such as `1e400` are rejected
    /// rather than read as infinity. `inf` and `nan` spelled out are kept.
    pub fn parse_narrowest(text: &str) -> Option<Number> {
        if let Ok(v) = text.parse() {
            return Some(Number::U8(v));
        }
        if let Ok(v) = text.parse() {
            return Some(Number::I8(v));
        }
        if let Ok(v) = text.parse() {
            return Some(Number::U16(v));
        }
        if let Ok(v) = text.parse() {
            return Some(Number::I16(v));
        }
        if let Ok(v) = text.parse() {
            return Some(Number::U32(v));
        }
        if let Ok(v) = text.parse() {
            return Some(Number::I32(v));
        }
        if let Ok(v) = text.parse() {
            return Some(Number::U64(v));
        }
        if let Ok(v) = text.parse() {
            return Some(Number::I64(v));
        }
        if let Ok(v) = text.parse() {
            return Some(Number::Decimal(v));
        }
        let wide = text.parse::<f64>().ok()?;
        if let Ok(v) = text.parse::<f32>() {
            let exact = v.is_finite() && v.to_string().parse::<f64>() == Ok(wide);
            if exact || spells_non_finite(text) {
                return Some(Number::F32(v));
            }
        }
        (wide.is_finite() || spells_non_finite(text)).then_some(Number::F64(wide))
    }

    /// Returns the declared type of this number.
    pub fn kind(&self) -> NumberKind {
        match self {
            Number::U8(_) => NumberKind::U8,
            Number::I8(_) => NumberKind::I8,
            Number::U16(_) => NumberKind::U16,
            Number::I16(_) => NumberKind::I16,
            Number::U32(_) => NumberKind::U32,
            Number::I32(_) => NumberKind::I32,
            Number::U64(_) => NumberKind::U64,
            Number::I64(_) => NumberKind::I64,
            Number::Decimal(_) => NumberKind::Decimal,
            Number::F32(_) => NumberKind::F32,
            Number::F64(_) => NumberKind::F64,
        }
    }
}

/// Returns true if `text` names infinity or NaN rather than overflowing to it.
fn spells_non_finite(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    ["inf", "infinity", "nan"]
        .iter()
        .any(|word| unsigned.eq_ignore_ascii_case(word))
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::U8(v) => fmt::Display::fmt(v, f),
            Number::I8(v) => fmt::Display::fmt(v, f),
            Number::U16(v) => fmt::Display::fmt(v, f),
            Number::I16(v) => fmt::Display::fmt(v, f),
            Number::U32(v) => fmt::Display::fmt(v, f),
            Number::I32(v) => fmt::Display::fmt(v, f),
            Number::U64(v) => fmt::Display::fmt(v, f),
            Number::I64(v) => fmt::Display::fmt(v, f),
            Number::Decimal(v) => fmt::Display::fmt(v, f),
            Number::F32(v) => fmt::Display::fmt(v, f),
            Number::F64(v) => fmt::Display::fmt(v, f),
        }
    }
}

macro_rules! number_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::$variant(value)
                }
            }
        )*
    };
}

number_from! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    Decimal => Decimal,
    f32 => F32,
    f64 => F64,
}

/// A reference to a directory principal (a user or group).
///
/// Principals compare by name; the optional id is carried for callers that
/// resolve it elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Account or group name.
    pub name: String,
    /// Directory object id, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

impl Principal {
    /// Creates a principal reference by name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    /// Attaches a directory id.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }
}

/// A field value exposed by an evaluated object.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    Uuid(Uuid),
    Text(String),
}

impl Value {
    /// Returns the text form used for comparisons, or `None` for null.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Uuid(u) => Some(Cow::Owned(u.hyphenated().to_string())),
            Value::Text(s) => Some(Cow::Borrowed(s)),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

macro_rules! value_from_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(value.into())
                }
            }
        )*
    };
}

value_from_number!(u8, i8, u16, i16, u32, i32, u64, i64, Decimal, f32, f64);

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
