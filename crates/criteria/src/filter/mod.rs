//! Filter expressions: tree, textual grammar, and evaluator.
//!
//! A filter selects objects by comparing their fields to literals or to
//! other fields. Filters can be built in code, parsed from text, serialized
//! back to text, and evaluated directly against objects.
//!
//! # Syntax
//!
//! ## Conditions
//! - `[Field] == "text"` - Field names go in brackets, text in double quotes
//! - `[Owner.Name] != NULL` - Dotted paths reach nested fields
//! - `[Age] >= 18`, `[Active] == TRUE` - Numbers, booleans, and UUIDs are bare
//! - `[Start] < [End]` - Compare two fields of the same object
//!
//! ## Operators
//! - `CONTAINS`, `STARTSWITH`, `ENDSWITH` - Case-insensitive text tests
//! - `==`, `!=` - Case-insensitive equality
//! - `<`, `<=`, `>`, `>=` - Numeric when both sides are numbers, else ordinal
//!
//! ## Combining
//! - `AND`, `OR` - Join conditions; `AND` binds tighter, so `a AND b OR c`
//!   is `(a AND b) OR c`
//! - `()` - Grouping
//!
//! # Example
//!
//! ```
//! use criteria_rs::filter::{Filter, FilterEvaluator, FilterParser, Operator};
//! use serde_json::json;
//!
//! // Parse a filter expression
//! let parsed = FilterParser::parse("([A] == 1 OR [B] == 2) AND [C] == TRUE").unwrap();
//!
//! // Or build the same one in code
//! let built = Filter::condition("A", Operator::Equal, 1u8)
//!     .unwrap()
//!     .or(&Filter::condition("B", Operator::Equal, 2u8).unwrap())
//!     .grouped()
//!     .and(&Filter::condition("C", Operator::Equal, true).unwrap());
//! assert_eq!(parsed, built);
//!
//! // Evaluate against an object
//! let evaluator = FilterEvaluator::new(&parsed);
//! assert!(evaluator.matches(&json!({ "A": 1, "C": true })).unwrap());
//! assert!(!evaluator.matches(&json!({ "A": 1, "C": false })).unwrap());
//! ```

mod ast;
mod builder;
mod error;
mod evaluator;
mod lexer;
mod parser;
mod value;

pub use ast::{
    Clause, Condition, Connective, FieldPath, Filter, Operand, Operator, Predicate, TargetKind,
};
pub use builder::FilterBuilder;
pub use error::{FilterError, FilterResult};
pub use evaluator::{matches, FieldAccessor, FieldValue, FilterEvaluator};
pub use parser::FilterParser;
pub use value::{Decimal, Number, NumberKind, ParseDecimalError, Principal, Value};
