//! Filter expression engine.
//!
//! This crate implements a small query language for boolean selection
//! criteria over object fields:
//!
//! - [`filter`] - the filter tree, its textual grammar, and an in-memory evaluator
//! - [`plan`] - rewrites applied before handing a filter to a backend
//! - [`config`] - tunable limits
//!
//! The functions at the crate root are the boundary used by query layers:
//!
//! ```
//! let filter = criteria_rs::parse("[Age] > 30 AND [Age] < 40").unwrap();
//! assert_eq!(criteria_rs::serialize(&filter), "[Age] > 30 AND [Age] < 40");
//!
//! let person = serde_json::json!({ "Age": 35 });
//! assert!(criteria_rs::matches(&filter, &person).unwrap());
//! ```

pub mod config;
pub mod filter;
pub mod plan;

pub use config::EngineSettings;
pub use filter::{matches, FieldAccessor, Filter, FilterError, FilterResult};
pub use plan::{sort, try_split_into_chunks};

/// Parses the textual grammar into a filter.
///
/// # Errors
///
/// Returns `FilterError::Syntax` if the text is malformed.
pub fn parse(text: &str) -> FilterResult<Filter> {
    filter::FilterParser::parse(text)
}

/// Serializes a filter to the textual grammar.
pub fn serialize(filter: &Filter) -> String {
    filter::FilterBuilder::build(filter)
}
