//! Query-plan rewrites over filter trees.
//!
//! Both transformations are pure: they read a [`Filter`] and return new
//! filters that evaluate the same way as the input.
//!
//! - [`sort`] reorders clauses into a canonical, planner-friendly order.
//! - [`try_split_into_chunks`] breaks a long OR-chain into bounded batches.
//!
//! [`Filter`]: crate::filter::Filter

mod sort;
mod split;

pub use sort::sort;
pub use split::try_split_into_chunks;
