//! OR-chain splitting.

use tracing::debug;

use crate::filter::{Connective, Filter};

/// Splits a flat OR-chain into consecutive chunks of at most `chunk_size`
/// conditions.
///
/// Returns `None` when the filter is not a flat OR-chain (it has an `AND`
/// at the top level or any sub-group), when `chunk_size` is zero, or when
/// the chain already fits in a single chunk. Callers then use the filter
/// unsplit. An object matches the original filter exactly when it matches
/// at least one of the chunks.
///
/// # Example
///
/// ```
/// use criteria_rs::filter::FilterParser;
/// use criteria_rs::plan::try_split_into_chunks;
///
/// let filter = FilterParser::parse("[Id] == 1 OR [Id] == 2 OR [Id] == 3").unwrap();
/// let chunks = try_split_into_chunks(&filter, 2).unwrap();
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[1].to_string(), "[Id] == 3");
///
/// let mixed = FilterParser::parse("[Id] == 1 AND [Id] == 2 OR [Id] == 3").unwrap();
/// assert!(try_split_into_chunks(&mixed, 2).is_none());
/// ```
pub fn try_split_into_chunks(filter: &Filter, chunk_size: usize) -> Option<Vec<Filter>> {
    if chunk_size == 0 {
        return None;
    }

    let flat_or_chain = filter
        .iter()
        .all(|clause| !clause.is_group() && clause.connective() != Connective::And);
    if !flat_or_chain {
        debug!("filter is not a flat OR-chain, not splitting");
        return None;
    }
    if filter.len() <= chunk_size {
        return None;
    }

    let chunks: Vec<Filter> = filter
        .clauses()
        .chunks(chunk_size)
        .map(|chunk| Filter::from_clauses(chunk.to_vec()))
        .collect();
    debug!(
        conditions = filter.len(),
        chunks = chunks.len(),
        chunk_size,
        "split OR-chain"
    );
    Some(chunks)
}

impl Filter {
    /// Splits a flat OR-chain into chunks; see [`try_split_into_chunks`].
    pub fn try_split_into_chunks(&self, chunk_size: usize) -> Option<Vec<Filter>> {
        try_split_into_chunks(self, chunk_size)
    }
}
