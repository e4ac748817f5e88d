//! Canonicalizing sort.

use std::cmp::Ordering;

use tracing::debug;

use crate::filter::{Clause, Connective, FieldPath, Filter, Predicate};

/// Returns `filter` with its clauses in canonical order.
///
/// The chain is cut into AND-runs at every `OR`. Inside a run, plain
/// conditions come before sub-groups and ties are broken by field path.
/// Runs made of a single plain condition come before longer or grouped
/// runs, again with ties broken by field path. Sub-groups are sorted the
/// same way, recursively. Sorting the result again changes nothing.
///
/// For objects that have every field the filter references, the result
/// matches exactly the same objects as the input. Evaluation stops early,
/// so a reordered filter may resolve a field the input never reached:
/// `[Z] == 1 OR [Missing] == 1` matches `{"Z": 1}`, while its sorted form
/// `[Missing] == 1 OR [Z] == 1` fails with `FieldNotFound`.
///
/// # Example
///
/// ```
/// use criteria_rs::filter::FilterParser;
/// use criteria_rs::plan::sort;
///
/// let filter = FilterParser::parse("[B] == 1 AND [A] == 2 OR [C] == 3").unwrap();
/// assert_eq!(sort(&filter).to_string(), "[C] == 3 OR [A] == 2 AND [B] == 1");
/// ```
pub fn sort(filter: &Filter) -> Filter {
    let mut runs = partition_runs(filter);
    for run in &mut runs {
        run.sort_by(compare_clauses);
    }
    runs.sort_by(|a, b| compare_runs(a, b));

    debug!(runs = runs.len(), "sorted filter");
    reassemble(runs)
}

impl Filter {
    /// Returns this filter in canonical order; see [`sort`].
    pub fn sorted(&self) -> Filter {
        sort(self)
    }
}

/// Splits the chain at OR connectives, sorting sub-groups along the way.
fn partition_runs(filter: &Filter) -> Vec<Vec<Clause>> {
    let mut runs: Vec<Vec<Clause>> = Vec::new();
    for clause in filter {
        let predicate = match clause.predicate() {
            Predicate::Group(group) => Predicate::Group(sort(group)),
            Predicate::Condition(condition) => Predicate::Condition(condition.clone()),
        };
        let clause = Clause {
            connective: clause.connective(),
            predicate,
        };
        match runs.last_mut() {
            Some(run) if clause.connective() != Connective::Or => run.push(clause),
            _ => runs.push(vec![clause]),
        }
    }
    runs
}

fn reassemble(runs: Vec<Vec<Clause>>) -> Filter {
    let clauses = runs
        .into_iter()
        .enumerate()
        .flat_map(|(run_index, run)| {
            run.into_iter().enumerate().map(move |(i, mut clause)| {
                clause.connective = match (run_index, i) {
                    (0, 0) => Connective::None,
                    (_, 0) => Connective::Or,
                    _ => Connective::And,
                };
                clause
            })
        })
        .collect();
    Filter::from_clauses(clauses)
}

fn field_of(clause: &Clause) -> Option<&FieldPath> {
    clause.as_condition().map(|condition| condition.field())
}

/// Renders a clause without its connective, as the last tie-breaker.
fn render(clause: &Clause) -> String {
    match clause.predicate() {
        Predicate::Condition(condition) => condition.to_string(),
        Predicate::Group(group) => format!("({group})"),
    }
}

fn compare_clauses(a: &Clause, b: &Clause) -> Ordering {
    a.is_group()
        .cmp(&b.is_group())
        .then_with(|| field_of(a).cmp(&field_of(b)))
        .then_with(|| render(a).cmp(&render(b)))
}

/// A run is simple when it is one plain condition.
fn is_simple(run: &[Clause]) -> bool {
    matches!(run, [only] if !only.is_group())
}

fn compare_runs(a: &[Clause], b: &[Clause]) -> Ordering {
    let render_run = |run: &[Clause]| run.iter().map(render).collect::<Vec<_>>().join(" AND ");
    is_simple(b)
        .cmp(&is_simple(a))
        .then_with(|| a.first().and_then(field_of).cmp(&b.first().and_then(field_of)))
        .then_with(|| render_run(a).cmp(&render_run(b)))
}
