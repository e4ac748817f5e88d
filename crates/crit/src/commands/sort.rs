//! Sort command implementation.
//!
//! Prints a filter with its clauses in canonical order.

use criteria_rs::sort;

use super::{CommandContext, Result};
use crate::output::{format_filter, FilterOutput};

/// Executes the sort command.
pub fn execute(ctx: &CommandContext, expr: &str) -> Result<()> {
    let filter = ctx.parse(expr)?;
    let sorted = sort(&filter);

    if ctx.json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&FilterOutput::new(&sorted))?
        );
    } else {
        println!("{}", format_filter(&sorted, ctx.use_colors));
    }

    Ok(())
}
