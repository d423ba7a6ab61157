//! `calculadora history`: print stored operations.

use clap::Args;

use crate::calculator::Calculator;
use crate::history::{HistoryFilter, OperationRecord};

#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    /// Only show this operation (e.g. "suma", "div")
    #[arg(short, long)]
    pub operation: Option<String>,

    /// Only show operations from this UTC day (YYYY-MM-DD)
    #[arg(short, long, conflicts_with = "operation")]
    pub date: Option<String>,
}

/// Run the history command.
pub async fn run_history_command(args: HistoryArgs, calculator: &Calculator) -> anyhow::Result<()> {
    let records = match (args.operation, args.date) {
        (Some(op), _) => calculator.history_by_operation(&op).await?,
        (None, Some(date)) => calculator.history_by_date(&date).await?,
        (None, None) => calculator.list_history(HistoryFilter::All).await?,
    };

    if records.is_empty() {
        println!("No operations recorded.");
        return Ok(());
    }

    println!("History ({} operations):", records.len());
    println!();
    for line in format_history(&records) {
        println!("  {}", line);
    }

    Ok(())
}

/// One aligned line per record: date, operation, operands, result.
pub fn format_history(records: &[OperationRecord]) -> Vec<String> {
    // Find the longest operation name for alignment
    let width = records
        .iter()
        .map(|r| r.operation.name().len())
        .max()
        .unwrap_or(0);

    records
        .iter()
        .map(|r| {
            let operands = r
                .operands
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "{}  {:width$}  [{}] = {}",
                r.timestamp.format("%Y-%m-%d %H:%M:%S"),
                r.operation.name(),
                operands,
                r.result,
                width = width
            )
        })
        .collect()
}
