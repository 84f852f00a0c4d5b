use prettytable::{format, Cell, Row, Table};

use crate::image_processing::batch::BatchReport;
use crate::utils::{display_name, format_duration};

const MAX_CELL_WIDTH: usize = 60;

/// Build the per-file outcome table printed by `--report`
pub fn outcome_table(report: &BatchReport) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);

    table.add_row(Row::new(vec![
        Cell::new("#"),
        Cell::new("Input"),
        Cell::new("Output / Error"),
        Cell::new("Status"),
    ]));

    for (index, outcome) in report.outcomes.iter().enumerate() {
        let (detail, status) = match &outcome.result {
            Ok(output) => (output.display().to_string(), "OK"),
            Err(e) => (e.to_string(), "FAILED"),
        };

        table.add_row(Row::new(vec![
            Cell::new(&(index + 1).to_string()),
            Cell::new(&display_name(&outcome.source)),
            Cell::new(&truncate(&detail, MAX_CELL_WIDTH)),
            Cell::new(status),
        ]));
    }

    table
}

/// Print the complete report as a formatted table
pub fn print_report(report: &BatchReport) {
    println!("\nREPORT\n");

    if report.outcomes.is_empty() {
        println!("No images were processed.\n");
        return;
    }

    outcome_table(report).printstd();
    println!(
        "\n{} of {} written ({:.1}%), {} per image\n",
        report.successful(),
        report.total(),
        report.success_rate(),
        format_duration(report.average_duration())
    );
}

/// Shorten `text` to at most `max` characters, keeping the tail
fn truncate(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - (max - 3)).collect();
    format!("...{}", tail)
}
