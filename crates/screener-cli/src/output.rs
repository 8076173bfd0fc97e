use serde_json::json;

use crate::cli::OutputFormat;
use crate::commands::{CommandResult, Table};
use crate::error::CliError;

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = json!({
                "data": result.data,
                "errors": result.errors,
            });
            let payload = if pretty {
                serde_json::to_string_pretty(&payload)?
            } else {
                serde_json::to_string(&payload)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => render_table(result),
    }

    Ok(())
}

fn render_table(result: &CommandResult) {
    for line in table_lines(&result.table) {
        println!("{line}");
    }

    if !result.errors.is_empty() {
        println!("errors:");
        for issue in &result.errors {
            println!("  - {} {}: {}", issue.source, issue.code, issue.message);
        }
    }
}

fn table_lines(table: &Table) -> Vec<String> {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(table.rows.len() + 1);
    lines.push(format_row(&table.headers, &widths));
    for row in &table.rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(format_row(&cells, &widths));
    }
    lines
}

fn format_row(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_the_widest_cell() {
        let mut table = Table::new(vec!["ticker", "price"]);
        table.push(vec![String::from("THYAO.IS"), String::from("$1.00")]);
        table.push(vec![String::from("A.IS"), String::from("$250.50")]);

        assert_eq!(
            table_lines(&table),
            vec![
                "ticker    price",
                "THYAO.IS  $1.00",
                "A.IS      $250.50",
            ]
        );
    }
}
