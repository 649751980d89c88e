//! Summary text sent to the model: shape, dtypes, missing counts, numeric
//! statistics and correlations, in that order.

use crate::data::{Analysis, CorrelationMatrix, NumericTable};
use crate::stats::{DescriptiveStats, StatsCalculator};

pub const NO_NUMERIC_COLUMNS: &str = "No numeric columns";
pub const NOT_ENOUGH_NUMERIC: &str = "Not enough numeric data";

pub struct SummaryBuilder;

impl SummaryBuilder {
    /// Assemble the summary. Always succeeds; absent parts become placeholders.
    pub fn build(analysis: &Analysis) -> String {
        let (rows, cols) = analysis.shape;

        let numeric = if analysis.numeric.is_empty() {
            NO_NUMERIC_COLUMNS.to_string()
        } else {
            Self::describe(&analysis.numeric)
        };

        let correlations = match &analysis.correlations {
            Some(matrix) => Self::correlation_table(matrix),
            None => NOT_ENOUGH_NUMERIC.to_string(),
        };

        let missing: Vec<(String, String)> = analysis
            .missing
            .iter()
            .map(|m| (m.column.clone(), m.count.to_string()))
            .collect();

        format!(
            "Dataset Shape: ({rows}, {cols})\n\n\
             Columns and Types:\n{}\n\n\
             Missing Values:\n{}\n\n\
             Numeric Summary:\n{numeric}\n\n\
             Correlations:\n{correlations}\n",
            Self::key_value_lines(&analysis.column_types),
            Self::key_value_lines(&missing),
        )
    }

    /// `describe()`-style table: one column per numeric column.
    pub fn describe(numeric: &NumericTable) -> String {
        let stats: Vec<DescriptiveStats> = numeric
            .columns
            .iter()
            .map(|c| StatsCalculator::compute_descriptive_stats(&c.present()))
            .collect();

        let row_labels: Vec<String> = DescriptiveStats::LABELS.iter().map(|s| s.to_string()).collect();
        let cells: Vec<Vec<String>> = (0..row_labels.len())
            .map(|row| stats.iter().map(|s| Self::number(s.values()[row])).collect())
            .collect();

        Self::table(&row_labels, &numeric.names(), &cells)
    }

    pub fn correlation_table(matrix: &CorrelationMatrix) -> String {
        let cells: Vec<Vec<String>> = matrix
            .rows()
            .map(|row| row.iter().map(|v| Self::number(*v)).collect())
            .collect();

        Self::table(&matrix.names, &matrix.names, &cells)
    }

    fn number(value: f64) -> String {
        if value.is_nan() {
            "NaN".to_string()
        } else {
            format!("{value:.6}")
        }
    }

    fn key_value_lines(pairs: &[(String, String)]) -> String {
        if pairs.is_empty() {
            return "(none)".to_string();
        }
        let width = pairs.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
        pairs
            .iter()
            .map(|(k, v)| format!("{k:<width$}    {v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Right-aligned grid with a left-aligned row label column.
    fn table(row_labels: &[String], col_labels: &[String], cells: &[Vec<String>]) -> String {
        let label_width = row_labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let widths: Vec<usize> = col_labels
            .iter()
            .enumerate()
            .map(|(c, label)| {
                cells
                    .iter()
                    .filter_map(|row| row.get(c))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(label.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = " ".repeat(label_width);
        for (label, width) in col_labels.iter().zip(&widths) {
            out.push_str(&format!("  {label:>width$}"));
        }

        for (label, row) in row_labels.iter().zip(cells) {
            out.push_str(&format!("\n{label:<label_width$}"));
            for (cell, width) in row.iter().zip(&widths) {
                out.push_str(&format!("  {cell:>width$}"));
            }
        }
        out
    }
}
