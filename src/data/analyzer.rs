//! Generic Analyzer Module
//! Derives missing-value counts, the numeric subtable and the correlation
//! matrix from a loaded DataFrame.

use crate::data::DataLoader;
use crate::stats::StatsCalculator;
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Count of absent cells in one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingCount {
    pub column: String,
    pub count: usize,
}

/// A numeric column with absent cells (null or NaN) as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl NumericColumn {
    /// Present values only, in row order.
    pub fn present(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }
}

/// Numeric columns of the table, in table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericTable {
    pub columns: Vec<NumericColumn>,
}

impl NumericTable {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn first(&self) -> Option<&NumericColumn> {
        self.columns.first()
    }
}

/// Square matrix of pairwise Pearson coefficients keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    /// Row-major, `names.len()` squared entries.
    pub values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.names.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.size() + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.size().max(1))
    }
}

/// Everything derived from the table, computed once.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub shape: (usize, usize),
    pub column_types: Vec<(String, String)>,
    pub missing: Vec<MissingCount>,
    pub numeric: NumericTable,
    pub correlations: Option<CorrelationMatrix>,
}

impl Analysis {
    /// Columns with at least one absent cell.
    pub fn missing_nonzero(&self) -> Vec<&MissingCount> {
        self.missing.iter().filter(|m| m.count > 0).collect()
    }

    pub fn total_missing(&self) -> usize {
        self.missing.iter().map(|m| m.count).sum()
    }
}

/// Runs the generic analysis over a DataFrame.
pub struct DataAnalyzer;

impl DataAnalyzer {
    pub fn analyze(df: &DataFrame) -> Result<Analysis, AnalyzerError> {
        let missing = Self::missing_values(df)?;
        let numeric = Self::numeric_table(df)?;
        let correlations = Self::correlation_matrix(&numeric);

        let analysis = Analysis {
            shape: df.shape(),
            column_types: DataLoader::get_column_types(df),
            missing,
            numeric,
            correlations,
        };

        info!(
            "analyzed {} columns: {} numeric, {} missing cells, correlations {}",
            analysis.shape.1,
            analysis.numeric.width(),
            analysis.total_missing(),
            if analysis.correlations.is_some() { "computed" } else { "skipped" }
        );
        Ok(analysis)
    }

    /// Absent cells per column: nulls, plus NaN in float columns.
    pub fn missing_values(df: &DataFrame) -> Result<Vec<MissingCount>, AnalyzerError> {
        df.get_columns()
            .iter()
            .map(|col| {
                let mut count = col.null_count();
                if col.dtype().is_float() {
                    let values = col.cast(&DataType::Float64)?;
                    count += values
                        .f64()?
                        .into_iter()
                        .filter(|v| v.is_some_and(f64::is_nan))
                        .count();
                }
                Ok::<_, AnalyzerError>(MissingCount {
                    column: col.name().to_string(),
                    count,
                })
            })
            .collect()
    }

    /// Numeric columns as `f64` with NaN folded into `None`.
    pub fn numeric_table(df: &DataFrame) -> Result<NumericTable, AnalyzerError> {
        let mut columns = Vec::new();

        for name in DataLoader::get_numeric_columns(df) {
            let series = df.column(&name)?;
            let value_f64 = series.cast(&DataType::Float64)?;
            let values = value_f64
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            columns.push(NumericColumn { name, values });
        }

        debug!("numeric columns: {:?}", columns.iter().map(|c| &c.name).collect::<Vec<_>>());
        Ok(NumericTable { columns })
    }

    /// Pairwise correlations, `None` with fewer than two numeric columns.
    pub fn correlation_matrix(numeric: &NumericTable) -> Option<CorrelationMatrix> {
        let n = numeric.width();
        if n < 2 {
            return None;
        }

        let mut values = vec![f64::NAN; n * n];
        for i in 0..n {
            for j in i..n {
                let r = StatsCalculator::pearson(&numeric.columns[i].values, &numeric.columns[j].values);
                values[i * n + j] = r;
                values[j * n + i] = r;
            }
        }

        Some(CorrelationMatrix {
            names: numeric.names(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_frame() -> DataFrame {
        df![
            "a" => [1i64, 2, 3, 4, 5],
            "b" => [Some(2.0f64), None, Some(5.0), None, Some(9.0)],
            "c" => ["x", "y", "z", "w", "v"],
        ]
        .unwrap()
    }

    #[test]
    fn scenario_missing_numeric_and_correlation() {
        let analysis = DataAnalyzer::analyze(&scenario_frame()).unwrap();

        let missing: Vec<(&str, usize)> = analysis
            .missing
            .iter()
            .map(|m| (m.column.as_str(), m.count))
            .collect();
        assert_eq!(missing, vec![("a", 0), ("b", 2), ("c", 0)]);
        assert_eq!(analysis.numeric.names(), vec!["a", "b"]);
        assert_eq!(analysis.numeric.first().unwrap().name, "a");

        let corr = analysis.correlations.unwrap();
        assert_eq!(corr.size(), 2);
        assert!((corr.get(0, 0) - 1.0).abs() < 1e-12);
        assert!((corr.get(1, 1) - 1.0).abs() < 1e-12);
        assert_eq!(corr.get(0, 1), corr.get(1, 0));
    }

    #[test]
    fn missing_sum_equals_absent_cells() {
        let df = df![
            "x" => [Some(1.0f64), None, Some(f64::NAN), None],
            "y" => [None, Some("a"), None, Some("b")],
            "z" => [Some(1i32), Some(2), Some(3), None],
        ]
        .unwrap();
        let analysis = DataAnalyzer::analyze(&df).unwrap();
        // x: two nulls and one NaN, y: two nulls, z: one null.
        assert_eq!(analysis.total_missing(), 6);
        assert_eq!(analysis.missing_nonzero().len(), 3);
    }

    #[test]
    fn single_numeric_column_has_no_correlations() {
        let df = df![
            "n" => [1.0f64, 2.0, 3.0],
            "s" => ["a", "b", "c"],
        ]
        .unwrap();
        let analysis = DataAnalyzer::analyze(&df).unwrap();
        assert_eq!(analysis.numeric.width(), 1);
        assert!(analysis.correlations.is_none());
    }

    #[test]
    fn text_only_table_is_degenerate_but_valid() {
        let df = df!["s" => ["a", "b"]].unwrap();
        let analysis = DataAnalyzer::analyze(&df).unwrap();
        assert!(analysis.numeric.is_empty());
        assert!(analysis.correlations.is_none());
        assert_eq!(analysis.shape, (2, 1));
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let numeric = NumericTable {
            columns: vec![
                NumericColumn {
                    name: "p".into(),
                    values: vec![Some(1.0), Some(2.0), Some(4.0), Some(8.0)],
                },
                NumericColumn {
                    name: "q".into(),
                    values: vec![Some(3.0), Some(1.0), Some(4.0), Some(1.0)],
                },
                NumericColumn {
                    name: "r".into(),
                    values: vec![Some(0.5), None, Some(0.25), Some(2.0)],
                },
            ],
        };
        let corr = DataAnalyzer::correlation_matrix(&numeric).unwrap();
        for i in 0..3 {
            assert!((corr.get(i, i) - 1.0).abs() < 1e-12);
            for j in 0..3 {
                assert_eq!(corr.get(i, j), corr.get(j, i));
                assert!(corr.get(i, j).abs() <= 1.0);
            }
        }
    }
}
