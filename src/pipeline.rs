//! Analysis pipeline: load → analyze → plot → summarize → report.
//!
//! Stages run in a fixed order and each consumes the previous stage's output.
//! The summary is always built, whether or not numeric columns exist.

use crate::charts::{
    ChartError, StaticChartRenderer, CORRELATION_HEATMAP_FILE, DISTRIBUTION_FILE,
    MISSING_VALUES_FILE,
};
use crate::config::ConfigError;
use crate::data::{Analysis, AnalyzerError, DataAnalyzer, DataLoader, LoaderError};
use crate::report::{ChatClient, ReportError, ReportGenerator, SummaryBuilder};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Data(#[from] LoaderError),
    #[error(transparent)]
    Analysis(#[from] AnalyzerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] ChartError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl PipelineError {
    /// Process exit status for this failure. 1 is reserved for usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Data(_) | PipelineError::Analysis(_) => 2,
            PipelineError::Config(_) => 3,
            PipelineError::Report(ReportError::Network(_) | ReportError::InvalidResponse(_)) => 4,
            PipelineError::Render(_) => 5,
            PipelineError::Report(ReportError::Write { .. }) => 6,
        }
    }
}

pub const NO_MISSING_VALUES_NOTICE: &str = "No missing values found; skipping missing values chart.";

/// Chart files written by one run; `None` where the precondition was unmet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedCharts {
    pub missing_values: Option<PathBuf>,
    pub correlation_heatmap: Option<PathBuf>,
    pub distribution: Option<PathBuf>,
    /// Informational lines for the user, in the order they arose.
    pub notices: Vec<&'static str>,
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub analysis: Analysis,
    pub charts: RenderedCharts,
    pub readme: PathBuf,
}

pub struct Pipeline<C: ChatClient> {
    out_dir: PathBuf,
    reporter: ReportGenerator<C>,
}

impl<C: ChatClient> Pipeline<C> {
    pub fn new(client: C, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            reporter: ReportGenerator::new(client),
        }
    }

    pub fn run(&self, dataset: &Path) -> Result<PipelineOutcome, PipelineError> {
        let df = DataLoader::load_csv(dataset)?;
        let analysis = DataAnalyzer::analyze(&df)?;

        let charts = self.render_charts(&analysis)?;
        for notice in &charts.notices {
            println!("{notice}");
        }
        println!("Charts generated successfully");

        let summary = SummaryBuilder::build(&analysis);
        debug!("summary text:\n{}", summary);

        let readme = self.reporter.generate(&summary, &self.out_dir)?;
        println!("{} generated successfully", crate::report::README_FILE);

        Ok(PipelineOutcome {
            analysis,
            charts,
            readme,
        })
    }

    /// Draw every chart whose precondition holds.
    pub fn render_charts(&self, analysis: &Analysis) -> Result<RenderedCharts, ChartError> {
        let mut charts = RenderedCharts::default();

        let missing = analysis.missing_nonzero();
        if missing.is_empty() {
            charts.notices.push(NO_MISSING_VALUES_NOTICE);
        } else {
            let path = self.out_dir.join(MISSING_VALUES_FILE);
            StaticChartRenderer::render_missing_values(&path, &missing)?;
            charts.missing_values = Some(path);
        }

        if let Some(matrix) = &analysis.correlations {
            let path = self.out_dir.join(CORRELATION_HEATMAP_FILE);
            StaticChartRenderer::render_correlation_heatmap(&path, matrix)?;
            charts.correlation_heatmap = Some(path);
        }

        if let Some(column) = analysis.numeric.first() {
            let path = self.out_dir.join(DISTRIBUTION_FILE);
            StaticChartRenderer::render_distribution(&path, column)?;
            charts.distribution = Some(path);
        }

        info!(
            "charts: missing_values={} heatmap={} distribution={}",
            charts.missing_values.is_some(),
            charts.correlation_heatmap.is_some(),
            charts.distribution.is_some()
        );
        Ok(charts)
    }
}
