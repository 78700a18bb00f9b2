//! Hand-off of timing reports to a renderer.

use super::TimingReport;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rendering a report.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Consumes timing reports, e.g. to draw charts.
pub trait Renderer {
    fn render(&self, report: &TimingReport) -> Result<(), RenderError>;
}

/// Writes the report as pretty-printed JSON for an external charting tool.
#[derive(Debug, Clone)]
pub struct JsonReportWriter {
    path: PathBuf,
}

impl JsonReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Renderer for JsonReportWriter {
    fn render(&self, report: &TimingReport) -> Result<(), RenderError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&self.path, json)?;

        tracing::info!(path = %self.path.display(), "Wrote timing report");
        Ok(())
    }
}
