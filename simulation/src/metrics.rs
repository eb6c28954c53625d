//! CSV metrics sink
//!
//! Appends one row per run so repeated invocations build up a data set
//! for charting security against randomness.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use detour_core::{ExportError, MetricsSink, RunReport};
use tracing::{debug, warn};

/// Default output file
pub const DEFAULT_METRICS_PATH: &str = "data.csv";

/// Header line, written only when the file does not exist yet
pub const CSV_HEADER: &str = "network size, packets sent, randomness probability, \
time for all packets to reach destination, optimal path length, \
packets copied by surveillance node, security (%)";

/// Appends run reports to a CSV file
#[derive(Debug, Clone)]
pub struct CsvMetricsSink {
    path: PathBuf,
}

impl CsvMetricsSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for CsvMetricsSink {
    fn default() -> Self {
        Self::new(DEFAULT_METRICS_PATH)
    }
}

impl MetricsSink for CsvMetricsSink {
    fn record(&mut self, report: &RunReport) -> Result<(), ExportError> {
        let write_header = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ExportError::io(&self.path, e))?;

        let mut contents = String::new();
        if write_header {
            contents.push_str(CSV_HEADER);
            contents.push('\n');
        }
        contents.push_str(&format_row(report));
        contents.push('\n');

        file.write_all(contents.as_bytes())
            .map_err(|e| ExportError::io(&self.path, e))?;
        debug!("Appended run to {}", self.path.display());
        Ok(())
    }
}

/// One CSV row, fields in header order
pub fn format_row(report: &RunReport) -> String {
    format!(
        "{}, {}, {}, {}, {}, {}, {}",
        report.network_size,
        report.packet_count,
        report.randomness,
        report.ticks,
        report.optimal_path_length,
        report.interceptions,
        report.security_percent
    )
}

/// Record a report, logging instead of failing on error
pub fn record_or_warn(sink: &mut dyn MetricsSink, report: &RunReport) {
    if let Err(e) = sink.record(report) {
        warn!("Failed to record metrics: {}", e);
    }
}
