mod csv;
mod json;

use crate::types::DiagramRecord;
use anyhow::Result;
use std::path::Path;

pub use self::csv::export_csv;
pub use self::json::{export_json, render_json};

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Write `diagram` to `output_path` in the given format
pub fn export(diagram: &DiagramRecord, format: ExportFormat, output_path: &Path) -> Result<()> {
    match format {
        ExportFormat::Csv => export_csv(diagram, output_path),
        ExportFormat::Json => export_json(diagram, output_path),
    }
}

/// File name used when exporting from the editor, e.g. `shop-orders.json`
pub fn default_file_name(diagram: &DiagramRecord, format: ExportFormat) -> String {
    let stem: String = diagram
        .name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let stem = stem.trim_matches('-');
    let stem = if stem.is_empty() { "diagram" } else { stem };
    format!("{}.{}", stem, format.extension())
}
