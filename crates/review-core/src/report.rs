//! Loading and exporting move-batch execution reports.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ReviewError};
use crate::i18n::Translate;
use crate::status::{self, ErrorMapper};

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportLoadResult {
    Success { report: Value, status_message: String },
    Error { status_message: String },
}

/// Fetch the report for `batch_id`. Every failure becomes
/// [`ReportLoadResult::Error`]; this never returns `Err`.
pub async fn load_batch_report<F, Fut>(
    fetch: F,
    batch_id: &str,
    t: &dyn Translate,
    mapper: Option<&ErrorMapper>,
) -> ReportLoadResult
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<Value, ApiError>>,
{
    match fetch(batch_id.to_string()).await {
        Ok(report) => ReportLoadResult::Success {
            report,
            status_message: status::report_ready(t, batch_id).message,
        },
        Err(e) => {
            tracing::warn!(%batch_id, error = %e, "report load failed");
            ReportLoadResult::Error {
                status_message: status::report_error(t, &e, mapper).message,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ReviewError::UnknownExportFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportExport {
    pub content: String,
    pub mime_type: &'static str,
    pub extension: &'static str,
}

pub fn serialize_report(format: ExportFormat, data: &Value) -> ReportExport {
    let content = match format {
        ExportFormat::Json => {
            // Value serialization cannot fail: keys are always strings.
            let mut out = serde_json::to_string_pretty(data).unwrap_or_default();
            out.push('\n');
            out
        }
        ExportFormat::Csv => to_csv(data),
    };
    ReportExport {
        content,
        mime_type: format.mime_type(),
        extension: format.extension(),
    }
}

fn to_csv(data: &Value) -> String {
    let mut out = String::from("key,value\n");
    match data {
        Value::Object(map) => {
            for (key, value) in map {
                push_row(&mut out, key, &cell_text(value));
            }
        }
        other => push_row(&mut out, "value", &scalar_text(other)),
    }
    out
}

fn push_row(out: &mut String, key: &str, value: &str) {
    out.push_str(&quote(key));
    out.push(',');
    out.push_str(&quote(value));
    out.push('\n');
}

/// Scalars verbatim, nested values as compact JSON.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => value.to_string(),
        scalar => scalar_text(scalar),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

// ---------------------------------------------------------------------------
// Download delivery
// ---------------------------------------------------------------------------

/// A serialized report ready to be handed to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDownload {
    pub filename: String,
    pub content: String,
    pub mime_type: &'static str,
}

impl ReportDownload {
    /// `batch_id` comes from the backend; anything outside
    /// `[A-Za-z0-9._-]` becomes `_` so the name stays one path component.
    pub fn new(batch_id: &str, export: ReportExport) -> Self {
        let safe_id: String = batch_id
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
                _ => '_',
            })
            .collect();
        Self {
            filename: format!("batch-{safe_id}.{}", export.extension),
            content: export.content,
            mime_type: export.mime_type,
        }
    }
}

/// Where exported reports go: an HTTP attachment, a file, a buffer.
pub trait DownloadTarget {
    fn deliver(&mut self, download: ReportDownload);
}

impl DownloadTarget for Option<ReportDownload> {
    fn deliver(&mut self, download: ReportDownload) {
        *self = Some(download);
    }
}

impl DownloadTarget for Vec<ReportDownload> {
    fn deliver(&mut self, download: ReportDownload) {
        self.push(download);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Translator;
    use serde_json::json;

    #[test]
    fn json_export_is_pretty_with_trailing_newline() {
        let export = serialize_report(ExportFormat::Json, &json!({"count": 1}));
        assert_eq!(export.content, "{\n  \"count\": 1\n}\n");
        assert_eq!(export.mime_type, "application/json");
        assert_eq!(export.extension, "json");
    }

    #[test]
    fn csv_export_has_header_and_quoted_cells() {
        let export = serialize_report(
            ExportFormat::Csv,
            &json!({"count": 1, "label": "say \"hi\"", "errors": ["a"]}),
        );
        assert!(export.content.starts_with("key,value\n"));
        assert_eq!(export.mime_type, "text/csv");
        assert_eq!(export.extension, "csv");
        let lines: Vec<&str> = export.content.lines().collect();
        assert_eq!(lines[1], r#""count","1""#);
        assert_eq!(lines[2], r#""label","say ""hi""""#);
        assert_eq!(lines[3], r#""errors","[""a""]""#);
    }

    #[test]
    fn csv_export_of_non_object_is_single_value_row() {
        let export = serialize_report(ExportFormat::Csv, &json!("done"));
        assert_eq!(export.content, "key,value\n\"value\",\"done\"\n");
        let export = serialize_report(ExportFormat::Csv, &json!(42));
        assert_eq!(export.content, "key,value\n\"value\",\"42\"\n");
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn download_is_named_after_batch() {
        let download = ReportDownload::new(
            "b-12",
            serialize_report(ExportFormat::Csv, &json!({"moved": 3})),
        );
        assert_eq!(download.filename, "batch-b-12.csv");
        assert_eq!(download.mime_type, "text/csv");
    }

    #[test]
    fn download_name_cannot_escape_exports_dir() {
        for id in ["../../etc/passwd", "..\\..\\boot", "/abs", "a\"b"] {
            let download =
                ReportDownload::new(id, serialize_report(ExportFormat::Json, &json!({})));
            let name = std::path::Path::new(&download.filename);
            assert_eq!(name.file_name().unwrap(), download.filename.as_str());
            assert!(!download.filename.contains(['/', '\\', '"']), "{id}");
        }
        let download =
            ReportDownload::new("../x", serialize_report(ExportFormat::Json, &json!({})));
        assert_eq!(download.filename, "batch-.._x.json");
    }

    #[tokio::test]
    async fn loader_wraps_success() {
        let t = Translator::default();
        let result = load_batch_report(
            |id| async move { Ok(json!({"batch": id, "moved": 2})) },
            "b-1",
            &t,
            None,
        )
        .await;
        assert_eq!(
            result,
            ReportLoadResult::Success {
                report: json!({"batch": "b-1", "moved": 2}),
                status_message: "Report ready for b-1.".into(),
            }
        );
    }

    #[tokio::test]
    async fn loader_captures_failure() {
        let t = Translator::default();
        let result = load_batch_report(
            |_| async { Err(ApiError::Network("connection reset".into())) },
            "b-1",
            &t,
            None,
        )
        .await;
        let ReportLoadResult::Error { status_message } = result else {
            panic!("expected Error")
        };
        assert_eq!(
            status_message,
            "Report error: network unavailable, check your connection"
        );
    }
}
