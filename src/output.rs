//! Report rendering
//!
//! Human output prints one line per report, errors first and in red when
//! stdout is a terminal, followed by a one-line verdict.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::report::{Report, Reports};

const RED: &str = "0;91";
const GREEN: &str = "32";

/// Output formatter for validation reports
pub struct Output {
    format: OutputFormat,
    errors_only: bool,
    show_colors: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    has_error: bool,
    error_count: usize,
    checked_at: DateTime<Utc>,
    reports: Vec<&'a Report>,
}

impl Output {
    pub fn new(format: OutputFormat, errors_only: bool) -> Self {
        Self {
            format,
            errors_only,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_reports(&self, reports: &Reports) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Human => Ok(self.format_human(reports)),
            OutputFormat::Json => self.format_json(reports),
            OutputFormat::Summary => Ok(self.format_summary(reports)),
        }
    }

    fn visible<'a>(&self, reports: &'a Reports) -> Vec<&'a Report> {
        reports
            .sorted_for_display()
            .into_iter()
            .filter(|r| r.is_error() || !self.errors_only)
            .collect()
    }

    fn format_human(&self, reports: &Reports) -> String {
        let mut output = String::new();

        for report in self.visible(reports) {
            if report.is_error() {
                output.push_str(&self.colorize(report.message(), RED));
            } else {
                output.push_str(report.message());
            }
            output.push('\n');
        }

        output.push_str(&self.format_summary(reports));
        output
    }

    fn format_summary(&self, reports: &Reports) -> String {
        if reports.has_error() {
            format!(
                "{} {} error(s), {} resource(s) available\n",
                self.colorize("Validation failed:", RED),
                reports.error_count(),
                reports.status_count()
            )
        } else {
            format!(
                "{} {} resource(s) available\n",
                self.colorize("Validation passed:", GREEN),
                reports.status_count()
            )
        }
    }

    fn format_json(&self, reports: &Reports) -> serde_json::Result<String> {
        let document = JsonOutput {
            has_error: reports.has_error(),
            error_count: reports.error_count(),
            checked_at: Utc::now(),
            reports: self.visible(reports),
        };
        let mut text = serde_json::to_string_pretty(&document)?;
        text.push('\n');
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_reports() -> Reports {
        vec![
            Report::status("OK: Resource https://cdn.example/a is available."),
            Report::error("HTTP HEAD request to URL 'https://cdn.example/b' yielded bad response code 404"),
            Report::status("OK: Resource https://cdn.example/c is available."),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_human_output_lists_errors_first() {
        let output = Output::new(OutputFormat::Human, false).with_colors(false);
        let formatted = output.format_reports(&create_test_reports()).unwrap();
        let lines: Vec<&str> = formatted.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("bad response code 404"));
        assert_eq!(lines[3], "Validation failed: 1 error(s), 2 resource(s) available");
    }

    #[test]
    fn test_errors_only_hides_status_lines() {
        let output = Output::new(OutputFormat::Human, true).with_colors(false);
        let formatted = output.format_reports(&create_test_reports()).unwrap();

        assert!(!formatted.contains("OK: Resource"));
        assert!(formatted.contains("bad response code 404"));
    }

    #[test]
    fn test_colored_errors() {
        let output = Output::new(OutputFormat::Human, true).with_colors(true);
        let formatted = output.format_reports(&create_test_reports()).unwrap();
        assert!(formatted.contains("\x1b[0;91mHTTP HEAD request"));
    }

    #[test]
    fn test_passed_summary() {
        let output = Output::new(OutputFormat::Summary, false).with_colors(false);
        let reports: Reports = vec![Report::status("OK")].into_iter().collect();
        assert_eq!(
            output.format_reports(&reports).unwrap(),
            "Validation passed: 1 resource(s) available\n"
        );
    }

    #[test]
    fn test_json_output() {
        let output = Output::new(OutputFormat::Json, false);
        let formatted = output.format_reports(&create_test_reports()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&formatted).unwrap();

        assert_eq!(value["has_error"], true);
        assert_eq!(value["error_count"], 1);
        assert!(value["checked_at"].is_string());
        assert_eq!(value["reports"].as_array().unwrap().len(), 3);
        assert_eq!(value["reports"][0]["is_error"], true);
    }
}
