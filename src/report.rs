//! Reports and their aggregation into a verdict.

use serde::{Deserialize, Serialize};

use crate::error::{StructuralError, ValidationError};

/// A single finding, either an error or an informational status line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    is_error: bool,
    message: String,
}

impl Report {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            message: message.into(),
        }
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self {
            is_error: false,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&ValidationError> for Report {
    fn from(error: &ValidationError) -> Self {
        Report::error(error.to_string())
    }
}

impl From<StructuralError> for Report {
    fn from(error: StructuralError) -> Self {
        Report::from(&ValidationError::PathResolution(error))
    }
}

/// An unordered collection of reports; only the error/status split matters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reports(Vec<Report>);

impl Reports {
    pub fn new() -> Self {
        Self::default()
    }

    /// A run stopped by a single fatal error
    pub fn fatal(error: &ValidationError) -> Self {
        Self(vec![Report::from(error)])
    }

    pub fn push(&mut self, report: Report) {
        self.0.push(report);
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(Report::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.0.iter().filter(|r| r.is_error()).count()
    }

    pub fn status_count(&self) -> usize {
        self.0.len() - self.error_count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Report> {
        self.0.iter().filter(|r| r.is_error())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Report> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Errors first, then status lines, each group sorted by message
    pub fn sorted_for_display(&self) -> Vec<&Report> {
        let mut reports: Vec<&Report> = self.0.iter().collect();
        reports.sort_by(|a, b| {
            b.is_error
                .cmp(&a.is_error)
                .then_with(|| a.message.cmp(&b.message))
        });
        reports
    }
}

impl Extend<Report> for Reports {
    fn extend<T: IntoIterator<Item = Report>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl FromIterator<Report> for Reports {
    fn from_iter<T: IntoIterator<Item = Report>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Reports {
    type Item = Report;
    type IntoIter = std::vec::IntoIter<Report>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Reports {
    type Item = &'a Report;
    type IntoIter = std::slice::Iter<'a, Report>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Merge structural errors and probe reports into one collection
pub fn aggregate(structural: Vec<StructuralError>, probes: Reports) -> Reports {
    let mut reports: Reports = structural.into_iter().map(Report::from).collect();
    reports.extend(probes);
    reports
}
