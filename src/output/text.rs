//! Plain-text report.
//!
//! One line per duplicate group, member paths separated by a tab:
//!
//! ```text
//! /photos/a.jpg	/backup/a.jpg
//! /notes/todo.txt	/notes/todo (1).txt	/old/todo.txt
//! ```
//!
//! No trailing summary is printed; scan totals go to the log. A tab or
//! newline inside a name is escaped, so every group stays on one line.

use std::io::Write;

use super::{report_groups, text_path, OutputError, ReportGroup};
use crate::duplicates::DuplicateGroups;

const SEPARATOR: &str = "\t";

/// Text formatter for duplicate groups.
#[derive(Debug, Clone)]
pub struct TextOutput {
    groups: Vec<ReportGroup>,
}

impl TextOutput {
    /// Prepare the report for `groups`.
    #[must_use]
    pub fn new(groups: &DuplicateGroups) -> Self {
        Self {
            groups: report_groups(groups),
        }
    }

    /// Number of lines the report will contain.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.groups.len()
    }

    /// Render the report as a string.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.groups
            .iter()
            .map(|group| format_line(group) + "\n")
            .collect()
    }

    /// Write the report to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), OutputError> {
        for group in &self.groups {
            writeln!(writer, "{}", format_line(group))?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn format_line(group: &ReportGroup) -> String {
    group
        .files
        .iter()
        .map(|path| text_path(path))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
