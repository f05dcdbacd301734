//! CSV audit report
//!
//! This module turns load rejections and conflicts into report rows and
//! serializes them as CSV with the columns `kind,organization,rule,subject,message`.
//!
//! Rows are sorted by kind (violations, then binding errors, then conflicts),
//! then organization, rule and subject. The sort is stable, so violations of
//! one field keep the order the validator found them in.

use crate::core::conflict::Conflict;
use crate::core::loader::LoadSummary;
use crate::types::RoutingError;
use std::fmt;
use std::io::Write;

/// Category of a report row; the derive order is the output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportKind {
    Violation,
    BindingError,
    Conflict,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Violation => "violation",
            ReportKind::BindingError => "binding_error",
            ReportKind::Conflict => "conflict",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the audit report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub kind: ReportKind,
    /// Empty for rule violations, which are not tied to an organization
    pub organization: String,
    pub rule: String,
    /// Violated field, rejected binding id, or the conflicting rule id
    pub subject: String,
    pub message: String,
}

impl ReportRow {
    fn sort_key(&self) -> (ReportKind, &str, &str, &str) {
        (self.kind, &self.organization, &self.rule, &self.subject)
    }
}

impl From<&Conflict> for ReportRow {
    fn from(conflict: &Conflict) -> Self {
        ReportRow {
            kind: ReportKind::Conflict,
            organization: conflict.organization_id.clone(),
            rule: conflict.rule_id.clone(),
            subject: conflict.conflicting_rule_id.clone(),
            message: conflict.to_string(),
        }
    }
}

/// Build report rows from a load summary and the conflicts found afterwards
pub fn report_rows(summary: &LoadSummary, conflicts: &[Conflict]) -> Vec<ReportRow> {
    let violations = summary.rejected_rules.iter().flat_map(|rejected| {
        rejected
            .errors
            .violations()
            .iter()
            .map(move |violation| ReportRow {
                kind: ReportKind::Violation,
                organization: String::new(),
                rule: rejected.label.clone(),
                subject: violation.field.clone(),
                message: violation.message.clone(),
            })
    });

    let binding_errors = summary.rejected_bindings.iter().map(|rejected| ReportRow {
        kind: ReportKind::BindingError,
        organization: rejected.binding.organization_id.clone(),
        rule: rejected.binding.routing_rule_id.clone(),
        subject: rejected.binding.id.clone(),
        message: rejected.error.to_string(),
    });

    violations
        .chain(binding_errors)
        .chain(conflicts.iter().map(ReportRow::from))
        .collect()
}

/// Write report rows as CSV to the given writer
///
/// The header is always written, even when there is nothing to report.
///
/// # Errors
///
/// `IoError` if the output cannot be written
pub fn write_report_csv(rows: &[ReportRow], output: &mut dyn Write) -> Result<(), RoutingError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["kind", "organization", "rule", "subject", "message"])?;

    let mut sorted: Vec<&ReportRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    for row in sorted {
        writer.write_record([
            row.kind.as_str(),
            row.organization.as_str(),
            row.rule.as_str(),
            row.subject.as_str(),
            row.message.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
