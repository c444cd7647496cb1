//! Record classification for the batch path

use chrono::Datelike;
use quotesync_domain::{Office, RawEstimate, RetentionWindow, SaleRecord, SaleStatus};

use super::{DepartmentNormalizer, RepDirectory};

/// What the sweep does with one raw estimate.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    Upsert(SaleRecord),
    Delete(String),
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Year outside the retention window, or no parsable date
    OutOfWindow,
    MissingExternalId,
    UnknownRep(Option<String>),
    UnknownDepartment(Option<String>),
    /// Negative or non-finite amount
    InvalidAmount,
}

impl SkipReason {
    /// Skips that count towards the sweep's `skipped` counter.
    pub const fn is_counted(&self) -> bool {
        !matches!(self, Self::OutOfWindow)
    }
}

/// Which ledger status an estimate status maps to, if any.
///
/// Case-insensitive: anything containing `invoiced` or `paid` is invoiced,
/// exactly `accepted` is accepted, everything else removes the sale.
pub fn ledger_status(status: &str) -> Option<SaleStatus> {
    let status = status.to_lowercase();
    if status.contains("invoiced") || status.contains("paid") {
        Some(SaleStatus::Invoiced)
    } else if status == "accepted" {
        Some(SaleStatus::Accepted)
    } else {
        None
    }
}

/// Turns raw estimates into dispositions for one sweep.
pub struct RecordClassifier<'a> {
    window: RetentionWindow,
    departments: &'a DepartmentNormalizer,
    reps: &'a RepDirectory,
}

impl<'a> RecordClassifier<'a> {
    pub fn new(
        window: RetentionWindow,
        departments: &'a DepartmentNormalizer,
        reps: &'a RepDirectory,
    ) -> Self {
        Self { window, departments, reps }
    }

    pub fn window(&self) -> RetentionWindow {
        self.window
    }

    /// Classify one estimate fetched from `office`'s organization.
    pub fn classify(&self, raw: &RawEstimate, office: Office) -> Disposition {
        let Some(sale_date) = raw.sale_date() else {
            return Disposition::Skip(SkipReason::OutOfWindow);
        };
        if !self.window.contains(sale_date.year()) {
            return Disposition::Skip(SkipReason::OutOfWindow);
        }
        let Some(external_id) = raw.external_id() else {
            return Disposition::Skip(SkipReason::MissingExternalId);
        };

        let Some(status) = ledger_status(&raw.normalized_status()) else {
            return Disposition::Delete(external_id.to_string());
        };

        let Some(rep) = raw.rep_name().and_then(|name| self.reps.lookup(name)) else {
            return Disposition::Skip(SkipReason::UnknownRep(raw.rep_name().map(str::to_string)));
        };
        let label = raw.department_label();
        let Some(department) = label.and_then(|l| self.departments.normalize(l)) else {
            return Disposition::Skip(SkipReason::UnknownDepartment(label.map(str::to_string)));
        };
        let Some(amount) = raw.valid_amount() else {
            return Disposition::Skip(SkipReason::InvalidAmount);
        };

        Disposition::Upsert(SaleRecord {
            external_id: external_id.to_string(),
            sale_date,
            client_name: raw.client_name(),
            amount,
            quote_number: raw.quote_number(),
            rep_id: rep.id.clone(),
            department: department.to_string(),
            raw_department_label: label.unwrap_or_default().to_string(),
            office,
            status,
        })
    }
}
