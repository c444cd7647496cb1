//! Sales ledger types
//!
//! A [`SaleRecord`] is the local projection of one accepted or invoiced
//! estimate. Rows are keyed by the provider's estimate id; the store never
//! holds two rows for the same `external_id`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::QuoteSyncError;
use crate::impl_label_conversions;

/// Physical office; each office is one provider organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Office {
    #[serde(rename = "QC")]
    Qc,
    #[serde(rename = "MTL")]
    Mtl,
}

impl Office {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Qc => "QC",
            Self::Mtl => "MTL",
        }
    }
}

impl fmt::Display for Office {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Office {
    type Err = QuoteSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QC" => Ok(Self::Qc),
            "MTL" => Ok(Self::Mtl),
            _ => Err(QuoteSyncError::InvalidInput(format!("Invalid Office: {s}"))),
        }
    }
}

/// Ledger status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Accepted,
    Invoiced,
}

impl_label_conversions!(SaleStatus {
    Accepted => "accepted",
    Invoiced => "invoiced",
});

/// One row of the local sales ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Provider estimate id; the idempotency key.
    pub external_id: String,
    pub sale_date: NaiveDate,
    pub client_name: String,
    pub amount: f64,
    pub quote_number: String,
    pub rep_id: String,
    /// Canonical department code.
    pub department: String,
    /// Department label exactly as the provider sent it.
    pub raw_department_label: String,
    pub office: Office,
    pub status: SaleStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn office_serializes_as_uppercase_code() {
        assert_eq!(serde_json::to_string(&Office::Mtl).unwrap(), "\"MTL\"");
        assert_eq!("qc".parse::<Office>().unwrap(), Office::Qc);
        assert!("TOR".parse::<Office>().is_err());
    }

    #[test]
    fn sale_status_round_trips_through_label() {
        assert_eq!(SaleStatus::Invoiced.to_string(), "invoiced");
        assert_eq!("Accepted".parse::<SaleStatus>().unwrap(), SaleStatus::Accepted);
    }
}
