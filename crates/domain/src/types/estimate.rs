//! Provider estimate payloads
//!
//! Zoho Books sends ids and amounts as either JSON numbers or strings
//! depending on the endpoint (listing vs workflow webhook), so the scalar
//! fields here are parsed leniently. Empty strings count as absent.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One estimate as delivered by the provider, listing or webhook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEstimate {
    #[serde(default, deserialize_with = "lenient_string")]
    pub estimate_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub estimate_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub sub_total: Option<f64>,
    /// `YYYY-MM-DD`; timestamps are accepted and truncated to their date.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub salesperson_name: Option<String>,
    /// Custom "Département" field (API name `cf_d_partement`).
    #[serde(default, rename = "cf_d_partement", deserialize_with = "lenient_string")]
    pub department_field: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub organization_id: Option<String>,
}

impl RawEstimate {
    /// Provider id, falling back to the estimate number.
    pub fn external_id(&self) -> Option<&str> {
        present(&self.estimate_id).or_else(|| present(&self.estimate_number))
    }

    /// Status lowercased for case-insensitive comparisons.
    pub fn normalized_status(&self) -> String {
        present(&self.status).map(str::to_lowercase).unwrap_or_default()
    }

    /// Department label from the custom field, else the plain field.
    pub fn department_label(&self) -> Option<&str> {
        self.department_field
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.department.as_deref().filter(|s| !s.is_empty()))
    }

    pub fn rep_name(&self) -> Option<&str> {
        present(&self.salesperson_name)
    }

    pub fn raw_date(&self) -> Option<&str> {
        present(&self.date)
    }

    pub fn sale_date(&self) -> Option<NaiveDate> {
        let raw = self.raw_date()?;
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    pub fn year(&self) -> Option<i32> {
        self.sale_date().map(|d| d.year())
    }

    /// `total`, then `sub_total`, then zero. A zero `total` falls through
    /// to `sub_total`.
    pub fn amount(&self) -> f64 {
        self.total.filter(|total| *total != 0.0).or(self.sub_total).unwrap_or(0.0)
    }

    /// [`amount`](Self::amount) when it is finite and not negative.
    pub fn valid_amount(&self) -> Option<f64> {
        Some(self.amount()).filter(|amount| amount.is_finite() && *amount >= 0.0)
    }

    pub fn client_name(&self) -> String {
        self.customer_name.clone().unwrap_or_default()
    }

    pub fn quote_number(&self) -> String {
        self.estimate_number.clone().unwrap_or_default()
    }
}

/// One page of a provider listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimatePage {
    pub estimates: Vec<RawEstimate>,
    pub has_more: bool,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
