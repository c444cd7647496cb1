//! Single-record push path

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use quotesync_domain::{
    ChangeEvent, Config, RawEstimate, SaleRecord, SaleStatus, SyncAction, SyncLogEntry,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use super::errors::WebhookRejection;
use crate::classification::{DepartmentNormalizer, RepDirectory};
use crate::sync::orchestrator::panic_message;
use crate::sync::ports::{BatchWriter, ChangeNotifier, NoopNotifier, RepSource};

/// Inbound delivery, stripped of transport details.
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    pub method: String,
    /// Value of the shared-secret header, if sent
    pub secret: Option<String>,
    pub body: Vec<u8>,
}

/// Status and JSON body to send back.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: Value,
}

impl From<&WebhookRejection> for WebhookResponse {
    fn from(rejection: &WebhookRejection) -> Self {
        Self { status: rejection.status_code(), body: rejection.body() }
    }
}

/// Successful terminal branches.
#[derive(Debug, Clone, PartialEq)]
enum Applied {
    Deleted { external_id: String },
    Upserted { external_id: String, amount: f64 },
    Ignored { status: String },
}

impl Applied {
    fn action(&self) -> SyncAction {
        match self {
            Self::Deleted { .. } => SyncAction::Deleted,
            Self::Upserted { .. } => SyncAction::Upserted,
            Self::Ignored { .. } => SyncAction::Ignored,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Deleted { external_id } => json!({ "action": "deleted", "external_id": external_id }),
            Self::Upserted { external_id, amount } => {
                json!({ "action": "upserted", "external_id": external_id, "amount": amount })
            }
            Self::Ignored { status } => json!({ "action": "ignored", "status": status }),
        }
    }
}

/// Applies one provider status change to the ledger.
///
/// Unlike the sweep, validation failures are reported back to the caller
/// with the offending field or value. Every branch after the payload parses
/// writes exactly one audit row; panics during processing become a 500.
pub struct WebhookReceiver {
    config: Arc<Config>,
    departments: DepartmentNormalizer,
    reps: Arc<dyn RepSource>,
    writer: Arc<dyn BatchWriter>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl WebhookReceiver {
    pub fn new(config: Arc<Config>, reps: Arc<dyn RepSource>, writer: Arc<dyn BatchWriter>) -> Self {
        let departments = DepartmentNormalizer::new(config.departments.clone());
        Self { config, departments, reps, writer, notifier: Arc::new(NoopNotifier) }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[instrument(skip_all, fields(method = %request.method))]
    pub async fn handle(&self, request: WebhookRequest) -> WebhookResponse {
        let (payload, estimate) = match self.admit(&request) {
            Ok(admitted) => admitted,
            Err(rejection) => {
                warn!(status = rejection.status_code(), reason = %rejection, "webhook refused");
                return WebhookResponse::from(&rejection);
            }
        };
        let external_id = estimate.external_id().map(str::to_string);

        let outcome = AssertUnwindSafe(self.apply(&estimate))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(WebhookRejection::Internal(panic_message(&*panic))));

        match outcome {
            Ok(applied) => {
                info!(action = %applied.action(), external_id = ?external_id, "webhook applied");
                let entry = SyncLogEntry::new(applied.action(), 200)
                    .with_external_id(external_id)
                    .with_payload(Some(payload));
                self.record(&entry).await;
                WebhookResponse { status: 200, body: applied.body() }
            }
            Err(rejection) => {
                if rejection.status_code() >= 500 {
                    error!(reason = %rejection, external_id = ?external_id, "webhook processing failed");
                } else {
                    warn!(reason = %rejection, external_id = ?external_id, "webhook rejected");
                }
                let entry = SyncLogEntry::new(SyncAction::Error, rejection.status_code())
                    .with_external_id(external_id)
                    .with_error(rejection.to_string())
                    .with_payload(Some(payload));
                self.record(&entry).await;
                WebhookResponse::from(&rejection)
            }
        }
    }

    /// Method, secret, and body checks. Nothing is audited at this stage.
    fn admit(&self, request: &WebhookRequest) -> Result<(Value, RawEstimate), WebhookRejection> {
        if !request.method.eq_ignore_ascii_case("POST") {
            return Err(WebhookRejection::MethodNotAllowed);
        }
        if request.secret.as_deref() != Some(self.config.webhook.secret.as_str()) {
            return Err(WebhookRejection::Unauthorized);
        }
        let payload: Value = serde_json::from_slice(&request.body)
            .map_err(|err| WebhookRejection::InvalidJson(err.to_string()))?;
        let estimate = RawEstimate::deserialize(&payload)
            .map_err(|err| WebhookRejection::InvalidJson(err.to_string()))?;
        Ok((payload, estimate))
    }

    async fn apply(&self, estimate: &RawEstimate) -> Result<Applied, WebhookRejection> {
        let status = estimate.normalized_status();
        match status.as_str() {
            "declined" | "rejected" => self.delete(estimate).await,
            "accepted" => self.upsert(estimate).await,
            _ => Ok(Applied::Ignored { status }),
        }
    }

    async fn delete(&self, estimate: &RawEstimate) -> Result<Applied, WebhookRejection> {
        let external_id = estimate
            .external_id()
            .ok_or_else(|| WebhookRejection::MissingFields(vec!["estimate_id"]))?
            .to_string();
        self.writer
            .delete_many(std::slice::from_ref(&external_id))
            .await
            .map_err(|source| WebhookRejection::Write { operation: "Delete", source })?;
        self.notifier.notify(ChangeEvent::SaleDeleted { external_id: external_id.clone() });
        Ok(Applied::Deleted { external_id })
    }

    async fn upsert(&self, estimate: &RawEstimate) -> Result<Applied, WebhookRejection> {
        let external_id = estimate.external_id();
        let raw_date = estimate.raw_date();
        let rep_name = estimate.rep_name();
        let label = estimate.department_label();

        let missing: Vec<&'static str> = [
            ("estimate_id", external_id.is_none()),
            ("date", raw_date.is_none()),
            ("salesperson_name", rep_name.is_none()),
            ("cf_d_partement", label.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();

        let (Some(external_id), Some(raw_date), Some(rep_name), Some(label)) =
            (external_id, raw_date, rep_name, label)
        else {
            return Err(WebhookRejection::MissingFields(missing));
        };

        let sale_date =
            estimate.sale_date().ok_or_else(|| WebhookRejection::InvalidDate(raw_date.to_string()))?;

        let department = self
            .departments
            .normalize(label)
            .ok_or_else(|| WebhookRejection::UnknownDepartment(label.to_string()))?;
        let directory = RepDirectory::load(self.reps.as_ref())
            .await
            .map_err(WebhookRejection::Directory)?;
        let rep = directory
            .lookup(rep_name)
            .ok_or_else(|| WebhookRejection::UnknownRep(rep_name.to_string()))?;

        let amount = estimate
            .valid_amount()
            .ok_or_else(|| WebhookRejection::InvalidAmount(estimate.amount()))?;

        let office = estimate
            .organization_id
            .as_deref()
            .and_then(|org| self.config.office_for_organization(org.trim()))
            .unwrap_or(rep.office);

        let record = SaleRecord {
            external_id: external_id.to_string(),
            sale_date,
            client_name: estimate.client_name(),
            amount,
            quote_number: estimate.quote_number(),
            rep_id: rep.id.clone(),
            department: department.to_string(),
            raw_department_label: label.to_string(),
            office,
            status: SaleStatus::Accepted,
        };
        self.writer
            .upsert_many(std::slice::from_ref(&record))
            .await
            .map_err(|source| WebhookRejection::Write { operation: "Upsert", source })?;

        self.notifier.notify(ChangeEvent::SaleUpserted { external_id: record.external_id.clone() });
        Ok(Applied::Upserted { external_id: record.external_id, amount })
    }

    async fn record(&self, entry: &SyncLogEntry) {
        if let Err(err) = self.writer.append_log(entry).await {
            error!(error = %err, action = %entry.action, "failed to write webhook audit row");
        }
    }
}
