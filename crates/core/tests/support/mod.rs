//! Shared test helpers for `quotesync-core` integration tests.
//!
//! In-memory implementations of every core port so sweep and webhook tests
//! can focus on behaviour instead of I/O.

#![allow(dead_code)]

pub mod fakes;

use std::sync::Arc;

use quotesync_domain::{Config, Office, RawEstimate, Rep, RetentionWindow, WebhookConfig};

pub const SECRET: &str = "test-secret";

/// Config with both default organizations and a fixed 2025–2026 window.
pub fn test_config() -> Arc<Config> {
    let mut config = Config { webhook: WebhookConfig { secret: SECRET.into() }, ..Config::default() };
    config.sync.retention = Some(RetentionWindow::new(2025, 2026));
    Arc::new(config)
}

pub fn rep(id: &str, name: &str, office: Office) -> Rep {
    Rep { id: id.into(), name: name.into(), office, active: true }
}

pub fn known_reps() -> Vec<Rep> {
    vec![rep("rep-julie", "Julie Tremblay", Office::Qc), rep("rep-marc", "Marc Gagnon", Office::Mtl)]
}

/// An in-window estimate sold by Julie in PROMOTIONNEL.
pub fn estimate(id: &str, status: &str, date: &str) -> RawEstimate {
    RawEstimate {
        estimate_id: Some(id.into()),
        estimate_number: Some(format!("QT-{id}")),
        status: Some(status.into()),
        customer_name: Some("Imprimerie Lavoie".into()),
        total: Some(1200.0),
        sub_total: Some(1000.0),
        date: Some(date.into()),
        salesperson_name: Some("Julie Tremblay".into()),
        department_field: Some("PROMOTIONNEL".into()),
        ..Default::default()
    }
}
