//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Provider pagination
pub const DEFAULT_PAGE_SIZE: u32 = 200;
pub const FIRST_PAGE: u32 = 1;

// Retention window: current year plus this many prior years
pub const DEFAULT_RETENTION_PRIOR_YEARS: i32 = 1;

// Inbound HTTP headers
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";
pub const SYNC_SOURCE_HEADER: &str = "x-sync-source";
pub const SYNC_SOURCE_CRON: &str = "cron";

// Joined into the sweep audit message when several pages failed
pub const SYNC_ERROR_SEPARATOR: &str = " | ";

// Zoho Books defaults
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.zoho.com/oauth/v2/token";
pub const DEFAULT_API_BASE_URL: &str = "https://www.zohoapis.com";
pub const DEFAULT_ORG_ID_QC: &str = "48244978";
pub const DEFAULT_ORG_ID_MTL: &str = "815683274";

// Scheduling
pub const DEFAULT_SYNC_CRON: &str = "0 0 6 * * *";

/// Canonical department codes.
pub const DEPARTMENT_CODES: [&str; 6] = [
    "MULTI-ANNONCEURS",
    "PROMOTIONNEL",
    "DIST. PUBLICITAIRE SOLO",
    "NUMERIQUE",
    "APPLICATION",
    "SERVICES IA",
];

/// Provider department labels and the canonical code each maps to.
/// Must stay in sync with the `department_mappings` reference table.
pub const DEFAULT_DEPARTMENT_MAPPINGS: [(&str, &str); 8] = [
    ("MÉDIA MULTI-ANNONCEURS", "MULTI-ANNONCEURS"),
    ("MULTI-ANNONCEURS", "MULTI-ANNONCEURS"),
    ("PROMOTIONNEL", "PROMOTIONNEL"),
    ("DIST. PUBLICITAIRE SOLO", "DIST. PUBLICITAIRE SOLO"),
    ("AGENCE PUB", "NUMERIQUE"),
    ("NUMÉRIQUE", "NUMERIQUE"),
    ("APPLICATION", "APPLICATION"),
    ("SERVICES IA", "SERVICES IA"),
];
