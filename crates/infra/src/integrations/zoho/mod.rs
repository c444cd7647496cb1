//! Zoho Books adapters
//!
//! - [`ZohoTokenProvider`]: refresh-token exchange against Zoho Accounts
//! - [`ZohoEstimateClient`]: paged estimate listing per organization

pub mod auth;
pub mod estimates;

pub use auth::ZohoTokenProvider;
pub use estimates::ZohoEstimateClient;
