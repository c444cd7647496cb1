//! External service integrations

pub mod zoho;
