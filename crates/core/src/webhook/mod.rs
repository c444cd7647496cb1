//! Push-path synchronization

pub mod errors;
pub mod receiver;

pub use errors::WebhookRejection;
pub use receiver::{WebhookReceiver, WebhookRequest, WebhookResponse};
