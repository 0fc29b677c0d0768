pub mod auth_service;
pub mod notification_service;

pub use auth_service::{Authenticator, SignupReceipt, CONFIRMATION_SUBJECT};
pub use notification_service::{DeliveryError, Notifier, TracingNotifier};
