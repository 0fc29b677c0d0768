//! # ReviewDeck Users Crate
//!
//! Identity and access for the ReviewDeck application: passwordless signup
//! with emailed confirmation codes, JWT access tokens, input validation,
//! and role-based access checks.
//!
//! ## Architecture
//!
//! - **Services**: signup/redemption orchestration and outbound delivery
//! - **Types**: identity errors and collected validation failures
//! - **Utils**: confirmation codes, JWT handling, validation, access checks

pub mod services;
pub mod types;
pub mod utils;

// Re-export database types used throughout the identity API
pub use reviewdeck_database::{
    CreateUserRequest, UpdateUserRequest, User, UserRepository, UserRole,
};

// Re-export main types for convenience
pub use services::{Authenticator, DeliveryError, Notifier, SignupReceipt, TracingNotifier};
pub use types::{AuthError, AuthResult, FieldError, ValidationErrors};
pub use utils::access::{AccessError, Actor};
pub use utils::confirmation::CodeIssuer;
pub use utils::jwt::{Claims, TokenManager};
