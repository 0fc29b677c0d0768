pub mod access;
pub mod confirmation;
pub mod jwt;
pub mod validation;
