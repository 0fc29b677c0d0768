pub mod errors;

pub use errors::{CatalogError, DatabaseError, ReviewError, UserError};

pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type UserResult<T> = Result<T, UserError>;
pub type CatalogResult<T> = Result<T, CatalogError>;
pub type ReviewResult<T> = Result<T, ReviewError>;
