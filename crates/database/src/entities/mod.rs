pub mod category;
pub mod comment;
pub mod common;
pub mod genre;
pub mod review;
pub mod title;
pub mod user;

pub use category::Category;
pub use comment::Comment;
pub use common::{AuthoredText, NameSlugPair};
pub use genre::Genre;
pub use review::Review;
pub use title::{CreateTitleRequest, Title, TitleDetail, TitleFilter, UpdateTitleRequest};
pub use user::{CreateUserRequest, UpdateUserRequest, User, UserRole};
