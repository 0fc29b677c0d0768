pub mod category_repository;
pub mod comment_repository;
pub mod genre_repository;
pub mod review_repository;
pub mod title_repository;
pub mod user_repository;

pub use category_repository::CategoryRepository;
pub use comment_repository::CommentRepository;
pub use genre_repository::GenreRepository;
pub use review_repository::ReviewRepository;
pub use title_repository::TitleRepository;
pub use user_repository::UserRepository;
