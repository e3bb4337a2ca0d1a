//! Database repositories
//!
//! Repository pattern implementations for database access. Each
//! repository handles the operations for one entity.

pub mod category;
pub mod page;
pub mod post;
pub mod tag;
pub mod user;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use page::{PageRepository, SqlxPageRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};
