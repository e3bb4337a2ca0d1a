//! Data models
//!
//! Database entities (Post, Page, Category, Tag, User), query filters,
//! and pagination types shared across the crate.

mod category;
mod page;
mod post;
mod tag;
mod user;

pub use category::Category;
pub use page::{CreatePageInput, Page};
pub use post::{CreatePostInput, ListParams, PagedResult, Post, PostFilter, PER_PAGE};
pub use tag::Tag;
pub use user::User;
