//! Services layer - business logic
//!
//! Services sit between the web handlers and the repositories, owning
//! the published-visibility rules and pagination arithmetic.

pub mod page;
pub mod post;

pub use page::PageService;
pub use post::PostService;
