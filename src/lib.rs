//! Folha - a small server-rendered blog
//!
//! Published posts and flat pages stored in SQLite or MySQL, listed
//! nine to a page, filterable by category, tag, and author, searchable
//! by free text, and rendered through swappable Tera themes.

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod theme;
pub mod web;
