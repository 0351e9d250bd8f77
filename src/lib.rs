// ABOUTME: Library root for lister - format resolution, templates and entity views.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod template;
pub mod types;
pub mod views;
