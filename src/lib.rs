pub mod admin_tui;
pub mod api;
pub mod config;
pub mod models;
