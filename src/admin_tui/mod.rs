//! School administration terminal UI
//!
//! A home menu plus one list screen per collection. Every list screen is the
//! same [`EntityListController`](list_controller::EntityListController)
//! configured with its own fetch, columns, form and delete operations.

pub mod app;
pub mod components;
pub mod fetch;
pub mod forms;
pub mod list_controller;
pub mod screens;
pub mod traits;
pub mod ui;

pub use app::{App, Screen};
pub use fetch::{CycleOrdering, FetchController, FetchState};
pub use list_controller::{EntityListController, ListConfig, UpdateKey};
