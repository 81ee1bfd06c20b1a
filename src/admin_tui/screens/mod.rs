//! Screens hosted by the application shell

pub mod entities;
pub mod main_menu;

pub use entities::{courses_page, enrollments_page, students_page};
pub use main_menu::MainMenuScreen;
