//! Reusable UI components for the admin TUI

pub mod form_field;
pub mod list_view;
pub mod record_table;
pub mod status_display;

pub use form_field::{Form, FormField, FormFieldType, FormInput};
pub use list_view::{MenuItem, MenuListView};
pub use record_table::{build_table, render_table, Column, TableView};
pub use status_display::{StatusDisplay, StatusType};
