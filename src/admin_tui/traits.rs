//! Core traits for the admin TUI architecture
//!
//! This module defines the contracts shared by the list controller, the
//! record forms it mounts and the screens the application switches between.

use crossterm::event::KeyEvent;
use futures::future::BoxFuture;
use ratatui::{layout::Rect, Frame};

use crate::{admin_tui::app::Screen as ScreenType, models::RecordId};

/// Actions that can be returned from screen event handling
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    /// Navigate to a different screen
    NavigateTo(ScreenType),
    /// Go back to previous screen
    NavigateBack,
    /// Quit the application
    Quit,
    /// No action taken
    None,
}

/// One item of a managed collection
///
/// The list controller only ever looks at the identifier and, for delete
/// confirmations, at the name-like field.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> RecordId;

    /// Name-like field used when no display-name extractor is configured
    fn name(&self) -> Option<&str> {
        None
    }
}

/// Outcome of a key event inside a mounted record form
pub enum FormSignal {
    /// Keep editing
    Idle,
    /// The form built its create/update call; the controller drives it
    Submit(BoxFuture<'static, Result<(), String>>),
    /// The user abandoned the form
    Cancel,
}

/// Create/edit UI for one record
///
/// A form reports exactly one terminal outcome per mount: a successful
/// submission or a cancel. Submit failures stay inside the form.
pub trait RecordForm: Send {
    fn title(&self) -> String;

    fn draw(&mut self, f: &mut Frame, area: Rect);

    fn handle_key_event(&mut self, key: KeyEvent) -> FormSignal;

    /// Apply results of background loads started by the form
    fn poll(&mut self) {}

    /// Whether a background load started by the form is still running
    fn is_loading(&self) -> bool {
        false
    }

    /// Called while the submission returned by `handle_key_event` is in flight
    fn set_submitting(&mut self, submitting: bool);

    /// Show the failure of the last submission; the form stays mounted
    fn submit_failed(&mut self, message: String);
}

/// Screens hosted by the application shell
pub trait ScreenHandler {
    fn title(&self) -> String;

    fn draw(&mut self, f: &mut Frame, area: Rect);

    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction;

    /// Apply finished background work; returns whether anything changed
    fn poll(&mut self) -> bool {
        false
    }

    /// Whether plain characters (such as `q`) belong to the screen right now
    fn captures_text_input(&self) -> bool {
        false
    }

    fn help(&self) -> &'static str;
}

/// Trait for screens with navigable lists
pub trait Navigable {
    /// Move selection up
    fn navigate_up(&mut self);

    /// Move selection down
    fn navigate_down(&mut self);

    /// Get currently selected index
    fn get_selected_index(&self) -> Option<usize>;

    /// Set selected index
    fn set_selected_index(&mut self, index: Option<usize>);

    /// Get total number of items
    fn get_item_count(&self) -> usize;

    /// Navigate to first item
    fn navigate_to_first(&mut self) {
        if self.get_item_count() > 0 {
            self.set_selected_index(Some(0));
        }
    }

    /// Navigate to last item
    fn navigate_to_last(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            self.set_selected_index(Some(count - 1));
        }
    }
}

/// Trait for form handling
pub trait FormHandler {
    /// Get current field index
    fn get_current_field(&self) -> usize;

    /// Set current field
    fn set_current_field(&mut self, field: usize);

    /// Get total number of fields
    fn get_field_count(&self) -> usize;

    /// Move to next field
    fn next_field(&mut self) {
        let current = self.get_current_field();
        let total = self.get_field_count();
        if total > 0 {
            self.set_current_field((current + 1) % total);
        }
    }

    /// Move to previous field
    fn previous_field(&mut self) {
        let current = self.get_current_field();
        let total = self.get_field_count();
        if total > 0 {
            self.set_current_field(if current == 0 { total - 1 } else { current - 1 });
        }
    }

    /// Handle character input for current field
    fn handle_char_input(&mut self, c: char);

    /// Handle backspace for current field
    fn handle_backspace(&mut self);

    /// Handle delete for current field
    fn handle_delete(&mut self);

    /// First validation error, if any
    fn validate(&self) -> Result<(), String>;
}
