//! Form field component for user input

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::admin_tui::{traits::FormHandler, ui::Styles};

/// Type of form field
#[derive(Debug, Clone, PartialEq)]
pub enum FormFieldType {
    Text,
    /// Whole number
    Number,
    /// Pick one of `dropdown_options`
    Dropdown,
}

/// Individual form field
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: String,
    pub value: String,
    pub placeholder: String,
    pub field_type: FormFieldType,
    pub required: bool,
    pub read_only: bool,
    pub is_focused: bool,
    /// Cursor position in chars
    pub cursor_position: usize,
    pub dropdown_options: Vec<String>,
    /// Chosen option; `dropdown_state` only tracks the highlight
    pub selected: Option<usize>,
    pub dropdown_state: ListState,
    pub show_dropdown: bool,
    pub validation_error: Option<String>,
}

impl FormField {
    pub fn new(label: &str, field_type: FormFieldType) -> Self {
        Self {
            label: label.to_string(),
            value: String::new(),
            placeholder: String::new(),
            field_type,
            required: false,
            read_only: false,
            is_focused: false,
            cursor_position: 0,
            dropdown_options: Vec::new(),
            selected: None,
            dropdown_state: ListState::default(),
            show_dropdown: false,
            validation_error: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self.cursor_position = value.chars().count();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Replace the options; any previous choice is cleared
    pub fn set_dropdown_options(&mut self, options: Vec<String>) {
        self.dropdown_options = options;
        self.selected = None;
        self.value.clear();
        self.cursor_position = 0;
        self.dropdown_state
            .select(if self.dropdown_options.is_empty() { None } else { Some(0) });
    }

    /// Select option `index` as the field value
    pub fn select_option(&mut self, index: usize) {
        if let Some(option) = self.dropdown_options.get(index) {
            self.value = option.clone();
            self.cursor_position = self.value.chars().count();
            self.selected = Some(index);
            self.dropdown_state.select(Some(index));
            self.validation_error = None;
        }
    }

    pub fn selected_option(&self) -> Option<usize> {
        self.selected
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.is_focused = focused;
        if focused && self.field_type == FormFieldType::Dropdown {
            self.show_dropdown = true;
        } else if !focused {
            self.show_dropdown = false;
        }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        if self.read_only || self.field_type == FormFieldType::Dropdown {
            return;
        }
        if self.field_type == FormFieldType::Number && !(c.is_ascii_digit() || c == '-') {
            return;
        }
        let at = self.byte_index(self.cursor_position);
        self.value.insert(at, c);
        self.cursor_position += 1;
        self.validation_error = None;
    }

    pub fn delete_char(&mut self) {
        if self.read_only || self.field_type == FormFieldType::Dropdown {
            return;
        }
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_index(self.cursor_position);
            self.value.remove(at);
            self.validation_error = None;
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.read_only || self.field_type == FormFieldType::Dropdown {
            return;
        }
        if self.cursor_position < self.char_len() {
            let at = self.byte_index(self.cursor_position);
            self.value.remove(at);
            self.validation_error = None;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.char_len() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.char_len();
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Handle dropdown navigation
    pub fn dropdown_up(&mut self) {
        if self.dropdown_options.is_empty() {
            return;
        }
        self.show_dropdown = true;
        let selected = self.dropdown_state.selected().unwrap_or(0);
        let new_selected = if selected == 0 {
            self.dropdown_options.len() - 1
        } else {
            selected - 1
        };
        self.dropdown_state.select(Some(new_selected));
    }

    pub fn dropdown_down(&mut self) {
        if self.dropdown_options.is_empty() {
            return;
        }
        self.show_dropdown = true;
        let selected = self.dropdown_state.selected().unwrap_or(0);
        let new_selected = (selected + 1) % self.dropdown_options.len();
        self.dropdown_state.select(Some(new_selected));
    }

    pub fn select_dropdown_value(&mut self) {
        if let Some(selected) = self.dropdown_state.selected() {
            self.select_option(selected);
            self.show_dropdown = false;
        }
    }

    /// Value as a whole number, for `Number` fields
    pub fn as_number(&self) -> Option<i64> {
        self.value.trim().parse().ok()
    }

    /// Validate field value
    pub fn validate(&mut self) -> bool {
        self.validation_error = None;

        if self.required && self.field_type == FormFieldType::Dropdown && self.selected.is_none() {
            self.validation_error = Some("choose an option".to_string());
            return false;
        }

        if self.required && self.is_empty() {
            self.validation_error = Some("required".to_string());
            return false;
        }

        if self.field_type == FormFieldType::Number && !self.is_empty() && self.as_number().is_none() {
            self.validation_error = Some("must be a whole number".to_string());
            return false;
        }

        true
    }

    /// Render the form field
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let display_text = if self.value.is_empty() && !self.placeholder.is_empty() {
            &self.placeholder
        } else {
            &self.value
        };

        let border_style = if self.validation_error.is_some() {
            Styles::error()
        } else if self.is_focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };

        let mut title = self.label.clone();
        if self.read_only {
            title.push_str(" (read-only)");
        }
        if let Some(ref error) = self.validation_error {
            title = format!("{} - {}", title, error);
        }

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let text_style = if (self.value.is_empty() && !self.placeholder.is_empty()) || self.read_only {
            Styles::inactive()
        } else {
            Styles::default()
        };

        let paragraph = Paragraph::new(display_text.to_string())
            .style(text_style)
            .block(block);

        f.render_widget(paragraph, area);

        if self.is_focused && !self.read_only && self.field_type != FormFieldType::Dropdown {
            let before: String = self.value.chars().take(self.cursor_position).collect();
            let cursor_x = area.x + 1 + before.width() as u16;
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }

    /// Render dropdown if visible
    pub fn render_dropdown(&mut self, f: &mut Frame, area: Rect) {
        if !self.show_dropdown || self.dropdown_options.is_empty() {
            return;
        }

        let items: Vec<ListItem> = self
            .dropdown_options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let style = if Some(i) == self.dropdown_state.selected() {
                    Styles::selected()
                } else {
                    Style::default()
                };
                ListItem::new(option.clone()).style(style)
            })
            .collect();

        let block = Block::default()
            .title("Options")
            .borders(Borders::ALL)
            .border_style(Styles::active_border());

        let list = List::new(items).block(block);

        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut self.dropdown_state);
    }
}

/// What a key did to a [`Form`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormInput {
    /// Field content or focus changed
    Edited,
    Submit,
    Cancel,
    Ignored,
}

/// Form container that manages multiple fields
pub struct Form {
    pub fields: Vec<FormField>,
    pub current_field: usize,
    /// Error of the last submit attempt
    pub error: Option<String>,
    pub submitting: bool,
}

impl Form {
    pub fn new(fields: Vec<FormField>) -> Self {
        let mut form = Self {
            fields,
            current_field: 0,
            error: None,
            submitting: false,
        };
        if form.fields.get(0).map_or(false, |f| f.read_only) {
            form.next_field();
        }
        form.update_focus();
        form
    }

    fn update_focus(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.set_focus(i == self.current_field);
        }
    }

    pub fn get_field(&self, index: usize) -> Option<&FormField> {
        self.fields.get(index)
    }

    pub fn get_field_mut(&mut self, index: usize) -> Option<&mut FormField> {
        self.fields.get_mut(index)
    }

    pub fn get_current_field_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.current_field)
    }

    /// Trimmed value of field `index`
    pub fn value(&self, index: usize) -> String {
        self.fields
            .get(index)
            .map(|f| f.value.trim().to_string())
            .unwrap_or_default()
    }

    /// Validate all fields
    pub fn validate_all(&mut self) -> bool {
        let mut all_valid = true;
        for field in &mut self.fields {
            if !field.validate() {
                all_valid = false;
            }
        }
        all_valid
    }

    /// Shared editing keys: Tab/Shift-Tab focus, Enter submits or picks a
    /// dropdown value, Esc cancels, everything else edits the focused field.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> FormInput {
        let on_open_dropdown = self
            .fields
            .get(self.current_field)
            .map_or(false, |f| {
                f.field_type == FormFieldType::Dropdown && f.show_dropdown && !f.dropdown_options.is_empty()
            });

        match key.code {
            KeyCode::Esc => FormInput::Cancel,
            KeyCode::Tab => {
                self.next_field();
                FormInput::Edited
            }
            KeyCode::BackTab => {
                self.previous_field();
                FormInput::Edited
            }
            KeyCode::Enter if on_open_dropdown => {
                if let Some(field) = self.get_current_field_mut() {
                    field.select_dropdown_value();
                }
                FormInput::Edited
            }
            KeyCode::Enter => FormInput::Submit,
            KeyCode::Up => match self.get_current_field_mut() {
                Some(field) if field.field_type == FormFieldType::Dropdown => {
                    field.dropdown_up();
                    FormInput::Edited
                }
                _ => {
                    self.previous_field();
                    FormInput::Edited
                }
            },
            KeyCode::Down => match self.get_current_field_mut() {
                Some(field) if field.field_type == FormFieldType::Dropdown => {
                    field.dropdown_down();
                    FormInput::Edited
                }
                _ => {
                    self.next_field();
                    FormInput::Edited
                }
            },
            KeyCode::Left => {
                if let Some(field) = self.get_current_field_mut() {
                    field.move_cursor_left();
                }
                FormInput::Edited
            }
            KeyCode::Right => {
                if let Some(field) = self.get_current_field_mut() {
                    field.move_cursor_right();
                }
                FormInput::Edited
            }
            KeyCode::Home => {
                if let Some(field) = self.get_current_field_mut() {
                    field.move_cursor_to_start();
                }
                FormInput::Edited
            }
            KeyCode::End => {
                if let Some(field) = self.get_current_field_mut() {
                    field.move_cursor_to_end();
                }
                FormInput::Edited
            }
            KeyCode::Backspace => {
                self.handle_backspace();
                FormInput::Edited
            }
            KeyCode::Delete => {
                self.handle_delete();
                FormInput::Edited
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.handle_char_input(c);
                FormInput::Edited
            }
            _ => FormInput::Ignored,
        }
    }

    /// Submit error line, fields, then the open dropdown on top
    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let mut constraints = vec![Constraint::Length(2)];
        constraints.extend(self.fields.iter().map(|_| Constraint::Length(3)));
        constraints.push(Constraint::Min(0));
        constraints.push(Constraint::Length(1));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let banner = match (&self.error, self.submitting) {
            (_, true) => Paragraph::new("Saving...").style(Styles::info()),
            (Some(error), false) => Paragraph::new(error.clone()).style(Styles::error()),
            (None, false) => Paragraph::new(""),
        };
        f.render_widget(banner.wrap(Wrap { trim: true }), chunks[0]);

        for (i, field) in self.fields.iter().enumerate() {
            field.render(f, chunks[i + 1]);
        }

        let hint = Paragraph::new("Tab Next field | Enter Save | Esc Cancel").style(Styles::inactive());
        f.render_widget(hint, chunks[chunks.len() - 1]);

        let current = self.current_field;
        if let Some(field) = self.fields.get_mut(current) {
            let below = chunks[current + 1];
            let height = (field.dropdown_options.len() as u16 + 2)
                .min(area.bottom().saturating_sub(below.bottom()));
            if height > 2 {
                let dropdown_area = Rect::new(below.x, below.bottom(), below.width, height);
                field.render_dropdown(f, dropdown_area);
            }
        }
    }
}

impl FormHandler for Form {
    fn get_current_field(&self) -> usize {
        self.current_field
    }

    fn set_current_field(&mut self, field: usize) {
        if field < self.fields.len() {
            self.current_field = field;
            self.update_focus();
        }
    }

    fn get_field_count(&self) -> usize {
        self.fields.len()
    }

    fn next_field(&mut self) {
        let total = self.fields.len();
        for step in 1..=total {
            let candidate = (self.current_field + step) % total;
            if !self.fields[candidate].read_only {
                self.set_current_field(candidate);
                return;
            }
        }
    }

    fn previous_field(&mut self) {
        let total = self.fields.len();
        for step in 1..=total {
            let candidate = (self.current_field + total - step) % total;
            if !self.fields[candidate].read_only {
                self.set_current_field(candidate);
                return;
            }
        }
    }

    fn handle_char_input(&mut self, c: char) {
        if let Some(field) = self.get_current_field_mut() {
            field.insert_char(c);
        }
    }

    fn handle_backspace(&mut self) {
        if let Some(field) = self.get_current_field_mut() {
            field.delete_char();
        }
    }

    fn handle_delete(&mut self) {
        if let Some(field) = self.get_current_field_mut() {
            field.delete_char_forward();
        }
    }

    fn validate(&self) -> Result<(), String> {
        for field in &self.fields {
            if let Some(ref error) = field.validation_error {
                return Err(format!("{}: {}", field.label, error));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut Form, text: &str) {
        for c in text.chars() {
            form.handle_key_event(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_editing_handles_multibyte_text() {
        let mut field = FormField::new("Name", FormFieldType::Text).with_value("Jose");
        field.move_cursor_left();
        field.delete_char_forward();
        field.insert_char('é');
        assert_eq!(field.value, "José");

        field.move_cursor_to_start();
        field.insert_char('Ç');
        field.move_cursor_to_end();
        field.delete_char();
        assert_eq!(field.value, "ÇJos");
    }

    #[test]
    fn test_number_field_rejects_letters_and_validates() {
        let mut field = FormField::new("Hours", FormFieldType::Number).required();
        assert!(!field.validate());
        assert_eq!(field.validation_error.as_deref(), Some("required"));

        field.insert_char('6');
        field.insert_char('x');
        field.insert_char('0');
        assert_eq!(field.value, "60");
        assert!(field.validate());
        assert_eq!(field.as_number(), Some(60));
    }

    #[test]
    fn test_read_only_field_is_skipped_and_unchanged() {
        let mut form = Form::new(vec![
            FormField::new("Name", FormFieldType::Text),
            FormField::new("Code", FormFieldType::Text).with_value("FIS").read_only(true),
            FormField::new("Hours", FormFieldType::Number),
        ]);

        form.handle_key_event(key(KeyCode::Tab));
        assert_eq!(form.current_field, 2);
        form.handle_key_event(key(KeyCode::BackTab));
        assert_eq!(form.current_field, 0);

        form.fields[1].insert_char('X');
        assert_eq!(form.value(1), "FIS");
    }

    #[test]
    fn test_keys_map_to_form_input() {
        let mut form = Form::new(vec![FormField::new("Name", FormFieldType::Text)]);
        type_text(&mut form, "quit");
        assert_eq!(form.value(0), "quit");
        assert_eq!(form.handle_key_event(key(KeyCode::Enter)), FormInput::Submit);
        assert_eq!(form.handle_key_event(key(KeyCode::Esc)), FormInput::Cancel);
    }

    #[test]
    fn test_dropdown_enter_picks_then_submits() {
        let mut form = Form::new(vec![FormField::new("Course", FormFieldType::Dropdown)]);
        form.fields[0].set_dropdown_options(vec!["Math".to_string(), "Physics".to_string()]);
        form.update_focus();

        form.handle_key_event(key(KeyCode::Down));
        assert_eq!(form.handle_key_event(key(KeyCode::Enter)), FormInput::Edited);
        assert_eq!(form.value(0), "Physics");
        assert_eq!(form.fields[0].selected_option(), Some(1));
        assert_eq!(form.handle_key_event(key(KeyCode::Enter)), FormInput::Submit);
    }

    #[test]
    fn test_validate_reports_first_error_with_label() {
        let mut form = Form::new(vec![
            FormField::new("Name", FormFieldType::Text).required(),
            FormField::new("Email", FormFieldType::Text).required(),
        ]);
        type_text(&mut form, "Ana");
        assert!(!form.validate_all());
        assert_eq!(FormHandler::validate(&form), Err("Email: required".to_string()));
    }
}
