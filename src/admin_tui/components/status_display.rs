//! Notice line for short-lived messages such as delete failures

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::admin_tui::ui::Styles;

/// Types of status messages
#[derive(Debug, Clone, PartialEq)]
pub enum StatusType {
    Info,
    Success,
    Error,
}

/// Status message with type and content
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub status_type: StatusType,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl StatusMessage {
    pub fn new(message: String, status_type: StatusType) -> Self {
        Self {
            message,
            status_type,
            timestamp: chrono::Local::now(),
        }
    }
}

/// Status display component
pub struct StatusDisplay {
    pub current_message: Option<StatusMessage>,
    pub message_history: Vec<StatusMessage>,
    pub max_history: usize,
    pub auto_clear_timeout: Option<std::time::Duration>,
}

impl Default for StatusDisplay {
    fn default() -> Self {
        Self {
            current_message: None,
            message_history: Vec::new(),
            max_history: 50,
            auto_clear_timeout: None,
        }
    }
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_clear(mut self, timeout: std::time::Duration) -> Self {
        self.auto_clear_timeout = Some(timeout);
        self
    }

    /// Set current status message
    pub fn set_message(&mut self, message: StatusMessage) {
        self.archive_current();
        self.current_message = Some(message);
    }

    pub fn set_info(&mut self, message: String) {
        self.set_message(StatusMessage::new(message, StatusType::Info));
    }

    pub fn set_success(&mut self, message: String) {
        self.set_message(StatusMessage::new(message, StatusType::Success));
    }

    pub fn set_error(&mut self, message: String) {
        self.set_message(StatusMessage::new(message, StatusType::Error));
    }

    /// Clear current message
    pub fn clear(&mut self) {
        self.archive_current();
    }

    fn archive_current(&mut self) {
        if let Some(current) = self.current_message.take() {
            self.message_history.push(current);

            if self.message_history.len() > self.max_history {
                self.message_history.remove(0);
            }
        }
    }

    pub fn get_current(&self) -> Option<&StatusMessage> {
        self.current_message.as_ref()
    }

    pub fn get_history(&self) -> &[StatusMessage] {
        &self.message_history
    }

    /// Check if we should auto-clear the current message
    pub fn should_auto_clear(&self) -> bool {
        if let (Some(timeout), Some(message)) = (self.auto_clear_timeout, &self.current_message) {
            let elapsed = chrono::Local::now().signed_duration_since(message.timestamp);
            return elapsed.to_std().unwrap_or_default() >= timeout;
        }
        false
    }

    /// Drop the current message once it outlived the auto-clear timeout
    pub fn clear_expired(&mut self) -> bool {
        if self.should_auto_clear() {
            self.clear();
            true
        } else {
            false
        }
    }

    /// Render the status display with a hint shown when there is no message
    pub fn render(&self, f: &mut Frame, area: Rect, idle_hint: &str) {
        let (content, style) = match &self.current_message {
            Some(message) => {
                let (prefix, style) = match message.status_type {
                    StatusType::Info => ("ℹ", Styles::info()),
                    StatusType::Success => ("✓", Styles::success()),
                    StatusType::Error => ("✗", Styles::error()),
                };
                (format!("{} {}", prefix, message.message), style)
            }
            None => (idle_hint.to_string(), Styles::inactive()),
        };

        let paragraph = Paragraph::new(content).style(style).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );

        f.render_widget(paragraph, area);
    }
}
