//! Menu list component

use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::admin_tui::{
    traits::{Navigable, ScreenAction},
    ui::Styles,
};

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: String,
    pub shortcut: Option<char>,
    pub description: Option<String>,
    /// What choosing the item does
    pub action: ScreenAction,
}

impl MenuItem {
    pub fn new(label: &str, action: ScreenAction) -> Self {
        Self {
            label: label.to_string(),
            shortcut: None,
            description: None,
            action,
        }
    }

    pub fn with_shortcut(mut self, shortcut: char) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Selectable list of menu items
pub struct MenuListView {
    pub title: String,
    pub items: Vec<MenuItem>,
    pub state: ListState,
}

impl MenuListView {
    pub fn new(items: Vec<MenuItem>, title: &str) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self {
            title: title.to_string(),
            items,
            state,
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let selected = self.state.selected();
        let items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let is_selected = Some(i) == selected;
                let label_style = if is_selected {
                    Styles::selected()
                } else {
                    Styles::default().add_modifier(Modifier::BOLD)
                };
                let shortcut = match item.shortcut {
                    Some(shortcut) => format!("[{}] ", shortcut),
                    None => "    ".to_string(),
                };

                let mut lines = vec![Line::from(vec![
                    Span::styled(shortcut, Styles::info()),
                    Span::styled(item.label.clone(), label_style),
                ])];
                if let Some(description) = &item.description {
                    lines.push(Line::from(Span::styled(
                        format!("    {}", description),
                        Styles::inactive(),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(self.title.clone())
                    .borders(Borders::ALL)
                    .border_style(Styles::active_border()),
            )
            .highlight_style(Styles::selected());

        f.render_stateful_widget(list, area, &mut self.state);
    }

    /// Get currently selected menu item
    pub fn selected(&self) -> Option<&MenuItem> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    /// Select by shortcut key
    pub fn select_by_shortcut(&mut self, key: char) -> Option<&MenuItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.shortcut.map_or(false, |s| s.eq_ignore_ascii_case(&key)))?;
        self.state.select(Some(index));
        self.items.get(index)
    }
}

impl Navigable for MenuListView {
    fn navigate_up(&mut self) {
        let count = self.items.len();
        if count == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => count - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn navigate_down(&mut self) {
        let count = self.items.len();
        if count == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 1) % count);
        self.state.select(Some(i));
    }

    fn get_selected_index(&self) -> Option<usize> {
        self.state.selected()
    }

    fn set_selected_index(&mut self, index: Option<usize>) {
        self.state.select(index);
    }

    fn get_item_count(&self) -> usize {
        self.items.len()
    }
}
