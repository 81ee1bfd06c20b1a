//! Home screen listing the managed collections

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::admin_tui::{
    app::Screen,
    components::list_view::{MenuItem, MenuListView},
    traits::{Navigable, ScreenAction, ScreenHandler},
    ui::Styles,
};

pub struct MainMenuScreen {
    menu: MenuListView,
    backend_url: String,
}

impl MainMenuScreen {
    pub fn new(backend_url: &str) -> Self {
        let items = vec![
            MenuItem::new("Students", ScreenAction::NavigateTo(Screen::Students))
                .with_shortcut('1')
                .with_description("Register students and keep their contact details"),
            MenuItem::new("Courses", ScreenAction::NavigateTo(Screen::Courses))
                .with_shortcut('2')
                .with_description("Manage the course catalogue"),
            MenuItem::new("Enrollments", ScreenAction::NavigateTo(Screen::Enrollments))
                .with_shortcut('3')
                .with_description("Enroll students in courses"),
            MenuItem::new("Quit", ScreenAction::Quit).with_shortcut('q'),
        ];

        Self {
            menu: MenuListView::new(items, "Main Menu"),
            backend_url: backend_url.to_string(),
        }
    }

    fn draw_title(&self, f: &mut Frame, area: Rect) {
        let title = Paragraph::new(Line::from(vec![
            Span::styled("School Administration", Styles::title()),
            Span::styled(format!("   {}", self.backend_url), Styles::inactive()),
        ]))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn draw_instructions(&self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let instructions = vec![
            Line::from(vec![
                Span::styled("Navigation: ", Styles::info()),
                Span::raw("↑/↓ to move, "),
                Span::styled("Enter", bold),
                Span::raw(" to open"),
            ]),
            Line::from(vec![
                Span::styled("Shortcuts: ", Styles::info()),
                Span::styled("1/2/3", bold),
                Span::raw(" for direct access, "),
                Span::styled("F1/?", bold),
                Span::raw(" for help, "),
                Span::styled("q", bold),
                Span::raw(" to quit"),
            ]),
        ];

        let paragraph = Paragraph::new(instructions).block(
            Block::default()
                .title("Instructions")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(paragraph, area);
    }
}

impl ScreenHandler for MainMenuScreen {
    fn title(&self) -> String {
        "Main Menu".to_string()
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(4),
            ])
            .split(area);

        self.draw_title(f, chunks[0]);
        self.menu.render(f, chunks[1]);
        self.draw_instructions(f, chunks[2]);
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Up => self.menu.navigate_up(),
            KeyCode::Down => self.menu.navigate_down(),
            KeyCode::Enter => {
                if let Some(item) = self.menu.selected() {
                    return item.action.clone();
                }
            }
            KeyCode::Char(c) => {
                if let Some(item) = self.menu.select_by_shortcut(c) {
                    return item.action.clone();
                }
            }
            _ => {}
        }
        ScreenAction::None
    }

    fn help(&self) -> &'static str {
        "Main Menu:\n\
        ↑/↓ - Navigate menu\n\
        Enter - Open selected screen\n\
        1 - Students\n\
        2 - Courses\n\
        3 - Enrollments\n\
        q - Quit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_shortcuts_navigate() {
        let mut menu = MainMenuScreen::new("http://127.0.0.1:8000/");
        assert_eq!(
            menu.handle_key_event(key(KeyCode::Char('2'))),
            ScreenAction::NavigateTo(Screen::Courses)
        );
        assert_eq!(menu.handle_key_event(key(KeyCode::Char('x'))), ScreenAction::None);
    }

    #[test]
    fn test_enter_opens_highlighted_item() {
        let mut menu = MainMenuScreen::new("http://127.0.0.1:8000/");
        menu.handle_key_event(key(KeyCode::Down));
        menu.handle_key_event(key(KeyCode::Down));
        assert_eq!(
            menu.handle_key_event(key(KeyCode::Enter)),
            ScreenAction::NavigateTo(Screen::Enrollments)
        );

        menu.handle_key_event(key(KeyCode::Down));
        assert_eq!(menu.handle_key_event(key(KeyCode::Enter)), ScreenAction::Quit);
    }
}
