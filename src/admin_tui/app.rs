//! Main TUI application state and logic

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{debug, info};

use crate::{
    admin_tui::{
        list_controller::EntityListController,
        screens::{courses_page, enrollments_page, students_page, MainMenuScreen},
        traits::{ScreenAction, ScreenHandler},
        ui::centered_rect,
    },
    api::Collections,
    config::Config,
};

/// Application screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Students,
    Courses,
    Enrollments,
}

impl Screen {
    pub fn label(&self) -> &'static str {
        match self {
            Screen::Home => "Main Menu",
            Screen::Students => "Students",
            Screen::Courses => "Courses",
            Screen::Enrollments => "Enrollments",
        }
    }
}

/// Main TUI application state
pub struct App {
    pub current_screen: Screen,
    /// Handler of `current_screen`; rebuilt on every navigation
    active: Box<dyn ScreenHandler>,
    collections: Collections,
    config: Config,

    pub should_quit: bool,
    pub show_help_popup: bool,
}

impl App {
    /// Create the application on the home screen.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: Config, collections: Collections) -> Self {
        let active: Box<dyn ScreenHandler> = Box::new(MainMenuScreen::new(&config.api_url));
        Self {
            current_screen: Screen::Home,
            active,
            collections,
            config,
            should_quit: false,
            show_help_popup: false,
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let tick = self.config.tick();

        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }

            self.active.poll();

            if self.should_quit {
                info!("Quitting");
                break;
            }

            tokio::task::yield_now().await;
        }

        Ok(())
    }

    /// Handle keyboard input events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let typing = self.active.captures_text_input();

        // Global shortcuts; plain characters belong to an open form
        match key.code {
            KeyCode::F(1) => {
                self.show_help_popup = !self.show_help_popup;
                return;
            }
            KeyCode::Char('?') if !typing => {
                self.show_help_popup = !self.show_help_popup;
                return;
            }
            KeyCode::Esc if self.show_help_popup => {
                self.show_help_popup = false;
                return;
            }
            KeyCode::Char('q') if !typing => {
                self.should_quit = true;
                return;
            }
            _ => {}
        }

        if self.show_help_popup {
            return;
        }

        let action = self.active.handle_key_event(key);
        self.apply_action(action);
    }

    fn apply_action(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::NavigateTo(screen) => self.navigate_to_screen(screen),
            ScreenAction::NavigateBack => self.navigate_to_screen(Screen::Home),
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::None => {}
        }
    }

    /// Navigate to a specific screen, mounting a fresh handler for it
    pub fn navigate_to_screen(&mut self, screen: Screen) {
        debug!("Navigating from {:?} to {:?}", self.current_screen, screen);
        let ordering = self.config.cycle_ordering();
        let collections = &self.collections;

        self.active = match screen {
            Screen::Home => Box::new(MainMenuScreen::new(&self.config.api_url)),
            Screen::Students => Box::new(EntityListController::mount(
                students_page(&collections.students).with_ordering(ordering),
            )),
            Screen::Courses => Box::new(EntityListController::mount(
                courses_page(&collections.courses).with_ordering(ordering),
            )),
            Screen::Enrollments => Box::new(EntityListController::mount(
                enrollments_page(collections).with_ordering(ordering),
            )),
        };
        self.current_screen = screen;
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.active.draw(f, chunks[0]);
        self.draw_status_bar(f, chunks[1]);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    /// Draw status bar with current screen info and shortcuts
    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = format!(
            "School Admin - {} | Esc: Back | q: Quit | F1/?: Help",
            self.active.title()
        );

        let status_bar = Paragraph::new(status_text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(status_bar, area);
    }

    /// Draw help popup with context-sensitive shortcuts
    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(80, 80, area);

        f.render_widget(Clear, popup_area);

        let help_content = format!(
            "Global Shortcuts:\n\
            F1 / ? - Toggle this help\n\
            q - Quit (except while typing in a form)\n\n{}",
            self.active.help()
        );
        let help_popup = Paragraph::new(help_content)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("Help - Context Shortcuts")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        f.render_widget(help_popup, popup_area);
    }
}
