//! Entity list controller
//!
//! The list/create/edit/delete lifecycle every entity screen shares. A
//! controller is built from a [`ListConfig`] (fetch operation, columns, form
//! factory, delete operation, optional display-name extractor) and owns one
//! [`FetchController`] plus the overlay state of its add/edit form.
//!
//! Nothing here blocks: form submissions and deletes run as spawned tasks and
//! their outcomes are applied by [`EntityListController::poll`].

use std::{fmt, future::Future, sync::Arc, time::Duration};

use crossterm::event::{KeyCode, KeyEvent};
use futures::{future::BoxFuture, FutureExt};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    oneshot::{self, error::TryRecvError},
};
use tracing::{debug, info, warn};

use crate::{
    admin_tui::{
        components::{
            record_table::{build_table, render_table, Column, TableView},
            status_display::StatusDisplay,
        },
        fetch::{CycleOrdering, FetchController, FetchFn, FetchState},
        traits::{FormSignal, Navigable, Record, RecordForm, ScreenAction, ScreenHandler},
        ui::{centered_rect, render_confirm_dialog, render_message, Styles},
    },
    models::RecordId,
};

/// Delete operation; failures carry a human-readable message
pub type DeleteFn = Arc<dyn Fn(RecordId) -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// Wrap an async closure as a [`DeleteFn`]
pub fn delete_fn<F, Fut>(f: F) -> DeleteFn
where
    F: Fn(RecordId) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), String>> + Send + 'static,
{
    Arc::new(move |id| f(id).boxed())
}

/// Name used for a record in delete confirmations
pub type DisplayName<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;

/// Builds the form mounted for an add or edit intent
pub type FormFactory<R> = Arc<dyn Fn(FormMount<R>) -> Box<dyn RecordForm> + Send + Sync>;

/// Which value addresses a record in update calls
pub enum UpdateKey<R> {
    /// The record's identifier
    Id,
    /// A natural key read from the record
    Field(fn(&R) -> String),
}

impl<R: Record> UpdateKey<R> {
    pub fn resolve(&self, record: &R) -> String {
        match self {
            UpdateKey::Id => record.id().to_string(),
            UpdateKey::Field(field) => field(record),
        }
    }
}

impl<R> Clone for UpdateKey<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for UpdateKey<R> {}

impl<R> fmt::Debug for UpdateKey<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateKey::Id => write!(f, "UpdateKey::Id"),
            UpdateKey::Field(_) => write!(f, "UpdateKey::Field(..)"),
        }
    }
}

/// What a form receives when it is mounted
#[derive(Debug, Clone)]
pub struct FormMount<R> {
    /// Record to prefill; `None` when adding
    pub item_to_edit: Option<R>,
    pub update_key: UpdateKey<R>,
}

impl<R: Record> FormMount<R> {
    pub fn is_editing(&self) -> bool {
        self.item_to_edit.is_some()
    }

    /// Key the update call must be addressed with, when editing
    pub fn update_target(&self) -> Option<String> {
        self.item_to_edit.as_ref().map(|record| self.update_key.resolve(record))
    }
}

/// Per-entity configuration of a list screen
pub struct ListConfig<R> {
    pub title: String,
    pub add_label: String,
    pub fetch: FetchFn<R>,
    pub form: FormFactory<R>,
    pub columns: Vec<Column<R>>,
    pub delete: DeleteFn,
    pub update_key: UpdateKey<R>,
    pub display_name: Option<DisplayName<R>>,
    pub ordering: CycleOrdering,
}

impl<R: Record> ListConfig<R> {
    pub fn new(
        title: &str,
        fetch: FetchFn<R>,
        form: FormFactory<R>,
        columns: Vec<Column<R>>,
        delete: DeleteFn,
    ) -> Self {
        Self {
            title: title.to_string(),
            add_label: "Add".to_string(),
            fetch,
            form,
            columns,
            delete,
            update_key: UpdateKey::Id,
            display_name: None,
            ordering: CycleOrdering::default(),
        }
    }

    pub fn with_add_label(mut self, label: &str) -> Self {
        self.add_label = label.to_string();
        self
    }

    pub fn with_update_key(mut self, update_key: UpdateKey<R>) -> Self {
        self.update_key = update_key;
        self
    }

    pub fn with_display_name<F>(mut self, display_name: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
    {
        self.display_name = Some(Arc::new(display_name));
        self
    }

    pub fn with_ordering(mut self, ordering: CycleOrdering) -> Self {
        self.ordering = ordering;
        self
    }
}

/// Mode of the add/edit form
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay<R> {
    Closed,
    Adding,
    Editing(R),
}

impl<R> Overlay<R> {
    pub fn is_open(&self) -> bool {
        !matches!(self, Overlay::Closed)
    }

    pub fn item_to_edit(&self) -> Option<&R> {
        match self {
            Overlay::Editing(record) => Some(record),
            _ => None,
        }
    }
}

/// Pending yes/no question before a delete
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteConfirmation {
    pub record_id: RecordId,
    pub display_name: String,
    pub message: String,
}

/// What the list area shows
#[derive(Debug, PartialEq)]
pub enum ListView<'a, R> {
    Loading,
    Failed(&'a str),
    Table(&'a [R]),
}

struct DeleteOutcome {
    record_id: RecordId,
    display_name: String,
    result: Result<(), String>,
}

const ACTIONS_CELL: &str = "[e] Edit  [d] Delete";
const NOTICE_TIMEOUT: Duration = Duration::from_secs(6);
const FORM_LOAD_POLL: Duration = Duration::from_millis(5);

pub struct EntityListController<R: Record> {
    config: ListConfig<R>,
    fetch: FetchController<R>,
    overlay: Overlay<R>,
    form: Option<Box<dyn RecordForm>>,
    pending_submit: Option<oneshot::Receiver<Result<(), String>>>,
    confirmation: Option<DeleteConfirmation>,
    deletes_in_flight: usize,
    delete_tx: UnboundedSender<DeleteOutcome>,
    delete_rx: UnboundedReceiver<DeleteOutcome>,
    notices: StatusDisplay,
    selected: Option<RecordId>,
}

impl<R: Record> EntityListController<R> {
    /// Mount the controller; its first fetch cycle starts immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(config: ListConfig<R>) -> Self {
        info!("Mounting list screen: {}", config.title);
        let fetch = FetchController::mount(config.fetch.clone(), config.ordering);
        let (delete_tx, delete_rx) = mpsc::unbounded_channel();

        Self {
            config,
            fetch,
            overlay: Overlay::Closed,
            form: None,
            pending_submit: None,
            confirmation: None,
            deletes_in_flight: 0,
            delete_tx,
            delete_rx,
            notices: StatusDisplay::new().with_auto_clear(NOTICE_TIMEOUT),
            selected: None,
        }
    }

    pub fn overlay(&self) -> &Overlay<R> {
        &self.overlay
    }

    pub fn fetch_state(&self) -> &FetchState<R> {
        self.fetch.state()
    }

    pub fn fetch_cycles(&self) -> u64 {
        self.fetch.cycles_issued()
    }

    pub fn confirmation(&self) -> Option<&DeleteConfirmation> {
        self.confirmation.as_ref()
    }

    pub fn notices(&self) -> &StatusDisplay {
        &self.notices
    }

    pub fn is_submitting(&self) -> bool {
        self.pending_submit.is_some()
    }

    /// Start a fetch cycle by hand
    pub fn refetch(&mut self) {
        self.fetch.refetch();
    }

    /// Records currently shown, in server order
    pub fn records(&self) -> &[R] {
        self.fetch.data().unwrap_or(&[])
    }

    pub fn view(&self) -> ListView<'_, R> {
        let state = self.fetch.state();
        match (&state.data, &state.error) {
            (Some(data), _) => ListView::Table(data),
            (None, Some(error)) => ListView::Failed(error),
            (None, None) => ListView::Loading,
        }
    }

    pub fn table_view(&self) -> TableView {
        let actions = |_: &R| ACTIONS_CELL.to_string();
        build_table(&self.config.columns, self.records(), Some(&actions))
    }

    /// Open the form for a new record. Only accepted while closed.
    pub fn open_add(&mut self) -> bool {
        if self.overlay.is_open() {
            return false;
        }
        debug!("{}: opening add form", self.config.title);
        self.mount_form(None);
        self.overlay = Overlay::Adding;
        true
    }

    /// Open the form prefilled with `record`. Only accepted while closed.
    pub fn open_edit(&mut self, record: R) -> bool {
        if self.overlay.is_open() {
            return false;
        }
        debug!("{}: opening edit form for #{}", self.config.title, record.id());
        self.mount_form(Some(record.clone()));
        self.overlay = Overlay::Editing(record);
        true
    }

    fn mount_form(&mut self, item_to_edit: Option<R>) {
        let mount = FormMount {
            item_to_edit,
            update_key: self.config.update_key,
        };
        self.form = Some((self.config.form)(mount));
    }

    /// Success callback of the mounted form: close it and reload the list
    pub fn on_form_success(&mut self) {
        info!("{}: form submitted", self.config.title);
        self.close_form();
        self.fetch.refetch();
    }

    /// Cancel callback of the mounted form
    pub fn on_form_cancel(&mut self) {
        debug!("{}: form cancelled", self.config.title);
        self.close_form();
    }

    fn close_form(&mut self) {
        self.overlay = Overlay::Closed;
        self.form = None;
        self.pending_submit = None;
    }

    fn start_submit(&mut self, submission: BoxFuture<'static, Result<(), String>>) {
        if self.pending_submit.is_some() {
            return;
        }
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(submission.await);
        });
        if let Some(form) = self.form.as_mut() {
            form.set_submitting(true);
        }
        self.pending_submit = Some(rx);
    }

    fn finish_submit(&mut self, result: Result<(), String>) {
        match result {
            Ok(()) => self.on_form_success(),
            Err(message) => {
                warn!("{}: submit failed: {}", self.config.title, message);
                // The form owns submit errors; the overlay stays as it is
                if let Some(form) = self.form.as_mut() {
                    form.set_submitting(false);
                    form.submit_failed(message);
                }
            }
        }
    }

    fn poll_submit(&mut self) -> bool {
        let Some(rx) = self.pending_submit.as_mut() else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Closed) => Err("The submission was interrupted.".to_string()),
        };
        self.pending_submit = None;
        self.finish_submit(result);
        true
    }

    /// Name of `record` as shown in confirmations
    pub fn display_name(&self, record: &R) -> String {
        match &self.config.display_name {
            Some(display_name) => display_name(record),
            None => record
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", record.id())),
        }
    }

    /// Ask the user to confirm deleting `record`. Ignored while another
    /// confirmation is pending.
    pub fn request_delete(&mut self, record: &R) -> Option<&DeleteConfirmation> {
        if self.confirmation.is_some() {
            return None;
        }
        let display_name = self.display_name(record);
        let message = format!("Are you sure you want to delete \"{}\"?", display_name);
        self.confirmation = Some(DeleteConfirmation {
            record_id: record.id(),
            display_name,
            message,
        });
        self.confirmation.as_ref()
    }

    /// Answer the pending confirmation; declining leaves no trace
    pub fn resolve_delete(&mut self, confirmed: bool) {
        let Some(confirmation) = self.confirmation.take() else {
            return;
        };
        if !confirmed {
            debug!("{}: delete of #{} declined", self.config.title, confirmation.record_id);
            return;
        }

        info!("{}: deleting #{}", self.config.title, confirmation.record_id);
        let deletion = (self.config.delete)(confirmation.record_id);
        let tx = self.delete_tx.clone();
        self.deletes_in_flight += 1;
        tokio::spawn(async move {
            let result = deletion.await;
            let _ = tx.send(DeleteOutcome {
                record_id: confirmation.record_id,
                display_name: confirmation.display_name,
                result,
            });
        });
    }

    fn finish_delete(&mut self, outcome: DeleteOutcome) {
        self.deletes_in_flight = self.deletes_in_flight.saturating_sub(1);
        match outcome.result {
            Ok(()) => {
                info!("{}: deleted #{}", self.config.title, outcome.record_id);
                self.notices.set_success(format!("Deleted \"{}\".", outcome.display_name));
                self.fetch.refetch();
            }
            Err(message) => {
                warn!("{}: delete of #{} failed: {}", self.config.title, outcome.record_id, message);
                self.notices.set_error(format!("Could not delete: {}", message));
            }
        }
    }

    /// Apply every background result that arrived since the last poll
    pub fn poll(&mut self) -> bool {
        let mut changed = false;

        while let Ok(outcome) = self.delete_rx.try_recv() {
            self.finish_delete(outcome);
            changed = true;
        }

        if let Some(form) = self.form.as_mut() {
            form.poll();
        }
        changed |= self.poll_submit();

        if self.fetch.poll() {
            self.reconcile_selection();
            changed = true;
        }

        changed |= self.notices.clear_expired();
        changed
    }

    /// Wait until no background work is outstanding
    pub async fn settle(&mut self) {
        while self.deletes_in_flight > 0 {
            match self.delete_rx.recv().await {
                Some(outcome) => self.finish_delete(outcome),
                None => break,
            }
        }

        while self.form.as_ref().map_or(false, |form| form.is_loading()) {
            tokio::time::sleep(FORM_LOAD_POLL).await;
            if let Some(form) = self.form.as_mut() {
                form.poll();
            }
        }

        if let Some(rx) = self.pending_submit.take() {
            let result = rx
                .await
                .unwrap_or_else(|_| Err("The submission was interrupted.".to_string()));
            self.finish_submit(result);
        }

        if let Some(form) = self.form.as_mut() {
            form.poll();
        }

        self.fetch.settle().await;
        self.reconcile_selection();
    }

    /// Keep the selection on the same record id; fall back to the first row
    fn reconcile_selection(&mut self) {
        let records = self.records();
        let still_there = self
            .selected
            .map_or(false, |id| records.iter().any(|r| r.id() == id));
        if !still_there {
            self.selected = records.first().map(|r| r.id());
        }
    }

    pub fn selected_id(&self) -> Option<RecordId> {
        self.selected
    }

    pub fn selected_record(&self) -> Option<&R> {
        let id = self.selected?;
        self.records().iter().find(|r| r.id() == id)
    }

    pub fn select(&mut self, id: RecordId) {
        self.selected = Some(id);
    }

    fn draw_header(&self, f: &mut Frame, area: Rect) {
        let state = self.fetch.state();
        // A failure with no data is drawn in place of the table instead
        let refresh = match (&state.error, &state.data) {
            _ if state.loading => Span::styled("   refreshing...", Styles::inactive()),
            (Some(message), Some(_)) => {
                Span::styled(format!("   Refresh failed: {}", message), Styles::error())
            }
            _ => Span::raw(""),
        };
        let line = Line::from(vec![
            Span::styled(self.config.title.clone(), Styles::title()),
            Span::raw("   "),
            Span::styled("[a] ", Styles::info()),
            Span::raw(self.config.add_label.clone()),
            refresh,
        ]);

        let header = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(header, area);
    }

    fn draw_form(&mut self, f: &mut Frame, area: Rect) {
        let submitting = self.is_submitting();
        let Some(form) = self.form.as_mut() else {
            return;
        };

        let popup = centered_rect(70, 80, area);
        f.render_widget(Clear, popup);

        let title = if submitting {
            format!("{} (saving...)", form.title())
        } else {
            form.title()
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Styles::active_border());
        let inner = block.inner(popup);
        f.render_widget(block, popup);

        form.draw(f, inner);
    }
}

impl<R: Record> Navigable for EntityListController<R> {
    fn navigate_up(&mut self) {
        let count = self.get_item_count();
        if count == 0 {
            return;
        }
        let current = self.get_selected_index().unwrap_or(0);
        let next = if current == 0 { count - 1 } else { current - 1 };
        self.set_selected_index(Some(next));
    }

    fn navigate_down(&mut self) {
        let count = self.get_item_count();
        if count == 0 {
            return;
        }
        let next = self.get_selected_index().map_or(0, |i| (i + 1) % count);
        self.set_selected_index(Some(next));
    }

    fn get_selected_index(&self) -> Option<usize> {
        let id = self.selected?;
        self.records().iter().position(|r| r.id() == id)
    }

    fn set_selected_index(&mut self, index: Option<usize>) {
        self.selected = index.and_then(|i| self.records().get(i)).map(|r| r.id());
    }

    fn get_item_count(&self) -> usize {
        self.records().len()
    }
}

impl<R: Record> ScreenHandler for EntityListController<R> {
    fn title(&self) -> String {
        self.config.title.clone()
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        self.draw_header(f, chunks[0]);

        match self.view() {
            ListView::Loading => {
                render_message(f, chunks[1], &self.config.title, "Loading...", Styles::info());
            }
            ListView::Failed(error) => {
                render_message(f, chunks[1], &self.config.title, &format!("Error: {}", error), Styles::error());
            }
            ListView::Table(_) => {
                let table = self.table_view();
                render_table(f, chunks[1], &table, &self.config.title, self.selected);
            }
        }

        self.notices.render(
            f,
            chunks[2],
            "↑/↓ Select | a Add | e Edit | d Delete | r Refresh | Esc Back",
        );

        self.draw_form(f, area);

        if let Some(confirmation) = &self.confirmation {
            render_confirm_dialog(f, area, &confirmation.message);
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction {
        if self.confirmation.is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.resolve_delete(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.resolve_delete(false),
                _ => {}
            }
            return ScreenAction::None;
        }

        if self.form.is_some() {
            // Input is frozen until the running submission reports back
            if self.pending_submit.is_some() {
                return ScreenAction::None;
            }
            let signal = match self.form.as_mut() {
                Some(form) => form.handle_key_event(key),
                None => FormSignal::Idle,
            };
            match signal {
                FormSignal::Idle => {}
                FormSignal::Submit(submission) => self.start_submit(submission),
                FormSignal::Cancel => self.on_form_cancel(),
            }
            return ScreenAction::None;
        }

        match key.code {
            KeyCode::Up => self.navigate_up(),
            KeyCode::Down => self.navigate_down(),
            KeyCode::Home => self.navigate_to_first(),
            KeyCode::End => self.navigate_to_last(),
            KeyCode::Char('a') => {
                self.open_add();
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(record) = self.selected_record().cloned() {
                    self.open_edit(record);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(record) = self.selected_record().cloned() {
                    self.request_delete(&record);
                }
            }
            KeyCode::Char('r') | KeyCode::F(5) => {
                self.notices.clear();
                self.refetch();
            }
            KeyCode::Esc => return ScreenAction::NavigateBack,
            _ => {}
        }
        ScreenAction::None
    }

    fn poll(&mut self) -> bool {
        EntityListController::poll(self)
    }

    fn captures_text_input(&self) -> bool {
        self.form.is_some() || self.confirmation.is_some()
    }

    fn help(&self) -> &'static str {
        "List Screen:\n\
        ↑/↓ - Select record\n\
        a - Add record\n\
        e / Enter - Edit selected record\n\
        d / Delete - Delete selected record\n\
        r / F5 - Refresh list\n\
        Esc - Back to main menu\n\n\
        Form:\n\
        Tab / Shift+Tab - Next / previous field\n\
        Enter - Save (or pick an option)\n\
        Esc - Cancel\n\n\
        Delete confirmation:\n\
        y / Enter - Confirm\n\
        n / Esc - Cancel"
    }
}
