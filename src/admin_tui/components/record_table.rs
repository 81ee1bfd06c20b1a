//! Generic record table
//!
//! Rendering is split in two steps: [`build_table`] turns columns and records
//! into a plain [`TableView`] (pure, no terminal involved), and
//! [`render_table`] draws that view with ratatui. The CLI prints the same view
//! through [`TableView::to_text`].

use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Row, Table, TableState},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    admin_tui::{traits::Record, ui::Styles},
    models::RecordId,
};

/// How a column obtains its display value
pub enum CellValue<R> {
    /// A text field read straight off the record
    Field(fn(&R) -> &str),
    /// A value derived from the record, e.g. a related record's name
    Derived(Box<dyn Fn(&R) -> String + Send + Sync>),
}

/// One table column
pub struct Column<R> {
    pub header: String,
    /// Stable column key
    pub accessor: &'static str,
    pub value: CellValue<R>,
}

impl<R> Column<R> {
    pub fn field(header: &str, accessor: &'static str, field: fn(&R) -> &str) -> Self {
        Self {
            header: header.to_string(),
            accessor,
            value: CellValue::Field(field),
        }
    }

    pub fn derived<F>(header: &str, accessor: &'static str, derive: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
    {
        Self {
            header: header.to_string(),
            accessor,
            value: CellValue::Derived(Box::new(derive)),
        }
    }

    pub fn display(&self, record: &R) -> String {
        match &self.value {
            CellValue::Field(field) => field(record).to_string(),
            CellValue::Derived(derive) => derive(record),
        }
    }
}

/// Renders the trailing actions cell of a row
pub type ActionRenderer<'a, R> = &'a dyn Fn(&R) -> String;

/// Header of the trailing actions column
pub const ACTIONS_HEADER: &str = "Actions";

/// Display-ready table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

/// One row, keyed by the identifier of the record it shows
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub key: RecordId,
    pub cells: Vec<String>,
}

/// Build the table for `rows` in the order given
pub fn build_table<R: Record>(
    columns: &[Column<R>],
    rows: &[R],
    actions: Option<ActionRenderer<'_, R>>,
) -> TableView {
    let mut headers: Vec<String> = columns.iter().map(|c| c.header.clone()).collect();
    if actions.is_some() {
        headers.push(ACTIONS_HEADER.to_string());
    }

    let rows = rows
        .iter()
        .map(|record| {
            let mut cells: Vec<String> = columns.iter().map(|c| c.display(record)).collect();
            if let Some(actions) = actions {
                cells.push(actions(record));
            }
            TableRow {
                key: record.id(),
                cells,
            }
        })
        .collect();

    TableView { headers, rows }
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row index of the record with identifier `key`
    pub fn position(&self, key: RecordId) -> Option<usize> {
        self.rows.iter().position(|row| row.key == key)
    }

    /// Display width of every column, header included
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.cells.get(i))
                    .map(|cell| cell.width())
                    .chain(std::iter::once(header.width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Plain-text rendering with aligned columns
    pub fn to_text(&self) -> String {
        let widths = self.column_widths();
        let mut lines = Vec::with_capacity(self.rows.len() + 2);

        lines.push(format_line(&self.headers, &widths));
        let total: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 3;
        lines.push("-".repeat(total));
        for row in &self.rows {
            lines.push(format_line(&row.cells, &widths));
        }

        lines.join("\n")
    }
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad(cell, *width))
        .collect();
    padded.join(" | ").trim_end().to_string()
}

/// Left-align by display width; `format!` pads by char count
fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

/// One column of gap after each width, clamped to what a terminal can address
fn column_constraints(widths: &[usize]) -> Vec<Constraint> {
    widths
        .iter()
        .map(|&w| Constraint::Length(u16::try_from(w).unwrap_or(u16::MAX).saturating_add(1)))
        .collect()
}

/// Draw `view`, highlighting the row keyed by `selected`
pub fn render_table(f: &mut Frame, area: Rect, view: &TableView, title: &str, selected: Option<RecordId>) {
    let widths = column_constraints(&view.column_widths());

    let header = Row::new(view.headers.clone()).style(Styles::title());
    let rows: Vec<Row> = view.rows.iter().map(|row| Row::new(row.cells.clone())).collect();

    let title = if view.is_empty() {
        format!("{} (Empty)", title)
    } else {
        format!("{} ({})", title, view.rows.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        )
        .highlight_style(Styles::selected())
        .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(selected.and_then(|key| view.position(key)));

    f.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: RecordId,
        name: String,
        owner: (RecordId, String),
    }

    impl Record for Item {
        fn id(&self) -> RecordId {
            self.id
        }
    }

    fn item(id: RecordId, name: &str, owner: &str) -> Item {
        Item {
            id,
            name: name.to_string(),
            owner: (id * 10, owner.to_string()),
        }
    }

    fn columns() -> Vec<Column<Item>> {
        vec![
            Column::<Item>::field("Name", "name", |i| i.name.as_str()),
            Column::<Item>::derived("Owner", "owner", |i| i.owner.1.clone()),
        ]
    }

    pub(crate) fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_rows_follow_input_order_and_are_keyed_by_id() {
        let rows = vec![item(2, "B", "Bea"), item(1, "A", "Ana")];
        let view = build_table(&columns(), &rows, None);

        assert_eq!(view.headers, vec!["Name", "Owner"]);
        assert_eq!(
            view.rows,
            vec![
                TableRow { key: 2, cells: vec!["B".to_string(), "Bea".to_string()] },
                TableRow { key: 1, cells: vec!["A".to_string(), "Ana".to_string()] },
            ]
        );
        assert_eq!(view.position(1), Some(1));
        assert_eq!(view.position(3), None);
    }

    #[test]
    fn test_empty_rows_give_header_only_table() {
        let view = build_table::<Item>(&columns(), &[], Some(&|_: &Item| "edit".to_string()));
        assert!(view.is_empty());
        assert_eq!(view.headers, vec!["Name", "Owner", ACTIONS_HEADER]);
        assert_eq!(view.to_text().lines().count(), 2);
    }

    #[test]
    fn test_actions_cell_is_appended() {
        let rows = vec![item(5, "E", "Eve")];
        let actions = |i: &Item| format!("edit-{} delete-{}", i.id, i.id);
        let view = build_table(&columns(), &rows, Some(&actions));
        assert_eq!(view.rows[0].cells.last().map(String::as_str), Some("edit-5 delete-5"));
    }

    #[test]
    fn test_text_alignment_uses_display_width() {
        let rows = vec![item(1, "Código", "Ana"), item(2, "X", "Bruno")];
        let text = build_table(&columns(), &rows, None).to_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Name   | Owner");
        assert_eq!(lines[1], "--------------");
        assert_eq!(lines[2], "Código | Ana");
        assert_eq!(lines[3], "X      | Bruno");
    }

    #[test]
    fn test_column_constraints_saturate_on_huge_cells() {
        assert_eq!(
            column_constraints(&[4, 65_535, 70_000]),
            vec![
                Constraint::Length(5),
                Constraint::Length(u16::MAX),
                Constraint::Length(u16::MAX),
            ]
        );
    }

    #[test]
    fn test_render_draws_headers_and_cells() {
        let rows = vec![item(1, "Physics", "Ana")];
        let view = build_table(&columns(), &rows, None);

        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                render_table(f, area, &view, "Items", Some(1));
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Items (1)"));
        assert!(text.contains("Name"));
        assert!(text.contains("Physics"));
    }
}
