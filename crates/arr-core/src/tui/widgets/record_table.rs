//! Scrollable table of projected records.
//!
//! Columns have fixed widths taken from the projector and shrink
//! proportionally when the terminal is narrower than their sum. Rendering
//! uses ftui's built-in Table widget.

use ftui::layout::Constraint as FtuiConstraint;
use ftui::text::Text as FtuiText;
use ftui::widgets::table::{Row as FtuiRow, Table as FtuiTable, TableState as FtuiTableState};
use ftui::widgets::StatefulWidget as FtuiStatefulWidget;
use ftui::Style as FtuiStyle;

use crate::tui::projector::{nominal_widths, scale_widths, Column};
use crate::tui::theme::Theme;

/// Rows assumed visible before the first resize arrives.
const DEFAULT_VIEWPORT: usize = 20;

/// Table widget over string rows.
#[derive(Debug)]
pub struct RecordTable<'a> {
    theme: Option<&'a Theme>,
    columns: &'a [Column],
    available_width: Option<u16>,
}

impl<'a> RecordTable<'a> {
    pub fn new(columns: &'a [Column]) -> Self {
        Self {
            theme: None,
            columns,
            available_width: None,
        }
    }

    pub fn theme(mut self, theme: &'a Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Width the columns must fit into. Defaults to the render area width.
    pub fn available_width(mut self, width: u16) -> Self {
        self.available_width = Some(width);
        self
    }

    /// Column widths for a given available width.
    pub fn widths(&self, available: u16) -> Vec<u16> {
        scale_widths(&nominal_widths(self.columns), available)
    }

    fn style(&self, class: &str, fallback: FtuiStyle) -> FtuiStyle {
        self.theme
            .map(|t| t.stylesheet().get_or_default(class))
            .unwrap_or(fallback)
    }

    /// Render from an immutable state reference (for Elm view()).
    pub fn render_view(
        &self,
        area: ftui::layout::Rect,
        frame: &mut ftui::render::frame::Frame,
        state: &RecordTableState,
    ) {
        let available = self.available_width.unwrap_or(area.width);
        let constraints: Vec<FtuiConstraint> = self
            .widths(available)
            .into_iter()
            .map(FtuiConstraint::Fixed)
            .collect();

        let header = FtuiRow::new(
            self.columns
                .iter()
                .map(|c| FtuiText::raw(c.title))
                .collect::<Vec<_>>(),
        )
        .style(self.style("table.header", FtuiStyle::new().bold()));

        let rows: Vec<FtuiRow> = state
            .rows
            .iter()
            .map(|cells| {
                FtuiRow::new(
                    cells
                        .iter()
                        .map(|c| FtuiText::raw(c.clone()))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        let table = FtuiTable::new(rows, constraints)
            .header(header)
            .highlight_style(self.style("table.selected", FtuiStyle::new().reverse()))
            .column_spacing(1);

        let mut ftui_state = FtuiTableState::default();
        if !state.rows.is_empty() {
            ftui_state.selected = Some(state.cursor);
        }
        ftui_state.offset = state.scroll_offset;

        FtuiStatefulWidget::render(&table, area, frame, &mut ftui_state);
    }
}

/// Rows and cursor position of a record table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTableState {
    pub rows: Vec<Vec<String>>,
    pub cursor: usize,
    pub scroll_offset: usize,
    viewport: usize,
}

impl RecordTableState {
    pub fn new() -> Self {
        Self {
            viewport: DEFAULT_VIEWPORT,
            ..Self::default()
        }
    }

    /// Replace the rows. The cursor is clamped to the new length.
    pub fn set_rows(&mut self, rows: Vec<Vec<String>>) {
        self.rows = rows;
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
        self.ensure_cursor_visible();
    }

    /// Number of body rows that fit on screen.
    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport = rows.max(1);
        self.ensure_cursor_visible();
    }

    pub fn viewport(&self) -> usize {
        self.viewport.max(1)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn current_row(&self) -> Option<&[String]> {
        self.rows.get(self.cursor).map(Vec::as_slice)
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.rows.len() {
            self.cursor += 1;
            self.ensure_cursor_visible();
        }
    }

    pub fn cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.ensure_cursor_visible();
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
        self.scroll_offset = 0;
    }

    pub fn cursor_end(&mut self) {
        if !self.rows.is_empty() {
            self.cursor = self.rows.len() - 1;
            self.ensure_cursor_visible();
        }
    }

    pub fn page_down(&mut self, page_size: usize) {
        self.cursor = (self.cursor + page_size).min(self.rows.len().saturating_sub(1));
        self.ensure_cursor_visible();
    }

    pub fn page_up(&mut self, page_size: usize) {
        self.cursor = self.cursor.saturating_sub(page_size);
        self.ensure_cursor_visible();
    }

    fn ensure_cursor_visible(&mut self) {
        let visible = self.viewport();
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + visible {
            self.scroll_offset = self.cursor + 1 - visible;
        }
    }
}
