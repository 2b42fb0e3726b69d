//! Constraint-based screen layout.
//!
//! The screen is a fixed stack solved with ftui's Flex solver:
//!
//! ```text
//! ┌ tabs ───────────────┐  3 rows
//! │ content             │  rest
//! └─────────────────────┘
//!  footer                  1 row
//! ```
//!
//! Data tabs split the content box further into a table and a one-line
//! summary beneath it.

use ftui::layout::{Constraint, Flex, Rect};
use tracing::trace;

/// Smallest usable terminal.
pub const MIN_WIDTH: u16 = 40;
pub const MIN_HEIGHT: u16 = 10;

/// Rows taken by everything except table body rows on a data tab.
///
/// Tab bar (3), content borders (2), padding (2), table header (1),
/// summary gap and line (2), footer (1), spare (2).
pub const TABLE_CHROME_ROWS: u16 = 13;

/// Areas of the top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainAreas {
    pub tabs: Rect,
    pub content: Rect,
    pub footer: Rect,
}

/// Areas inside the content box of a data tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataAreas {
    pub table: Rect,
    pub summary: Rect,
}

#[derive(Debug, Clone, Copy)]
pub struct ResponsiveLayout {
    area: Rect,
}

impl ResponsiveLayout {
    pub fn new(area: Rect) -> Self {
        trace!(width = area.width, height = area.height, "layout.calculate");
        Self { area }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Check if terminal is too small for usable display.
    pub fn is_too_small(&self) -> bool {
        self.area.width < MIN_WIDTH || self.area.height < MIN_HEIGHT
    }

    pub fn main_areas(&self) -> MainAreas {
        let chunks = Flex::vertical()
            .constraints([
                Constraint::Fixed(3), // Tab bar
                Constraint::Min(3),   // Content
                Constraint::Fixed(1), // Footer
            ])
            .split(self.area);

        MainAreas {
            tabs: chunks[0],
            content: chunks[1],
            footer: chunks[2],
        }
    }

    /// Split the inside of a bordered content box into table and summary.
    pub fn data_areas(content: Rect) -> DataAreas {
        let inner = inset(content, 2, 1);
        let chunks = Flex::vertical()
            .constraints([
                Constraint::Min(1),   // Table
                Constraint::Fixed(1), // Gap
                Constraint::Fixed(1), // Summary
            ])
            .split(inner);

        DataAreas {
            table: chunks[0],
            summary: chunks[2],
        }
    }
}

/// Table body rows that fit in a terminal `height` rows tall.
pub fn table_height(height: u16) -> u16 {
    height.saturating_sub(TABLE_CHROME_ROWS)
}

/// Shrink `area` by `dx` columns and `dy` rows on each side.
/// Row-aligned inside of a one-cell border.
pub fn block_inner(area: Rect) -> Rect {
    inset(area, 1, 1)
}

pub fn inset(area: Rect, dx: u16, dy: u16) -> Rect {
    let width = area.width.saturating_sub(dx.saturating_mul(2));
    let height = area.height.saturating_sub(dy.saturating_mul(2));
    Rect::new(
        area.x.saturating_add(dx.min(area.width / 2)),
        area.y.saturating_add(dy.min(area.height / 2)),
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_too_small() {
        assert!(ResponsiveLayout::new(Rect::new(0, 0, 39, 24)).is_too_small());
        assert!(ResponsiveLayout::new(Rect::new(0, 0, 80, 9)).is_too_small());
        assert!(!ResponsiveLayout::new(Rect::new(0, 0, 40, 10)).is_too_small());
    }

    #[test]
    fn test_main_areas_stack() {
        let areas = ResponsiveLayout::new(Rect::new(0, 0, 100, 30)).main_areas();
        assert_eq!(areas.tabs.height, 3);
        assert_eq!(areas.footer.height, 1);
        assert_eq!(areas.content.y, 3);
        assert_eq!(areas.content.height, 26);
        assert_eq!(areas.footer.y, 29);
    }

    #[test]
    fn test_areas_cover_full_width() {
        let areas = ResponsiveLayout::new(Rect::new(0, 0, 120, 40)).main_areas();
        for rect in [areas.tabs, areas.content, areas.footer] {
            assert_eq!(rect.x, 0);
            assert_eq!(rect.width, 120);
        }
    }

    #[test]
    fn test_data_areas_inside_content() {
        let content = Rect::new(0, 3, 100, 26);
        let data = ResponsiveLayout::data_areas(content);
        assert_eq!(data.table.x, 2);
        assert_eq!(data.table.width, 96);
        assert_eq!(data.summary.y + 1, content.y + content.height - 1);
        assert!(data.table.y + data.table.height <= data.summary.y);
    }

    #[test]
    fn test_table_height_saturates() {
        assert_eq!(table_height(40), 27);
        assert_eq!(table_height(5), 0);
    }

    #[test]
    fn test_block_inner_starts_below_top_border() {
        let inner = block_inner(Rect::new(0, 3, 80, 16));
        assert_eq!(inner, Rect::new(1, 4, 78, 14));
    }

    #[test]
    fn test_inset_never_underflows() {
        let r = inset(Rect::new(5, 5, 2, 1), 2, 1);
        assert_eq!(r.width, 0);
        assert_eq!(r.height, 0);
    }
}
