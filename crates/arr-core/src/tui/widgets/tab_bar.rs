//! Bordered tab strip with the application title.

use ftui::text::{Line as FtuiLine, Span as FtuiSpan, Text as FtuiText};
use ftui::widgets::block::Block as FtuiBlock;
use ftui::widgets::paragraph::Paragraph as FtuiParagraph;
use ftui::widgets::Widget as FtuiWidget;

use crate::tui::layout::block_inner;
use crate::tui::router::Tab;
use crate::tui::theme::Theme;

pub const APP_TITLE: &str = "Arrogance Admin";

const SEPARATOR: &str = " \u{2502} ";

#[derive(Debug)]
pub struct TabBar<'a> {
    theme: Option<&'a Theme>,
    active: Tab,
}

impl<'a> TabBar<'a> {
    pub fn new(active: Tab) -> Self {
        Self {
            theme: None,
            active,
        }
    }

    pub fn theme(mut self, theme: &'a Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Plain-text rendering of the tab labels, e.g. `Home │ Users │ Routines`.
    pub fn labels_text() -> String {
        Tab::ALL
            .iter()
            .map(|t| t.label())
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    fn style(&self, class: &str) -> ftui::Style {
        self.theme.map(|t| t.class(class)).unwrap_or_default()
    }

    pub fn render_ftui(&self, area: ftui::layout::Rect, frame: &mut ftui::render::frame::Frame) {
        let mut spans = Vec::with_capacity(Tab::ALL.len() * 2);
        for (i, tab) in Tab::ALL.iter().enumerate() {
            if i > 0 {
                spans.push(FtuiSpan::styled(SEPARATOR, self.style("text.muted")));
            }
            let class = if *tab == self.active {
                "tab.active"
            } else {
                "tab.inactive"
            };
            spans.push(FtuiSpan::styled(tab.label(), self.style(class)));
        }

        let block = FtuiBlock::bordered()
            .title(APP_TITLE)
            .border_style(self.style("border.normal"));
        FtuiWidget::render(&FtuiParagraph::new(FtuiText::raw("")).block(block), area, frame);

        let labels = FtuiParagraph::new(FtuiText::from_line(FtuiLine::from_spans(spans)));
        FtuiWidget::render(&labels, block_inner(area), frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftui::layout::Rect;
    use ftui::{Frame, GraphemePool};

    #[test]
    fn test_labels_text() {
        assert_eq!(TabBar::labels_text(), "Home \u{2502} Users \u{2502} Routines");
    }

    #[test]
    fn test_render_shows_title_and_tabs() {
        let mut pool = GraphemePool::new();
        let mut frame = Frame::new(60, 3, &mut pool);
        TabBar::new(Tab::Users)
            .theme(&Theme::no_color())
            .render_ftui(Rect::new(0, 0, 60, 3), &mut frame);
        let Frame { buffer, .. } = frame;
        let text = ftui_harness::buffer_to_text(&buffer);
        assert!(text.contains(APP_TITLE));
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[0].contains(APP_TITLE));
        assert!(rows[1].contains(&TabBar::labels_text()));
    }

    #[test]
    fn test_render_labels_on_inner_row_when_offset() {
        let mut pool = GraphemePool::new();
        let mut frame = Frame::new(50, 8, &mut pool);
        TabBar::new(Tab::Home)
            .theme(&Theme::no_color())
            .render_ftui(Rect::new(0, 4, 50, 3), &mut frame);
        let Frame { buffer, .. } = frame;
        let text = ftui_harness::buffer_to_text(&buffer);
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[4].contains(APP_TITLE));
        assert!(rows[5].contains("Home"));
        assert!(rows[5].contains("Users"));
        assert!(rows[5].contains("Routines"));
        assert!(!rows[6].contains("Home"));
    }
}
