//! Footer line.
//!
//! Shows the key hints for the active tab followed by the latest status
//! message, if any.

use ftui::widgets::Widget as FtuiWidget;

use crate::tui::router::Tab;
use crate::tui::theme::Theme;

/// Footer widget for the bottom row of the dashboard.
#[derive(Debug)]
pub struct StatusBar<'a> {
    theme: Option<&'a Theme>,
    tab: Tab,
    /// Latest status message, appended after the hints.
    message: Option<&'a str>,
}

impl<'a> Default for StatusBar<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self {
            theme: None,
            tab: Tab::Home,
            message: None,
        }
    }

    pub fn theme(mut self, theme: &'a Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Set the active tab; data tabs get selection and refresh hints.
    pub fn tab(mut self, tab: Tab) -> Self {
        self.tab = tab;
        self
    }

    pub fn message(mut self, message: &'a str) -> Self {
        self.message = Some(message);
        self
    }

    /// Key hints for the active tab.
    pub fn build_hints_text(&self) -> String {
        let mut text = String::from("Press 'q' to quit, tab/arrow keys to navigate");
        let noun = match self.tab {
            Tab::Users => Some("users"),
            Tab::Routines => Some("routines"),
            Tab::Home => None,
        };
        if let Some(noun) = noun {
            text.push_str(&format!(", up/down to select {noun}, r to refresh"));
        }
        text
    }

    pub fn build_text(&self) -> String {
        let hints = self.build_hints_text();
        match self.message {
            Some(msg) if !msg.is_empty() => format!("{hints} \u{2502} {msg}"),
            _ => hints,
        }
    }

    pub fn render_ftui(&self, area: ftui::layout::Rect, frame: &mut ftui::render::frame::Frame) {
        let style = self
            .theme
            .map(|t| t.class("text.muted"))
            .unwrap_or_default();
        let paragraph = ftui::widgets::paragraph::Paragraph::new(self.build_text()).style(style);
        FtuiWidget::render(&paragraph, area, frame);
    }
}
