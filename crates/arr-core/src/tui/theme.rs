//! Theme and styling for the Arrogance Admin TUI.
//!
//! Provides consistent colors and styles across all widgets using ftui's
//! Theme/StyleSheet system with WCAG accessibility validation.

use ftui::style::{
    contrast_ratio, meets_wcag_aa, meets_wcag_aaa, Rgb as FtuiRgb, StyleSheet,
    Theme as FtuiTheme, ThemeBuilder,
};
use ftui::PackedRgba;
use ftui::Style as FtuiStyle;

/// Theme mode selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    /// Dark theme (default).
    #[default]
    Dark,
    /// High contrast for accessibility (WCAG AAA).
    HighContrast,
    /// Respects the `NO_COLOR` environment variable.
    NoColor,
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(ThemeMode::Dark),
            "light" => Ok(ThemeMode::Light),
            "high-contrast" | "high_contrast" | "hc" => Ok(ThemeMode::HighContrast),
            "no-color" | "no_color" | "none" => Ok(ThemeMode::NoColor),
            _ => Err(format!("unknown theme: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Palette {
    bg: FtuiRgb,
    fg: FtuiRgb,
    accent: FtuiRgb,
    muted: FtuiRgb,
    error: FtuiRgb,
    loading: FtuiRgb,
    success: FtuiRgb,
    border: FtuiRgb,
    selected_bg: FtuiRgb,
}

const DARK: Palette = Palette {
    bg: FtuiRgb::new(30, 30, 30),
    fg: FtuiRgb::new(220, 220, 220),
    accent: FtuiRgb::new(255, 138, 101),
    muted: FtuiRgb::new(150, 150, 150),
    error: FtuiRgb::new(255, 95, 95),
    loading: FtuiRgb::new(255, 200, 50),
    success: FtuiRgb::new(80, 220, 80),
    border: FtuiRgb::new(90, 90, 90),
    selected_bg: FtuiRgb::new(60, 60, 60),
};

const LIGHT: Palette = Palette {
    bg: FtuiRgb::new(255, 255, 255),
    fg: FtuiRgb::new(30, 30, 30),
    accent: FtuiRgb::new(170, 60, 20),
    muted: FtuiRgb::new(105, 105, 105),
    error: FtuiRgb::new(200, 0, 0),
    loading: FtuiRgb::new(140, 100, 0),
    success: FtuiRgb::new(0, 128, 0),
    border: FtuiRgb::new(180, 180, 180),
    selected_bg: FtuiRgb::new(220, 220, 220),
};

const HIGH_CONTRAST: Palette = Palette {
    bg: FtuiRgb::new(0, 0, 0),
    fg: FtuiRgb::new(255, 255, 255),
    accent: FtuiRgb::new(255, 255, 0),
    muted: FtuiRgb::new(200, 200, 200),
    error: FtuiRgb::new(255, 110, 110),
    loading: FtuiRgb::new(255, 255, 80),
    success: FtuiRgb::new(100, 255, 100),
    border: FtuiRgb::new(255, 255, 255),
    selected_bg: FtuiRgb::new(0, 0, 170),
};

fn packed(c: FtuiRgb) -> PackedRgba {
    PackedRgba::rgb(c.r, c.g, c.b)
}

fn color(c: FtuiRgb) -> ftui::Color {
    ftui::Color::rgb(c.r, c.g, c.b)
}

/// Theme configuration for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    pub mode: ThemeMode,
    ftui_theme: FtuiTheme,
    stylesheet: StyleSheet,
    palette: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Theme {
    /// Auto-detect theme from environment variables.
    ///
    /// Priority:
    /// 1. `NO_COLOR` set → NoColor theme
    /// 2. `ARR_THEME=light|dark|high-contrast`
    /// 3. Default → Dark theme
    pub fn from_env() -> Self {
        if std::env::var("NO_COLOR").is_ok() {
            return Self::no_color();
        }
        let mode = std::env::var("ARR_THEME")
            .ok()
            .and_then(|v| v.parse::<ThemeMode>().ok())
            .unwrap_or_default();
        Self::for_mode(mode)
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
            ThemeMode::HighContrast => Self::high_contrast(),
            ThemeMode::NoColor => Self::no_color(),
        }
    }

    pub fn dark() -> Self {
        Self::from_palette(ThemeMode::Dark, DARK)
    }

    pub fn light() -> Self {
        Self::from_palette(ThemeMode::Light, LIGHT)
    }

    pub fn high_contrast() -> Self {
        Self::from_palette(ThemeMode::HighContrast, HIGH_CONTRAST)
    }

    /// Text attributes only; terminal default colors.
    pub fn no_color() -> Self {
        let ftui_theme = ThemeBuilder::new().build();
        Self {
            mode: ThemeMode::NoColor,
            ftui_theme,
            stylesheet: build_no_color_stylesheet(),
            palette: DARK,
        }
    }

    fn from_palette(mode: ThemeMode, palette: Palette) -> Self {
        let ftui_theme = ThemeBuilder::new()
            .background(color(palette.bg))
            .text(color(palette.fg))
            .error(color(palette.error))
            .warning(color(palette.loading))
            .success(color(palette.success))
            .primary(color(palette.accent))
            .text_muted(color(palette.muted))
            .border(color(palette.border))
            .border_focused(color(palette.accent))
            .build();

        Self {
            mode,
            ftui_theme,
            stylesheet: build_stylesheet(&palette),
            palette,
        }
    }

    /// Access the underlying ftui theme.
    pub fn ftui_theme(&self) -> &FtuiTheme {
        &self.ftui_theme
    }

    /// Access the stylesheet with named style classes.
    pub fn stylesheet(&self) -> &StyleSheet {
        &self.stylesheet
    }

    /// Get an ftui style by class name from the stylesheet.
    pub fn class(&self, name: &str) -> FtuiStyle {
        self.stylesheet.get_or_default(name)
    }

    fn text_pairs(&self) -> [(&'static str, FtuiRgb); 6] {
        let p = &self.palette;
        [
            ("text", p.fg),
            ("accent", p.accent),
            ("muted", p.muted),
            ("error", p.error),
            ("loading", p.loading),
            ("success", p.success),
        ]
    }

    /// Validate that all text colors meet WCAG AA (4.5:1 ratio) against the
    /// theme's background color.
    pub fn validate_wcag_aa(&self) -> Vec<String> {
        let bg = self.palette.bg;
        self.text_pairs()
            .into_iter()
            .filter(|(_, fg)| !meets_wcag_aa(*fg, bg))
            .map(|(name, fg)| {
                let ratio = contrast_ratio(fg, bg);
                format!("{name} ({fg:?}) on bg ({bg:?}) fails WCAG AA: {ratio:.2}:1 < 4.5:1")
            })
            .collect()
    }

    /// Validate that all text colors meet WCAG AAA (7:1 ratio).
    pub fn validate_wcag_aaa(&self) -> Vec<String> {
        let bg = self.palette.bg;
        self.text_pairs()
            .into_iter()
            .filter(|(_, fg)| !meets_wcag_aaa(*fg, bg))
            .map(|(name, fg)| {
                let ratio = contrast_ratio(fg, bg);
                format!("{name} ({fg:?}) on bg ({bg:?}) fails WCAG AAA: {ratio:.2}:1 < 7.0:1")
            })
            .collect()
    }
}

/// Style classes every widget may ask for.
pub const CLASSES: &[&str] = &[
    "title",
    "tab.active",
    "tab.inactive",
    "table.header",
    "table.selected",
    "text.muted",
    "status.error",
    "status.loading",
    "status.success",
    "border.normal",
    "border.focused",
];

fn build_stylesheet(p: &Palette) -> StyleSheet {
    let sheet = StyleSheet::new();

    sheet.define("title", FtuiStyle::new().fg(packed(p.accent)).bold());

    // Tabs
    sheet.define(
        "tab.active",
        FtuiStyle::new().fg(packed(p.accent)).bold().underline(),
    );
    sheet.define("tab.inactive", FtuiStyle::new().fg(packed(p.muted)));

    // Table
    sheet.define("table.header", FtuiStyle::new().fg(packed(p.fg)).bold());
    sheet.define(
        "table.selected",
        FtuiStyle::new().bg(packed(p.selected_bg)).fg(packed(p.fg)),
    );

    sheet.define("text.muted", FtuiStyle::new().fg(packed(p.muted)));

    // Status indicators
    sheet.define("status.error", FtuiStyle::new().fg(packed(p.error)).bold());
    sheet.define("status.loading", FtuiStyle::new().fg(packed(p.loading)));
    sheet.define("status.success", FtuiStyle::new().fg(packed(p.success)));

    // Borders
    sheet.define("border.normal", FtuiStyle::new().fg(packed(p.border)));
    sheet.define("border.focused", FtuiStyle::new().fg(packed(p.accent)));

    sheet
}

/// Build a stylesheet for NO_COLOR mode using only text attributes.
fn build_no_color_stylesheet() -> StyleSheet {
    let sheet = StyleSheet::new();

    sheet.define("title", FtuiStyle::new().bold());
    sheet.define("tab.active", FtuiStyle::new().bold().reverse());
    sheet.define("tab.inactive", FtuiStyle::new());
    sheet.define("table.header", FtuiStyle::new().bold());
    sheet.define("table.selected", FtuiStyle::new().reverse());
    sheet.define("text.muted", FtuiStyle::new());
    sheet.define("status.error", FtuiStyle::new().bold().underline());
    sheet.define("status.loading", FtuiStyle::new().bold());
    sheet.define("status.success", FtuiStyle::new());
    sheet.define("border.normal", FtuiStyle::new());
    sheet.define("border.focused", FtuiStyle::new().bold());

    sheet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_modes() {
        assert_eq!(Theme::dark().mode, ThemeMode::Dark);
        assert_eq!(Theme::light().mode, ThemeMode::Light);
        assert_eq!(Theme::high_contrast().mode, ThemeMode::HighContrast);
        assert_eq!(Theme::no_color().mode, ThemeMode::NoColor);
    }

    #[test]
    fn test_theme_mode_parse() {
        assert_eq!("light".parse::<ThemeMode>().unwrap(), ThemeMode::Light);
        assert_eq!(
            "high-contrast".parse::<ThemeMode>().unwrap(),
            ThemeMode::HighContrast
        );
        assert!("neon".parse::<ThemeMode>().is_err());
    }

    #[test]
    fn test_dark_theme_meets_wcag_aa() {
        let failures = Theme::dark().validate_wcag_aa();
        assert!(failures.is_empty(), "Dark theme WCAG AA failures: {failures:?}");
    }

    #[test]
    fn test_light_theme_meets_wcag_aa() {
        let failures = Theme::light().validate_wcag_aa();
        assert!(failures.is_empty(), "Light theme WCAG AA failures: {failures:?}");
    }

    #[test]
    fn test_high_contrast_theme_meets_wcag_aaa() {
        let failures = Theme::high_contrast().validate_wcag_aaa();
        assert!(
            failures.is_empty(),
            "High contrast WCAG AAA failures: {failures:?}"
        );
    }

    #[test]
    fn test_every_theme_defines_all_classes() {
        for theme in [
            Theme::dark(),
            Theme::light(),
            Theme::high_contrast(),
            Theme::no_color(),
        ] {
            for class in CLASSES {
                assert!(
                    theme.stylesheet().contains(class),
                    "Theme {:?} missing stylesheet class: {class}",
                    theme.mode
                );
            }
        }
    }

    #[test]
    fn test_missing_class_falls_back_to_default() {
        let theme = Theme::dark();
        let _style = theme.class("nonexistent.class");
    }
}
