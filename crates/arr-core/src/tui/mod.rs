//! Terminal dashboard for a Firebase project.
//!
//! Built on ftui's Elm-style runtime: one `Msg` enum, one `App` model, and
//! background tasks for every network call.
//!
//! # Module Structure
//!
//! - `app`: Application state machine and rendering
//! - `commands`: Gateway initialization and fetch tasks
//! - `router`: Tabs and view routing
//! - `projector`: Records to table rows and column widths
//! - `widgets`: Tab bar, record table and footer
//! - `theme`: Color schemes and styling
//! - `events`: Key bindings

mod app;
pub mod commands;
mod events;
pub mod layout;
pub mod msg;
pub mod projector;
pub mod router;
pub mod spinner;
mod theme;
pub mod widgets;

pub use app::{run_ftui, App, Panel, SessionOutcome, SPINNER_TICK_ID};
pub use events::KeyBindings;
pub use layout::{MainAreas, ResponsiveLayout};
pub use msg::Msg;
pub use router::{route, Tab, View};
pub use theme::{Theme, ThemeMode};

use thiserror::Error;

/// Errors that can occur in the TUI module.
#[derive(Error, Debug)]
pub enum TuiError {
    /// Failed to initialize terminal.
    #[error("terminal initialization failed: {0}")]
    TerminalInit(String),

    /// Failed to restore terminal state.
    #[error("terminal restoration failed: {0}")]
    TerminalRestore(String),

    /// IO error during TUI operation.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for TUI operations.
pub type TuiResult<T> = Result<T, TuiError>;
