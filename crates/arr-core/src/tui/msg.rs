//! Central message type for the ftui Elm-style architecture.
//!
//! One `Msg` enum captures user input, navigation and async completions so
//! every transition is an explicit `match` arm in `App::update`.
//!
//! When adding new variants:
//! - Keep `From<ftui::Event>` mapping shallow (Event -> Msg::KeyPressed/Resized/etc.)
//! - Async completions carry `Result<T, String>` so they stay `Send + 'static`

use arr_common::{RoutineRecord, UserRecord};
use ftui::{Event, KeyEvent};

use crate::gateway::Services;

/// Single message type used by the ftui model update loop.
#[derive(Debug, Clone)]
pub enum Msg {
    // Input messages
    KeyPressed(KeyEvent),
    Resized { width: u16, height: u16 },
    Tick,
    Noop,

    // Navigation messages
    NextTab,
    PrevTab,
    CursorUp,
    CursorDown,
    CursorHome,
    CursorEnd,
    PageUp,
    PageDown,

    // Action messages
    RequestRefresh,

    // Async result messages
    GatewayReady(Result<Services, String>),
    UsersLoaded(Result<Vec<UserRecord>, String>),
    RoutinesLoaded(Result<Vec<RoutineRecord>, String>),

    // System messages
    Quit,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) => Msg::KeyPressed(key),
            Event::Resize { width, height } => Msg::Resized { width, height },
            Event::Tick => Msg::Tick,
            Event::Focus(_) | Event::Paste(_) | Event::Clipboard(_) | Event::Mouse(_) => {
                Msg::Noop
            }
        }
    }
}
