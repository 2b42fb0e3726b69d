//! Dashboard widgets.
//!
//! # Widgets
//!
//! - `TabBar`: Title box with the tab strip
//! - `RecordTable`: Scrollable table of projected records
//! - `StatusBar`: Footer with key hints and the latest status message

mod record_table;
mod status_bar;
mod tab_bar;

pub use record_table::{RecordTable, RecordTableState};
pub use status_bar::StatusBar;
pub use tab_bar::{TabBar, APP_TITLE};
