//! Turns records into table rows and column widths.
//!
//! Rows keep the order of the input slice; sorting is the caller's job.

use arr_common::{RoutineRecord, UserRecord};
use chrono::{DateTime, Utc};

/// Horizontal chrome around the table: borders plus padding.
pub const CONTENT_CHROME: u16 = 8;

/// Display format for timestamps, e.g. `05 Mar 2024, 14:07`.
pub const TIMESTAMP_FORMAT: &str = "%d %b %Y, %H:%M";

/// A column title and its nominal width in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub title: &'static str,
    pub width: u16,
}

const fn col(title: &'static str, width: u16) -> Column {
    Column { title, width }
}

pub const USER_COLUMNS: [Column; 6] = [
    col("UID", 25),
    col("Email", 30),
    col("Display Name", 20),
    col("Created", 20),
    col("Last Sign In", 20),
    col("Last Activity", 20),
];

pub const ROUTINE_COLUMNS: [Column; 5] = [
    col("ID", 25),
    col("Name", 30),
    col("Owner", 28),
    col("Created", 20),
    col("Updated", 20),
];

/// Width left for the table inside a terminal `width` cells wide.
pub fn content_width(width: u16) -> u16 {
    width.saturating_sub(CONTENT_CHROME)
}

/// Shrink nominal widths proportionally when they overflow `available`.
///
/// Each width becomes `round(nominal * available / total)`. When the
/// nominal widths already fit they are returned unchanged.
pub fn scale_widths(nominal: &[u16], available: u16) -> Vec<u16> {
    let total: u32 = nominal.iter().map(|&w| u32::from(w)).sum();
    if total == 0 || total <= u32::from(available) {
        return nominal.to_vec();
    }
    let ratio = f64::from(available) / f64::from(total);
    nominal
        .iter()
        .map(|&w| (f64::from(w) * ratio).round() as u16)
        .collect()
}

/// Nominal widths of a column set.
pub fn nominal_widths(columns: &[Column]) -> Vec<u16> {
    columns.iter().map(|c| c.width).collect()
}

/// Format epoch milliseconds; missing or non-positive values render as `-`.
pub fn format_timestamp(ms: Option<i64>) -> String {
    match ms {
        Some(ms) if ms > 0 => DateTime::<Utc>::from_timestamp_millis(ms)
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string()),
        _ => "-".to_string(),
    }
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

pub fn project_users(users: &[UserRecord]) -> Vec<Vec<String>> {
    users
        .iter()
        .map(|u| {
            vec![
                u.uid.clone(),
                or_dash(u.email.as_deref()),
                or_dash(u.display_name.as_deref()),
                format_timestamp(Some(u.created_at_ms)),
                format_timestamp(u.last_login_at_ms),
                format_timestamp(u.last_refresh_at_ms),
            ]
        })
        .collect()
}

pub fn project_routines(routines: &[RoutineRecord]) -> Vec<Vec<String>> {
    routines
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                or_dash(r.name.as_deref()),
                or_dash(r.uid.as_deref()),
                format_timestamp(r.created_at_ms),
                format_timestamp(r.updated_at_ms),
            ]
        })
        .collect()
}
