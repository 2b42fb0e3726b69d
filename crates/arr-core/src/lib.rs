//! Arrogance Admin core library
//!
//! This library provides the dashboard and everything behind it:
//! - Exit codes for the binary
//! - Remote data gateway (Firebase REST and in-memory)
//! - Logging setup
//! - The ftui terminal dashboard
//!
//! The binary entry point is in `main.rs`.

pub mod exit_codes;
pub mod gateway;
pub mod logging;
pub mod tui;
