//! idea2code - software catalog and service request desk for the terminal
//!
//! The library holds the request wizard and everything it persists
//! through; the binary wraps it in a TUI and a small CLI.

pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod draft;
pub mod logging;
pub mod navigation;
pub mod request;
pub mod storage;
pub mod submission;
pub mod tracking;
pub mod ui;
pub mod wizard;
