// lib.rs

//! Per-terminal command line history, served to a tty driver.
//!
//! Each (pid, tty) pair gets its own [`history::HistorySession`]. The
//! [`daemon::Daemon`] feeds requests through [`navigator::apply`] and reaps
//! sessions whose process has exited.

pub mod config;
pub mod daemon;
pub mod error;
pub mod feedback;
pub mod history;
pub mod navigator;
pub mod reaper;
pub mod source;
pub mod store;
pub mod ttys;
