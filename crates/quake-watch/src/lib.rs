//! # Quake Watch
//!
//! Terminal earthquake watcher for the USGS event feed.
//!
//! This crate wires the feed pipeline to a timer-driven refresh loop and a
//! line-oriented console that renders the latest snapshot as a table and a
//! text bar chart.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod commands;
pub mod console;
pub mod error;
pub mod refresh;
pub mod state;
pub mod view;

pub use app::{export_filter, run_export, run_places, run_watch};
pub use commands::{Command, ParseCommandError, HELP};
pub use console::{Console, Flow, StatusLine};
pub use error::{WatchError, WatchResult};
pub use refresh::{RefreshHandle, RefreshLoop, RefreshStatus, Snapshot};
pub use state::FilterHandle;
