//! # Quake Feed
//!
//! Event acquisition and processing for quakewatch.
//!
//! This crate fetches the USGS GeoJSON feed, filters events by place and
//! date range, builds the display list, aggregates the per-day maximum
//! magnitude for the chart and writes CSV exports.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod data_fetcher;
pub mod exporter;
pub mod filter;
pub mod pipeline;
pub mod traits;
pub mod transformer;

pub use aggregator::*;
pub use data_fetcher::*;
pub use exporter::*;
pub use filter::*;
pub use pipeline::*;
pub use traits::*;
pub use transformer::*;
