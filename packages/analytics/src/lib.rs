#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter engine and aggregation pipelines for the income vs crime
//! dashboard.
//!
//! [`filter::apply`] narrows the dataset to the records matching a
//! [`FilterState`](income_crime_analytics_models::FilterState). Each module
//! under [`pipelines`] turns that view into the tables one dashboard page
//! draws. [`DashboardSession`] ties the two together for a single caller.

pub mod filter;
pub mod pipelines;
pub mod session;
pub mod stats;
pub mod views;

#[cfg(test)]
mod fixtures;

pub use filter::{FilteredView, apply};
pub use session::{DEFAULT_PREVIEW_ROWS, DashboardSession};

use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A filter value was rejected.
    #[error("Invalid filter: {message}")]
    InvalidFilter {
        /// Description of what went wrong.
        message: String,
    },
}

impl AnalyticsError {
    pub(crate) fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }
}
