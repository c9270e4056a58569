#![forbid(unsafe_code)]

//! Core domain model and business logic for the vita health tracker.
//!
//! This crate provides:
//! - Domain types (profile, weight, calorie, water and sleep entries)
//! - SQLite record store with additive migrations and reactive reads
//! - Pure analytics (averages, trends, goal estimation)
//! - Calorie target calculation (Mifflin-St Jeor)
//! - The `Tracker` facade the presentation layer talks to

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod store;
pub mod analytics;
pub mod calories;
pub mod tracker;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use store::{Store, Subscription};
pub use calories::{daily_calories, DEFAULT_ACTIVITY_LEVEL};
pub use tracker::{DailySummary, StatsReport, Tracker};
