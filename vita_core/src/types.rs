//! Core domain types for the vita health tracker.
//!
//! This module defines the record kinds held by the store:
//! - User profile (singleton by convention)
//! - Weight, calorie, water and sleep entries
//!
//! Every entry carries both an epoch-millisecond timestamp and the
//! calendar day (`YYYY-MM-DD`) derived from it at creation time. The two
//! fields are never re-validated against each other afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used for the `date` field of every entry
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render the calendar day for a point in time (UTC)
pub fn day_string(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

// ============================================================================
// Profile
// ============================================================================

/// Biological gender, as used by the calorie target formula
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(crate::Error::Other(format!("unknown gender: {other}"))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single user's profile
///
/// One row in practice. The store does not enforce uniqueness; reads take
/// the first row and inserts replace it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub current_weight: f32,
    pub target_weight: f32,
    /// Height in centimetres
    pub height: i32,
    pub age: i32,
    pub gender: Gender,
    /// Daily calorie target computed at onboarding
    pub daily_calorie_limit: i32,
}

// ============================================================================
// Entry kinds
// ============================================================================

/// A single body-weight measurement (kg)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeightEntry {
    pub id: i64,
    pub weight: f32,
    pub date: String,
    pub timestamp: i64,
}

impl WeightEntry {
    /// Build a new entry stamped at `at`; the id is assigned on insert
    pub fn new(weight: f32, at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            weight,
            date: day_string(at),
            timestamp: at.timestamp_millis(),
        }
    }
}

/// A logged food item with its macro breakdown (grams)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CalorieEntry {
    pub id: i64,
    pub food_name: String,
    pub calories: i32,
    pub proteins: f32,
    pub fats: f32,
    pub carbs: f32,
    pub date: String,
    pub timestamp: i64,
}

impl CalorieEntry {
    pub fn new(
        food_name: impl Into<String>,
        calories: i32,
        proteins: f32,
        fats: f32,
        carbs: f32,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            food_name: food_name.into(),
            calories,
            proteins,
            fats,
            carbs,
            date: day_string(at),
            timestamp: at.timestamp_millis(),
        }
    }
}

/// Water intake in millilitres
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WaterEntry {
    pub id: i64,
    pub milliliters: i32,
    pub date: String,
    pub timestamp: i64,
}

impl WaterEntry {
    pub fn new(milliliters: i32, at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            milliliters,
            date: day_string(at),
            timestamp: at.timestamp_millis(),
        }
    }
}

/// A night of sleep: hours plus a 1–5 quality rating
///
/// One conceptual entry per day, not enforced by the schema.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SleepEntry {
    pub id: i64,
    pub hours: f32,
    pub quality: i32,
    pub date: String,
    pub timestamp: i64,
}

impl SleepEntry {
    pub fn new(hours: f32, quality: i32, at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            hours,
            quality,
            date: day_string(at),
            timestamp: at.timestamp_millis(),
        }
    }
}

// ============================================================================
// Analytics support types
// ============================================================================

/// Coarse direction of recent weight change
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Down,
    Up,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Down => "down",
            Trend::Up => "up",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything carrying an epoch-millisecond timestamp; lets the period
/// filter work over every entry kind
pub trait Timestamped {
    fn timestamp_millis(&self) -> i64;
}

impl Timestamped for WeightEntry {
    fn timestamp_millis(&self) -> i64 {
        self.timestamp
    }
}

impl Timestamped for CalorieEntry {
    fn timestamp_millis(&self) -> i64 {
        self.timestamp
    }
}

impl Timestamped for WaterEntry {
    fn timestamp_millis(&self) -> i64 {
        self.timestamp
    }
}

impl Timestamped for SleepEntry {
    fn timestamp_millis(&self) -> i64 {
        self.timestamp
    }
}
