//! High-level facade over the record store and analytics.
//!
//! This is the layer the presentation surface talks to: it stamps new
//! entries with the injected clock, derives the calendar day, and wires
//! store reads into the pure analytics functions. It holds no state of
//! its own beyond a store handle and the activity multiplier used at
//! onboarding.

use crate::{
    analytics, calories, CalorieEntry, Gender, Result, SleepEntry, Store, Subscription, Trend,
    UserProfile, WaterEntry, WeightEntry,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Facade combining the store, the analytics engine and the calorie
/// target calculator
pub struct Tracker {
    store: Store,
    activity_level: f32,
}

/// Everything shown on the daily summary screen
#[derive(Clone, Debug, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub total_calories: i32,
    pub calorie_limit: Option<i32>,
    pub total_water_ml: i32,
    pub sleep: Option<SleepEntry>,
    pub latest_weight: Option<WeightEntry>,
}

/// Aggregated statistics over an optional trailing period
#[derive(Clone, Debug, Serialize)]
pub struct StatsReport {
    pub period_days: Option<u32>,
    pub average_weight: f32,
    pub weekly_change: f32,
    pub trend: Trend,
    pub average_daily_calories: i32,
    pub days_over_limit: usize,
    pub daily_calorie_totals: BTreeMap<String, i32>,
    pub estimated_days_to_goal: Option<u32>,
}

impl Tracker {
    pub fn new(store: Store, activity_level: f32) -> Self {
        Self {
            store,
            activity_level,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    // ========================================================================
    // Onboarding and profile
    // ========================================================================

    /// Create the user profile and log the starting weight
    ///
    /// The daily calorie limit is computed from the profile via
    /// Mifflin–St Jeor and this tracker's activity multiplier.
    pub fn complete_onboarding(
        &self,
        current_weight: f32,
        target_weight: f32,
        height: i32,
        age: i32,
        gender: Gender,
        now: DateTime<Utc>,
    ) -> Result<UserProfile> {
        let limit =
            calories::daily_calories(current_weight, height, age, gender, self.activity_level);

        let profile = UserProfile {
            id: 1,
            current_weight,
            target_weight,
            height,
            age,
            gender,
            daily_calorie_limit: limit,
        };
        self.store.insert_profile(&profile)?;

        // The starting weight doubles as the first measurement
        self.store
            .insert_weight_entry(&WeightEntry::new(current_weight, now))?;

        tracing::info!(
            "Onboarding complete: target {}kg, {} kcal/day",
            target_weight,
            limit
        );
        Ok(profile)
    }

    pub fn profile(&self) -> Result<Option<UserProfile>> {
        self.store.profile()
    }

    pub fn is_onboarded(&self) -> Result<bool> {
        Ok(self.store.profile()?.is_some())
    }

    // ========================================================================
    // Entry logging
    // ========================================================================

    pub fn add_weight(&self, weight: f32, now: DateTime<Utc>) -> Result<WeightEntry> {
        self.store.insert_weight_entry(&WeightEntry::new(weight, now))
    }

    pub fn delete_weight(&self, id: i64) -> Result<bool> {
        self.store.delete_weight_entry(id)
    }

    pub fn add_food(
        &self,
        food_name: &str,
        calories: i32,
        proteins: f32,
        fats: f32,
        carbs: f32,
        now: DateTime<Utc>,
    ) -> Result<CalorieEntry> {
        self.store.insert_calorie_entry(&CalorieEntry::new(
            food_name, calories, proteins, fats, carbs, now,
        ))
    }

    pub fn delete_food(&self, id: i64) -> Result<bool> {
        self.store.delete_calorie_entry(id)
    }

    pub fn add_water(&self, milliliters: i32, now: DateTime<Utc>) -> Result<WaterEntry> {
        self.store
            .insert_water_entry(&WaterEntry::new(milliliters, now))
    }

    pub fn delete_water(&self, id: i64) -> Result<bool> {
        self.store.delete_water_entry(id)
    }

    pub fn add_sleep(&self, hours: f32, quality: i32, now: DateTime<Utc>) -> Result<SleepEntry> {
        self.store
            .insert_sleep_entry(&SleepEntry::new(hours, quality, now))
    }

    pub fn delete_sleep(&self, id: i64) -> Result<bool> {
        self.store.delete_sleep_entry(id)
    }

    // ========================================================================
    // Reactive reads (repository passthrough)
    // ========================================================================

    pub fn watch_profile(&self) -> Subscription<Option<UserProfile>> {
        self.store.subscribe(|s| s.profile())
    }

    pub fn watch_weight_entries(&self) -> Subscription<Vec<WeightEntry>> {
        self.store.subscribe(|s| s.weight_entries())
    }

    pub fn watch_daily_calories(&self, date: &str) -> Subscription<i32> {
        let date = date.to_string();
        self.store
            .subscribe(move |s| Ok(s.total_calories_by_date(&date)?.unwrap_or(0)))
    }

    // ========================================================================
    // Analytics
    // ========================================================================

    pub fn average_weight(&self, period_days: Option<u32>, now: DateTime<Utc>) -> Result<f32> {
        let entries =
            analytics::filter_by_period(&self.store.weight_entries()?, period_days, now);
        Ok(analytics::average_weight(&entries))
    }

    pub fn weekly_weight_change(&self, now: DateTime<Utc>) -> Result<f32> {
        Ok(analytics::weekly_change(&self.store.weight_entries()?, now))
    }

    pub fn weight_trend(&self) -> Result<Trend> {
        Ok(analytics::weight_trend(&self.store.weight_entries()?))
    }

    pub fn average_daily_calories(
        &self,
        period_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<i32> {
        let entries =
            analytics::filter_by_period(&self.store.calorie_entries()?, period_days, now);
        Ok(analytics::average_daily_calories(&entries))
    }

    /// Days with calories over the profile's limit; 0 when no profile
    pub fn days_over_limit(&self, period_days: Option<u32>, now: DateTime<Utc>) -> Result<usize> {
        let Some(profile) = self.store.profile()? else {
            return Ok(0);
        };
        let entries =
            analytics::filter_by_period(&self.store.calorie_entries()?, period_days, now);
        Ok(analytics::days_over_limit(
            &entries,
            profile.daily_calorie_limit,
        ))
    }

    pub fn daily_calorie_totals(
        &self,
        period_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<BTreeMap<String, i32>> {
        let entries =
            analytics::filter_by_period(&self.store.calorie_entries()?, period_days, now);
        Ok(analytics::daily_calorie_totals(&entries))
    }

    /// Projected days until the target weight; `None` without a profile,
    /// weight history, or a losing trend
    pub fn estimated_days_to_goal(&self, now: DateTime<Utc>) -> Result<Option<u32>> {
        let Some(profile) = self.store.profile()? else {
            return Ok(None);
        };
        let Some(latest) = self.store.latest_weight_entry()? else {
            return Ok(None);
        };

        Ok(analytics::estimate_days_to_goal(
            &self.store.weight_entries()?,
            latest.weight,
            profile.target_weight,
            now,
        ))
    }

    // ========================================================================
    // Summaries
    // ========================================================================

    /// Everything logged for one calendar day, plus context
    pub fn daily_summary(&self, date: &str) -> Result<DailySummary> {
        Ok(DailySummary {
            date: date.to_string(),
            total_calories: self.store.total_calories_by_date(date)?.unwrap_or(0),
            calorie_limit: self.store.profile()?.map(|p| p.daily_calorie_limit),
            total_water_ml: self.store.total_water_by_date(date)?.unwrap_or(0),
            sleep: self.store.sleep_entry_by_date(date)?,
            latest_weight: self.store.latest_weight_entry()?,
        })
    }

    /// Full statistics report over an optional trailing period
    pub fn stats(&self, period_days: Option<u32>, now: DateTime<Utc>) -> Result<StatsReport> {
        Ok(StatsReport {
            period_days,
            average_weight: self.average_weight(period_days, now)?,
            weekly_change: self.weekly_weight_change(now)?,
            trend: self.weight_trend()?,
            average_daily_calories: self.average_daily_calories(period_days, now)?,
            days_over_limit: self.days_over_limit(period_days, now)?,
            daily_calorie_totals: self.daily_calorie_totals(period_days, now)?,
            estimated_days_to_goal: self.estimated_days_to_goal(now)?,
        })
    }
}
