//! Pure analytics over in-memory entry lists.
//!
//! Every function here is deterministic given its inputs: the ones that
//! depend on "now" (period filtering, the trailing-week window) take an
//! explicit `DateTime<Utc>` instead of reading the wall clock, so tests
//! can pin the reference time.
//!
//! Empty or insufficient input never errors; it yields a neutral default
//! (0, `Trend::Stable`, or `None`).

use crate::{CalorieEntry, Timestamped, Trend, WeightEntry};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Arithmetic mean of the recorded weights; 0 for an empty list
pub fn average_weight(entries: &[WeightEntry]) -> f32 {
    if entries.is_empty() {
        return 0.0;
    }
    let sum: f64 = entries.iter().map(|e| e.weight as f64).sum();
    (sum / entries.len() as f64) as f32
}

/// Weight change over the trailing 7 days of `now`
///
/// Negative means loss, positive means gain. Returns 0 when fewer than
/// two entries exist overall, or fewer than two fall inside the window.
pub fn weekly_change(entries: &[WeightEntry], now: DateTime<Utc>) -> f32 {
    if entries.len() < 2 {
        return 0.0;
    }

    let mut sorted: Vec<&WeightEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    let one_week_ago = (now - Duration::days(7)).timestamp_millis();
    let recent: Vec<&&WeightEntry> = sorted
        .iter()
        .filter(|e| e.timestamp >= one_week_ago)
        .collect();

    if recent.len() < 2 {
        return 0.0;
    }

    recent[recent.len() - 1].weight - recent[0].weight
}

/// Threshold below which a first-vs-last difference counts as stable
const TREND_STABLE_EPSILON: f32 = 0.3;

/// Classify the direction of the last up-to-7 entries
pub fn weight_trend(entries: &[WeightEntry]) -> Trend {
    if entries.len() < 2 {
        return Trend::Stable;
    }

    let mut sorted: Vec<&WeightEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);
    let window = &sorted[sorted.len().saturating_sub(7)..];

    let diff = window[window.len() - 1].weight - window[0].weight;
    if diff.abs() < TREND_STABLE_EPSILON {
        Trend::Stable
    } else if diff < 0.0 {
        Trend::Down
    } else {
        Trend::Up
    }
}

/// Average of per-day calorie sums, truncated; 0 for an empty list
pub fn average_daily_calories(entries: &[CalorieEntry]) -> i32 {
    if entries.is_empty() {
        return 0;
    }

    let totals = daily_calorie_totals(entries);
    let sum: i64 = totals.values().map(|&v| v as i64).sum();
    (sum as f64 / totals.len() as f64) as i32
}

/// Count distinct days whose summed calories exceed `daily_limit`
pub fn days_over_limit(entries: &[CalorieEntry], daily_limit: i32) -> usize {
    daily_calorie_totals(entries)
        .values()
        .filter(|&&total| total > daily_limit)
        .count()
}

/// Restrict entries to the trailing `days` window of `now`
///
/// `None` disables filtering. `Some(0)` keeps only entries stamped at or
/// after `now` itself.
pub fn filter_by_period<T: Timestamped + Clone>(
    entries: &[T],
    days: Option<u32>,
    now: DateTime<Utc>,
) -> Vec<T> {
    let Some(days) = days else {
        return entries.to_vec();
    };

    // A window reaching past the representable past covers everything.
    let Some(cutoff) = now.checked_sub_signed(Duration::days(days as i64)) else {
        return entries.to_vec();
    };
    let cutoff = cutoff.timestamp_millis();
    entries
        .iter()
        .filter(|e| e.timestamp_millis() >= cutoff)
        .cloned()
        .collect()
}

/// Per-day calorie sums, keyed by the entry date string
pub fn daily_calorie_totals(entries: &[CalorieEntry]) -> BTreeMap<String, i32> {
    let mut totals: BTreeMap<String, i32> = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.date.clone()).or_insert(0) += entry.calories;
    }
    totals
}

/// Linear projection of days until `target_weight` is reached
///
/// Uses the trailing-week change as the rate. `None` when the user is not
/// losing weight or is already at/below the target.
pub fn estimate_days_to_goal(
    entries: &[WeightEntry],
    current_weight: f32,
    target_weight: f32,
    now: DateTime<Utc>,
) -> Option<u32> {
    let weekly = weekly_change(entries, now);
    if weekly >= 0.0 || current_weight <= target_weight {
        return None;
    }

    let remaining = current_weight - target_weight;
    let weeks_needed = remaining / weekly.abs();
    Some((weeks_needed * 7.0) as u32)
}
