//! SQLite record store for the five record kinds.
//!
//! The store wraps a single `rusqlite::Connection` behind a mutex, which
//! serializes writes (at most one writer at a time). Read queries come in
//! two flavours: plain one-shot methods, and [`Subscription`]s that
//! re-run their query after every write to the store.
//!
//! Schema changes are additive-only migrations tracked in a
//! `schema_migrations` table.

use crate::{
    CalorieEntry, Gender, Result, SleepEntry, UserProfile, WaterEntry, WeightEntry,
};
use once_cell::sync::OnceCell;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Process-wide store handle, initialized once
static GLOBAL_STORE: OnceCell<Store> = OnceCell::new();

/// Handle to the record store
///
/// Cheap to clone; all clones share the same connection and the same
/// subscriber list.
pub struct Store {
    conn: Arc<Mutex<Connection>>,
    watchers: Arc<Mutex<Vec<Sender<()>>>>,
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            watchers: Arc::clone(&self.watchers),
        }
    }
}

impl Store {
    /// Open (or create) the store at the given database path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        run_migrations(&conn)?;

        tracing::debug!("Opened store at {:?}", path);
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory store (used by tests)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Get the process-wide store, opening it on first use
    ///
    /// Later calls ignore `path` and return the already-open handle.
    pub fn global(path: &Path) -> Result<&'static Store> {
        GLOBAL_STORE.get_or_try_init(|| Store::open(path))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            watchers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("store connection poisoned")
    }

    /// Subscribe to a read query; the subscription re-emits after every
    /// write to the store
    pub fn subscribe<T, F>(&self, query: F) -> Subscription<T>
    where
        F: Fn(&Store) -> Result<T> + Send + Sync + 'static,
    {
        let (tx, rx) = channel();
        self.watchers
            .lock()
            .expect("watcher list poisoned")
            .push(tx);

        Subscription {
            store: self.clone(),
            query: Box::new(query),
            rx,
        }
    }

    /// Wake every live subscriber; called after each successful write
    fn notify(&self) {
        let mut watchers = self.watchers.lock().expect("watcher list poisoned");
        watchers.retain(|tx| tx.send(()).is_ok());
    }

    // ========================================================================
    // User profile
    // ========================================================================

    /// Fetch the profile, if onboarding has completed
    pub fn profile(&self) -> Result<Option<UserProfile>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, current_weight, target_weight, height, age, gender, daily_calorie_limit
             FROM user_profile LIMIT 1",
        )?;
        let result = stmt.query_row([], row_to_profile);
        optional(result)
    }

    /// Insert the profile, replacing any existing row
    ///
    /// The profile is a singleton by convention: it always occupies row 1.
    pub fn insert_profile(&self, profile: &UserProfile) -> Result<()> {
        {
            let conn = self.lock();
            conn.execute(
                "INSERT OR REPLACE INTO user_profile
                 (id, current_weight, target_weight, height, age, gender, daily_calorie_limit)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    profile.current_weight,
                    profile.target_weight,
                    profile.height,
                    profile.age,
                    profile.gender.as_str(),
                    profile.daily_calorie_limit,
                ],
            )?;
        }
        tracing::info!("Saved user profile");
        self.notify();
        Ok(())
    }

    /// Update the existing profile row in place
    pub fn update_profile(&self, profile: &UserProfile) -> Result<()> {
        {
            let conn = self.lock();
            conn.execute(
                "UPDATE user_profile
                 SET current_weight = ?1, target_weight = ?2, height = ?3,
                     age = ?4, gender = ?5, daily_calorie_limit = ?6
                 WHERE id = ?7",
                params![
                    profile.current_weight,
                    profile.target_weight,
                    profile.height,
                    profile.age,
                    profile.gender.as_str(),
                    profile.daily_calorie_limit,
                    profile.id,
                ],
            )?;
        }
        self.notify();
        Ok(())
    }

    /// Remove the profile (used when resetting the tracker)
    pub fn delete_profile(&self) -> Result<()> {
        {
            let conn = self.lock();
            conn.execute("DELETE FROM user_profile", [])?;
        }
        self.notify();
        Ok(())
    }

    // ========================================================================
    // Weight entries
    // ========================================================================

    /// All weight entries, newest first
    pub fn weight_entries(&self) -> Result<Vec<WeightEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, weight, date, timestamp FROM weight_entries ORDER BY timestamp DESC",
        )?;
        let entries = stmt
            .query_map([], row_to_weight)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// The most recent `limit` weight entries
    pub fn recent_weight_entries(&self, limit: u32) -> Result<Vec<WeightEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, weight, date, timestamp FROM weight_entries
             ORDER BY timestamp DESC LIMIT ?1",
        )?;
        let entries = stmt
            .query_map([limit], row_to_weight)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// The weight entry recorded on one calendar day, if any
    pub fn weight_entry_by_date(&self, date: &str) -> Result<Option<WeightEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, weight, date, timestamp FROM weight_entries WHERE date = ?1 LIMIT 1",
        )?;
        optional(stmt.query_row([date], row_to_weight))
    }

    /// The single most recent weight entry
    pub fn latest_weight_entry(&self) -> Result<Option<WeightEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, weight, date, timestamp FROM weight_entries
             ORDER BY timestamp DESC LIMIT 1",
        )?;
        optional(stmt.query_row([], row_to_weight))
    }

    /// Insert a weight entry, returning it with its assigned id
    pub fn insert_weight_entry(&self, entry: &WeightEntry) -> Result<WeightEntry> {
        let id = {
            let conn = self.lock();
            conn.execute(
                "INSERT INTO weight_entries (weight, date, timestamp) VALUES (?1, ?2, ?3)",
                params![entry.weight, entry.date, entry.timestamp],
            )?;
            conn.last_insert_rowid()
        };
        tracing::debug!("Logged weight {} on {}", entry.weight, entry.date);
        self.notify();
        Ok(WeightEntry { id, ..entry.clone() })
    }

    /// Rewrite an existing weight entry in place
    pub fn update_weight_entry(&self, entry: &WeightEntry) -> Result<()> {
        {
            let conn = self.lock();
            conn.execute(
                "UPDATE weight_entries SET weight = ?1, date = ?2, timestamp = ?3 WHERE id = ?4",
                params![entry.weight, entry.date, entry.timestamp, entry.id],
            )?;
        }
        self.notify();
        Ok(())
    }

    /// Delete a weight entry by id; returns whether a row was removed
    pub fn delete_weight_entry(&self, id: i64) -> Result<bool> {
        let removed = {
            let conn = self.lock();
            conn.execute("DELETE FROM weight_entries WHERE id = ?1", [id])?
        };
        self.notify();
        Ok(removed > 0)
    }

    // ========================================================================
    // Calorie entries
    // ========================================================================

    /// All calorie entries, newest first
    pub fn calorie_entries(&self) -> Result<Vec<CalorieEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, food_name, calories, proteins, fats, carbs, date, timestamp
             FROM calorie_entries ORDER BY timestamp DESC",
        )?;
        let entries = stmt
            .query_map([], row_to_calorie)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Calorie entries for one calendar day, newest first
    pub fn calorie_entries_by_date(&self, date: &str) -> Result<Vec<CalorieEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, food_name, calories, proteins, fats, carbs, date, timestamp
             FROM calorie_entries WHERE date = ?1 ORDER BY timestamp DESC",
        )?;
        let entries = stmt
            .query_map([date], row_to_calorie)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Summed calories for one calendar day; `None` if nothing logged
    pub fn total_calories_by_date(&self, date: &str) -> Result<Option<i32>> {
        let conn = self.lock();
        let total: Option<i32> = conn.query_row(
            "SELECT SUM(calories) FROM calorie_entries WHERE date = ?1",
            [date],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    pub fn insert_calorie_entry(&self, entry: &CalorieEntry) -> Result<CalorieEntry> {
        let id = {
            let conn = self.lock();
            conn.execute(
                "INSERT INTO calorie_entries
                 (food_name, calories, proteins, fats, carbs, date, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.food_name,
                    entry.calories,
                    entry.proteins,
                    entry.fats,
                    entry.carbs,
                    entry.date,
                    entry.timestamp,
                ],
            )?;
            conn.last_insert_rowid()
        };
        tracing::debug!("Logged {} kcal on {}", entry.calories, entry.date);
        self.notify();
        Ok(CalorieEntry { id, ..entry.clone() })
    }

    /// Rewrite an existing calorie entry in place
    pub fn update_calorie_entry(&self, entry: &CalorieEntry) -> Result<()> {
        {
            let conn = self.lock();
            conn.execute(
                "UPDATE calorie_entries
                 SET food_name = ?1, calories = ?2, proteins = ?3, fats = ?4,
                     carbs = ?5, date = ?6, timestamp = ?7
                 WHERE id = ?8",
                params![
                    entry.food_name,
                    entry.calories,
                    entry.proteins,
                    entry.fats,
                    entry.carbs,
                    entry.date,
                    entry.timestamp,
                    entry.id,
                ],
            )?;
        }
        self.notify();
        Ok(())
    }

    pub fn delete_calorie_entry(&self, id: i64) -> Result<bool> {
        let removed = {
            let conn = self.lock();
            conn.execute("DELETE FROM calorie_entries WHERE id = ?1", [id])?
        };
        self.notify();
        Ok(removed > 0)
    }

    // ========================================================================
    // Water entries
    // ========================================================================

    pub fn water_entries(&self) -> Result<Vec<WaterEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, milliliters, date, timestamp FROM water_entries
             ORDER BY timestamp DESC",
        )?;
        let entries = stmt
            .query_map([], row_to_water)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn water_entries_by_date(&self, date: &str) -> Result<Vec<WaterEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, milliliters, date, timestamp FROM water_entries
             WHERE date = ?1 ORDER BY timestamp DESC",
        )?;
        let entries = stmt
            .query_map([date], row_to_water)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Summed millilitres for one calendar day; `None` if nothing logged
    pub fn total_water_by_date(&self, date: &str) -> Result<Option<i32>> {
        let conn = self.lock();
        let total: Option<i32> = conn.query_row(
            "SELECT SUM(milliliters) FROM water_entries WHERE date = ?1",
            [date],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    pub fn insert_water_entry(&self, entry: &WaterEntry) -> Result<WaterEntry> {
        let id = {
            let conn = self.lock();
            conn.execute(
                "INSERT INTO water_entries (milliliters, date, timestamp) VALUES (?1, ?2, ?3)",
                params![entry.milliliters, entry.date, entry.timestamp],
            )?;
            conn.last_insert_rowid()
        };
        self.notify();
        Ok(WaterEntry { id, ..entry.clone() })
    }

    pub fn delete_water_entry(&self, id: i64) -> Result<bool> {
        let removed = {
            let conn = self.lock();
            conn.execute("DELETE FROM water_entries WHERE id = ?1", [id])?
        };
        self.notify();
        Ok(removed > 0)
    }

    // ========================================================================
    // Sleep entries
    // ========================================================================

    pub fn sleep_entries(&self) -> Result<Vec<SleepEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, hours, quality, date, timestamp FROM sleep_entries
             ORDER BY timestamp DESC",
        )?;
        let entries = stmt
            .query_map([], row_to_sleep)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Latest sleep entry for one calendar day
    pub fn sleep_entry_by_date(&self, date: &str) -> Result<Option<SleepEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, hours, quality, date, timestamp FROM sleep_entries
             WHERE date = ?1 ORDER BY timestamp DESC LIMIT 1",
        )?;
        optional(stmt.query_row([date], row_to_sleep))
    }

    /// Average sleep hours over days on or after `start_date`
    pub fn average_sleep_hours(&self, start_date: &str) -> Result<Option<f32>> {
        let conn = self.lock();
        let avg: Option<f64> = conn.query_row(
            "SELECT AVG(hours) FROM sleep_entries WHERE date >= ?1",
            [start_date],
            |row| row.get(0),
        )?;
        Ok(avg.map(|v| v as f32))
    }

    /// Average sleep quality over days on or after `start_date`
    pub fn average_sleep_quality(&self, start_date: &str) -> Result<Option<f32>> {
        let conn = self.lock();
        let avg: Option<f64> = conn.query_row(
            "SELECT AVG(quality) FROM sleep_entries WHERE date >= ?1",
            [start_date],
            |row| row.get(0),
        )?;
        Ok(avg.map(|v| v as f32))
    }

    pub fn insert_sleep_entry(&self, entry: &SleepEntry) -> Result<SleepEntry> {
        let id = {
            let conn = self.lock();
            conn.execute(
                "INSERT INTO sleep_entries (hours, quality, date, timestamp)
                 VALUES (?1, ?2, ?3, ?4)",
                params![entry.hours, entry.quality, entry.date, entry.timestamp],
            )?;
            conn.last_insert_rowid()
        };
        self.notify();
        Ok(SleepEntry { id, ..entry.clone() })
    }

    pub fn delete_sleep_entry(&self, id: i64) -> Result<bool> {
        let removed = {
            let conn = self.lock();
            conn.execute("DELETE FROM sleep_entries WHERE id = ?1", [id])?
        };
        self.notify();
        Ok(removed > 0)
    }
}

/// A reactive read query
///
/// Holds a live receiver on the store's write notifications. `current()`
/// runs the query immediately; `wait_timeout()` blocks until the next
/// write (or the timeout), then re-runs the query.
pub struct Subscription<T> {
    store: Store,
    query: Box<dyn Fn(&Store) -> Result<T> + Send + Sync>,
    rx: Receiver<()>,
}

impl<T> Subscription<T> {
    /// Run the query against the store's current contents
    pub fn current(&self) -> Result<T> {
        (self.query)(&self.store)
    }

    /// Wait for the next write, then re-run the query
    ///
    /// Returns `Ok(None)` if no write happened within `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Option<T>> {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => {
                // Drain queued notifications so one re-query covers them all
                while self.rx.try_recv().is_ok() {}
                Ok(Some(self.current()?))
            }
            Err(_) => Ok(None),
        }
    }
}

// ============================================================================
// Migrations
// ============================================================================

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        migration_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (?1)", [1])?;
    }
    if current_version < 2 {
        migration_v2(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (?1)", [2])?;
    }
    if current_version < 3 {
        migration_v3(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (?1)", [3])?;
    }

    if current_version < 3 {
        tracing::info!("Migrated store schema from v{} to v3", current_version);
    }

    Ok(())
}

/// v1: profile, weight and calorie tables
fn migration_v1(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_profile (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            current_weight REAL NOT NULL,
            target_weight REAL NOT NULL,
            height INTEGER NOT NULL,
            age INTEGER NOT NULL,
            gender TEXT NOT NULL,
            daily_calorie_limit INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS weight_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            weight REAL NOT NULL,
            date TEXT NOT NULL,
            timestamp INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS calorie_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            calories INTEGER NOT NULL,
            date TEXT NOT NULL,
            timestamp INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_weight_entries_timestamp
         ON weight_entries(timestamp DESC)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_calorie_entries_date ON calorie_entries(date)",
        [],
    )?;

    Ok(())
}

/// v2: food name and macro columns on calorie entries
fn migration_v2(conn: &Connection) -> Result<()> {
    conn.execute(
        "ALTER TABLE calorie_entries ADD COLUMN food_name TEXT NOT NULL DEFAULT ''",
        [],
    )?;
    conn.execute(
        "ALTER TABLE calorie_entries ADD COLUMN proteins REAL NOT NULL DEFAULT 0",
        [],
    )?;
    conn.execute(
        "ALTER TABLE calorie_entries ADD COLUMN fats REAL NOT NULL DEFAULT 0",
        [],
    )?;
    conn.execute(
        "ALTER TABLE calorie_entries ADD COLUMN carbs REAL NOT NULL DEFAULT 0",
        [],
    )?;
    Ok(())
}

/// v3: water and sleep tables
fn migration_v3(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS water_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            milliliters INTEGER NOT NULL,
            date TEXT NOT NULL,
            timestamp INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sleep_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            hours REAL NOT NULL,
            quality INTEGER NOT NULL,
            date TEXT NOT NULL,
            timestamp INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_water_entries_date ON water_entries(date)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sleep_entries_date ON sleep_entries(date)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// Row mapping
// ============================================================================

fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<UserProfile> {
    let gender_str: String = row.get(5)?;
    let gender = gender_str.parse::<Gender>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(UserProfile {
        id: row.get(0)?,
        current_weight: row.get(1)?,
        target_weight: row.get(2)?,
        height: row.get(3)?,
        age: row.get(4)?,
        gender,
        daily_calorie_limit: row.get(6)?,
    })
}

fn row_to_weight(row: &Row<'_>) -> rusqlite::Result<WeightEntry> {
    Ok(WeightEntry {
        id: row.get(0)?,
        weight: row.get(1)?,
        date: row.get(2)?,
        timestamp: row.get(3)?,
    })
}

fn row_to_calorie(row: &Row<'_>) -> rusqlite::Result<CalorieEntry> {
    Ok(CalorieEntry {
        id: row.get(0)?,
        food_name: row.get(1)?,
        calories: row.get(2)?,
        proteins: row.get(3)?,
        fats: row.get(4)?,
        carbs: row.get(5)?,
        date: row.get(6)?,
        timestamp: row.get(7)?,
    })
}

fn row_to_water(row: &Row<'_>) -> rusqlite::Result<WaterEntry> {
    Ok(WaterEntry {
        id: row.get(0)?,
        milliliters: row.get(1)?,
        date: row.get(2)?,
        timestamp: row.get(3)?,
    })
}

fn row_to_sleep(row: &Row<'_>) -> rusqlite::Result<SleepEntry> {
    Ok(SleepEntry {
        id: row.get(0)?,
        hours: row.get(1)?,
        quality: row.get(2)?,
        date: row.get(3)?,
        timestamp: row.get(4)?,
    })
}

/// Map `QueryReturnedNoRows` to `Ok(None)`
fn optional<T>(result: rusqlite::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_store() -> Store {
        Store::open_in_memory().unwrap()
    }

    #[test]
    fn test_migrations_create_all_tables() {
        let store = test_store();
        let conn = store.lock();

        let table_count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN
                 ('user_profile', 'weight_entries', 'calorie_entries',
                  'water_entries', 'sleep_entries')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(table_count, 5);

        let version: i32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 3);
    }

    #[test]
    fn test_migrations_are_idempotent_on_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("vita.db");

        {
            let store = Store::open(&db_path).unwrap();
            store
                .insert_weight_entry(&WeightEntry::new(80.0, Utc::now()))
                .unwrap();
        }

        // Reopening must not re-run ALTER TABLE migrations
        let store = Store::open(&db_path).unwrap();
        let entries = store.weight_entries().unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_profile_is_singleton() {
        let store = test_store();

        let mut profile = UserProfile {
            id: 1,
            current_weight: 82.0,
            target_weight: 75.0,
            height: 180,
            age: 34,
            gender: Gender::Male,
            daily_calorie_limit: 2100,
        };
        store.insert_profile(&profile).unwrap();

        profile.current_weight = 81.0;
        store.insert_profile(&profile).unwrap();

        {
            let conn = store.lock();
            let rows: i32 = conn
                .query_row("SELECT COUNT(*) FROM user_profile", [], |row| row.get(0))
                .unwrap();
            assert_eq!(rows, 1);
        }

        profile.target_weight = 74.0;
        store.update_profile(&profile).unwrap();
        let stored = store.profile().unwrap().unwrap();
        assert!((stored.target_weight - 74.0).abs() < 1e-5);
        assert!((stored.current_weight - 81.0).abs() < 1e-5);

        store.delete_profile().unwrap();
        assert!(store.profile().unwrap().is_none());
    }

    #[test]
    fn test_weight_insert_query_delete() {
        let store = test_store();
        let entry = store
            .insert_weight_entry(&WeightEntry::new(79.4, Utc::now()))
            .unwrap();
        assert!(entry.id > 0);

        let latest = store.latest_weight_entry().unwrap().unwrap();
        assert_eq!(latest.id, entry.id);

        assert!(store.delete_weight_entry(entry.id).unwrap());
        assert!(!store.delete_weight_entry(entry.id).unwrap());
        assert!(store.latest_weight_entry().unwrap().is_none());
    }

    #[test]
    fn test_weight_update_and_lookup_by_date() {
        let store = test_store();
        let now = Utc::now();
        let mut entry = store
            .insert_weight_entry(&WeightEntry::new(79.0, now))
            .unwrap();

        entry.weight = 78.6;
        store.update_weight_entry(&entry).unwrap();

        let today = crate::day_string(now);
        let fetched = store.weight_entry_by_date(&today).unwrap().unwrap();
        assert!((fetched.weight - 78.6).abs() < 1e-5);
        assert!(store.weight_entry_by_date("1999-01-01").unwrap().is_none());
    }

    #[test]
    fn test_calorie_update_rewrites_row() {
        let store = test_store();
        let now = Utc::now();
        let mut entry = store
            .insert_calorie_entry(&CalorieEntry::new("rice", 400, 8.0, 1.0, 80.0, now))
            .unwrap();

        entry.calories = 350;
        entry.food_name = "rice (small)".into();
        store.update_calorie_entry(&entry).unwrap();

        let entries = store.calorie_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].calories, 350);
        assert_eq!(entries[0].food_name, "rice (small)");
    }

    #[test]
    fn test_recent_weight_entries_limit() {
        let store = test_store();
        for i in 0..8 {
            let mut entry = WeightEntry::new(80.0 - i as f32 * 0.1, Utc::now());
            entry.timestamp += i; // Distinct, increasing timestamps
            store.insert_weight_entry(&entry).unwrap();
        }

        let recent = store.recent_weight_entries(5).unwrap();
        assert_eq!(recent.len(), 5);
        // Newest first
        assert!(recent[0].timestamp > recent[4].timestamp);
    }

    #[test]
    fn test_calorie_totals_by_date() {
        let store = test_store();
        let now = Utc::now();

        store
            .insert_calorie_entry(&CalorieEntry::new("oatmeal", 350, 12.0, 6.0, 60.0, now))
            .unwrap();
        store
            .insert_calorie_entry(&CalorieEntry::new("salad", 200, 5.0, 10.0, 15.0, now))
            .unwrap();

        let today = crate::day_string(now);
        assert_eq!(store.total_calories_by_date(&today).unwrap(), Some(550));
        assert_eq!(store.total_calories_by_date("1999-01-01").unwrap(), None);
    }

    #[test]
    fn test_water_totals_by_date() {
        let store = test_store();
        let now = Utc::now();

        store
            .insert_water_entry(&WaterEntry::new(250, now))
            .unwrap();
        store
            .insert_water_entry(&WaterEntry::new(500, now))
            .unwrap();

        let today = crate::day_string(now);
        assert_eq!(store.total_water_by_date(&today).unwrap(), Some(750));
    }

    #[test]
    fn test_sleep_averages() {
        let store = test_store();
        let now = Utc::now();

        store
            .insert_sleep_entry(&SleepEntry::new(7.0, 4, now))
            .unwrap();
        store
            .insert_sleep_entry(&SleepEntry::new(8.0, 2, now))
            .unwrap();

        let hours = store.average_sleep_hours("1999-01-01").unwrap().unwrap();
        assert!((hours - 7.5).abs() < 1e-6);

        let quality = store.average_sleep_quality("1999-01-01").unwrap().unwrap();
        assert!((quality - 3.0).abs() < 1e-6);

        assert!(store.average_sleep_hours("2999-01-01").unwrap().is_none());
    }

    #[test]
    fn test_subscription_reemits_on_write() {
        let store = test_store();
        let sub = store.subscribe(|s| s.weight_entries());

        assert!(sub.current().unwrap().is_empty());

        store
            .insert_weight_entry(&WeightEntry::new(77.0, Utc::now()))
            .unwrap();

        let entries = sub
            .wait_timeout(Duration::from_secs(1))
            .unwrap()
            .expect("write should re-emit");
        assert_eq!(entries.len(), 1);

        // No further writes: times out with None
        assert!(sub
            .wait_timeout(Duration::from_millis(20))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_global_handle_initializes_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("vita.db");

        let first = Store::global(&db_path).unwrap();
        let second = Store::global(&db_path).unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
