use chrono::{DateTime, TimeZone, Utc};
use tracing::log;

use crate::db::Db;
use crate::LogResult;

const KEY_FIRST_SAVED: &str = "firstSavedTime";
const KEY_SECOND_SAVED: &str = "secondSavedTime";
const KEY_FINAL: &str = "finalTime";
const KEY_ACTIVE: &str = "isActive";
const KEY_START: &str = "startTimestamp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedHalf {
    First,
    Second,
}

/// Two-state match stopwatch. While running, elapsed time is derived
/// from a persisted wall-clock start timestamp rather than a tick
/// counter, so it survives process restarts. The start timestamp is
/// back-dated by any previously accumulated time.
pub struct MatchClock {
    db: Db<String, String>,
    default_half_s: u32,
    half_duration_s: u32,
    accumulated_s: u32,
    started_at: Option<DateTime<Utc>>,
    pub first_saved: Option<String>,
    pub second_saved: Option<String>,
}

impl MatchClock {
    pub fn new(half_duration_s: u32) -> MatchClock {
        MatchClock::with_db(Db::new("v2_clock"), half_duration_s)
    }

    pub fn with_db(db: Db<String, String>, default_half_s: u32) -> MatchClock {
        let half_duration_s = db
            .read(&KEY_FINAL.to_string())
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(default_half_s);
        let active = db.read(&KEY_ACTIVE.to_string()).map(|v| v == "true").unwrap_or(false);
        let started_at = if active {
            db.read(&KEY_START.to_string())
                .and_then(|v| v.parse::<i64>().ok())
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        } else {
            None
        };

        MatchClock {
            first_saved: db.read(&KEY_FIRST_SAVED.to_string()),
            second_saved: db.read(&KEY_SECOND_SAVED.to_string()),
            db,
            default_half_s,
            half_duration_s,
            accumulated_s: 0,
            started_at,
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn half_duration_s(&self) -> u32 {
        self.half_duration_s
    }

    pub fn start(&mut self) {
        if self.started_at.is_some() {
            return;
        }
        let start = Utc::now() - chrono::Duration::seconds(self.accumulated_s as i64);
        self.started_at = Some(start);
        self.persist(KEY_START, &start.timestamp_millis().to_string());
        self.persist(KEY_ACTIVE, "true");
    }

    pub fn pause(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.accumulated_s = raw_elapsed(started_at);
            self.persist(KEY_ACTIVE, "false");
        }
    }

    /// Elapsed seconds, capped at the half duration.
    pub fn elapsed_s(&self) -> u32 {
        let raw = match self.started_at {
            Some(started_at) => raw_elapsed(started_at),
            None => self.accumulated_s,
        };
        raw.min(self.half_duration_s)
    }

    /// Checks for half-duration overflow. On overflow the formatted
    /// elapsed time is written into the first free half slot and the
    /// clock returns to Paused at zero.
    pub fn poll(&mut self) -> Option<SavedHalf> {
        let started_at = self.started_at?;
        if raw_elapsed(started_at) < self.half_duration_s {
            return None;
        }

        let formatted = format_time(self.half_duration_s);
        let half = if self.first_saved.is_none() {
            self.first_saved = Some(formatted.clone());
            self.persist(KEY_FIRST_SAVED, &formatted);
            SavedHalf::First
        } else {
            self.second_saved = Some(formatted.clone());
            self.persist(KEY_SECOND_SAVED, &formatted);
            SavedHalf::Second
        };
        log::info!("[CLOCK] Half complete at {formatted}");

        self.started_at = None;
        self.accumulated_s = 0;
        self.persist(KEY_ACTIVE, "false");
        self.db.remove(&KEY_START.to_string());
        Some(half)
    }

    pub fn add_minute(&mut self) {
        self.extend_by_seconds(60);
    }

    pub fn subtract_minute(&mut self) {
        self.half_duration_s = self.half_duration_s.saturating_sub(60);
        self.persist(KEY_FINAL, &self.half_duration_s.to_string());
    }

    pub fn extend_by_seconds(&mut self, seconds: u32) {
        self.half_duration_s += seconds;
        self.persist(KEY_FINAL, &self.half_duration_s.to_string());
    }

    /// Clears all persisted state and both saved half-times.
    pub fn reset(&mut self) {
        for key in [KEY_FIRST_SAVED, KEY_SECOND_SAVED, KEY_FINAL, KEY_ACTIVE, KEY_START] {
            self.db.remove(&key.to_string());
        }
        self.first_saved = None;
        self.second_saved = None;
        self.half_duration_s = self.default_half_s;
        self.accumulated_s = 0;
        self.started_at = None;
    }

    fn persist(&self, key: &str, value: &str) {
        self.db.write(&key.to_string(), &value.to_string()).ok_log("[CLOCK] Failed to persist");
    }
}

fn raw_elapsed(started_at: DateTime<Utc>) -> u32 {
    (Utc::now() - started_at).num_seconds().max(0) as u32
}

pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
