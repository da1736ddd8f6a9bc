// file: src/classifier/trend.rs
// description: star-velocity trend heuristic and velocity derivation
// reference: snapshot diffing for recent growth

use crate::models::{RawRepository, Snapshot, Trend};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub const RISING_ABOVE: i64 = 1000;
pub const FALLING_BELOW: i64 = 100;

const WEEK_SECS: i64 = 7 * 24 * 3600;
/// Snapshots closer together than this give no derived velocity.
pub const MIN_SNAPSHOT_GAP_SECS: i64 = 24 * 3600;

/// Map a recent-growth signal onto a trend label.
///
/// Strictly above 1000 is rising, strictly below 100 is falling, the bounds
/// themselves are stable. No signal at all reads as stable.
pub fn trend(velocity: Option<i64>) -> Trend {
    match velocity {
        Some(v) if v > RISING_ABOVE => Trend::Rising,
        Some(v) if v < FALLING_BELOW => Trend::Falling,
        _ => Trend::Stable,
    }
}

/// Star counts from the previous snapshot, keyed by `full_name`.
#[derive(Debug, Clone, Default)]
pub struct VelocityIndex {
    previous_stars: HashMap<String, u64>,
    gap_secs: i64,
}

impl VelocityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self::from_snapshot_at(snapshot, Utc::now())
    }

    pub fn from_snapshot_at(snapshot: &Snapshot, now: DateTime<Utc>) -> Self {
        let previous_stars = snapshot
            .projects
            .iter()
            .map(|p| (p.full_name.clone(), p.stars))
            .collect();
        Self {
            previous_stars,
            gap_secs: (now - snapshot.timestamp).num_seconds(),
        }
    }

    pub fn len(&self) -> usize {
        self.previous_stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.previous_stars.is_empty()
    }

    /// Upstream velocity wins; otherwise the star delta against the previous
    /// snapshot, scaled to stars per week. `None` when the previous snapshot is
    /// less than a day old.
    pub fn velocity_for(&self, record: &RawRepository) -> Option<i64> {
        if let Some(v) = record.stargazers_since_last_analytic {
            return Some(v);
        }
        if self.gap_secs < MIN_SNAPSHOT_GAP_SECS {
            return None;
        }

        self.previous_stars.get(&record.full_name).map(|&prev| {
            let delta = record.stargazers_count as i64 - prev as i64;
            (delta as i128 * WEEK_SECS as i128 / self.gap_secs as i128) as i64
        })
    }
}
