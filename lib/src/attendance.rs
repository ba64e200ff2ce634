use crate::{date, Day, PlayerId, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Presence marks per day, completion flags, and the day currently being edited.
///
/// A player missing from a day's bucket was absent; marks are only ever `true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogStore {
    #[serde(rename = "currentDay")]
    current_day: Day,
    #[serde(default)]
    day: BTreeMap<Day, BTreeMap<PlayerId, bool>>,
    #[serde(default)]
    complete: BTreeMap<Day, bool>,
}

impl LogStore {
    pub fn new(current_day: Day) -> Self {
        let mut log = Self::default();
        log.set_current_day(current_day);
        log
    }

    pub fn current_day(&self) -> Day {
        self.current_day
    }

    pub fn set_current_day(&mut self, day: Day) {
        self.day.entry(day).or_default();
        self.current_day = day;
    }

    /// Parses `text` and moves the pointer; on error the pointer stays put.
    pub fn set_current_date(&mut self, text: &str) -> Result<Day> {
        let day = date::parse_day(text)?;
        self.set_current_day(day);
        Ok(day)
    }

    pub fn current_date(&self) -> Result<NaiveDate> {
        date::date_of(self.current_day)
    }

    pub fn mark(&mut self, player: PlayerId) {
        self.day.entry(self.current_day).or_default().insert(player, true);
    }

    /// Returns whether a mark was removed.
    pub fn unmark(&mut self, player: PlayerId) -> bool {
        self.day
            .get_mut(&self.current_day)
            .and_then(|bucket| bucket.remove(&player))
            .is_some()
    }

    pub fn complete(&mut self) {
        self.complete.insert(self.current_day, true);
    }

    pub fn is_present(&self, day: Day, player: PlayerId) -> bool {
        self.day
            .get(&day)
            .and_then(|bucket| bucket.get(&player))
            .copied()
            .unwrap_or(false)
    }

    pub fn is_complete(&self, day: Day) -> bool {
        self.complete.get(&day).copied().unwrap_or(false)
    }

    pub fn bucket(&self, day: Day) -> Option<&BTreeMap<PlayerId, bool>> {
        self.day.get(&day)
    }

    /// Days that have a bucket, ascending.
    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        self.day.keys().copied()
    }

    /// Days in `range` on which `player` was marked. `range` must not be empty.
    pub fn present_days(&self, player: PlayerId, range: RangeInclusive<Day>) -> impl Iterator<Item = Day> + '_ {
        self.day
            .range(range)
            .filter(move |(_, bucket)| bucket.get(&player).copied().unwrap_or(false))
            .map(|(&day, _)| day)
    }

    /// Completed days in `range`. `range` must not be empty.
    pub fn completed_days(&self, range: RangeInclusive<Day>) -> impl Iterator<Item = Day> + '_ {
        self.complete
            .range(range)
            .filter(|&(_, &done)| done)
            .map(|(&day, _)| day)
    }
}
