use crate::{attendance::LogStore, registry::PlayerStore, Day, Player, Result};
use chrono::NaiveDate;
use derive_deref::Deref;

/// Attendance on the current day.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub day: Day,
    pub date: NaiveDate,
    pub completed: bool,
    pub present_count: usize,
    pub total_eligible: usize,
    /// Eligible players without a mark, registry order.
    pub lazy_players: Vec<Player>,
}

pub fn summary(players: &PlayerStore, log: &LogStore) -> Result<Summary> {
    let day = log.current_day();
    let mut present_count = 0;
    let mut total_eligible = 0;
    let mut lazy_players = Vec::new();

    for player in players.eligible_on(day) {
        total_eligible += 1;
        if log.is_present(day, player.id) {
            present_count += 1;
        } else {
            lazy_players.push(player.clone());
        }
    }

    Ok(Summary {
        day,
        date: log.current_date()?,
        completed: log.is_complete(day),
        present_count,
        total_eligible,
        lazy_players,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct LazyEntry {
    pub player: Player,
    pub total_days: i64,
    /// Absent on a day that was never completed.
    pub missed_days: i64,
    /// Absent on a completed day.
    pub layback_days: i64,
    pub score: f64,
}

impl LazyEntry {
    fn score(total_days: i64, missed_days: i64, layback_days: i64) -> f64 {
        let total = total_days as f64;
        (missed_days as f64 / total) * 10.0 + (layback_days as f64 / total)
    }
}

/// Lazy entries, highest score first.
#[derive(Debug, Clone, Default, PartialEq, Deref)]
pub struct Ranking(Vec<LazyEntry>);

impl IntoIterator for Ranking {
    type Item = LazyEntry;
    type IntoIter = std::vec::IntoIter<LazyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// Counts come from the logged days inside the window, so its width does not
// matter; a window whose bounds overflow is skipped.
fn lazy_entry(player: &Player, log: &LogStore, today: Day) -> Option<LazyEntry> {
    let start_day = player.join.checked_add(1)?;
    let end_day = player.leave.unwrap_or(today);
    let total_days = end_day.checked_sub(start_day)?.checked_add(1)?;
    if total_days <= 0 {
        return None;
    }

    let present_days = log.present_days(player.id, start_day..=end_day).count() as i64;
    let layback_days = log
        .completed_days(start_day..=end_day)
        .filter(|&day| !log.is_present(day, player.id))
        .count() as i64;
    let missed_days = total_days - present_days - layback_days;

    if missed_days == 0 && layback_days == 0 {
        return None;
    }

    Some(LazyEntry {
        player: player.clone(),
        total_days,
        missed_days,
        layback_days,
        score: LazyEntry::score(total_days, missed_days, layback_days),
    })
}

/// Historical absence ranking over every player still on the roster at the
/// current day.
///
/// Uncompleted days weigh ten times as much as completed days the player
/// skipped. Players with a clean record are left out.
pub fn lazy_ranking(players: &PlayerStore, log: &LogStore) -> Ranking {
    let today = log.current_day();
    let mut entries: Vec<LazyEntry> = players
        .iter()
        .filter(|player| player.leave.map_or(true, |leave| leave >= today))
        .filter_map(|player| lazy_entry(player, log, today))
        .collect();
    entries.sort_by(|lhs, rhs| rhs.score.total_cmp(&lhs.score));
    log::debug!("{} of {} players in the lazy ranking", entries.len(), players.len());
    Ranking(entries)
}
