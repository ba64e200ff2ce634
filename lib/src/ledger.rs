use crate::{
    analytics::{self, Ranking, Summary},
    attendance::LogStore,
    error::Error,
    initials::{Transliterate, WordInitials},
    lookup, migrate,
    registry::PlayerStore,
    Day, Player, PlayerId, PlayerPatch, Result,
};
use chrono::NaiveDate;
use std::path::Path;

pub const PLAYER_FILE: &str = "players.json";
pub const LOG_FILE: &str = "log.json";

/// The attendance ledger: the player registry and the day log, plus the
/// collaborator that derives initials for new players.
///
/// State lives in memory between [`Ledger::load`] and [`Ledger::save`];
/// nothing is written until `save` is called.
pub struct Ledger {
    players: PlayerStore,
    log: LogStore,
    transliterate: Box<dyn Transliterate>,
}

impl Ledger {
    /// An empty ledger with the pointer on `current_day`.
    pub fn new(current_day: Day) -> Self {
        Self::from_stores(PlayerStore::new(), LogStore::new(current_day))
    }

    pub fn from_stores(players: PlayerStore, log: LogStore) -> Self {
        Self {
            players,
            log,
            transliterate: Box::new(WordInitials),
        }
    }

    pub fn with_transliterator<T: Transliterate + 'static>(mut self, transliterate: T) -> Self {
        self.transliterate = Box::new(transliterate);
        self
    }

    /// Reads both stores from `dir` and brings the player store up to date.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut players: PlayerStore = crate::load_json(dir.join(PLAYER_FILE))?;
        let log: LogStore = crate::load_json(dir.join(LOG_FILE))?;
        log::info!(
            "Loaded {} players and {} days from {}",
            players.len(),
            log.days().count(),
            dir.display()
        );
        migrate::run(&mut players);
        Ok(Self::from_stores(players, log))
    }

    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        crate::save_json(dir.join(PLAYER_FILE), &self.players)?;
        crate::save_json(dir.join(LOG_FILE), &self.log)?;
        log::debug!("Saved ledger to {}", dir.display());
        Ok(())
    }

    pub fn players(&self) -> &PlayerStore {
        &self.players
    }

    pub fn log(&self) -> &LogStore {
        &self.log
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    fn ensure_player(&self, id: PlayerId) -> Result<()> {
        if self.players.contains(id) {
            Ok(())
        } else {
            Err(Error::UnknownPlayer(id))
        }
    }

    // Registry

    /// Adds a player joining on the current day and returns their id.
    pub fn add(&mut self, name: &str, level: u32, initials: Option<&str>) -> PlayerId {
        let join = self.log.current_day();
        self.players
            .add(name, level, initials, join, self.transliterate.as_ref())
    }

    pub fn edit(&mut self, id: PlayerId, patch: &PlayerPatch) -> Result<()> {
        self.players.edit(id, patch)
    }

    pub fn warn(&mut self, id: PlayerId) -> Result<u32> {
        self.players.warn(id)
    }

    pub fn unwarn(&mut self, id: PlayerId) -> Result<u32> {
        self.players.unwarn(id)
    }

    /// Marks the player as leaving on the current day.
    pub fn remove(&mut self, id: PlayerId) -> Result<()> {
        self.players.remove(id, self.log.current_day())
    }

    pub fn fix(&mut self) -> Vec<&'static str> {
        migrate::run(&mut self.players)
    }

    pub fn lookup(&self, query: &str) -> Vec<&Player> {
        lookup::lookup(query, self.players.iter())
    }

    // Day log

    pub fn current_day(&self) -> Day {
        self.log.current_day()
    }

    pub fn set_current_day(&mut self, day: Day) {
        self.log.set_current_day(day);
    }

    pub fn set_current_date(&mut self, text: &str) -> Result<Day> {
        self.log.set_current_date(text)
    }

    pub fn current_date(&self) -> Result<NaiveDate> {
        self.log.current_date()
    }

    pub fn mark(&mut self, id: PlayerId) -> Result<()> {
        self.ensure_player(id)?;
        self.log.mark(id);
        Ok(())
    }

    /// Returns whether the player had been marked.
    pub fn unmark(&mut self, id: PlayerId) -> Result<bool> {
        self.ensure_player(id)?;
        Ok(self.log.unmark(id))
    }

    pub fn complete(&mut self) {
        self.log.complete();
    }

    // Analytics

    pub fn summary(&self) -> Result<Summary> {
        analytics::summary(&self.players, &self.log)
    }

    pub fn lazy_ranking(&self) -> Ranking {
        analytics::lazy_ranking(&self.players, &self.log)
    }
}
