use crate::{
    error::Error, initials::Transliterate, Day, Player, PlayerId, PlayerPatch, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every player ever added, keyed by id. Records are never deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStore {
    /// Next id to hand out.
    #[serde(rename = "id", default)]
    next_id: PlayerId,
    /// Last applied migration, see [`crate::migrate`].
    #[serde(default)]
    pub(crate) schema: u32,
    #[serde(rename = "player", default)]
    players: BTreeMap<PlayerId, Player>,
}

impl PlayerStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            schema: crate::migrate::SCHEMA_VERSION,
            players: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> u32 {
        self.schema
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    /// Players in registry order, which is ascending id.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn eligible_on(&self, day: Day) -> impl Iterator<Item = &Player> {
        self.iter().filter(move |player| player.is_eligible_on(day))
    }

    pub(crate) fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    fn get_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players.get_mut(&id).ok_or(Error::UnknownPlayer(id))
    }

    // A stale counter in the file must never hand out an id already in use.
    fn allocate_id(&mut self) -> PlayerId {
        let after_last = self.players.keys().next_back().map_or(1, |id| id + 1);
        let id = self.next_id.max(after_last).max(1);
        self.next_id = id + 1;
        id
    }

    pub fn add(
        &mut self,
        name: &str,
        level: u32,
        initials: Option<&str>,
        join: Day,
        transliterate: &dyn Transliterate,
    ) -> PlayerId {
        let initials = match initials {
            Some(initials) => initials.to_string(),
            None => transliterate.initials(name),
        };
        let id = self.allocate_id();
        let player = Player::new(id, name.to_string(), initials, level, join);
        log::debug!("Adding player {} ({}) on day {}", id, player, join);
        self.players.insert(id, player);
        id
    }

    pub fn edit(&mut self, id: PlayerId, patch: &PlayerPatch) -> Result<()> {
        let player = self.get_mut(id)?;
        log::debug!("Editing player {}: {:?}", id, patch);
        patch.apply(player);
        Ok(())
    }

    /// Returns the new warning count.
    pub fn warn(&mut self, id: PlayerId) -> Result<u32> {
        let player = self.get_mut(id)?;
        player.warn = player.warn.saturating_add(1);
        Ok(player.warn)
    }

    /// Returns the new warning count; never goes below zero.
    pub fn unwarn(&mut self, id: PlayerId) -> Result<u32> {
        let player = self.get_mut(id)?;
        player.warn = player.warn.saturating_sub(1);
        Ok(player.warn)
    }

    /// Stamps `leave`; the record stays for historical analytics.
    pub fn remove(&mut self, id: PlayerId, day: Day) -> Result<()> {
        let player = self.get_mut(id)?;
        log::debug!("Player {} leaves on day {}", id, day);
        player.leave = Some(day);
        Ok(())
    }
}
