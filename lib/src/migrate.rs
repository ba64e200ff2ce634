//! Versioned repairs for player stores written by older builds.
//!
//! Each step carries the schema version it upgrades to. [`run`] applies the
//! steps newer than the store's stamp, in order, then bumps the stamp, so a
//! store is only ever repaired once.

use crate::{registry::PlayerStore, Day};

/// Default join day for records imported without one.
pub const LEGACY_JOIN_DAY: Day = 16401;

struct Migration {
    version: u32,
    name: &'static str,
    /// Returns how many records were changed.
    apply: fn(&mut PlayerStore) -> usize,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "legacy-join",
        apply: legacy_join,
    },
    Migration {
        version: 2,
        name: "leave-before-join",
        apply: leave_before_join,
    },
];

pub const SCHEMA_VERSION: u32 = 2;

fn legacy_join(store: &mut PlayerStore) -> usize {
    let mut changed = 0;
    for player in store.players_mut().filter(|p| p.join == 0) {
        player.join = LEGACY_JOIN_DAY;
        changed += 1;
    }
    changed
}

fn leave_before_join(store: &mut PlayerStore) -> usize {
    let mut changed = 0;
    for player in store.players_mut() {
        if let Some(leave) = player.leave.filter(|&leave| leave < player.join) {
            log::debug!("Player {} left on {} before joining on {}", player.id, leave, player.join);
            player.leave = Some(player.join);
            changed += 1;
        }
    }
    changed
}

/// Applies pending migrations, returning the names of the steps that ran.
pub fn run(store: &mut PlayerStore) -> Vec<&'static str> {
    let from = store.schema;
    let mut applied = Vec::new();
    for migration in MIGRATIONS.iter().filter(|m| m.version > from) {
        let changed = (migration.apply)(store);
        store.schema = migration.version;
        log::info!(
            "Applied migration {} ({}): {} record(s) changed",
            migration.version,
            migration.name,
            changed
        );
        applied.push(migration.name);
    }
    applied
}
