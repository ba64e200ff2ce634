use rollcall::ledger::{LOG_FILE, PLAYER_FILE};
use rollcall::{date, Error, Ledger, PlayerPatch};
use std::fs;

fn ledger_on(date: &str) -> Ledger {
    let mut ledger = Ledger::new(0);
    ledger.set_current_date(date).unwrap();
    ledger
}

#[test]
fn date_pointer_moves_forward_and_round_trips() {
    let mut ledger = ledger_on("2015-06-01");
    let first = ledger.current_day();
    ledger.set_current_date("2015-06-02").unwrap();
    assert!(ledger.current_day() > first);
    assert_eq!(ledger.current_date().unwrap().to_string(), "2015-06-02");
    assert_eq!(
        date::instant_of(ledger.current_day()).unwrap().to_rfc3339(),
        "2015-06-02T00:00:00+00:00"
    );
    assert!(ledger.log().bucket(first).is_some());
    assert!(ledger.log().bucket(ledger.current_day()).is_some());
}

#[test]
fn ids_keep_increasing_across_removals() {
    let mut ledger = ledger_on("2015-06-01");
    let a = ledger.add("Alice Brown", 1, None);
    let b = ledger.add("Bob Cole", 1, None);
    ledger.remove(b).unwrap();
    let c = ledger.add("Carol Diaz", 1, None);
    assert!(a < b && b < c);
    assert_eq!(ledger.players().len(), 3);
}

#[test]
fn warn_then_unwarn_restores_count() {
    let mut ledger = ledger_on("2015-06-01");
    let id = ledger.add("Alice Brown", 1, None);
    ledger.warn(id).unwrap();
    let before = ledger.player(id).unwrap().warn;
    ledger.warn(id).unwrap();
    ledger.unwarn(id).unwrap();
    assert_eq!(ledger.player(id).unwrap().warn, before);

    let fresh = ledger.add("Bob Cole", 1, None);
    assert_eq!(ledger.unwarn(fresh).unwrap(), 0);
}

#[test]
fn unmark_leaves_no_key_behind() {
    let mut ledger = ledger_on("2015-06-01");
    let id = ledger.add("Alice Brown", 1, None);
    ledger.mark(id).unwrap();
    assert!(ledger.unmark(id).unwrap());
    let bucket = ledger.log().bucket(ledger.current_day()).unwrap();
    assert!(!bucket.contains_key(&id));
}

#[test]
fn lookup_by_initials() {
    let mut ledger = ledger_on("2015-06-01");
    let ab = ledger.add("Anna Bell", 1, Some("AB"));
    let ac = ledger.add("Anna Cruz", 1, Some("AC"));
    let found: Vec<_> = ledger.lookup("A").iter().map(|p| p.id).collect();
    assert_eq!(found, [ab, ac]);
    assert!(ledger.lookup("ZZ").is_empty());
    let found: Vec<_> = ledger.lookup("ac").iter().map(|p| p.id).collect();
    assert_eq!(found, [ac]);
}

#[test]
fn edit_applies_patch() {
    let mut ledger = ledger_on("2015-06-01");
    let id = ledger.add("Alice Brown", 1, None);
    let patch = PlayerPatch::from_pairs(["level=4", "title=officer"]).unwrap();
    ledger.edit(id, &patch).unwrap();
    let player = ledger.player(id).unwrap();
    assert_eq!(player.level, 4);
    assert_eq!(player.title.as_deref(), Some("officer"));
    assert!(matches!(PlayerPatch::from_pairs(["colour=red"]), Err(Error::UnknownField(_))));
}

#[test]
fn a_week_of_attendance() {
    let mut ledger = Ledger::new(5);
    let steady = ledger.add("Steady Eddie", 2, None);
    let flaky = ledger.add("Flaky Fran", 2, None);

    for day in 6..=9 {
        ledger.set_current_day(day);
        ledger.mark(steady).unwrap();
        if day == 7 {
            ledger.mark(flaky).unwrap();
        }
        ledger.complete();
    }

    let summary = ledger.summary().unwrap();
    assert_eq!(summary.total_eligible, 2);
    assert_eq!(summary.present_count, 1);
    assert_eq!(summary.lazy_players.iter().map(|p| p.id).collect::<Vec<_>>(), [flaky]);
    assert!(summary.completed);

    let ranking = ledger.lazy_ranking();
    assert_eq!(ranking.len(), 1);
    let entry = &ranking[0];
    assert_eq!(entry.player.id, flaky);
    assert_eq!((entry.total_days, entry.missed_days, entry.layback_days), (4, 0, 3));
    assert_eq!(entry.score, 0.75);

    ledger.set_current_day(10);
    let summary = ledger.summary().unwrap();
    assert_eq!(summary.present_count, 0);
    assert!(!summary.completed);
    for entry in ledger.lazy_ranking().iter() {
        assert!(entry.total_days > 0);
        assert!(entry.missed_days + entry.layback_days > 0);
    }
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = ledger_on("2015-06-01");
    let id = ledger.add("Alice Brown", 3, None);
    ledger.set_current_date("2015-06-02").unwrap();
    ledger.mark(id).unwrap();
    ledger.complete();
    ledger.warn(id).unwrap();
    ledger.save(dir.path()).unwrap();

    let loaded = Ledger::load(dir.path()).unwrap();
    assert_eq!(loaded.players(), ledger.players());
    assert_eq!(loaded.log(), ledger.log());

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(PLAYER_FILE)).unwrap()).unwrap();
    assert_eq!(raw["id"], 2);
    assert_eq!(raw["player"]["1"]["name"], "Alice Brown");
    assert_eq!(raw["player"]["1"]["warn"], 1);
}

#[test]
fn loading_a_legacy_store_runs_migrations_once() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(PLAYER_FILE),
        r#"{"id": 2, "player": {"1": {"id": 1, "active": true, "name": "Old Timer", "initials": "ot", "level": "5", "title": null, "join": 0, "warn": 0}}}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(LOG_FILE),
        r#"{"currentDay": 16500, "day": {"16500": {}}, "complete": {}}"#,
    )
    .unwrap();

    let mut ledger = Ledger::load(dir.path()).unwrap();
    let player = ledger.player(1).unwrap();
    assert_eq!(player.join, rollcall::migrate::LEGACY_JOIN_DAY);
    assert_eq!(player.level, 5);
    assert!(ledger.fix().is_empty());
}

#[test]
fn missing_files_fail_to_load() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(Ledger::load(dir.path()), Err(Error::Io(_))));

    fs::write(dir.path().join(PLAYER_FILE), "{ not json").unwrap();
    fs::write(dir.path().join(LOG_FILE), "{}").unwrap();
    assert!(matches!(Ledger::load(dir.path()), Err(Error::Json(_))));
}
