use broadside::{FileStats, MatchRecord, MemoryStats, StatsStore};

fn record(player: &str, opponent: &str, winner: &str, hits: (u32, u32)) -> MatchRecord {
    MatchRecord {
        player: player.into(),
        opponent: opponent.into(),
        winner: winner.into(),
        player_hits: hits.0,
        opponent_hits: hits.1,
    }
}

#[test]
fn leaderboard_aggregates_both_sides() {
    let mut stats = MemoryStats::new();
    stats
        .record_result(&record("Alice", "Bob", "Alice", (12, 5)))
        .unwrap();
    stats
        .record_result(&record("Alice", "Bob", "Bob", (3, 12)))
        .unwrap();
    stats
        .record_result(&record("Alice", "Carol", "Alice", (12, 0)))
        .unwrap();

    let rows = stats.leaderboard().unwrap();
    assert_eq!(rows[0].name, "Alice");
    assert_eq!(rows[0].wins, 2);
    assert_eq!(rows[0].losses, 1);
    assert_eq!(rows[0].total_hits, 27);
    let bob = rows.iter().find(|r| r.name == "Bob").unwrap();
    assert_eq!((bob.wins, bob.losses, bob.total_hits), (1, 1, 17));
}

#[test]
fn history_is_newest_first_and_limited() {
    let mut stats = MemoryStats::new();
    for i in 0..5 {
        stats
            .record_result(&record("Alice", "Bob", "Alice", (i, 0)))
            .unwrap();
    }
    let history = stats.history(3).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].player_hits, 4);
    assert_eq!(history[2].player_hits, 2);
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.bin");

    let mut stats = FileStats::open(&path);
    stats
        .record_result(&record("Alice", "Bob", "Bob", (7, 12)))
        .unwrap();
    drop(stats);

    let reopened = FileStats::open(&path);
    let history = reopened.history(10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].winner, "Bob");
    let rows = reopened.leaderboard().unwrap();
    assert_eq!(rows[0].name, "Bob");
    assert_eq!(rows[0].wins, 1);
}

#[test]
fn corrupt_file_starts_empty_instead_of_failing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.bin");
    std::fs::write(&path, b"not bincode at all").unwrap();

    let stats = FileStats::open(&path);
    assert!(stats.history(10).unwrap().is_empty());
}
