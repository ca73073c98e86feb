//! Match persistence collaborator. Write-mostly and best-effort: a failure
//! here is logged and never reaches turn flow or win detection.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One concluded match as seen by the local peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub player: String,
    pub opponent: String,
    pub winner: String,
    pub player_hits: u32,
    pub opponent_hits: u32,
}

/// Aggregated per-player standings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub total_hits: u32,
}

/// Storage seam for match results and the leaderboard/history read surface.
pub trait StatsStore: Send {
    fn record_result(&mut self, record: &MatchRecord) -> anyhow::Result<()>;

    /// Standings sorted by wins descending, then name.
    fn leaderboard(&self) -> anyhow::Result<Vec<LeaderboardRow>>;

    /// Most recent matches first, at most `limit`.
    fn history(&self, limit: usize) -> anyhow::Result<Vec<MatchRecord>>;
}

fn aggregate(records: &[MatchRecord]) -> Vec<LeaderboardRow> {
    fn bump(rows: &mut BTreeMap<String, LeaderboardRow>, name: &str, won: bool, hits: u32) {
        let row = rows
            .entry(name.to_string())
            .or_insert_with(|| LeaderboardRow {
                name: name.to_string(),
                wins: 0,
                losses: 0,
                total_hits: 0,
            });
        if won {
            row.wins += 1;
        } else {
            row.losses += 1;
        }
        row.total_hits += hits;
    }

    let mut rows: BTreeMap<String, LeaderboardRow> = BTreeMap::new();
    for rec in records {
        bump(&mut rows, &rec.player, rec.winner == rec.player, rec.player_hits);
        bump(
            &mut rows,
            &rec.opponent,
            rec.winner == rec.opponent,
            rec.opponent_hits,
        );
    }
    let mut out: Vec<LeaderboardRow> = rows.into_values().collect();
    out.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.name.cmp(&b.name)));
    out
}

fn history_of(records: &[MatchRecord], limit: usize) -> Vec<MatchRecord> {
    records.iter().rev().take(limit).cloned().collect()
}

/// In-memory store for tests and database-less runs.
#[derive(Debug, Default)]
pub struct MemoryStats {
    records: Vec<MatchRecord>,
}

impl MemoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }
}

impl StatsStore for MemoryStats {
    fn record_result(&mut self, record: &MatchRecord) -> anyhow::Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn leaderboard(&self) -> anyhow::Result<Vec<LeaderboardRow>> {
        Ok(aggregate(&self.records))
    }

    fn history(&self, limit: usize) -> anyhow::Result<Vec<MatchRecord>> {
        Ok(history_of(&self.records, limit))
    }
}

/// File-backed store: the full record vector, bincode-encoded, rewritten on
/// every append. Fine for the volumes a two-player game produces.
pub struct FileStats {
    path: PathBuf,
    records: Vec<MatchRecord>,
}

impl FileStats {
    /// Open or create the store at `path`. An unreadable or corrupt file
    /// starts an empty history rather than failing the game.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = Self::load(&path).unwrap_or_else(|e| {
            log::warn!("stats file {} unreadable, starting empty: {e:#}", path.display());
            Vec::new()
        });
        Self { path, records }
    }

    fn load(path: &Path) -> anyhow::Result<Vec<MatchRecord>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    fn flush(&self) -> anyhow::Result<()> {
        let bytes = bincode::serialize(&self.records)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl StatsStore for FileStats {
    fn record_result(&mut self, record: &MatchRecord) -> anyhow::Result<()> {
        self.records.push(record.clone());
        self.flush()
    }

    fn leaderboard(&self) -> anyhow::Result<Vec<LeaderboardRow>> {
        Ok(aggregate(&self.records))
    }

    fn history(&self, limit: usize) -> anyhow::Result<Vec<MatchRecord>> {
        Ok(history_of(&self.records, limit))
    }
}
