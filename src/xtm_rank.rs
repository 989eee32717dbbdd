// Rankings: completion times per difficulty, persisted as JSON

use chrono::Local;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::xtm_error::StoreError;
use crate::xtm_game::Difficulty;
use crate::xtm_store::write_file;

/// Number of entries shown per difficulty
pub const PODIUM_SIZE: usize = 3;

/// One finished game
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RankingEntry {
    pub nickname: String,
    pub time: u32, // Completion time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>, // YYYY-MM-DD
}

impl RankingEntry {
    pub fn time_display(&self) -> String {
        format_clock(self.time)
    }
}

/// All recorded results, keyed by difficulty, in insertion order
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RankingData {
    #[serde(default, deserialize_with = "merge_rankings")]
    pub difficulty_rankings: BTreeMap<Difficulty, Vec<RankingEntry>>,
}

/// Read the rankings map, concatenating lists whose keys name the same difficulty
/// (e.g. "쉬움" and "Easy") in file order
fn merge_rankings<'de, D>(deserializer: D) -> Result<BTreeMap<Difficulty, Vec<RankingEntry>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct MergeVisitor;

    impl<'de> Visitor<'de> for MergeVisitor {
        type Value = BTreeMap<Difficulty, Vec<RankingEntry>>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of difficulty names to ranking lists")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut rankings: Self::Value = BTreeMap::new();
            while let Some((difficulty, entries)) = map.next_entry::<Difficulty, Vec<RankingEntry>>()? {
                rankings.entry(difficulty).or_default().extend(entries);
            }
            Ok(rankings)
        }
    }

    deserializer.deserialize_map(MergeVisitor)
}

impl RankingData {
    /// Read the rankings file; an absent file gives empty rankings
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let json = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                return match StoreError::io(path, e) {
                    StoreError::NotFound(_) => Ok(RankingData::default()),
                    other => Err(other),
                };
            }
        };
        serde_json::from_str(&json).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        write_file(path, &json)
    }

    /// Append a result, stamped with today's date; no dedup, no cap
    pub fn push(&mut self, difficulty: Difficulty, nickname: &str, secs: u32) {
        let date = Local::now().format("%Y-%m-%d").to_string();
        self.difficulty_rankings
            .entry(difficulty)
            .or_default()
            .push(RankingEntry {
                nickname: nickname.to_string(),
                time: secs,
                date: Some(date),
            });
    }

    /// Append a result and persist the whole table
    pub fn record_result(
        &mut self,
        path: &Path,
        difficulty: Difficulty,
        nickname: &str,
        secs: u32,
    ) -> Result<(), StoreError> {
        self.push(difficulty, nickname, secs);
        self.save(path)?;
        info!(difficulty = difficulty.name(), nickname, secs, "Result recorded");
        Ok(())
    }

    /// Up to `n` fastest entries; equal times keep insertion order
    pub fn top_n(&self, difficulty: Difficulty, n: usize) -> Vec<&RankingEntry> {
        let mut entries: Vec<&RankingEntry> = self
            .difficulty_rankings
            .get(&difficulty)
            .map(|v| v.iter().collect())
            .unwrap_or_default();
        entries.sort_by_key(|e| e.time);
        entries.truncate(n);
        entries
    }

    /// Top three of each difficulty that has any results, easiest first
    pub fn podium(&self) -> Vec<(Difficulty, Vec<&RankingEntry>)> {
        Difficulty::ALL
            .iter()
            .map(|&d| (d, self.top_n(d, PODIUM_SIZE)))
            .filter(|(_, top)| !top.is_empty())
            .collect()
    }
}

/// Load, append, save: what a win does to the rankings file
pub fn record_result(
    path: &Path,
    difficulty: Difficulty,
    nickname: &str,
    secs: u32,
) -> Result<(), StoreError> {
    RankingData::load(path)?.record_result(path, difficulty, nickname, secs)
}

/// MM:SS
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
