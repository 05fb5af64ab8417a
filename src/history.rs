use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{DailyRecord, HistoryItem};

const STORE_DIR: &str = "pitchcast";
const STORE_FILE: &str = "history.json";
const STORE_VERSION: u32 = 1;

/// Appends incoming items to the record, dropping any whose (home, away)
/// pair already exists. Running the same merge twice converges to one item
/// per pair, which keeps repeated pipeline runs idempotent.
pub fn merge_into_record(record: &mut DailyRecord, incoming: Vec<HistoryItem>) {
    for item in incoming {
        let exists = record.items.iter().any(|existing| {
            existing.home_team.eq_ignore_ascii_case(&item.home_team)
                && existing.away_team.eq_ignore_ascii_case(&item.away_team)
        });
        if !exists {
            record.items.push(item);
        }
    }
}

/// Read/write contract the settlement pipeline needs from persistence:
/// read-before-merge, upsert-after-merge. Storage mechanics stay behind
/// this trait.
pub trait HistoryStore {
    fn load(&self, date: NaiveDate) -> Result<Option<DailyRecord>>;
    fn upsert(&self, record: &DailyRecord) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoreFile {
    version: u32,
    days: HashMap<String, Vec<HistoryItem>>,
}

/// Single-file JSON store under the XDG cache dir. Writes go through a tmp
/// file and rename so a crash never leaves a half-written history.
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_env() -> Result<Self> {
        let path = store_path().context("no usable cache directory for history")?;
        Ok(Self::new(path))
    }

    fn load_file(&self) -> StoreFile {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return StoreFile::default();
        };
        let file = serde_json::from_str::<StoreFile>(&raw).unwrap_or_default();
        if file.version != STORE_VERSION {
            return StoreFile::default();
        }
        file
    }

    fn save_file(&self, file: &StoreFile) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).ok();
        }
        let json = serde_json::to_string(file).context("serialize history store")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).context("write history store")?;
        fs::rename(&tmp, &self.path).context("swap history store")?;
        Ok(())
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self, date: NaiveDate) -> Result<Option<DailyRecord>> {
        let file = self.load_file();
        Ok(file.days.get(&date.to_string()).map(|items| DailyRecord {
            date,
            items: items.clone(),
        }))
    }

    fn upsert(&self, record: &DailyRecord) -> Result<()> {
        let mut file = self.load_file();
        file.version = STORE_VERSION;
        file.days
            .insert(record.date.to_string(), record.items.clone());
        self.save_file(&file)
    }
}

fn store_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(STORE_DIR).join(STORE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(STORE_DIR)
            .join(STORE_FILE),
    )
}
