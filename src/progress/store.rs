use std::{
    collections::BTreeMap,
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::multicut::{Cost, Graph};

/// Best cost of one level, identified by its name and creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub created_at: String,
    pub best_achieved_cost: Cost,
    pub optimal_cost: Cost,
}

impl ScoreRecord {
    /// `None` while nothing was achieved on the level.
    pub fn from_graph(graph: &Graph) -> Option<Self> {
        Some(Self {
            name: graph.name.clone(),
            created_at: graph.created_at.clone(),
            best_achieved_cost: graph.best_achieved_cost?,
            optimal_cost: graph.optimal_cost,
        })
    }

    pub fn key(&self) -> String {
        level_key(&self.name, &self.created_at)
    }

    pub fn is_completed(&self) -> bool {
        self.best_achieved_cost == self.optimal_cost
    }
}

/// The length prefix keeps keys distinct even when names contain the separator.
fn level_key(name: &str, created_at: &str) -> String {
    format!("{}:{name}@{created_at}", name.len())
}

/// Durable storage for best scores. Records carry absolute values, so saving the same
/// record twice is harmless and failed saves may simply be retried.
pub trait ScoreStore: Send + Sync + 'static {
    fn save(&self, records: &[ScoreRecord]) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub levels: BTreeMap<String, ScoreRecord>,
}

impl Progress {
    pub fn record(&self, graph: &Graph) -> Option<&ScoreRecord> {
        self.levels.get(&level_key(&graph.name, &graph.created_at))
    }

    /// Restores saved best costs onto freshly loaded levels; returns how many were found.
    pub fn apply(&self, graphs: &mut [Graph]) -> usize {
        let mut restored = 0;
        for graph in graphs.iter_mut() {
            if let Some(record) = self.record(graph) {
                graph.best_achieved_cost = Some(record.best_achieved_cost);
                restored += 1;
            }
        }
        restored
    }

    pub fn completed_levels(&self) -> usize {
        self.levels.values().filter(|r| r.is_completed()).count()
    }
}

pub async fn load_progress(path: &Path) -> anyhow::Result<Progress> {
    match tokio::fs::read(path).await {
        Ok(data) => serde_json::from_slice(&data)
            .with_context(|| format!("failed to parse progress file {}", path.display())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Progress::default()),
        Err(e) => {
            Err(e).with_context(|| format!("failed to read progress file {}", path.display()))
        }
    }
}

/// Keeps progress in a single JSON file, replaced atomically on every save.
pub struct JsonProgressStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonProgressStore {
    async fn save(&self, records: &[ScoreRecord]) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;

        let mut progress = load_progress(&self.path).await?;
        for record in records {
            progress.levels.insert(record.key(), record.clone());
        }

        let data = serde_json::to_vec_pretty(&progress)?;
        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, data)
            .await
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        debug!(
            "Saved {} record(s) to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn level(name: &str, best: Option<Cost>) -> Graph {
        let mut graph = Graph::from_edges(2, [(0, 1, -1)], -1).unwrap();
        graph.name = name.to_string();
        graph.created_at = "2025-01-01".to_string();
        graph.best_achieved_cost = best;
        graph
    }

    #[test]
    fn records_need_an_achievement() {
        assert!(ScoreRecord::from_graph(&level("a", None)).is_none());

        let record = ScoreRecord::from_graph(&level("a", Some(-1))).unwrap();
        assert_eq!(record.key(), "1:a@2025-01-01");
        assert!(record.is_completed());
    }

    #[test]
    fn keys_do_not_collide() {
        let mut first = level("a@b", Some(0));
        first.created_at = String::new();
        let mut second = level("a", Some(-1));
        second.created_at = String::from("b@");

        let first = ScoreRecord::from_graph(&first).unwrap();
        let second = ScoreRecord::from_graph(&second).unwrap();
        assert_ne!(first.key(), second.key());

        let progress = Progress {
            levels: [first, second]
                .into_iter()
                .map(|record| (record.key(), record))
                .collect(),
        };
        assert_eq!(progress.levels.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_empty_progress() {
        let dir = tempfile::tempdir().unwrap();
        let progress = load_progress(&dir.path().join("progress.json")).await.unwrap();
        assert_eq!(progress, Progress::default());
    }

    #[tokio::test]
    async fn save_overwrites_and_restores() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProgressStore::new(dir.path().join("progress.json"));

        let first = ScoreRecord::from_graph(&level("a", Some(0))).unwrap();
        let other = ScoreRecord::from_graph(&level("b", Some(0))).unwrap();
        store.save(&[first, other]).await.unwrap();

        // saving the same value twice is harmless
        let better = ScoreRecord::from_graph(&level("a", Some(-1))).unwrap();
        store.save(&[better.clone()]).await.unwrap();
        store.save(&[better]).await.unwrap();

        let progress = load_progress(store.path()).await.unwrap();
        assert_eq!(progress.levels.len(), 2);
        assert_eq!(progress.completed_levels(), 1);

        let mut levels = vec![level("a", None), level("b", None), level("c", None)];
        assert_eq!(progress.apply(&mut levels), 2);
        assert_eq!(levels[0].best_achieved_cost, Some(-1));
        assert_eq!(levels[1].best_achieved_cost, Some(0));
        assert_eq!(levels[2].best_achieved_cost, None);
        assert!(levels[0].is_completed());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let err = load_progress(&path).await.unwrap_err();
        assert!(err.to_string().contains("failed to parse progress file"));
        assert!(JsonProgressStore::new(path).save(&[]).await.is_err());
    }
}
