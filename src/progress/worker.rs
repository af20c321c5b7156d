use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use super::store::{ScoreRecord, ScoreStore};
use crate::multicut::{Graph, SessionObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Additional attempts after a failed save.
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_ms: 250,
        }
    }
}

/// Queues improved scores for the background worker. Never blocks.
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    tx: mpsc::UnboundedSender<ScoreRecord>,
}

impl ProgressHandle {
    pub fn submit(&self, record: ScoreRecord) {
        if self.tx.send(record).is_err() {
            warn!("Progress worker is gone; dropping score record");
        }
    }
}

impl SessionObserver for ProgressHandle {
    fn on_score_improved(&mut self, graph: &Graph) {
        if let Some(record) = ScoreRecord::from_graph(graph) {
            self.submit(record);
        }
    }

    fn on_solved(&mut self, graph: &Graph) {
        debug!("Level {:?} solved; best cost already queued", graph.name);
    }
}

/// Starts the worker persisting submitted records. It stops once every handle is dropped
/// and the queue has been drained.
pub fn spawn_progress_worker<S: ScoreStore>(
    store: S,
    config: ProgressConfig,
) -> (ProgressHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(run_worker(store, config, rx));
    (ProgressHandle { tx }, worker)
}

async fn run_worker<S: ScoreStore>(
    store: S,
    config: ProgressConfig,
    mut rx: mpsc::UnboundedReceiver<ScoreRecord>,
) {
    while let Some(record) = rx.recv().await {
        // only the latest record per level matters
        let mut pending = BTreeMap::new();
        pending.insert(record.key(), record);
        while let Ok(record) = rx.try_recv() {
            pending.insert(record.key(), record);
        }

        let batch: Vec<ScoreRecord> = pending.into_values().collect();
        save_with_retries(&store, &batch, config).await;
    }

    debug!("Progress worker stopped");
}

async fn save_with_retries<S: ScoreStore>(store: &S, batch: &[ScoreRecord], config: ProgressConfig) {
    let mut attempt = 0;
    loop {
        match store.save(batch).await {
            Ok(()) => {
                info!("Persisted {} score record(s)", batch.len());
                return;
            }
            Err(e) if attempt < config.retries => {
                attempt += 1;
                warn!("Saving progress failed (attempt {attempt}): {e:?}");
                tokio::time::sleep(Duration::from_millis(config.retry_delay_ms)).await;
            }
            Err(e) => {
                warn!(
                    "Giving up on {} score record(s) after {} attempts: {e:?}",
                    batch.len(),
                    attempt + 1
                );
                return;
            }
        }
    }
}
