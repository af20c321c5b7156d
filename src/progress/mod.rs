pub mod store;
pub mod worker;

pub use store::{load_progress, JsonProgressStore, Progress, ScoreRecord, ScoreStore};
pub use worker::{spawn_progress_worker, ProgressConfig, ProgressHandle};
