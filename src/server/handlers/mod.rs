pub mod status;
pub use status::status_handler;

pub mod score_submit;
pub use score_submit::score_submit_handler;

pub mod leaderboard;
pub use leaderboard::{leaderboard_handler, player_rank_handler};

pub mod level_upload;
pub use level_upload::level_upload_handler;

pub mod level_list;
pub use level_list::level_list_handler;

pub mod level_download;
pub use level_download::level_download_handler;

pub mod level_delete;
pub use level_delete::level_delete_handler;

pub mod solution_upload;
pub use solution_upload::solution_upload_handler;

// imports used by pretty much every handler
mod common;
