pub mod multicut;
pub mod progress;
pub mod server;
