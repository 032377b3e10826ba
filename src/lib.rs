pub mod config;
pub mod masking;
pub mod json_masking;
pub mod drain;
pub mod patterns;
pub mod summary;
pub mod compare;
pub mod miner;
pub mod source;
pub mod store;

pub use compare::{compare, ComparisonResult, PatternChange};
pub use config::MinerConfig;
pub use drain::{ClusterId, DrainEngine};
pub use miner::{MinerStats, PatternMiner, RawMessage};
pub use summary::{PatternRecord, PatternSummary};
